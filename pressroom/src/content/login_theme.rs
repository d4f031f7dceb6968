// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Login page theming. The stored option is a partial override; the page
//! always renders `defaults ⊕ stored` over the fixed key set below.

use super::{ContentError, ValidationErrors};
use crate::options::{LOGIN_SETTINGS, OptionStore, OptionStoreExt, StoreError};
use crate::util::FormData;
use crate::util::color::{parse_hex_color, rgba};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Write;

pub const BG_TYPES: &[&str] = &["color", "gradient", "image", "pattern", "none"];
pub const BG_PATTERNS: &[&str] = &["dots", "grid", "diagonal", "checkerboard", "waves"];
const IMAGE_SIZES: &[&str] = &["cover", "contain", "auto"];
const IMAGE_POSITIONS: &[&str] = &["center", "top", "bottom", "left", "right"];
const FONT_WEIGHTS: &[&str] = &["normal", "500", "600", "bold"];
const TEXT_ALIGNS: &[&str] = &["left", "center", "right"];
const NO_OPTIONS: &[&str] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Text,
    Color,
    Number { min: i64, max: i64 },
    Flag,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Text(&'static str),
    Number(i64),
    Flag(bool),
}

#[derive(Debug, Clone, Copy)]
pub struct SettingSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub section: &'static str,
    pub kind: SettingKind,
    pub default: DefaultValue,
}

impl SettingSpec {
    pub fn default_value(&self) -> Value {
        match self.default {
            DefaultValue::Text(text) => Value::from(text),
            DefaultValue::Number(number) => Value::from(number),
            DefaultValue::Flag(flag) => Value::from(flag),
        }
    }
}

const fn setting(
    section: &'static str,
    key: &'static str,
    label: &'static str,
    kind: SettingKind,
    default: DefaultValue,
) -> SettingSpec {
    SettingSpec {
        key,
        label,
        section,
        kind,
        default,
    }
}

const BACKGROUND: &str = "Background";
const LOGO: &str = "Logo";
const FORM: &str = "Form";
const LABELS: &str = "Labels";
const INPUTS: &str = "Inputs";
const BUTTON: &str = "Button";
const LINKS: &str = "Links";
const TEXT: &str = "Text";

use DefaultValue::{Flag as F, Number as N, Text as T};
use SettingKind::{Choice, Color, Flag, Number, Text};

const PERCENT: SettingKind = Number { min: 0, max: 100 };
const PIXELS: SettingKind = Number { min: 0, max: 2000 };

pub static SETTINGS: &[SettingSpec] = &[
    setting(BACKGROUND, "bg_type", "Background type", Choice(BG_TYPES), T("color")),
    setting(BACKGROUND, "bg_color", "Background color", Color, T("#f0f0f1")),
    setting(BACKGROUND, "bg_gradient_start", "Gradient start", Color, T("#667eea")),
    setting(BACKGROUND, "bg_gradient_end", "Gradient end", Color, T("#764ba2")),
    setting(BACKGROUND, "bg_gradient_angle", "Gradient angle", Number { min: 0, max: 360 }, N(135)),
    setting(BACKGROUND, "bg_image_url", "Background image URL", Text, T("")),
    setting(BACKGROUND, "bg_image_size", "Background image size", Choice(IMAGE_SIZES), T("cover")),
    setting(BACKGROUND, "bg_image_position", "Background image position", Choice(IMAGE_POSITIONS), T("center")),
    setting(BACKGROUND, "bg_overlay_enabled", "Overlay", Flag, F(false)),
    setting(BACKGROUND, "bg_overlay_color", "Overlay color", Color, T("#000000")),
    setting(BACKGROUND, "bg_overlay_opacity", "Overlay opacity", PERCENT, N(50)),
    setting(BACKGROUND, "bg_pattern", "Pattern", Choice(BG_PATTERNS), T("dots")),
    setting(BACKGROUND, "bg_pattern_color", "Pattern color", Color, T("#c3c4c7")),
    setting(BACKGROUND, "bg_pattern_size", "Pattern size", Number { min: 2, max: 200 }, N(20)),
    setting(BACKGROUND, "bg_pattern_opacity", "Pattern opacity", PERCENT, N(50)),
    setting(LOGO, "logo_enabled", "Show logo", Flag, F(true)),
    setting(LOGO, "logo_url", "Logo URL", Text, T("")),
    setting(LOGO, "logo_width", "Logo width", PIXELS, N(84)),
    setting(LOGO, "logo_height", "Logo height", PIXELS, N(84)),
    setting(LOGO, "logo_link_url", "Logo link", Text, T("/")),
    setting(LOGO, "logo_alt_text", "Logo alt text", Text, T("Site logo")),
    setting(FORM, "form_bg_color", "Form background", Color, T("#ffffff")),
    setting(FORM, "form_text_color", "Form text color", Color, T("#3c434a")),
    setting(FORM, "form_width", "Form width", PIXELS, N(320)),
    setting(FORM, "form_padding", "Form padding", PIXELS, N(24)),
    setting(FORM, "form_margin_top", "Form top margin", PIXELS, N(20)),
    setting(FORM, "form_border_radius", "Form corner radius", PIXELS, N(4)),
    setting(FORM, "form_border_width", "Form border width", PIXELS, N(1)),
    setting(FORM, "form_border_color", "Form border color", Color, T("#c3c4c7")),
    setting(FORM, "form_shadow_enabled", "Form shadow", Flag, F(true)),
    setting(FORM, "form_shadow_color", "Form shadow color", Color, T("#0000001f")),
    setting(FORM, "form_shadow_blur", "Form shadow blur", PIXELS, N(3)),
    setting(FORM, "text_align", "Text alignment", Choice(TEXT_ALIGNS), T("left")),
    setting(LABELS, "label_color", "Label color", Color, T("#3c434a")),
    setting(LABELS, "label_font_size", "Label font size", PIXELS, N(14)),
    setting(LABELS, "label_font_weight", "Label font weight", Choice(FONT_WEIGHTS), T("normal")),
    setting(INPUTS, "input_bg_color", "Input background", Color, T("#ffffff")),
    setting(INPUTS, "input_text_color", "Input text color", Color, T("#2c3338")),
    setting(INPUTS, "input_border_color", "Input border color", Color, T("#8c8f94")),
    setting(INPUTS, "input_border_radius", "Input corner radius", PIXELS, N(4)),
    setting(INPUTS, "input_focus_color", "Input focus color", Color, T("#2271b1")),
    setting(INPUTS, "input_font_size", "Input font size", PIXELS, N(16)),
    setting(INPUTS, "input_padding", "Input padding", PIXELS, N(6)),
    setting(BUTTON, "button_label", "Button label", Text, T("Sign In")),
    setting(BUTTON, "button_bg_color", "Button background", Color, T("#2271b1")),
    setting(BUTTON, "button_text_color", "Button text color", Color, T("#ffffff")),
    setting(BUTTON, "button_hover_color", "Button hover background", Color, T("#135e96")),
    setting(BUTTON, "button_border_radius", "Button corner radius", PIXELS, N(3)),
    setting(BUTTON, "button_font_size", "Button font size", PIXELS, N(13)),
    setting(BUTTON, "button_padding", "Button padding", PIXELS, N(10)),
    setting(BUTTON, "button_full_width", "Full-width button", Flag, F(false)),
    setting(LINKS, "link_color", "Link color", Color, T("#50575e")),
    setting(LINKS, "link_hover_color", "Link hover color", Color, T("#135e96")),
    setting(LINKS, "show_lost_password", "Show lost password link", Flag, F(true)),
    setting(LINKS, "show_back_to_site", "Show back to site link", Flag, F(true)),
    setting(LINKS, "show_remember_me", "Show remember me", Flag, F(true)),
    setting(TEXT, "font_family", "Font family", Text, T("-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif")),
    setting(TEXT, "page_title", "Page title", Text, T("Log In")),
    setting(TEXT, "heading_text", "Heading", Text, T("")),
    setting(TEXT, "custom_message", "Message above the form", Text, T("")),
    setting(TEXT, "footer_text", "Footer text", Text, T("")),
    setting(TEXT, "custom_css", "Additional CSS", Text, T("")),
];

pub fn spec(key: &str) -> Option<&'static SettingSpec> {
    SETTINGS.iter().find(|spec| spec.key == key)
}

pub fn is_flag_key(key: &str) -> bool {
    matches!(spec(key), Some(spec) if spec.kind == Flag)
}

pub fn defaults() -> Map<String, Value> {
    SETTINGS
        .iter()
        .map(|spec| (spec.key.to_string(), spec.default_value()))
        .collect()
}

/// Shallow right-biased merge restricted to the keys of `defaults`.
pub fn merge(defaults: &Map<String, Value>, stored: &Map<String, Value>) -> Map<String, Value> {
    defaults
        .iter()
        .map(|(key, default)| {
            let value = stored.get(key).unwrap_or(default);
            (key.clone(), value.clone())
        })
        .collect()
}

/// The effective theme: every known key, stored overrides applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LoginTheme {
    values: Map<String, Value>,
}

impl Default for LoginTheme {
    fn default() -> Self {
        Self { values: defaults() }
    }
}

impl LoginTheme {
    pub fn from_overrides(stored: &Map<String, Value>) -> Self {
        Self {
            values: merge(&defaults(), stored),
        }
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn text(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Numeric value; malformed stored data falls back to the key's default.
    pub fn number(&self, key: &str) -> i64 {
        let parsed = match self.values.get(key) {
            Some(Value::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f.round() as i64)),
            Some(Value::String(text)) => text.trim().parse().ok(),
            _ => None,
        };
        parsed.unwrap_or_else(|| match spec(key).map(|spec| spec.default) {
            Some(DefaultValue::Number(number)) => number,
            _ => 0,
        })
    }

    pub fn flag(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(text)) => matches!(text.trim(), "1" | "true" | "on" | "yes"),
            _ => false,
        }
    }

    /// Choice value, or the first allowed option when the stored one is unknown.
    pub fn choice(&self, key: &str, allowed: &[&'static str]) -> &'static str {
        let current = self.text(key);
        allowed
            .iter()
            .copied()
            .find(|option| *option == current)
            .or_else(|| allowed.first().copied())
            .unwrap_or_default()
    }

    fn color(&self, key: &str) -> String {
        let value = self.text(key);
        if parse_hex_color(&value).is_some() {
            value
        } else {
            match spec(key).map(|spec| spec.default) {
                Some(DefaultValue::Text(text)) => text.to_string(),
                _ => "transparent".to_string(),
            }
        }
    }

    pub fn to_css(&self) -> String {
        let mut css = String::new();
        let _ = self.write_css(&mut css, true);
        css
    }

    /// Stylesheet derived from the settings alone, without `custom_css`.
    pub fn generated_css(&self) -> String {
        let mut css = String::new();
        let _ = self.write_css(&mut css, false);
        css
    }

    fn write_css(&self, css: &mut String, include_custom: bool) -> std::fmt::Result {
        writeln!(css, "body.login {{")?;
        writeln!(css, "  font-family: {};", css_value(&self.text("font_family")))?;
        for declaration in self.background_declarations() {
            writeln!(css, "  {}", declaration)?;
        }
        writeln!(css, "}}")?;

        if self.flag("bg_overlay_enabled") {
            writeln!(
                css,
                "body.login::before {{ content: \"\"; position: fixed; inset: 0; background: {}; pointer-events: none; }}",
                rgba(&self.color("bg_overlay_color"), self.number("bg_overlay_opacity"))
            )?;
        }

        let logo_url = self.text("logo_url");
        if !self.flag("logo_enabled") {
            writeln!(css, ".login h1 {{ display: none; }}")?;
        } else if !logo_url.is_empty() {
            writeln!(
                css,
                ".login h1 a {{ background-image: url(\"{}\"); background-size: contain; background-repeat: no-repeat; width: {}px; height: {}px; }}",
                css_string(&logo_url),
                self.number("logo_width"),
                self.number("logo_height")
            )?;
        }

        let shadow = if self.flag("form_shadow_enabled") {
            format!(
                "0 1px {}px {}",
                self.number("form_shadow_blur"),
                self.color("form_shadow_color")
            )
        } else {
            "none".to_string()
        };
        writeln!(
            css,
            "#login {{ width: {}px; text-align: {}; }}",
            self.number("form_width"),
            self.choice("text_align", TEXT_ALIGNS)
        )?;
        writeln!(
            css,
            "#loginform {{ background: {}; color: {}; padding: {}px; margin-top: {}px; border: {}px solid {}; border-radius: {}px; box-shadow: {}; }}",
            self.color("form_bg_color"),
            self.color("form_text_color"),
            self.number("form_padding"),
            self.number("form_margin_top"),
            self.number("form_border_width"),
            self.color("form_border_color"),
            self.number("form_border_radius"),
            shadow
        )?;
        writeln!(
            css,
            "#loginform label {{ color: {}; font-size: {}px; font-weight: {}; }}",
            self.color("label_color"),
            self.number("label_font_size"),
            self.choice("label_font_weight", FONT_WEIGHTS)
        )?;
        writeln!(
            css,
            "#loginform input[type=text], #loginform input[type=password] {{ background: {}; color: {}; border: 1px solid {}; border-radius: {}px; font-size: {}px; padding: {}px; }}",
            self.color("input_bg_color"),
            self.color("input_text_color"),
            self.color("input_border_color"),
            self.number("input_border_radius"),
            self.number("input_font_size"),
            self.number("input_padding")
        )?;
        writeln!(
            css,
            "#loginform input:focus {{ border-color: {0}; box-shadow: 0 0 0 1px {0}; outline: none; }}",
            self.color("input_focus_color")
        )?;
        writeln!(
            css,
            "#wp-submit {{ background: {}; color: {}; border: none; border-radius: {}px; font-size: {}px; padding: {}px; width: {}; }}",
            self.color("button_bg_color"),
            self.color("button_text_color"),
            self.number("button_border_radius"),
            self.number("button_font_size"),
            self.number("button_padding"),
            if self.flag("button_full_width") { "100%" } else { "auto" }
        )?;
        writeln!(
            css,
            "#wp-submit:hover {{ background: {}; }}",
            self.color("button_hover_color")
        )?;
        writeln!(
            css,
            ".login a {{ color: {}; }}\n.login a:hover {{ color: {}; }}",
            self.color("link_color"),
            self.color("link_hover_color")
        )?;
        for (key, selector) in [
            ("show_lost_password", "#nav"),
            ("show_back_to_site", "#backtoblog"),
            ("show_remember_me", ".forgetmenot"),
        ] {
            if !self.flag(key) {
                writeln!(css, "{} {{ display: none; }}", selector)?;
            }
        }

        let custom = self.text("custom_css");
        if include_custom && !custom.trim().is_empty() {
            writeln!(css, "{}", custom.trim())?;
        }
        Ok(())
    }

    fn background_declarations(&self) -> Vec<String> {
        let bg_color = self.color("bg_color");
        match self.choice("bg_type", BG_TYPES) {
            "gradient" => vec![format!(
                "background: linear-gradient({}deg, {}, {});",
                self.number("bg_gradient_angle"),
                self.color("bg_gradient_start"),
                self.color("bg_gradient_end")
            )],
            "image" => {
                let url = self.text("bg_image_url");
                let mut declarations = vec![format!("background-color: {};", bg_color)];
                if !url.is_empty() {
                    declarations.push(format!("background-image: url(\"{}\");", css_string(&url)));
                    declarations.push(format!(
                        "background-size: {};",
                        self.choice("bg_image_size", IMAGE_SIZES)
                    ));
                    declarations.push(format!(
                        "background-position: {};",
                        self.choice("bg_image_position", IMAGE_POSITIONS)
                    ));
                    declarations.push("background-repeat: no-repeat;".to_string());
                }
                declarations
            }
            "pattern" => self.pattern_declarations(&bg_color),
            "none" => vec!["background: none;".to_string()],
            _ => vec![format!("background-color: {};", bg_color)],
        }
    }

    fn pattern_declarations(&self, bg_color: &str) -> Vec<String> {
        let ink = rgba(
            &self.color("bg_pattern_color"),
            self.number("bg_pattern_opacity"),
        );
        let size = self.number("bg_pattern_size").max(2);
        let mut declarations = vec![format!("background-color: {};", bg_color)];
        match self.choice("bg_pattern", BG_PATTERNS) {
            "grid" => {
                declarations.push(format!(
                    "background-image: linear-gradient({0} 1px, transparent 1px), linear-gradient(90deg, {0} 1px, transparent 1px);",
                    ink
                ));
                declarations.push(format!("background-size: {0}px {0}px;", size));
            }
            "diagonal" => {
                declarations.push(format!(
                    "background-image: repeating-linear-gradient(45deg, {0} 0, {0} 1px, transparent 0, transparent 50%);",
                    ink
                ));
                declarations.push(format!("background-size: {0}px {0}px;", size));
            }
            "checkerboard" => {
                declarations.push(format!(
                    "background-image: linear-gradient(45deg, {0} 25%, transparent 25%, transparent 75%, {0} 75%), linear-gradient(45deg, {0} 25%, transparent 25%, transparent 75%, {0} 75%);",
                    ink
                ));
                declarations.push(format!("background-size: {0}px {0}px;", size));
                declarations.push(format!("background-position: 0 0, {0}px {0}px;", size / 2));
            }
            "waves" => {
                declarations.push(format!(
                    "background-image: radial-gradient(circle at 100% 50%, transparent 20%, {0} 21%, {0} 34%, transparent 35%, transparent);",
                    ink
                ));
                declarations.push(format!("background-size: {}px {}px;", size * 2, size));
            }
            _ => {
                declarations.push(format!(
                    "background-image: radial-gradient({} 1px, transparent 1px);",
                    ink
                ));
                declarations.push(format!("background-size: {0}px {0}px;", size));
            }
        }
        declarations
    }
}

/// Free text placed in a declaration value; block and statement delimiters are dropped.
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | ';' | '<' | '\n' | '\r'))
        .collect()
}

/// Contents of a double-quoted CSS string.
fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' | '\r' | '<' => {}
            _ => out.push(c),
        }
    }
    out
}

pub fn load_overrides(store: &dyn OptionStore) -> Result<Map<String, Value>, StoreError> {
    store.get_typed(LOGIN_SETTINGS)
}

pub fn load(store: &dyn OptionStore) -> Result<LoginTheme, StoreError> {
    Ok(LoginTheme::from_overrides(&load_overrides(store)?))
}

/// Reads every known key from the editor form. Invalid entries are
/// reported and kept as submitted so the form can redisplay them.
pub fn values_from_form(form: &FormData, errors: &mut ValidationErrors) -> Map<String, Value> {
    let mut values = Map::new();
    for spec in SETTINGS {
        let value = match spec.kind {
            Flag => Value::Bool(form.flag(spec.key)),
            Text if spec.key == "custom_css" => Value::String(form.raw(spec.key)),
            Text => Value::String(form.text(spec.key)),
            Number { min, max } => {
                let raw = form.text(spec.key);
                match raw.parse::<i64>() {
                    Ok(number) if (min..=max).contains(&number) => Value::from(number),
                    _ => {
                        errors.push(format!(
                            "{} must be a whole number between {} and {}.",
                            spec.label, min, max
                        ));
                        Value::String(raw)
                    }
                }
            }
            Color => {
                let raw = form.text(spec.key);
                if parse_hex_color(&raw).is_none() {
                    errors.push(format!("{} must be a hex color such as #2271b1.", spec.label));
                }
                Value::String(raw)
            }
            Choice(allowed) => {
                let raw = form.text(spec.key);
                if !allowed.contains(&raw.as_str()) {
                    errors.push(format!("{} has an unknown value '{}'.", spec.label, raw));
                }
                Value::String(raw)
            }
        };
        values.insert(spec.key.to_string(), value);
    }
    values
}

/// Stores the submitted values as the new override. No diff against the
/// defaults is taken.
pub fn save(
    store: &dyn OptionStore,
    values: Map<String, Value>,
    errors: ValidationErrors,
) -> Result<LoginTheme, ContentError> {
    let values = errors.into_result(values)?;
    store.set_typed(LOGIN_SETTINGS, &values)?;
    Ok(LoginTheme::from_overrides(&values))
}

pub fn reset(store: &dyn OptionStore) -> Result<(), StoreError> {
    store.delete(LOGIN_SETTINGS)
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorField {
    pub key: &'static str,
    pub label: &'static str,
    pub input: &'static str,
    pub options: &'static [&'static str],
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorSection {
    pub title: &'static str,
    pub fields: Vec<EditorField>,
}

/// Editor layout in table order, one section per group.
pub fn editor_sections(values: &Map<String, Value>) -> Vec<EditorSection> {
    let mut sections: Vec<EditorSection> = Vec::new();
    for spec in SETTINGS {
        let (input, options, min, max) = match spec.kind {
            Text if spec.key == "custom_css" => ("textarea", NO_OPTIONS, None, None),
            Text => ("text", NO_OPTIONS, None, None),
            Color => ("color", NO_OPTIONS, None, None),
            Number { min, max } => ("number", NO_OPTIONS, Some(min), Some(max)),
            Flag => ("checkbox", NO_OPTIONS, None, None),
            Choice(allowed) => ("select", allowed, None, None),
        };
        let field = EditorField {
            key: spec.key,
            label: spec.label,
            input,
            options,
            min,
            max,
            value: values
                .get(spec.key)
                .cloned()
                .unwrap_or_else(|| spec.default_value()),
        };
        match sections.last_mut() {
            Some(section) if section.title == spec.section => section.fields.push(field),
            _ => sections.push(EditorSection {
                title: spec.section,
                fields: vec![field],
            }),
        }
    }
    sections
}
