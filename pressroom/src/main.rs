// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use pressroom::app_state::AppState;
use pressroom::bootstrap::{self, BootstrapResult};
use pressroom::config::ValidatedConfig;
use pressroom::iam::JwtAuthMiddlewareFactory;
use pressroom::iam::jwt::JwtService;
use pressroom::runtime_paths::RuntimePaths;
use pressroom::{admin, assets, headers, util};

const HELP_TEXT: &str = "\
Usage: pressroom [-C <root>]

Starts the admin server for the runtime directory <root> (default: current directory).
A default config.yaml is written on first start.

Options:
  -C <root>    Runtime directory holding config.yaml, plugins/ and state/
  -h, --help   Show this help
";

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if matches!(parsed_args.mode, RunMode::Help) {
        print!("{}", HELP_TEXT);
        return 0;
    }

    let bootstrap = match bootstrap::bootstrap_runtime(&parsed_args.runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    match System::new().block_on(run_server(bootstrap)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

async fn run_server(bootstrap: BootstrapResult) -> std::io::Result<()> {
    let validated_config = Arc::new(bootstrap.validated_config);
    let runtime_paths = bootstrap.runtime_paths;

    let logger = util::build_logger(validated_config.log_level_filter());
    util::init_logger(util::default_level_rules(), logger).map_err(|error| {
        eprintln!("❌ Failed to initialize logger: {}", error);
        std::io::Error::other(error.to_string())
    })?;

    log_startup_info(&validated_config, &runtime_paths);
    if bootstrap.created_config {
        info!(
            "Default configuration written to {}",
            runtime_paths.config_file.display()
        );
    }

    let app_state = match AppState::open(&validated_config, runtime_paths.clone()) {
        Ok(state) => Arc::new(state),
        Err(error) => {
            eprintln!("❌ Failed to initialize application state: {}", error);
            return Err(std::io::Error::other(error.to_string()));
        }
    };
    info!(
        "✅ App state initialized with app name: {}",
        validated_config.app.name
    );

    let jwt_service = Arc::new(JwtService::new(&validated_config));
    info!("✅ Session verification initialized successfully");

    let admin_path = validated_config.admin.path.clone();
    let workers = validated_config.server.workers;

    let factory = {
        let config_for_app = validated_config.clone();
        let app_state = app_state.clone();
        let jwt_service = jwt_service.clone();

        move || {
            let admin_path = admin_path.clone();
            let config_for_security = config_for_app.clone();
            let config_for_admin = config_for_app.clone();

            App::new()
                .app_data(web::Data::from(config_for_app.clone()))
                .app_data(web::Data::from(app_state.clone()))
                .app_data(web::Data::from(jwt_service.clone()))
                .wrap(Logger::new(
                    r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
                ))
                .wrap(headers::Headers::new(config_for_security))
                .wrap(JwtAuthMiddlewareFactory)
                .configure(move |cfg| admin::configure(cfg, &admin_path, &config_for_admin))
                .configure(assets::configure)
        }
    };

    HttpServer::new(factory)
        .workers(workers)
        .bind(validated_config.server.address_tuple())?
        .run()
        .await
}

fn log_startup_info(config: &ValidatedConfig, runtime_paths: &RuntimePaths) {
    info!("Starting {} - {}", config.app.name, config.app.description);
    info!("Workers: {}", config.server.workers);
    info!(
        "Listening on {}:{}",
        config.server.host, config.server.port
    );
    info!(
        "Admin panel available at: http://{}:{}{}",
        config.server.host, config.server.port, config.admin.path
    );
    if let Some(mode) = &config.dev_mode {
        log::warn!("Development mode {:?} is enabled", mode);
    }

    info!("Runtime root: {}", runtime_paths.root.display());
    info!("Config file: {}", runtime_paths.config_file.display());
    info!(
        "Plugins directory (canonical): {}",
        runtime_paths.plugins_dir.display()
    );
    info!(
        "State sys directory (canonical): {}",
        runtime_paths.state_sys_dir.display()
    );
    info!("Options file: {}", runtime_paths.options_file.display());
    info!("Content database: {}", runtime_paths.database_file.display());

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

enum RunMode {
    Serve,
    Help,
}

struct ParsedArgs {
    runtime_root: PathBuf,
    mode: RunMode,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            runtime_root: PathBuf::from("."),
            mode: RunMode::Help,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            return Err(format!("Unexpected argument '{}'", arg));
        }
    }

    Ok(ParsedArgs {
        runtime_root: make_runtime_root_absolute(runtime_root)?,
        mode: RunMode::Serve,
    })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}
