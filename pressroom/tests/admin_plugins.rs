// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::{http::StatusCode, test};
use pressroom::content::plugins::active_slugs;

#[actix_web::test]
async fn plugin_list_shows_counts_and_filters() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = common::with_session(test::TestRequest::get().uri("/admin/plugins"), &session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_text(&test::read_body(resp).await);
    assert!(body.contains("Hello Dolly"));
    assert!(body.contains("Akismet"));
    assert!(body.contains("All <span class=\"count\">(2)</span>"));
    assert!(body.contains("Inactive <span class=\"count\">(2)</span>"));

    let req = common::with_session(
        test::TestRequest::get().uri("/admin/plugins?status=active"),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    let body = common::body_text(&test::read_body(resp).await);
    assert!(!body.contains("Hello Dolly"));
    assert!(body.contains("No plugins found."));
}

#[actix_web::test]
async fn toggle_activates_then_deactivates() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let form = common::form_with_csrf(&session, &[("slug", "hello-dolly"), ("status", "all")]);
    let req = common::with_session(
        test::TestRequest::post().uri("/admin/plugins/toggle").set_form(&form),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        common::location(&resp),
        "/admin/plugins?status=all&activated=hello-dolly"
    );
    let active = active_slugs(harness.app_state.options.as_ref()).expect("active plugins");
    assert!(active.contains("hello-dolly"));

    let req = common::with_session(
        test::TestRequest::get().uri("/admin/plugins?status=all&activated=hello-dolly"),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    let body = common::body_text(&test::read_body(resp).await);
    assert!(body.contains("Plugin &#x27;hello-dolly&#x27; activated."));

    // The same token stays valid for the session.
    let req = common::with_session(
        test::TestRequest::post().uri("/admin/plugins/toggle").set_form(&form),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        common::location(&resp),
        "/admin/plugins?status=all&deactivated=hello-dolly"
    );
    let active = active_slugs(harness.app_state.options.as_ref()).expect("active plugins");
    assert!(active.is_empty());
}

#[actix_web::test]
async fn toggle_without_token_changes_nothing() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let form = common::form_without_csrf(&[("slug", "hello-dolly"), ("status", "inactive")]);
    let req = common::with_session(
        test::TestRequest::post().uri("/admin/plugins/toggle").set_form(&form),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        common::location(&resp),
        "/admin/plugins?status=inactive&error=token"
    );
    let active = active_slugs(harness.app_state.options.as_ref()).expect("active plugins");
    assert!(active.is_empty());

    let req = common::with_session(
        test::TestRequest::get().uri("/admin/plugins?status=inactive&error=token"),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    let body = common::body_text(&test::read_body(resp).await);
    assert!(body.contains("Your session token is invalid or expired. Please try again."));
}

#[actix_web::test]
async fn activating_unknown_plugin_reports_error() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let form = common::form_with_csrf(&session, &[("slug", "ghost"), ("status", "all")]);
    let req = common::with_session(
        test::TestRequest::post().uri("/admin/plugins/toggle").set_form(&form),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(common::location(&resp), "/admin/plugins?status=all&error=plugin");

    let req = common::with_session(test::TestRequest::get().uri("/admin/plugins"), &session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = common::body_text(&test::read_body(resp).await);
    assert!(body.contains("could not be activated: Plugin not found."));
}
