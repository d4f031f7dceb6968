// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::{http::StatusCode, test};
use pressroom::content::post_types;

#[actix_web::test]
async fn create_derives_slug_and_plural_then_lists_it() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let form = common::form_with_csrf(
        &session,
        &[
            ("label", "Book Review"),
            ("icon", "book"),
            ("public", "1"),
            ("field_label", "Rating"),
            ("field_name", ""),
            ("field_type", "number"),
            ("field_required", "0"),
        ],
    );
    let req = common::with_session(
        test::TestRequest::post().uri("/admin/post-types/new").set_form(&form),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/admin/post-types?created=book-review");

    let collection = post_types::load(harness.app_state.options.as_ref()).expect("post types");
    let record = collection.get("book-review").expect("created post type");
    assert_eq!(record.label_plural, "Book Reviews");
    assert_eq!(record.fields.len(), 1);
    assert_eq!(record.fields[0].name, "rating");
    assert!(record.fields[0].required);

    let req = common::with_session(
        test::TestRequest::get().uri("/admin/post-types?created=book-review"),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_text(&test::read_body(resp).await);
    assert!(body.contains("<code>book-review</code>"));
    assert!(body.contains("&#x27;book-review&#x27; was created."));
}

#[actix_web::test]
async fn invalid_create_rerenders_form_with_errors() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let form = common::form_with_csrf(&session, &[("label", "Page")]);
    let req = common::with_session(
        test::TestRequest::post().uri("/admin/post-types/new").set_form(&form),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_text(&test::read_body(resp).await);
    assert!(body.contains("The slug &#x27;page&#x27; is reserved."));
    assert!(body.contains("value=\"Page\""));

    let collection = post_types::load(harness.app_state.options.as_ref()).expect("post types");
    assert!(collection.is_empty());
}

#[actix_web::test]
async fn create_without_token_is_rejected() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let form = common::form_without_csrf(&[("label", "Movie")]);
    let req = common::with_session(
        test::TestRequest::post().uri("/admin/post-types/new").set_form(&form),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_text(&test::read_body(resp).await);
    assert!(body.contains("Your session token is invalid or expired. Please try again."));

    let collection = post_types::load(harness.app_state.options.as_ref()).expect("post types");
    assert!(collection.is_empty());
}

#[actix_web::test]
async fn edit_keeps_slug_and_updates_labels() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let create = common::form_with_csrf(&session, &[("label", "Movie"), ("public", "1")]);
    let req = common::with_session(
        test::TestRequest::post().uri("/admin/post-types/new").set_form(&create),
        &session,
    )
    .to_request();
    test::call_service(&app, req).await;

    let req = common::with_session(
        test::TestRequest::get().uri("/admin/post-types/edit/movie"),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let edit = common::form_with_csrf(
        &session,
        &[("slug", "film"), ("label", "Film"), ("label_plural", "Cinema")],
    );
    let req = common::with_session(
        test::TestRequest::post()
            .uri("/admin/post-types/edit/movie")
            .set_form(&edit),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(common::location(&resp), "/admin/post-types?updated=movie");

    let collection = post_types::load(harness.app_state.options.as_ref()).expect("post types");
    let record = collection.get("movie").expect("movie kept its slug");
    assert_eq!(record.label, "Film");
    assert_eq!(record.label_plural, "Cinema");
    assert!(!record.public);
    assert!(!collection.contains_key("film"));
}

#[actix_web::test]
async fn editing_unknown_post_type_redirects_to_list() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = common::with_session(
        test::TestRequest::get().uri("/admin/post-types/edit/ghost"),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/admin/post-types");
}

#[actix_web::test]
async fn delete_is_refused_while_content_exists() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let create = common::form_with_csrf(&session, &[("label", "Book")]);
    let req = common::with_session(
        test::TestRequest::post().uri("/admin/post-types/new").set_form(&create),
        &session,
    )
    .to_request();
    test::call_service(&app, req).await;
    harness.seed_posts("book", 3);

    let delete = common::form_with_csrf(&session, &[("slug", "book")]);
    let req = common::with_session(
        test::TestRequest::post()
            .uri("/admin/post-types/delete")
            .set_form(&delete),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(common::location(&resp), "/admin/post-types?error=in_use");
    let collection = post_types::load(harness.app_state.options.as_ref()).expect("post types");
    assert!(collection.contains_key("book"));

    let req = common::with_session(
        test::TestRequest::get().uri("/admin/post-types?error=in_use"),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    let body = common::body_text(&test::read_body(resp).await);
    assert!(body.contains("Cannot delete Books: 3 Books still exist."));
}

#[actix_web::test]
async fn delete_removes_unused_post_type_only() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    for label in ["Book", "Movie"] {
        let create = common::form_with_csrf(&session, &[("label", label)]);
        let req = common::with_session(
            test::TestRequest::post().uri("/admin/post-types/new").set_form(&create),
            &session,
        )
        .to_request();
        test::call_service(&app, req).await;
    }

    let delete = common::form_with_csrf(&session, &[("slug", "book")]);
    let req = common::with_session(
        test::TestRequest::post()
            .uri("/admin/post-types/delete")
            .set_form(&delete),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(common::location(&resp), "/admin/post-types?deleted=1");

    let collection = post_types::load(harness.app_state.options.as_ref()).expect("post types");
    assert!(!collection.contains_key("book"));
    assert!(collection.contains_key("movie"));

    let req = common::with_session(
        test::TestRequest::post()
            .uri("/admin/post-types/delete")
            .set_form(&delete),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(common::location(&resp), "/admin/post-types?deleted=0");
}

#[actix_web::test]
async fn single_blocking_record_uses_singular_label() {
    let harness = common::TestHarness::new();
    let session = harness.admin_auth();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let create = common::form_with_csrf(&session, &[("label", "Book")]);
    let req = common::with_session(
        test::TestRequest::post().uri("/admin/post-types/new").set_form(&create),
        &session,
    )
    .to_request();
    test::call_service(&app, req).await;
    harness.seed_posts("book", 1);

    let delete = common::form_with_csrf(&session, &[("slug", "book")]);
    let req = common::with_session(
        test::TestRequest::post()
            .uri("/admin/post-types/delete")
            .set_form(&delete),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(common::location(&resp), "/admin/post-types?error=in_use");

    let req = common::with_session(test::TestRequest::get().uri("/admin/post-types"), &session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = common::body_text(&test::read_body(resp).await);
    assert!(body.contains("Cannot delete Books: 1 Book still exists."));
}
