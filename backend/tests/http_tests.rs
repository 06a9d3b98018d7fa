//! End-to-end handler tests against the SQLite backend: login gating,
//! CRUD flows, flash rendering, and the "Autre" support substitution.

use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use tempfile::TempDir;

use backend::auth::{Authenticator, EnvAuthenticator};
use backend::services;
use backend::store::sqlite::SqliteStore;
use backend::store::RecordStore;

const USERNAME: &str = "admin";
const PASSWORD: &str = "secret";

fn test_app(
    dir: &TempDir,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let store: Arc<dyn RecordStore> = Arc::new(
        SqliteStore::new(dir.path().join("records.sqlite")).expect("open store"),
    );
    let authenticator: Arc<dyn Authenticator> = Arc::new(EnvAuthenticator::new(
        USERNAME.to_string(),
        PASSWORD.to_string(),
    ));

    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build();

    App::new()
        .app_data(web::Data::from(store))
        .app_data(web::Data::from(authenticator))
        .wrap(session)
        .configure(services::auth::configure_routes)
        .configure(services::records::configure_routes)
}

fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(|c| c.into_owned())
}

fn location(res: &ServiceResponse) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Logs in and returns the session cookie.
async fn log_in<S>(app: &S) -> Cookie<'static>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/login")
            .set_form([("username", USERNAME), ("password", PASSWORD)])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    session_cookie(&res).expect("session cookie set")
}

#[actix_web::test]
async fn anonymous_visitor_is_redirected_to_login() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(test_app(&dir)).await;

    for uri in ["/", "/edit/1", "/delete/1", "/logout"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "uri {uri}");
        assert_eq!(location(&res), "/login");
    }
}

#[actix_web::test]
async fn wrong_password_stays_anonymous() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(test_app(&dir)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_form([("username", USERNAME), ("password", "wrong")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    // The session cookie issued for the flash message must not grant access.
    let mut req = test::TestRequest::get().uri("/");
    if let Some(cookie) = session_cookie(&res) {
        req = req.cookie(cookie);
    }
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[actix_web::test]
async fn login_grants_access_and_logout_revokes_it() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(test_app(&dir)).await;

    let cookie = log_in(&app).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).unwrap_or(cookie);
    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Connecté avec succès."));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let cookie = session_cookie(&res);
    let mut req = test::TestRequest::get().uri("/");
    if let Some(cookie) = cookie {
        req = req.cookie(cookie);
    }
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[actix_web::test]
async fn add_then_list_shows_the_record() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(test_app(&dir)).await;
    let cookie = log_in(&app).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/add")
            .cookie(cookie.clone())
            .set_form([
                ("date_insertion", "2024-03-01"),
                ("nom_collab", "Alice"),
                ("titre_profil", "Backend Dev"),
                ("support_ao", "LinkedIn"),
                ("source_ao", "http://x"),
                ("nombre_cv", "5"),
                ("lien_annonce", "http://y"),
                ("lien_drive", "http://z"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    let cookie = session_cookie(&res).unwrap_or(cookie);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Enregistrement ajouté avec succès."));
    assert!(body.contains("Alice"));
    assert!(body.contains("Backend Dev"));
    assert!(body.contains("2024-03-01"));
}

#[actix_web::test]
async fn autre_support_stores_the_free_text_value() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(test_app(&dir)).await;
    let cookie = log_in(&app).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/add")
            .cookie(cookie.clone())
            .set_form([
                ("date_insertion", "2024-03-01"),
                ("nom_collab", "Alice"),
                ("titre_profil", "Backend Dev"),
                ("support_ao", "Autre"),
                ("autre_support", "Custom Board"),
                ("source_ao", "http://x"),
                ("nombre_cv", "5"),
                ("lien_annonce", "http://y"),
                ("lien_drive", "http://z"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&res).unwrap_or(cookie);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("<td>Custom Board</td>"));
}

#[actix_web::test]
async fn invalid_cv_count_flashes_a_validation_message() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(test_app(&dir)).await;
    let cookie = log_in(&app).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/add")
            .cookie(cookie.clone())
            .set_form([
                ("date_insertion", "2024-03-01"),
                ("nom_collab", "Alice"),
                ("titre_profil", "Backend Dev"),
                ("support_ao", "LinkedIn"),
                ("source_ao", "http://x"),
                ("nombre_cv", "five"),
                ("lien_annonce", "http://y"),
                ("lien_drive", "http://z"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&res).unwrap_or(cookie);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Nombre de CV invalide"));
    assert!(!body.contains("<td>Alice</td>"));
}

#[actix_web::test]
async fn edit_updates_and_delete_removes() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(test_app(&dir)).await;
    let mut cookie = log_in(&app).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/add")
            .cookie(cookie.clone())
            .set_form([
                ("date_insertion", "2024-03-01"),
                ("nom_collab", "Alice"),
                ("titre_profil", "Backend Dev"),
                ("support_ao", "LinkedIn"),
                ("source_ao", "http://x"),
                ("nombre_cv", "5"),
                ("lien_annonce", "http://y"),
                ("lien_drive", "http://z"),
            ])
            .to_request(),
    )
    .await;
    cookie = session_cookie(&res).unwrap_or(cookie);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/edit/1")
            .cookie(cookie.clone())
            .set_form([
                ("date_insertion", "2024-04-15"),
                ("nom_collab", "Bob"),
                ("titre_profil", "Data Engineer"),
                ("support_ao", "Indeed"),
                ("source_ao", "http://x2"),
                ("nombre_cv", "9"),
                ("lien_annonce", "http://y2"),
                ("lien_drive", "http://z2"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    cookie = session_cookie(&res).unwrap_or(cookie);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    cookie = session_cookie(&res).unwrap_or(cookie);
    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Bob"));
    assert!(body.contains("Data Engineer"));
    assert!(!body.contains("<td>Alice</td>"));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/delete/1")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    cookie = session_cookie(&res).unwrap_or(cookie);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Enregistrement supprimé avec succès."));
    assert!(!body.contains("<td>Bob</td>"));
}

#[actix_web::test]
async fn editing_a_missing_record_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(test_app(&dir)).await;
    let cookie = log_in(&app).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/edit/42")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    let cookie = session_cookie(&res).unwrap_or(cookie);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Enregistrement non trouvé."));
}

#[actix_web::test]
async fn invalid_search_date_flashes_and_is_ignored() {
    let dir = TempDir::new().unwrap();
    let app = test::init_service(test_app(&dir)).await;
    let cookie = log_in(&app).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/?search_date=31-03-2024")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Format de date invalide"));
}
