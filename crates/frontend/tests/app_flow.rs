//! End-to-end screen flows against a mocked backend

use portal_core::{AccessToken, SessionStore, UserProfile};
use portal_frontend::{App, AssumeYes, AuthContext, HomeStatus, LoginField, LoginStatus, Route};
use portal_http::PortalClient;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context_for(server: &MockServer) -> AuthContext {
    AuthContext::new(PortalClient::new(server.uri(), SessionStore::in_memory()).unwrap())
}

fn signed_in_context(server: &MockServer) -> AuthContext {
    let auth = context_for(server);
    let user = UserProfile {
        username: "student01".to_string(),
        full_name: "Nguyen Van A".to_string(),
        email: "a@x.edu".to_string(),
        role_name: "Student".to_string(),
        user_id: None,
        role_description: None,
    };
    auth.client()
        .session_store()
        .set_session(&AccessToken::new("abc.def.ghi"), &user)
        .unwrap();
    auth
}

fn fill_login(app: &mut App, username: &str, password: &str) {
    let page = app.login_page_mut().expect("login screen mounted");
    page.input(LoginField::Username, username);
    page.input(LoginField::Password, password);
}

#[tokio::test]
async fn test_login_scenario_lands_on_home() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful",
            "data": {
                "accessToken": "abc.def.ghi",
                "tokenType": "Bearer",
                "username": "student01",
                "fullName": "Nguyen Van A",
                "email": "a@x.edu",
                "roleName": "Student"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = context_for(&mock_server);
    let mut app = App::start(auth.clone(), "/");
    assert_eq!(app.route(), Route::Login);

    fill_login(&mut app, "student01", "pass123");
    app.submit_login().await;

    assert_eq!(app.route(), Route::Home);
    assert_eq!(app.router().history(), &[Route::Login, Route::Home]);
    assert_eq!(auth.stored_user().unwrap().full_name, "Nguyen Van A");
    assert!(app.render().contains("Welcome, Nguyen Van A!"));
}

#[tokio::test]
async fn test_empty_credentials_never_reach_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut app = App::start(context_for(&mock_server), "/login");
    fill_login(&mut app, "student01", "  ");
    app.submit_login().await;

    let page = app.login_page_mut().unwrap();
    assert_eq!(
        page.status(),
        &LoginStatus::Error("Please enter both your username and password".to_string())
    );
}

#[tokio::test]
async fn test_rejected_login_stays_on_login_with_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Invalid username or password"
        })))
        .mount(&mock_server)
        .await;

    let mut app = App::start(context_for(&mock_server), "/login");
    fill_login(&mut app, "student01", "wrong");
    app.submit_login().await;

    assert_eq!(app.route(), Route::Login);
    assert_eq!(app.router().history(), &[Route::Login]);
    let page = app.login_page_mut().unwrap();
    assert_eq!(page.username(), "student01");
    assert_eq!(
        page.status(),
        &LoginStatus::Error("Invalid username or password".to_string())
    );
}

#[tokio::test]
async fn test_unreachable_server_shows_generic_message() {
    let auth = AuthContext::new(
        PortalClient::new("http://127.0.0.1:9", SessionStore::in_memory()).unwrap(),
    );
    let mut app = App::start(auth, "/login");
    fill_login(&mut app, "student01", "pass123");
    app.submit_login().await;

    let page = app.login_page_mut().unwrap();
    assert_eq!(
        page.status(),
        &LoginStatus::Error("Unable to connect to the server".to_string())
    );
}

#[tokio::test]
async fn test_home_without_token_never_renders_profile() {
    let mock_server = MockServer::start().await;
    let app = App::start(context_for(&mock_server), "/home");

    assert_eq!(app.route(), Route::Login);
    assert!(app.home_page().is_none());
    let rendered = app.render();
    assert!(!rendered.contains("Nguyen Van A"));
    assert!(!rendered.contains("Welcome"));
}

#[tokio::test]
async fn test_refresh_updates_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer abc.def.ghi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "userId": 7,
                "username": "student01",
                "fullName": "Nguyen Van An",
                "email": "an@x.edu",
                "roleName": "Student",
                "isActive": true
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = signed_in_context(&mock_server);
    let mut app = App::start(auth.clone(), "/home");
    app.refresh_home().await;

    assert_eq!(app.route(), Route::Home);
    let HomeStatus::Ready { user, .. } = app.home_page().unwrap().status() else {
        panic!("home should be ready");
    };
    assert_eq!(user.as_ref().unwrap().full_name, "Nguyen Van An");
    assert_eq!(auth.stored_user().unwrap().user_id, Some(7));
    assert_eq!(
        auth.client().session_store().access_token().unwrap().as_str(),
        "abc.def.ghi"
    );
}

#[tokio::test]
async fn test_expired_session_redirects_to_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let auth = signed_in_context(&mock_server);
    let mut app = App::start(auth.clone(), "/home");
    assert_eq!(app.route(), Route::Home);

    app.refresh_home().await;

    assert_eq!(app.route(), Route::Login);
    assert!(!auth.is_authenticated());
    assert!(auth.stored_user().is_none());
    assert!(!app.render().contains("Nguyen Van A"));
}

#[tokio::test]
async fn test_logout_survives_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = signed_in_context(&mock_server);
    let mut app = App::start(auth.clone(), "/home");
    app.logout(&AssumeYes).await;

    assert_eq!(app.route(), Route::Login);
    assert!(!auth.is_authenticated());
    assert_eq!(app.router().history(), &[Route::Home, Route::Login]);
}
