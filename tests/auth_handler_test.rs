mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{normal_classifier, TestApp};
use toh_backend::model::user::UserRole;

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    let body = json!({ "toll": username, "password": password });
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new(normal_classifier());
    app.seed_user("operator1", "Passw0rd1", UserRole::TollOperator, Some("Plaza A"))
        .await;

    let resp = app
        .router
        .clone()
        .oneshot(login_request("operator1", "Passw0rd1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert!(json["token"].as_str().unwrap().len() > 20);
    assert_eq!(json["user"]["username"], "operator1");
    assert_eq!(json["user"]["role"], "toll_operator");
    assert_eq!(json["user"]["tollPlaza"], "Plaza A");

    // lastLogin is stamped on success
    let users = app.user_repo.users.lock().unwrap();
    assert!(users[0].last_login.is_some());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new(normal_classifier());
    app.seed_user("operator1", "Passw0rd1", UserRole::TollOperator, Some("Plaza A"))
        .await;

    let resp = app
        .router
        .clone()
        .oneshot(login_request("operator1", "wrong"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::new(normal_classifier());
    let resp = app
        .router
        .clone()
        .oneshot(login_request("ghost", "whatever"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_disabled_account() {
    let app = TestApp::new(normal_classifier());
    let (user, _) = app
        .seed_user("operator1", "Passw0rd1", UserRole::TollOperator, Some("Plaza A"))
        .await;
    {
        let mut users = app.user_repo.users.lock().unwrap();
        users.iter_mut().find(|u| u.id == user.id).unwrap().is_active = false;
    }

    let resp = app
        .router
        .clone()
        .oneshot(login_request("operator1", "Passw0rd1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(
        json["message"],
        "Account is disabled. Please contact administrator."
    );
}

#[tokio::test]
async fn test_register_requires_admin() {
    let app = TestApp::new(normal_classifier());
    let (_, operator_token) = app
        .seed_user("operator1", "Passw0rd1", UserRole::TollOperator, Some("Plaza A"))
        .await;

    let body = json!({
        "username": "newop",
        "password": "Passw0rd1",
        "tollPlaza": "Plaza B",
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", operator_token))
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_operator_success() {
    let app = TestApp::new(normal_classifier());
    let (_, admin_token) = app
        .seed_user("admin", "Adm1nPass", UserRole::Admin, None)
        .await;

    let body = json!({
        "username": "newop",
        "password": "Passw0rd1",
        "tollPlaza": "Plaza B",
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", admin_token))
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let json = body_json(resp).await;
    assert_eq!(json["user"]["role"], "toll_operator");
    assert_eq!(json["user"]["tollPlaza"], "Plaza B");
}

#[tokio::test]
async fn test_register_operator_without_plaza_fails() {
    let app = TestApp::new(normal_classifier());
    let (_, admin_token) = app
        .seed_user("admin", "Adm1nPass", UserRole::Admin, None)
        .await;

    let body = json!({ "username": "newop", "password": "Passw0rd1" });
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", admin_token))
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Toll plaza is required for toll operators");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::new(normal_classifier());
    let (_, admin_token) = app
        .seed_user("admin", "Adm1nPass", UserRole::Admin, None)
        .await;
    app.seed_user("operator1", "Passw0rd1", UserRole::TollOperator, Some("Plaza A"))
        .await;

    let body = json!({
        "username": "operator1",
        "password": "Passw0rd1",
        "tollPlaza": "Plaza B",
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", admin_token))
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Username already exists");
}

#[tokio::test]
async fn test_profile_returns_current_user() {
    let app = TestApp::new(normal_classifier());
    let (_, token) = app
        .seed_user("operator1", "Passw0rd1", UserRole::TollOperator, Some("Plaza A"))
        .await;

    let req = Request::builder()
        .method("GET")
        .uri("/api/auth/profile")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["user"]["username"], "operator1");
    assert!(json["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = TestApp::new(normal_classifier());
    let (_, token) = app
        .seed_user("operator1", "Passw0rd1", UserRole::TollOperator, Some("Plaza A"))
        .await;

    // wrong current password
    let body = json!({ "currentPassword": "nope", "newPassword": "N3wPassword" });
    let req = Request::builder()
        .method("PUT")
        .uri("/api/auth/change-password")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // correct current password
    let body = json!({ "currentPassword": "Passw0rd1", "newPassword": "N3wPassword" });
    let req = Request::builder()
        .method("PUT")
        .uri("/api/auth/change-password")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // the new password now works for login
    let resp = app
        .router
        .clone()
        .oneshot(login_request("operator1", "N3wPassword"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_weak_new_password_rejected() {
    let app = TestApp::new(normal_classifier());
    let (_, token) = app
        .seed_user("operator1", "Passw0rd1", UserRole::TollOperator, Some("Plaza A"))
        .await;

    let body = json!({ "currentPassword": "Passw0rd1", "newPassword": "alllowercase" });
    let req = Request::builder()
        .method("PUT")
        .uri("/api/auth/change-password")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_password_rejects_post() {
    let app = TestApp::new(normal_classifier());
    let (_, token) = app
        .seed_user("operator1", "Passw0rd1", UserRole::TollOperator, Some("Plaza A"))
        .await;

    let body = json!({ "currentPassword": "Passw0rd1", "newPassword": "N3wPassword" });
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/change-password")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
