use super::*;
use axum::http::Request;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;

const SECRET: &str = "supersecretjwtsecretforunittesting123";
const USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

fn set_env_vars() {
    unsafe {
        env::set_var("JWT_SECRET", SECRET);
    }
}

fn token(secret: &str, role: &str, exp: usize) -> String {
    let claims = AccessClaims {
        sub: USER_ID.to_string(),
        role: role.to_string(),
        email: Some("test@example.com".to_string()),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_validate_access_token_success() {
    let claims = validate_access_token(&token(SECRET, "user", 9999999999), SECRET)
        .expect("Valid token should pass");
    assert_eq!(claims.sub, USER_ID);
    assert_eq!(claims.email.as_deref(), Some("test@example.com"));
}

#[test]
fn test_validate_access_token_expired() {
    let result = validate_access_token(&token(SECRET, "user", 1), SECRET);
    assert!(result.is_err());
}

#[test]
fn test_validate_access_token_invalid_signature() {
    let result = validate_access_token(&token("wrongsecret", "user", 9999999999), SECRET);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_extractor_reads_bearer_header() {
    set_env_vars();
    let request = Request::builder()
        .header(AUTHORIZATION, format!("Bearer {}", token(SECRET, "admin", 9999999999)))
        .body(())
        .unwrap();
    let (mut parts, _) = request.into_parts();

    let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(user.user_id, Uuid::parse_str(USER_ID).unwrap());
    assert!(user.is_admin());
    assert!(user.require_admin().is_ok());
}

#[tokio::test]
async fn test_extractor_rejects_missing_and_malformed_headers() {
    set_env_vars();
    let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
    let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);

    let (mut parts, _) = Request::builder()
        .header(AUTHORIZATION, "Token abc")
        .body(())
        .unwrap()
        .into_parts();
    let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
}

#[test]
fn test_non_admin_is_forbidden() {
    let user = AuthUser {
        user_id: Uuid::new_v4(),
        email: None,
        role: "business".to_string(),
    };
    let err = user.require_admin().unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
}
