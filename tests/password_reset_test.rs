mod common;

use common::TestApp;
use tenant_auth::dtos::{
    ChangePasswordRequest, LoginRequest, PasswordResetConfirm, PasswordResetRequest,
};
use tenant_auth::models::VerificationToken;
use tenant_auth::store::IdentityStore;
use tenant_auth::AuthError;

fn login_req(username_or_email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username_or_email: username_or_email.to_string(),
        password: password.to_string(),
    }
}

fn reset_confirm(email: &str, token: &str, new_password: &str) -> PasswordResetConfirm {
    PasswordResetConfirm {
        email: email.to_string(),
        token: token.to_string(),
        new_password: new_password.to_string(),
    }
}

#[tokio::test]
async fn reset_flow_replaces_the_password() {
    let app = TestApp::new();
    app.register_confirmed_user("alice", "alice@example.com", "Secret123")
        .await;

    app.auth
        .request_password_reset(PasswordResetRequest {
            email: "alice@example.com".to_string(),
        })
        .await
        .unwrap();
    let token = app.mail.last_reset_token().unwrap();

    app.auth
        .reset_password(reset_confirm("alice@example.com", &token, "NewSecret456"))
        .await
        .unwrap();

    let err = app.auth.login(login_req("alice", "Secret123")).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(app.auth.login(login_req("alice", "NewSecret456")).await.is_ok());
}

#[tokio::test]
async fn reset_token_is_single_use() {
    let app = TestApp::new();
    app.register_confirmed_user("alice", "alice@example.com", "Secret123")
        .await;

    app.auth
        .request_password_reset(PasswordResetRequest {
            email: "alice@example.com".to_string(),
        })
        .await
        .unwrap();
    let token = app.mail.last_reset_token().unwrap();

    app.auth
        .reset_password(reset_confirm("alice@example.com", &token, "NewSecret456"))
        .await
        .unwrap();

    let err = app
        .auth
        .reset_password(reset_confirm("alice@example.com", &token, "Another789"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::VerificationTokenInvalid));
}

#[tokio::test]
async fn second_reset_request_leaves_only_the_latest_token() {
    let app = TestApp::new();
    app.register_confirmed_user("alice", "alice@example.com", "Secret123")
        .await;

    let request = || PasswordResetRequest {
        email: "alice@example.com".to_string(),
    };
    app.auth.request_password_reset(request()).await.unwrap();
    let first = app.mail.last_reset_token().unwrap();
    app.auth.request_password_reset(request()).await.unwrap();
    let second = app.mail.last_reset_token().unwrap();
    assert_ne!(first, second);

    let err = app
        .auth
        .reset_password(reset_confirm("alice@example.com", &first, "NewSecret456"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::VerificationTokenInvalid));

    assert!(app
        .auth
        .reset_password(reset_confirm("alice@example.com", &second, "NewSecret456"))
        .await
        .is_ok());
}

#[tokio::test]
async fn unknown_address_request_is_silent() {
    let app = TestApp::new();
    assert!(app
        .auth
        .request_password_reset(PasswordResetRequest {
            email: "nobody@example.com".to_string(),
        })
        .await
        .is_ok());
    assert_eq!(app.mail.reset_count(), 0);
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let app = TestApp::new();
    app.register_confirmed_user("alice", "alice@example.com", "Secret123")
        .await;

    let err = app
        .auth
        .reset_password(reset_confirm("alice@example.com", "bogus", "NewSecret456"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::VerificationTokenInvalid));
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let app = TestApp::new();
    let user_id = app
        .register_confirmed_user("alice", "alice@example.com", "Secret123")
        .await;

    let mut stale = VerificationToken::new_password_reset(user_id, "stale-raw");
    stale.expires_utc = chrono::Utc::now() - chrono::Duration::minutes(5);
    app.store.insert_verification_token(&stale).await.unwrap();

    let err = app
        .auth
        .reset_password(reset_confirm("alice@example.com", "stale-raw", "NewSecret456"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::VerificationTokenExpired));

    // The old password still works.
    assert!(app.auth.login(login_req("alice", "Secret123")).await.is_ok());
}

#[tokio::test]
async fn change_password_verifies_the_current_one() {
    let app = TestApp::new();
    let user_id = app
        .register_confirmed_user("alice", "alice@example.com", "Secret123")
        .await;

    let err = app
        .auth
        .change_password(
            user_id,
            ChangePasswordRequest {
                current_password: "wrong".to_string(),
                new_password: "NewSecret456".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    app.auth
        .change_password(
            user_id,
            ChangePasswordRequest {
                current_password: "Secret123".to_string(),
                new_password: "NewSecret456".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(app.auth.login(login_req("alice", "NewSecret456")).await.is_ok());
}
