use uuid::Uuid;

use homerent_auth::error::AuthServiceError;
use homerent_auth::usecase::account::{
    GetMeUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
};
use homerent_auth::usecase::password::hash_password;
use homerent_auth::usecase::token::{issue_registration_token, issue_session_token};
use homerent_auth_types::token::validate_session_token;
use homerent_domain::contact::Email;
use homerent_domain::user::AuthMethod;

use crate::helpers::{MockUserRepo, TEST_JWT_SECRET, test_user};

fn registration_token(email: &str) -> String {
    issue_registration_token(&Email::parse(email).unwrap(), TEST_JWT_SECRET)
        .unwrap()
        .token
}

fn register_input(token: String, password: &str) -> RegisterInput {
    RegisterInput {
        registration_token: token,
        name: "Alice".to_owned(),
        password: password.to_owned(),
    }
}

fn register(users: &MockUserRepo) -> RegisterUseCase<MockUserRepo> {
    RegisterUseCase {
        users: users.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

fn login(users: &MockUserRepo) -> LoginUseCase<MockUserRepo> {
    LoginUseCase {
        users: users.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

// ── RegisterUseCase ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_with_hashed_password() {
    let users = MockUserRepo::empty();

    let out = register(&users)
        .execute(register_input(registration_token("a@x.com"), "hunter22!"))
        .await
        .unwrap();

    assert_eq!(out.user.email, "a@x.com");
    assert_eq!(out.user.method, AuthMethod::Email);
    let hash = out.user.password_hash.clone().unwrap();
    assert_ne!(hash, "hunter22!");
    assert!(hash.starts_with("$argon2"));

    let session = validate_session_token(&out.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(session.user_id, out.user.id);
}

#[tokio::test]
async fn should_reject_taken_email() {
    let users = MockUserRepo::new(vec![test_user("a@x.com")]);

    let result = register(&users)
        .execute(register_input(registration_token("a@x.com"), "hunter22!"))
        .await;
    assert!(matches!(result, Err(AuthServiceError::EmailTaken)));
}

#[tokio::test]
async fn should_reject_session_token_as_registration_token() {
    let users = MockUserRepo::empty();
    let session = issue_session_token(test_user("a@x.com"), TEST_JWT_SECRET).unwrap();

    let result = register(&users)
        .execute(register_input(session.token, "hunter22!"))
        .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidRegistrationToken)));
}

#[tokio::test]
async fn should_reject_short_password() {
    let result = register(&MockUserRepo::empty())
        .execute(register_input(registration_token("a@x.com"), "short"))
        .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidInput(_))));
}

// ── LoginUseCase ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_login_with_correct_password() {
    let mut user = test_user("a@x.com");
    user.password_hash = Some(hash_password("hunter22!").unwrap());
    let users = MockUserRepo::new(vec![user.clone()]);

    let out = login(&users)
        .execute(LoginInput {
            email: "A@x.com".to_owned(),
            password: "hunter22!".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(out.user.id, user.id);
}

#[tokio::test]
async fn should_give_same_error_for_wrong_password_and_unknown_email() {
    let mut user = test_user("a@x.com");
    user.password_hash = Some(hash_password("hunter22!").unwrap());
    let users = MockUserRepo::new(vec![user]);

    for (email, password) in [("a@x.com", "wrong-password"), ("nobody@x.com", "hunter22!")] {
        let result = login(&users)
            .execute(LoginInput {
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .await;
        assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
    }
}

#[tokio::test]
async fn should_not_login_account_without_password() {
    let users = MockUserRepo::new(vec![test_user("a@x.com")]);
    let result = login(&users)
        .execute(LoginInput {
            email: "a@x.com".to_owned(),
            password: "".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
}

// ── GetMeUseCase ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_profile_of_session_user() {
    let user = test_user("a@x.com");
    let users = MockUserRepo::new(vec![user.clone()]);
    let me = GetMeUseCase { users }.execute(user.id).await.unwrap();
    assert_eq!(me.email, "a@x.com");
}

#[tokio::test]
async fn should_return_user_not_found_for_deleted_account() {
    let result = GetMeUseCase {
        users: MockUserRepo::empty(),
    }
    .execute(Uuid::new_v4())
    .await;
    assert!(matches!(result, Err(AuthServiceError::UserNotFound)));
}
