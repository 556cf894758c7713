use uuid::Uuid;

use homerent_domain::contact::Email;
use homerent_domain::user::AuthMethod;

use crate::domain::repository::UserRepository;
use crate::domain::types::{MIN_PASSWORD_LEN, NewUser, Timestamps, UserRecord};
use crate::error::AuthServiceError;
use crate::usecase::password::{hash_password, verify_password};
use crate::usecase::token::{SessionOutput, issue_session_token, registration_email};

pub struct RegisterInput {
    pub registration_token: String,
    pub name: String,
    pub password: String,
}

pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
    pub jwt_secret: String,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<SessionOutput, AuthServiceError> {
        let email = registration_email(&input.registration_token, &self.jwt_secret)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AuthServiceError::InvalidInput("name is required".to_owned()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthServiceError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthServiceError::EmailTaken);
        }

        let user = self
            .users
            .create(&NewUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
                name: name.to_owned(),
                password_hash: hash_password(&input.password)?,
                method: AuthMethod::Email,
                timestamps: Timestamps::now(),
            })
            .await?;
        tracing::info!(user_id = %user.id, "registered account");

        issue_session_token(user, &self.jwt_secret)
    }
}

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
    pub jwt_secret: String,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(&self, input: LoginInput) -> Result<SessionOutput, AuthServiceError> {
        // Malformed and unknown emails are indistinguishable from a wrong password.
        let email = Email::parse(&input.email).map_err(|_| AuthServiceError::InvalidCredentials)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        let matches = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(hash, &input.password));
        if !matches {
            return Err(AuthServiceError::InvalidCredentials);
        }

        issue_session_token(user, &self.jwt_secret)
    }
}

pub struct GetMeUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
}

impl<U> GetMeUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(&self, user_id: Uuid) -> Result<UserRecord, AuthServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)
    }
}
