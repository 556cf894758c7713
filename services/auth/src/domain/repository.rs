#![allow(async_fn_in_trait)]

use uuid::Uuid;

use homerent_domain::contact::{Email, PhoneNumber};
use homerent_domain::user::Provider;

use crate::domain::types::{
    FederatedLink, IdentityAssertion, NewUser, OtpChallenge, OtpChannel, SiteVerification,
    UserRecord,
};
use crate::error::AuthServiceError;

/// Local accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthServiceError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, AuthServiceError>;

    /// Insert an account. `EmailTaken` when the email is already registered.
    async fn create(&self, user: &NewUser) -> Result<UserRecord, AuthServiceError>;

    /// `true` if an account other than `user_id` has verified `phone`.
    async fn phone_verified_elsewhere(
        &self,
        phone: &PhoneNumber,
        user_id: Uuid,
    ) -> Result<bool, AuthServiceError>;

    /// Replace the pending phone (or clear it with `None`) and mark it unverified.
    async fn set_pending_phone(
        &self,
        user_id: Uuid,
        phone: Option<&PhoneNumber>,
    ) -> Result<(), AuthServiceError>;

    async fn mark_phone_verified(&self, user_id: Uuid) -> Result<(), AuthServiceError>;
}

/// Federated identity links.
pub trait IdentityRepository: Send + Sync {
    async fn find_by_subject(
        &self,
        provider: Provider,
        subject: &str,
    ) -> Result<Option<FederatedLink>, AuthServiceError>;

    async fn find_for_user(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<FederatedLink>, AuthServiceError>;

    /// Attach a link to an existing account. `AccountConflict` when the subject is already
    /// linked elsewhere or the account already holds a link for the provider.
    async fn attach(&self, link: &FederatedLink) -> Result<(), AuthServiceError>;

    /// Create an account and its first link atomically (same transaction).
    async fn create_account_with_link(
        &self,
        user: &NewUser,
        link: &FederatedLink,
    ) -> Result<UserRecord, AuthServiceError>;
}

/// One-time passcode storage.
///
/// Challenges are keyed by `(channel, subject, owner)`. Unowned challenges (`None`) never
/// see owned ones and two owners never see each other's.
pub trait OtpRepository: Send + Sync {
    /// Most recently created challenge for the subject and owner, expired or not.
    async fn latest(
        &self,
        channel: OtpChannel,
        subject: &str,
        owner: Option<Uuid>,
    ) -> Result<Option<OtpChallenge>, AuthServiceError>;

    /// Delete the challenge's owner's challenges for its subject and insert it (same
    /// transaction).
    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), AuthServiceError>;

    /// Delete a challenge. Returns `true` if deleted, `false` if it was already gone.
    async fn delete(&self, id: Uuid) -> Result<bool, AuthServiceError>;

    async fn delete_for_subject(
        &self,
        channel: OtpChannel,
        subject: &str,
        owner: Option<Uuid>,
    ) -> Result<(), AuthServiceError>;
}

/// Short-lived OAuth2 `state` values (Redis, 10 minute TTL).
pub trait OAuthStateCache: Send + Sync {
    async fn put(&self, state: &str, provider: Provider) -> Result<(), AuthServiceError>;

    /// Remove and return the provider the state was issued for.
    async fn take(&self, state: &str) -> Result<Option<Provider>, AuthServiceError>;
}

/// OAuth2 authorization-code flow against one provider.
pub trait OAuthProvider: Send + Sync {
    fn provider(&self) -> Provider;

    fn authorize_url(&self, state: &str) -> String;

    /// Exchange the code and fetch the user's profile.
    async fn exchange(&self, code: &str) -> anyhow::Result<IdentityAssertion>;
}

/// Delivers email passcodes.
pub trait MailSender: Send + Sync {
    async fn send_code(&self, to: &Email, code: &str) -> anyhow::Result<()>;
}

/// Delivers SMS passcodes.
pub trait SmsSender: Send + Sync {
    async fn send_code(&self, to: &PhoneNumber, code: &str) -> anyhow::Result<()>;
}

pub trait RecaptchaVerifier: Send + Sync {
    async fn site_verify(&self, token: &str) -> anyhow::Result<SiteVerification>;
}
