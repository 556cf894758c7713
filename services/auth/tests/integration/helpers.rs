#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use uuid::Uuid;

use homerent_auth::domain::repository::{
    IdentityRepository, MailSender, OAuthProvider, OAuthStateCache, OtpRepository,
    RecaptchaVerifier, SmsSender, UserRepository,
};
use homerent_auth::domain::types::{
    FederatedLink, IdentityAssertion, NewUser, OtpChallenge, OtpChannel, OtpIssuePolicy,
    SiteVerification, Timestamps, UserRecord,
};
use homerent_auth::error::AuthServiceError;
use homerent_auth::usecase::otp::OtpLifecycle;
use homerent_domain::contact::{Email, PhoneNumber};
use homerent_domain::user::{AuthMethod, Provider};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<UserRecord>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Shared handle to the user list for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<UserRecord>>> {
        Arc::clone(&self.users)
    }

    pub fn get(&self, id: Uuid) -> Option<UserRecord> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthServiceError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email.as_str())
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<UserRecord, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthServiceError::EmailTaken);
        }
        let record = user.clone().into_record();
        users.push(record.clone());
        Ok(record)
    }

    async fn phone_verified_elsewhere(
        &self,
        phone: &PhoneNumber,
        user_id: Uuid,
    ) -> Result<bool, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.id != user_id && u.phone_verified && u.phone.as_ref() == Some(phone)))
    }

    async fn set_pending_phone(
        &self,
        user_id: Uuid,
        phone: Option<&PhoneNumber>,
    ) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == user_id) {
            u.phone = phone.cloned();
            u.phone_verified = false;
        }
        Ok(())
    }

    async fn mark_phone_verified(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == user_id) {
            u.phone_verified = true;
        }
        Ok(())
    }
}

// ── MockIdentityRepo ─────────────────────────────────────────────────────────

/// Shares its user list with a [`MockUserRepo`] so created accounts are visible to both.
#[derive(Clone)]
pub struct MockIdentityRepo {
    pub links: Arc<Mutex<Vec<FederatedLink>>>,
    pub users: Arc<Mutex<Vec<UserRecord>>>,
}

impl MockIdentityRepo {
    pub fn new(users: &MockUserRepo, links: Vec<FederatedLink>) -> Self {
        Self {
            links: Arc::new(Mutex::new(links)),
            users: users.users_handle(),
        }
    }

    pub fn links_handle(&self) -> Arc<Mutex<Vec<FederatedLink>>> {
        Arc::clone(&self.links)
    }
}

impl IdentityRepository for MockIdentityRepo {
    async fn find_by_subject(
        &self,
        provider: Provider,
        subject: &str,
    ) -> Result<Option<FederatedLink>, AuthServiceError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.provider == provider && l.subject == subject)
            .cloned())
    }

    async fn find_for_user(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<FederatedLink>, AuthServiceError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.user_id == user_id && l.provider == provider)
            .cloned())
    }

    async fn attach(&self, link: &FederatedLink) -> Result<(), AuthServiceError> {
        let mut links = self.links.lock().unwrap();
        let taken = links.iter().any(|l| {
            l.provider == link.provider && (l.subject == link.subject || l.user_id == link.user_id)
        });
        if taken {
            return Err(AuthServiceError::AccountConflict(link.provider));
        }
        links.push(link.clone());
        Ok(())
    }

    async fn create_account_with_link(
        &self,
        user: &NewUser,
        link: &FederatedLink,
    ) -> Result<UserRecord, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        let mut links = self.links.lock().unwrap();
        let clash = users.iter().any(|u| u.email == user.email)
            || links
                .iter()
                .any(|l| l.provider == link.provider && l.subject == link.subject);
        if clash {
            return Err(AuthServiceError::AccountConflict(link.provider));
        }
        let record = user.clone().into_record();
        users.push(record.clone());
        links.push(link.clone());
        Ok(record)
    }
}

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOtpRepo {
    pub challenges: Arc<Mutex<Vec<OtpChallenge>>>,
}

impl MockOtpRepo {
    pub fn new(challenges: Vec<OtpChallenge>) -> Self {
        Self {
            challenges: Arc::new(Mutex::new(challenges)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn challenges_handle(&self) -> Arc<Mutex<Vec<OtpChallenge>>> {
        Arc::clone(&self.challenges)
    }
}

impl OtpRepository for MockOtpRepo {
    async fn latest(
        &self,
        channel: OtpChannel,
        subject: &str,
        owner: Option<Uuid>,
    ) -> Result<Option<OtpChallenge>, AuthServiceError> {
        Ok(self
            .challenges
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.channel == channel && c.subject == subject && c.user_id == owner)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), AuthServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        challenges.retain(|c| {
            !(c.channel == challenge.channel
                && c.subject == challenge.subject
                && c.user_id == challenge.user_id)
        });
        challenges.push(challenge.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        let before = challenges.len();
        challenges.retain(|c| c.id != id);
        Ok(challenges.len() < before)
    }

    async fn delete_for_subject(
        &self,
        channel: OtpChannel,
        subject: &str,
        owner: Option<Uuid>,
    ) -> Result<(), AuthServiceError> {
        self.challenges
            .lock()
            .unwrap()
            .retain(|c| !(c.channel == channel && c.subject == subject && c.user_id == owner));
        Ok(())
    }
}

pub fn lifecycle(repo: &MockOtpRepo, policy: OtpIssuePolicy) -> OtpLifecycle<MockOtpRepo> {
    OtpLifecycle {
        otp_challenges: repo.clone(),
        policy,
    }
}

// ── Delivery mocks ───────────────────────────────────────────────────────────

/// Records `(recipient, code)` pairs; fails every send when `fail` is set.
#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.sent)
    }
}

impl MailSender for MockMailer {
    async fn send_code(&self, to: &Email, code: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("smtp relay unavailable");
        }
        self.sent.lock().unwrap().push((to.to_string(), code.to_owned()));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockSms {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

impl MockSms {
    pub fn sent_handle(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.sent)
    }
}

impl SmsSender for MockSms {
    async fn send_code(&self, to: &PhoneNumber, code: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("twilio unavailable");
        }
        self.sent.lock().unwrap().push((to.e164(), code.to_owned()));
        Ok(())
    }
}

// ── OAuth mocks ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockStateCache {
    pub states: Arc<Mutex<HashMap<String, Provider>>>,
}

impl MockStateCache {
    pub fn with(state: &str, provider: Provider) -> Self {
        let cache = Self::default();
        cache.states.lock().unwrap().insert(state.to_owned(), provider);
        cache
    }
}

impl OAuthStateCache for MockStateCache {
    async fn put(&self, state: &str, provider: Provider) -> Result<(), AuthServiceError> {
        self.states.lock().unwrap().insert(state.to_owned(), provider);
        Ok(())
    }

    async fn take(&self, state: &str) -> Result<Option<Provider>, AuthServiceError> {
        Ok(self.states.lock().unwrap().remove(state))
    }
}

/// Provider that answers every code with a fixed assertion, or fails when it has none.
pub struct MockOAuthProvider {
    pub provider: Provider,
    pub assertion: Option<IdentityAssertion>,
}

impl OAuthProvider for MockOAuthProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://idp.test/{}/authorize?state={state}", self.provider)
    }

    async fn exchange(&self, _code: &str) -> anyhow::Result<IdentityAssertion> {
        self.assertion
            .clone()
            .ok_or_else(|| anyhow::anyhow!("token endpoint returned 400"))
    }
}

pub struct MockRecaptcha {
    pub answer: Option<SiteVerification>,
}

impl RecaptchaVerifier for MockRecaptcha {
    async fn site_verify(&self, _token: &str) -> anyhow::Result<SiteVerification> {
        self.answer
            .clone()
            .ok_or_else(|| anyhow::anyhow!("connection reset"))
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user(email: &str) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        name: "Test User".to_owned(),
        password_hash: None,
        method: AuthMethod::Email,
        phone: None,
        phone_verified: false,
        timestamps: Timestamps::now(),
    }
}

pub fn assertion(provider: Provider, subject: &str, email: &str) -> IdentityAssertion {
    IdentityAssertion {
        provider,
        subject: subject.to_owned(),
        email: Some(email.to_owned()),
        display_name: Some("Bob".to_owned()),
    }
}

/// Challenge created `age_secs` ago with the regular 5 minute lifetime.
pub fn challenge_aged(
    channel: OtpChannel,
    subject: &str,
    owner: Option<Uuid>,
    code: &str,
    age_secs: i64,
) -> OtpChallenge {
    let created_at = Utc::now() - Duration::seconds(age_secs);
    OtpChallenge {
        id: Uuid::new_v4(),
        channel,
        subject: subject.to_owned(),
        user_id: owner,
        code: code.to_owned(),
        expires_at: created_at + Duration::seconds(300),
        created_at,
    }
}
