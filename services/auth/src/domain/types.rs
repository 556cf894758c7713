use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use homerent_domain::contact::PhoneNumber;
use homerent_domain::user::{AuthMethod, Provider};

/// Creation/modification stamps shared by persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

/// Local account as the service sees it.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub method: AuthMethod,
    /// Pending or verified phone, see `phone_verified`.
    pub phone: Option<PhoneNumber>,
    pub phone_verified: bool,
    pub timestamps: Timestamps,
}

/// Account about to be written. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub method: AuthMethod,
    pub timestamps: Timestamps,
}

impl NewUser {
    pub fn into_record(self) -> UserRecord {
        UserRecord {
            id: self.id,
            email: self.email,
            name: self.name,
            password_hash: Some(self.password_hash),
            method: self.method,
            phone: None,
            phone_verified: false,
            timestamps: self.timestamps,
        }
    }
}

/// `(provider, subject)` pair owned by one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: Provider,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

impl FederatedLink {
    pub fn new(user_id: Uuid, provider: Provider, subject: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            provider,
            subject: subject.to_owned(),
            created_at: Utc::now(),
        }
    }
}

/// What a provider told us about the person who just signed in.
#[derive(Debug, Clone)]
pub struct IdentityAssertion {
    pub provider: Provider,
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpChannel {
    Email,
    Phone,
}

impl OtpChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

/// Persisted one-time passcode.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub id: Uuid,
    pub channel: OtpChannel,
    /// Normalized email or `"<prefix> <number>"`.
    pub subject: String,
    /// Requesting account, for phone challenges.
    pub user_id: Option<Uuid>,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Live and issued less than [`OTP_RESEND_INTERVAL_SECS`] ago.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now)
            && now - self.created_at < Duration::seconds(OTP_RESEND_INTERVAL_SECS)
    }
}

/// What `issue` does when the subject already has a challenge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpIssuePolicy {
    /// Always discard prior challenges and send a new code.
    #[default]
    ReplaceAlways,
    /// Keep a challenge issued within the resend interval and deliver its code again.
    ReplaceIfStale,
}

/// Shape of a generated code.
#[derive(Debug, Clone, Copy)]
pub struct CodeFormat {
    pub alphabet: &'static [u8],
    pub len: usize,
}

pub const NUMERIC: &[u8] = b"0123456789";
pub const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Email codes: 6 digits, zero padded.
pub const EMAIL_CODE: CodeFormat = CodeFormat {
    alphabet: NUMERIC,
    len: 6,
};

/// SMS codes: 5 uppercase alphanumerics.
pub const PHONE_CODE: CodeFormat = CodeFormat {
    alphabet: ALPHANUMERIC,
    len: 5,
};

/// Challenge lifetime in seconds.
pub const OTP_TTL_SECS: i64 = 300;

/// Minimum age before `ReplaceIfStale` sends a new code.
pub const OTP_RESEND_INTERVAL_SECS: i64 = 60;

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// reCAPTCHA v3 score threshold.
pub const RECAPTCHA_MIN_SCORE: f64 = 0.7;

/// reCAPTCHA action the frontend tags its token with.
pub const RECAPTCHA_ACTION: &str = "verify";

/// Answer from reCAPTCHA `siteverify`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteVerification {
    pub success: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
}
