use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use homerent_domain::contact::{Email, PhoneNumber};

use crate::domain::repository::{MailSender, OtpRepository, SmsSender, UserRepository};
use crate::domain::types::{
    CodeFormat, EMAIL_CODE, OTP_TTL_SECS, OtpChallenge, OtpChannel, OtpIssuePolicy, PHONE_CODE,
};
use crate::error::AuthServiceError;
use crate::usecase::token::{RegistrationToken, issue_registration_token};

/// Draw a code from the thread-local CSPRNG.
///
/// Bytes at or above the largest multiple of the alphabet size are redrawn, so every
/// symbol is equally likely.
pub fn generate_code(format: CodeFormat) -> String {
    let n = format.alphabet.len();
    debug_assert!(n > 0 && n <= 256);
    let limit = 256 - 256 % n;
    let mut rng = rand::rng();
    let mut code = String::with_capacity(format.len);
    while code.len() < format.len {
        let byte = rng.random::<u8>() as usize;
        if byte < limit {
            code.push(format.alphabet[byte % n] as char);
        }
    }
    code
}

/// Result of [`OtpLifecycle::issue`].
#[derive(Debug, Clone)]
pub struct Issued {
    pub challenge: OtpChallenge,
    /// `false` when the policy kept an earlier challenge; its code is delivered again.
    pub fresh: bool,
}

/// Issue and verify one-time passcodes for any channel.
pub struct OtpLifecycle<R>
where
    R: OtpRepository,
{
    pub otp_challenges: R,
    pub policy: OtpIssuePolicy,
}

impl<R> OtpLifecycle<R>
where
    R: OtpRepository,
{
    pub async fn issue(
        &self,
        channel: OtpChannel,
        subject: &str,
        owner: Option<Uuid>,
        format: CodeFormat,
    ) -> Result<Issued, AuthServiceError> {
        let now = Utc::now();

        if self.policy == OtpIssuePolicy::ReplaceIfStale {
            let latest = self.otp_challenges.latest(channel, subject, owner).await?;
            if let Some(challenge) = latest.filter(|c| c.is_fresh_at(now)) {
                return Ok(Issued {
                    challenge,
                    fresh: false,
                });
            }
        }

        let challenge = OtpChallenge {
            id: Uuid::new_v4(),
            channel,
            subject: subject.to_owned(),
            user_id: owner,
            code: generate_code(format),
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            created_at: now,
        };
        self.otp_challenges.replace(&challenge).await?;
        Ok(Issued {
            challenge,
            fresh: true,
        })
    }

    /// Check a presented code against the owner's most recent challenge for the subject
    /// and consume it.
    ///
    /// Order: no challenge, wrong code, expired. A wrong code leaves the challenge in place.
    pub async fn verify(
        &self,
        channel: OtpChannel,
        subject: &str,
        owner: Option<Uuid>,
        code: &str,
    ) -> Result<OtpChallenge, AuthServiceError> {
        let challenge = self
            .otp_challenges
            .latest(channel, subject, owner)
            .await?
            .ok_or(AuthServiceError::OtpNotFound)?;

        if challenge.code != code {
            return Err(AuthServiceError::InvalidCode);
        }
        if challenge.is_expired_at(Utc::now()) {
            return Err(AuthServiceError::CodeExpired);
        }

        // A concurrent verify may have consumed it first.
        if !self.otp_challenges.delete(challenge.id).await? {
            return Err(AuthServiceError::OtpNotFound);
        }
        Ok(challenge)
    }
}

fn delivered(result: anyhow::Result<()>, channel: OtpChannel) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(channel = channel.as_str(), error = %e, "otp delivery failed");
            false
        }
    }
}

// ── Email ────────────────────────────────────────────────────────────────────

pub struct SendEmailOtpUseCase<R, M>
where
    R: OtpRepository,
    M: MailSender,
{
    pub otp: OtpLifecycle<R>,
    pub mailer: M,
}

impl<R, M> SendEmailOtpUseCase<R, M>
where
    R: OtpRepository,
    M: MailSender,
{
    /// Returns whether the mail went out. The challenge is kept either way. A reused
    /// challenge has its existing code mailed again.
    pub async fn execute(&self, email: &str) -> Result<bool, AuthServiceError> {
        let email = Email::parse(email)?;
        let issued = self
            .otp
            .issue(OtpChannel::Email, email.as_str(), None, EMAIL_CODE)
            .await?;
        let result = self.mailer.send_code(&email, &issued.challenge.code).await;
        Ok(delivered(result, OtpChannel::Email))
    }
}

pub struct VerifyEmailOtpInput {
    pub email: String,
    pub code: String,
}

pub struct VerifyEmailOtpUseCase<R>
where
    R: OtpRepository,
{
    pub otp: OtpLifecycle<R>,
    pub jwt_secret: String,
}

impl<R> VerifyEmailOtpUseCase<R>
where
    R: OtpRepository,
{
    /// On success returns a registration token for exactly the verified email.
    pub async fn execute(
        &self,
        input: VerifyEmailOtpInput,
    ) -> Result<RegistrationToken, AuthServiceError> {
        let email = Email::parse(&input.email)?;
        self.otp
            .verify(OtpChannel::Email, email.as_str(), None, &input.code)
            .await?;
        issue_registration_token(&email, &self.jwt_secret)
    }
}

// ── Phone ────────────────────────────────────────────────────────────────────

pub struct SendPhoneOtpInput {
    pub user_id: Uuid,
    pub prefix: String,
    pub number: String,
}

pub struct SendPhoneOtpUseCase<U, R, S>
where
    U: UserRepository,
    R: OtpRepository,
    S: SmsSender,
{
    pub users: U,
    pub otp: OtpLifecycle<R>,
    pub sms: S,
}

impl<U, R, S> SendPhoneOtpUseCase<U, R, S>
where
    U: UserRepository,
    R: OtpRepository,
    S: SmsSender,
{
    pub async fn execute(&self, input: SendPhoneOtpInput) -> Result<bool, AuthServiceError> {
        let phone = PhoneNumber::parse(&input.prefix, &input.number)?;
        let user = self
            .users
            .find_by_id(input.user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if user.phone_verified && user.phone.as_ref() == Some(&phone) {
            return Err(AuthServiceError::PhoneAlreadyVerified);
        }
        if self.users.phone_verified_elsewhere(&phone, user.id).await? {
            return Err(AuthServiceError::PhoneInUse);
        }

        // Switching numbers abandons this user's code for the old number.
        if let Some(previous) = user.phone.as_ref().filter(|p| **p != phone) {
            self.otp
                .otp_challenges
                .delete_for_subject(OtpChannel::Phone, &previous.to_string(), Some(user.id))
                .await?;
        }
        self.users.set_pending_phone(user.id, Some(&phone)).await?;

        let issued = self
            .otp
            .issue(OtpChannel::Phone, &phone.to_string(), Some(user.id), PHONE_CODE)
            .await?;
        let result = self.sms.send_code(&phone, &issued.challenge.code).await;
        Ok(delivered(result, OtpChannel::Phone))
    }
}

pub struct VerifyPhoneOtpUseCase<U, R>
where
    U: UserRepository,
    R: OtpRepository,
{
    pub users: U,
    pub otp: OtpLifecycle<R>,
}

impl<U, R> VerifyPhoneOtpUseCase<U, R>
where
    U: UserRepository,
    R: OtpRepository,
{
    /// Returns the phone that is now verified.
    pub async fn execute(&self, user_id: Uuid, code: &str) -> Result<PhoneNumber, AuthServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;
        if user.phone_verified {
            return Err(AuthServiceError::PhoneAlreadyVerified);
        }
        let phone = user.phone.ok_or(AuthServiceError::OtpNotFound)?;

        if self.users.phone_verified_elsewhere(&phone, user.id).await? {
            self.users.set_pending_phone(user.id, None).await?;
            return Err(AuthServiceError::PhoneInUse);
        }

        self.otp
            .verify(OtpChannel::Phone, &phone.to_string(), Some(user.id), code)
            .await?;
        self.users.mark_phone_verified(user.id).await?;
        Ok(phone)
    }
}
