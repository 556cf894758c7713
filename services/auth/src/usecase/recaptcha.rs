use crate::domain::repository::RecaptchaVerifier;
use crate::domain::types::{RECAPTCHA_ACTION, RECAPTCHA_MIN_SCORE, SiteVerification};

pub struct VerifyRecaptchaUseCase<V>
where
    V: RecaptchaVerifier,
{
    pub verifier: V,
    pub hostname: String,
}

impl<V> VerifyRecaptchaUseCase<V>
where
    V: RecaptchaVerifier,
{
    /// Human or not. Transport failures count as "not".
    pub async fn execute(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        match self.verifier.site_verify(token).await {
            Ok(answer) => accepts(&answer, &self.hostname),
            Err(e) => {
                tracing::warn!(error = %e, "recaptcha verification failed");
                false
            }
        }
    }
}

fn accepts(answer: &SiteVerification, hostname: &str) -> bool {
    answer.success
        && answer.hostname.as_deref() == Some(hostname)
        && answer.score.is_some_and(|s| s >= RECAPTCHA_MIN_SCORE)
        && answer.action.as_deref() == Some(RECAPTCHA_ACTION)
}
