use anyhow::Context as _;

use crate::domain::repository::RecaptchaVerifier;
use crate::domain::types::SiteVerification;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Clone)]
pub struct HttpRecaptchaVerifier {
    pub client: reqwest::Client,
    pub secret_key: String,
}

impl RecaptchaVerifier for HttpRecaptchaVerifier {
    async fn site_verify(&self, token: &str) -> anyhow::Result<SiteVerification> {
        let answer = self
            .client
            .post(SITEVERIFY_URL)
            .form(&[("secret", self.secret_key.as_str()), ("response", token)])
            .send()
            .await
            .context("siteverify request")?
            .error_for_status()
            .context("siteverify rejected request")?
            .json()
            .await
            .context("decode siteverify response")?;
        Ok(answer)
    }
}
