//! Email delivery for one-time passcodes.

use anyhow::Context as _;
use serde::Serialize;

use homerent_domain::contact::Email;

use crate::domain::repository::MailSender;

const SUBJECT: &str = "Your Homerent verification code";

fn body(code: &str) -> String {
    format!("Your Homerent verification code is {code}. It expires in 5 minutes.")
}

#[derive(Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: String,
}

/// Transactional mail HTTP API (`POST {api_url}` with a bearer key and a JSON message).
#[derive(Clone)]
pub struct HttpMailSender {
    pub client: reqwest::Client,
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

impl HttpMailSender {
    async fn send(&self, to: &Email, code: &str) -> anyhow::Result<()> {
        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&SendMailRequest {
                from: &self.from,
                to: to.as_str(),
                subject: SUBJECT,
                text: body(code),
            })
            .send()
            .await
            .context("send mail request")?
            .error_for_status()
            .context("mail API rejected message")?;
        Ok(())
    }
}

/// Mail transport picked at start-up.
#[derive(Clone)]
pub enum MailTransport {
    Http(HttpMailSender),
    /// No API configured: log instead of sending.
    Log,
}

impl MailSender for MailTransport {
    async fn send_code(&self, to: &Email, code: &str) -> anyhow::Result<()> {
        match self {
            Self::Http(sender) => sender.send(to, code).await,
            Self::Log => {
                tracing::info!(to = %to, code, "mail transport disabled; otp not sent");
                Ok(())
            }
        }
    }
}
