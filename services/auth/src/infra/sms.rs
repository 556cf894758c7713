//! SMS delivery through the Twilio Messages API.

use anyhow::Context as _;

use homerent_domain::contact::PhoneNumber;

use crate::domain::repository::SmsSender;

const TWILIO_API: &str = "https://api.twilio.com/2010-04-01";

#[derive(Clone)]
pub struct TwilioSmsSender {
    pub client: reqwest::Client,
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
}

impl TwilioSmsSender {
    fn messages_url(&self) -> String {
        format!("{TWILIO_API}/Accounts/{}/Messages.json", self.account_sid)
    }

    async fn send(&self, to: &PhoneNumber, code: &str) -> anyhow::Result<()> {
        let to = to.e164();
        let body = format!("Your Homerent verification code is {code}");
        let params = [("To", to.as_str()), ("From", self.from.as_str()), ("Body", body.as_str())];
        self.client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .context("send twilio request")?
            .error_for_status()
            .context("twilio rejected message")?;
        Ok(())
    }
}

/// SMS transport picked at start-up.
#[derive(Clone)]
pub enum SmsTransport {
    Twilio(TwilioSmsSender),
    /// No credentials configured: log instead of sending.
    Log,
}

impl SmsSender for SmsTransport {
    async fn send_code(&self, to: &PhoneNumber, code: &str) -> anyhow::Result<()> {
        match self {
            Self::Twilio(sender) => sender.send(to, code).await,
            Self::Log => {
                tracing::info!(to = %to, code, "sms transport disabled; otp not sent");
                Ok(())
            }
        }
    }
}
