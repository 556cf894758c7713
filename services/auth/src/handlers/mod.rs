pub mod account;
pub mod health;
pub mod oauth;
pub mod otp;
pub mod recaptcha;

use serde::Serialize;

use homerent_core::serde::to_rfc3339_ms;

use crate::domain::types::UserRecord;

#[derive(Serialize)]
pub struct PhoneResponse {
    pub prefix: String,
    pub number: String,
    pub verified: bool,
}

/// Public view of an account. Never includes the password hash.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub email: String,
    pub name: String,
    pub method: homerent_domain::user::AuthMethod,
    pub phone: Option<PhoneResponse>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            method: user.method,
            phone: user.phone.map(|p| PhoneResponse {
                prefix: p.prefix().to_owned(),
                number: p.number().to_owned(),
                verified: user.phone_verified,
            }),
            created_at: user.timestamps.created_at,
        }
    }
}
