pub mod account;
pub mod identity;
pub mod oauth;
pub mod otp;
pub mod password;
pub mod recaptcha;
pub mod token;
