pub mod cache;
pub mod db;
pub mod mail;
pub mod oauth;
pub mod recaptcha;
pub mod sms;
