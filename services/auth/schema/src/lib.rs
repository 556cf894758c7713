//! sea-orm entities for the accounts database.

pub mod federated_identities;
pub mod otp_challenges;
pub mod users;
