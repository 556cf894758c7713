//! Domain types shared across Homerent services.
//!
//! Pure value types with no framework dependencies. Parsing here is the single place
//! contact input gets normalized.

pub mod contact;
pub mod user;
