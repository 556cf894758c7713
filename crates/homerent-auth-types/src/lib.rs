//! Session types shared by Homerent services.
//!
//! Provides session/registration JWT claims, cookie builders, and the `SessionIdentity`
//! extractor.

pub mod cookie;
pub mod identity;
pub mod token;
