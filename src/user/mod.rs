//! User registration and authentication.
//!
//! Users own a lower-cased, unique email address and a salted password
//! hash. Tasks reference users by [`domain::UserId`]; users do not hold
//! their tasks.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
