//! Postgres wire messages and the envelope that frames them.

pub mod auth;
pub mod backend;
pub mod envelope;
