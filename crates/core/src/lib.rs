//! Domain rules for the PitchWise marketplace.
//!
//! Everything here is pure: status constants, transition rules, field
//! validation, and verification-code helpers shared by the DB and API
//! layers. No I/O happens in this crate.

pub mod accounts;
pub mod error;
pub mod hashing;
pub mod pagination;
pub mod pitch;
pub mod pitch_fields;
pub mod pitch_update;
pub mod roles;
pub mod types;
pub mod verification;
