//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - DTOs for inserts and list filters

pub mod email_verification;
pub mod pitch;
pub mod pitch_update;
pub mod stats;
pub mod user;
