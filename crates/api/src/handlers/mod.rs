pub mod admin;
pub mod auth;
pub mod marketplace;
pub mod pitch;
pub mod verification;
