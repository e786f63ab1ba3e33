//! Repository layer: zero-sized structs with async CRUD methods taking `&PgPool`.

pub mod email_verification_repo;
pub mod pitch_repo;
pub mod pitch_update_repo;
pub mod user_repo;

pub use email_verification_repo::EmailVerificationRepo;
pub use pitch_repo::{MarketplaceFilter, PitchRepo};
pub use pitch_update_repo::PitchUpdateRepo;
pub use user_repo::UserRepo;
