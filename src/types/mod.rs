//! Core identifier types shared by the webhook, command and check modules.

pub mod ids;

pub use ids::{DeliveryId, InvalidSha, PrNumber, RepoId, Sha};
