//! PR Steward - a GitHub bot that checks pull request titles and descriptions
//! and runs build commands issued in pull request comments.
//!
//! Deliveries flow through [`server`] to [`router::EventRouter`], which sends
//! comment events to [`commands`] and pull request events to [`checks`].

pub mod build;
pub mod checks;
pub mod commands;
pub mod config;
pub mod github;
pub mod router;
pub mod rules;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_utils;
