//! # rolodex-sync
//!
//! Configuration, authentication, API clients, and sync orchestration.
//!
//! Call [`pipeline::connect_at`] to build authenticated clients, then
//! [`pipeline::run`] to apply changes or [`pipeline::plan`] to only compute
//! them.

pub mod client;
pub mod config;
pub mod error;
pub mod notion;
pub mod oauth;
pub mod paths;
pub mod people;
pub mod pipeline;
pub mod token_store;

pub use client::{DestinationApi, SourceApi};
pub use config::Config;
pub use error::SyncError;
pub use pipeline::{ApplyCounts, ApplyResult, SyncOptions, SyncPlan, SyncReport};
