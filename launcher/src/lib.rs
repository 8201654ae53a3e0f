//! Mintforge Launcher - creates SPL tokens and OpenBook markets.
//!
//! This crate builds, signs and submits the transactions that create a
//! market (mints, vaults, queues, order book and the `InitializeMarket`
//! call) or a token with metadata, reporting each step as it confirms.
//!
//! # Components
//!
//! - [`config`]: Launcher configuration and clusters
//! - [`rent`]: Rent lookup and cost estimation
//! - [`builder`]: Market transaction building
//! - [`token`]: Token and authority transaction building
//! - [`submitter`]: Sequential submission
//! - [`events`]: Step progress events
//! - [`service`]: Main launcher service
//! - [`metrics`]: Launcher metrics

pub mod builder;
pub mod config;
pub mod events;
pub mod metrics;
pub mod rent;
pub mod service;
pub mod submitter;
pub mod token;

#[cfg(test)]
pub(crate) mod test_utils;

pub use builder::{MarketTransactionBuilder, StepKind, TransactionBatch};
pub use config::{Cluster, ConfigError, LauncherConfig};
pub use events::{EventHub, StepEvent, StepStatus};
pub use metrics::LaunchMetrics;
pub use rent::{CostEstimate, RentSchedule};
pub use service::{LaunchError, Launcher, MarketCreated, TokenCreated};
pub use submitter::{BatchSubmitter, StepReceipt, SubmitError};
pub use token::TokenTransactionBuilder;
