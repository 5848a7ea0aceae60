//! # keg-cli
//!
//! Keg tracker command-line interface.
//!
//! Provides commands for:
//! - Listing kegs as grid cards or station columns
//! - Editing, moving, resetting and deleting kegs
//! - Syncing batches from the brewing-data service
//! - Usage statistics and recent activity
//!
//! # Architecture
//!
//! Every command loads the current state, runs at most one
//! [`keg_core::Command`] through a [`keg_core::Tracker`] and prints the
//! resulting view-model.
//!
//! ```text
//! ┌───────────┐     REST (JSON)      ┌─────────────────┐
//! │  keg-cli  │◄────────────────────►│   keg server    │
//! └───────────┘                      └─────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod confirm;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, EditArgs, Format};
pub use confirm::{AssumeYes, Confirm, StdinConfirm};
pub use error::CliError;
pub use output::OutputFormat;
