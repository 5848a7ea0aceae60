//! # keg-core
//!
//! Client core for the keg tracker.
//!
//! Provides:
//! - A typed client for the keg tracker REST API
//! - The client state store (kegs, batches, active view)
//! - Pure view-models for the grid, board, stats and edit views
//! - The reconciliation contract: every mutation is followed by a full
//!   reload of the collections it touches
//!
//! # Architecture
//!
//! Front ends never talk to the server directly. They turn user input into a
//! [`Command`], hand it to [`execute`] (or a [`Tracker`]), apply the returned
//! [`Reloaded`] snapshot to the [`Store`] and draw the view-model for the
//! active [`View`].
//!
//! ```text
//! ┌───────────┐  Command   ┌──────────┐   REST    ┌──────────────┐
//! │ front end │──────────►│ execute  │◄─────────►│ keg server   │
//! └───────────┘            └──────────┘           └──────────────┘
//!       ▲                       │ Reloaded
//!       │  view-models    ┌─────▼────┐
//!       └─────────────────│  Store   │
//!                         └──────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod memory;
pub mod reconcile;
pub mod store;
pub mod sync;
pub mod types;
pub mod views;

pub use api::{HttpKegApi, KegApi};
pub use config::{ClientConfig, Stations};
pub use error::{KegError, KegResult};
pub use memory::MemoryBackend;
pub use reconcile::{Command, Reloaded, Tracker, execute};
pub use store::Store;
pub use sync::SyncGuard;
pub use types::{Batch, Keg, KegId, KegStatus, KegUpdate, StatsPayload};
pub use views::View;
