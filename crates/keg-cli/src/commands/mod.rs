//! Command implementations.

pub mod batches;
pub mod kegs;
pub mod stats;
pub mod status;

pub use batches::BatchesCommand;
pub use kegs::KegsCommand;
pub use stats::StatsCommand;
pub use status::StatusCommand;
