//! Trailer resolution orchestrator.
//!
//! Drives catalog entries through acquisition (primary provider, then
//! secondary), embeddability verification and search repair:
//! - **TwoPass**: acquisition for all entries in provider batches, then
//!   verification and repair for all entries
//! - **PerEntry**: the same steps applied to one entry at a time
//!
//! Everything runs sequentially; each upstream call is awaited before the
//! next one starts.

mod config;
mod runner;
mod types;

pub use config::{ResolutionStrategy, ResolverOptions};
pub use runner::TrailerResolver;
pub use types::{EntryOutcome, ProviderFailure, ResolutionReport};
