//! ratis-reconcile - Under-replication reconciliation handler for a
//! Storage Container Manager's Ratis-replicated containers.
//!
//! Composes a ReplicaCount Calculator, Under-Replication Verifier,
//! Source Selector, Target Selector and Command Emitter into a single
//! stateless pass over one under-replicated container's snapshot. See
//! [`orchestrator::process_and_send_commands`] for the entry point.

pub mod config;
pub mod emitter;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod orchestrator;
pub mod placement;
pub mod replica_count;
pub mod replication_manager;
pub mod source_selector;
pub mod target_selector;
pub mod verifier;

pub use config::HandlerConfig;
pub use error::{ReconcileError, ReconcileResult};
pub use orchestrator::process_and_send_commands;
