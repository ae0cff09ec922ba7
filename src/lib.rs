//! Kansei survey engine
//!
//! A perceptual-rating survey client with:
//! - Deterministic per-participant stimulus ordering
//! - Rotating group assignment over a durable counter
//! - A guarded trial state machine with undo-log back navigation
//! - Idempotent submission rows plus a local JSONL journal
//! - A thin forwarding proxy in front of the collecting script endpoint

pub mod assignment;
pub mod catalog;
pub mod config;
pub mod gateway;
pub mod server;
pub mod session;
pub mod shuffle;

// Re-exports for convenience
pub use assignment::{assign_group, Assignment, GroupId};
pub use gateway::{GatewayError, HttpGateway, SurveyGateway};
pub use session::{Blocker, Phase, StepOutcome, SurveySession};
