//! Core domain types and logic.

pub mod classifier;
pub mod config_validation;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod position;
pub mod post;
pub mod report;
pub mod simulator;
pub mod thread;
