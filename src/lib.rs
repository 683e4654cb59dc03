//! posttrader: event-driven backtester for social-media impact trading.
//!
//! Posts are scored by a keyword classifier; each qualifying post opens a
//! fixed-size, fixed-duration long position priced by an interpolating oracle.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
