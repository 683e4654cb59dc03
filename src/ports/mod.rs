//! Port traits between the simulation core and its collaborators.

pub mod config_port;
pub mod post_port;
pub mod price_port;
pub mod report_port;
