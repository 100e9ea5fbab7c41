//! Campus Console - terminal front end of the reservation admin panel engine
//!
//! Command-line definition, session bootstrap and plain-text rendering used
//! by the `campus-console` binary.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod render;
pub mod session;

pub use session::{load_config, resolve_role};
