//! Campus Filter - draft filter of the incident view
//!
//! Cascading faculty → school → space selection scoped by the session role,
//! plus debounced free-text search.
//!
//! # Example
//!
//! ```rust
//! use campus_core::RoleContext;
//! use campus_filter::{FilterStateMachine, Transition};
//!
//! let mut filter = FilterStateMachine::new(RoleContext::Administrative);
//! let _ = filter.set_escuela("10");
//! let _ = filter.set_espacio("100");
//! assert_eq!(filter.set_facultad("2"), Transition::ReloadSchools(Some(2)));
//! assert_eq!(filter.effective_query().espacio_id, None);
//! ```

#![warn(unreachable_pub)]

pub mod debounce;
pub mod machine;

pub use debounce::Debouncer;
pub use machine::{FilterStateMachine, SearchUpdate, Transition};
