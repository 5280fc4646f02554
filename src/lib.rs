//! Error forms that keep their identity across serialization boundaries, and policy-driven
//! sanitization of error chains.

pub mod error;
pub mod sanex;
pub mod task_local;

mod static_state;
pub use static_state::*;
