//! Sanitization of error chains before they leave a trust boundary.

//===========================
// region:      --- modules

mod context;
mod policy;
mod sanitize;

// endregion:   --- modules

//===========================
// region:      --- flattened

pub use context::*;
pub use policy::*;
pub use sanitize::*;

// endregion:   --- flattened
