//! Error forms: tagged error kinds that keep their identity across serialization boundaries.

//===========================
// region:      --- modules

mod deser;
mod errors;
mod form;
mod keys;
mod proxy;
mod registry;
mod trivial;
mod utils;
mod value;

// endregion:   --- modules

//===========================
// region:      --- flattened

pub use deser::*;
pub use errors::*;
pub use form::*;
pub use keys::*;
pub use proxy::*;
pub use registry::*;
pub use trivial::*;
pub use utils::*;
pub use value::*;

// endregion:   --- flattened
