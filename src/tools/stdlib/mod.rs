//! Built-in library for Quoll
//!
//! [`builtins`] holds the `core/` functions user code is expected to call
//! directly; [`sugar`] holds the `internal/` targets of reader sugar such as
//! `[..]` and `{..}`.

pub mod builtins;
pub mod sugar;

use crate::tools::Library;

/// Register the `core/` and `internal/` entries
pub fn register_all(library: &mut Library) {
    builtins::register(library);
    sugar::register(library);
}
