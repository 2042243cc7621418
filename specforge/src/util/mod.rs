//! Utilities for worker implementations.

mod lenient;

pub use lenient::{parse_lenient_json, LenientJsonError};
