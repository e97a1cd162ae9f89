//! Domain building blocks for the internship intake portal.
//!
//! Zero I/O: shared id/timestamp types, the domain error, the submission
//! validation schema, and anti-forgery token signing.

pub mod csrf;
pub mod error;
pub mod form;
pub mod types;
