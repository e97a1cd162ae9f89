//! Route definitions.

pub mod health;
pub mod submissions;
