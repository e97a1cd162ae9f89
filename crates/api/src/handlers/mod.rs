//! Request handlers.
//!
//! Handlers load and store through `intake_db` repositories, render pages from
//! [`crate::views`], and map faults via [`crate::error::AppError`].

pub mod submissions;
