//! Glue between the command line and the library crates.
//!
//! Default file locations and the security code list format live here so
//! that `main.rs` only deals with argument plumbing.

pub(crate) mod history_manager;
pub(crate) mod sec_codes;
