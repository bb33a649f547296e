//!
//! # Job21 Internal Utilities Crate
//!
//! Shared machinery for the job21 crates:
//! * [enumstr] keyword tables, mapping fieldless enums to their on-file strings
//! * [ser] serialization of job data to and from JSON, YAML and TOML files
//! * [error] helper traits for context-carrying failures
//!

pub mod enumstr;
pub use enumstr::*;

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;
