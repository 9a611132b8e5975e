//! Command implementations for the `pixbatch` binary.

pub mod config;
pub mod run;
