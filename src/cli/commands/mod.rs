//! Command implementations for Schemata
//!
//! Each command is implemented in its own module.

pub mod check;
pub mod config;
pub mod init;
pub mod modules;
pub mod parse;
pub mod status;
pub mod symbols;
