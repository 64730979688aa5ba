//! A library for providing compile flags to semantic completion engines.
//!
//! The flag list of a project is built once from literal flags, the flags
//! `pkg-config` reports for a list of packages, and one include flag per
//! directory of the project's source trees. Every file then gets that same list.
//!
//! The library uses a ycm_flags.toml file to configure the project.
//!

/// Contains code to build the flag list
pub mod builder;
/// Contains code that handles various CLI commands
pub mod commands;
/// Contains the error type
pub mod error;
/// Contains hashing related functions
pub mod hasher;
/// Contains package metadata queries
pub mod packages;
/// Contains parse related functions
pub mod parser;
/// Contains the logger
pub mod utils;

#[macro_use]
extern crate lazy_static;

pub use builder::{FileFlags, FlagProvider};
pub use error::{FlagError, Result};
pub use packages::{MetadataTool, PkgConfig};
pub use parser::FlagsConfig;
