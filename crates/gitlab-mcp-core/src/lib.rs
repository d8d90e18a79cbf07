//! Core types shared across gitlab-mcp crates.
//!
//! This crate provides the error model, the configuration file, and the
//! parameter normalization helpers every tool handler uses to read its
//! arguments.

pub mod config;
pub mod error;
pub mod params;

pub use error::{Error, ParamError, Result, ToolsetError};
pub use params::{Arguments, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
