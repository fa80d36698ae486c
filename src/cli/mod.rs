//! Command-line interface.
//!
//! Argument parsing and the `analyze` and `poses` command implementations.

/// CLI arguments.
pub mod args;

/// Analysis logic.
pub mod analyze;
