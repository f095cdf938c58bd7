//! Common utilities for the Marmot markup parser.
//!
//! This crate provides shared infrastructure used by all parser components:
//! - **Warning System** - colored, deduplicated terminal output for recoverable
//!   oddities in the input

pub mod warning;
