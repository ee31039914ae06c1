//! Library half of the `wcm` command: argument types, configuration,
//! source loading and logging.

#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod logging;
pub mod sources;
