//! Library components of the `contract-studio` command line tool.

pub mod config;
pub mod logging;
pub mod report;
