//! CLI command implementations

pub mod utils;

pub mod catalog;
pub mod completions;
pub mod config;
pub mod export;
pub mod import;
pub mod init;
pub mod line_csv;
pub mod load;
pub mod mat;
pub mod op;
pub mod set;
pub mod show;
