//! Command implementations for envstrap CLI

pub mod completions;
pub mod helpers;
pub mod init;
pub mod plan;
pub mod run;
pub mod verify;
pub mod version;
