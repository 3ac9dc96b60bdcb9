pub mod build_info;
pub mod checks;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod release;
pub mod ui;
pub mod warning;

pub use error::{BumpError, ParseErrorKind, Result};
