//! Data models

pub mod admin;
pub mod report;

pub use admin::*;
pub use report::*;
