#![deny(warnings)]

pub mod analytics;
pub mod config;
pub mod provider;
pub mod report;
pub mod transcript;
pub mod util;
