pub mod catalog;
pub mod checklist;
pub mod config;
pub mod error;
pub mod home;
pub mod io;
pub mod mirror;
pub mod navigator;
pub mod notice;
pub mod paths;
pub mod progress;
pub mod roadmap;
pub mod rotation;
pub mod storage;
pub mod templates;
pub mod tracker;
pub mod types;

pub use error::{CycleError, Result};
