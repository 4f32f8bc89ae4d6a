//! SiteWrap Core Library
//!
//! This crate provides shared types, errors, and configuration for SiteWrap.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{SiteWrapError, SiteWrapResult};
pub use types::{DenialReason, Denied, FrameTarget};
