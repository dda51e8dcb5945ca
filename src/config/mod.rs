//! Configuration module for statement-recon
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence
//! - Matching thresholds

pub mod paths;
pub mod settings;

pub use paths::ReconPaths;
pub use settings::{MatchingConfig, Settings};
