//! # Lyrics Enricher
//!
//! Main library for the lyrics enrichment service.
//!
//! This crate provides the entry point and configuration for running the
//! enrichment pipeline against one language partition.

pub mod config;

pub use config::Dependencies;

use thiserror::Error;

/// Errors that can occur during enricher initialization or execution.
#[derive(Error, Debug)]
pub enum EnricherError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] lyrics_enricher_pipeline::PipelineError),

    /// Capability error.
    #[error("Capability error: {0}")]
    CapabilityError(#[from] lyrics_enricher_capabilities::CapabilityError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EnricherError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
