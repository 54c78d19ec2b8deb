//! # pdscan Common Library
//!
//! Shared code for the pdscan screening service:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Score fusion across the spiral, MRI and wave modalities
//! - Static report and help content

pub mod config;
pub mod content;
pub mod error;
pub mod fusion;

pub use error::{Error, Result};
pub use fusion::{Confidence, FusionOutcome, Modality, ModalitySet, Verdict};
