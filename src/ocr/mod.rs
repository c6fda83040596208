//! Screenshot recognition via OCR.space.
//!
//! This module provides:
//! - Upload preparation (shrinking oversized screenshots)
//! - The OCR.space client with typed errors
//! - The attribute parser for recognized text
//! - A background worker running one recognition job

pub mod client;
pub mod extract;
pub mod preprocess;
pub mod worker;

pub use extract::AttributeCounts;
pub use worker::{spawn_recognition, OcrJob, OcrOutcome};
