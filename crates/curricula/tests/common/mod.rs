//! Shared test utilities for curricula integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs over a temporary workspace
//! - Scripted fakes for the decoder, OCR engine and generative model

pub mod fakes;
pub mod harness;

pub use fakes::*;
pub use harness::{blank_pdf, requirements, RecordingProgress, TestHarness};
