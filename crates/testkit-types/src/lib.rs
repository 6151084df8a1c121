//! Shared types for the futures testnet harness
//!
//! This crate provides the core type definitions used across the testkit.
//! It has minimal dependencies and can be used independently.
//!
//! # Key Types
//!
//! - [`AuthLevel`] - Ordered authorization levels for test cases
//! - [`Verdict`], [`OutcomeRecord`] - Terminal classification of a pairing
//! - [`FailureReport`] - Raw failure shape fed into the classifier
//! - [`CaseError`] - Errors a test case body can surface
//! - [`DefectRecord`] - A suspected defect in the generated client

pub mod failure;
pub mod level;
pub mod verdict;

// Re-export commonly used types
pub use failure::*;
pub use level::*;
pub use verdict::*;
