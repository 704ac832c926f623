//! Document-to-matrix logic for legal document analysis
//!
//! Everything in this crate is a pure function of its inputs:
//! - [`prompts`] builds the instruction sent with each document
//! - [`chunking`] splits oversized text into fixed character windows
//! - [`sections`] pulls labeled sections out of free-text model output
//! - [`matrix`] assembles the per-document sections into a comparison table

pub mod chunking;
pub mod matrix;
pub mod patterns;
pub mod prompts;
pub mod roles;
pub mod sections;

pub use chunking::{needs_chunking, split_windows, window_count};
pub use matrix::{ComparisonMatrix, RawRow};
pub use prompts::Prompt;
pub use roles::sample_questions;
pub use sections::{extract_section, extract_sections};
