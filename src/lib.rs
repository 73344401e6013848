//! Deterministic header detection and canonicalization for quantity-survey
//! spreadsheets.
//!
//! `qs-canon` takes a materialized spreadsheet grid (cells plus merge regions),
//! locates the true header row inside metadata preambles and footer clutter,
//! resolves merged header spans into distinct semantic columns, and emits a
//! canonical record set whose content hash is identical across runs, threads
//! and machines.
//!
//! Stages run strictly forward:
//! loader → propagator → classifier → matcher → footer filter → canonicalizer.
//! See [`pipeline::Pipeline`] for the entry point and [`harness`] for the
//! repeat-and-compare determinism check.

pub mod canonical;
pub mod classify;
pub mod config;
pub mod error;
pub mod footer;
pub mod grid;
pub mod harness;
pub mod lexicon;
pub mod matcher;
pub mod pipeline;
pub mod text;
pub mod types;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineWarning};
pub use pipeline::{Pipeline, PipelineOutput};
