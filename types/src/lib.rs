//! Core domain types for lintbridge.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The analyzer side (findings, fixes, reports) and the host side (diagnostics,
//! code-fix actions) meet here so that the runner and the overlay never depend
//! on each other's internals.

mod host;
mod lint;
mod span;

pub use host::{
    CodeFixAction, CombinedCodeActions, Diagnostic, DiagnosticCategory, FileTextChanges,
    TextChange,
};
pub use lint::{FileResult, Finding, Fix, LintReport, Replacement, normalize_path};
pub use span::TextSpan;

/// Source tag attached to every diagnostic the overlay synthesizes.
pub const LINT_SOURCE: &str = "eslint";
