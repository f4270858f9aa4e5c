//! Lint overlay for a host language service.
//!
//! [`LintOverlay`] decorates a [`LanguageService`]: on every semantic
//! diagnostics request it runs the analyzer through a
//! [`lintbridge_runner::LintRunner`], maps the findings onto the snapshot and
//! appends them to the host's diagnostics. Code-fix requests at a published
//! span then offer the finding's own fix, a fix-all for its rule, a fix-all
//! for the whole file and a line-level disable comment.
//!
//! Lint failures never reach the host; they degrade to the host's own output.

mod diagnostics;
mod error;
mod fixes;
mod line_index;
mod overlay;
mod problems;
mod replacements;
mod service;

pub use diagnostics::{category_for, message_for};
pub use error::OverlayError;
pub use fixes::{FIX_NAME, fix_id, rule_from_fix_id};
pub use line_index::LineIndex;
pub use overlay::{LintOverlay, decorate};
pub use problems::{Problem, ProblemRegistry};
pub use replacements::non_overlapping;
pub use service::{LanguageService, ProjectHost, ServiceFut};
