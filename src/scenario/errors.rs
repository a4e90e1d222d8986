// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for running a test case.

use thiserror::Error;

/// Reasons a test case could not run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// Sections nested deeper than the runner allows.
    #[error("section `{path}` exceeds the maximum nesting depth of {max}")]
    DepthExceeded { path: String, max: usize },

    /// The body kept discovering new sections (for example, names that change
    /// on every pass) and never finished.
    #[error("test case `{test_case}` did not finish after {passes} passes")]
    PassLimitExceeded { test_case: String, passes: usize },
}
