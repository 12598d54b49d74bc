// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with the measurement operator.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperatorError {
    #[error("The model image has {got} pixels, but the image grid has {expected}")]
    ModelLength { expected: usize, got: usize },

    #[error("Expected {expected} sampled visibilities, but got {got}")]
    VisibilityLength { expected: usize, got: usize },

    #[error("Expected {expected} sample weights, but got {got}")]
    WeightLength { expected: usize, got: usize },

    #[error("Sample weight {index} is invalid ({value}); weights must be finite and non-negative")]
    BadWeight { index: usize, value: f64 },
}
