// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with restoring CLEAN images.

use thiserror::Error;

use crate::clean::CleanError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("No PSF samples either side of the peak are above half power; the main lobe can't be fitted")]
    EmptyMainLobe,

    #[error("The PSF main lobe runs into the edge of the PSF grid, so it can't be isolated")]
    MainLobeNotIsolated,

    #[error("The clean-beam fit didn't converge within {iterations} iterations (amplitude {amplitude}, sigma {sigma})")]
    NoConvergence {
        iterations: u32,
        amplitude: f64,
        sigma: f64,
    },

    #[error("The clean-beam fit gave unusable parameters: amplitude {amplitude}, sigma {sigma}")]
    BadParameters { amplitude: f64, sigma: f64 },

    #[error(transparent)]
    Clean(#[from] CleanError),
}
