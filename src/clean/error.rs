// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with CLEAN deconvolution. These are all raised eagerly,
//! before any iterating is done.

use thiserror::Error;

use crate::{grid::GridError, operator::OperatorError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CleanError {
    #[error("The loop gain must lie in (0, 1]; got {0}")]
    InvalidGain(f64),

    #[error("The peak factor must lie in (0, 1); got {0}")]
    InvalidPeakFactor(f64),

    #[error("The {name} tolerance must be finite and non-negative; got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("The maximum number of {name} iterations must be at least 1")]
    NoIterations { name: &'static str },

    #[error("The {name} image has {got} pixels, but {expected} were expected")]
    ImageLength {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("The {name} image has a non-finite value ({value}) at pixel {index}")]
    NonFiniteImage {
        name: &'static str,
        index: usize,
        value: f64,
    },

    #[error("The PSF has {psf_len} samples with its peak at index {centre}, so it can't be shifted onto every pixel of a {image_len}-pixel image; it must extend at least {image_len} - 1 samples from its peak in both directions")]
    PsfTooShort {
        psf_len: usize,
        centre: usize,
        image_len: usize,
    },

    #[error("The PSF grid has {grid_len} coordinates, but {values_len} values were supplied")]
    PsfLength { grid_len: usize, values_len: usize },

    #[error("The PSF peak ({0}) isn't positive and finite; are any coordinates sampled with a non-zero weight?")]
    BadPsfPeak(f64),

    #[error("The weighting exponent must be finite; got {0}")]
    InvalidExponent(f64),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Operator(#[from] OperatorError),
}
