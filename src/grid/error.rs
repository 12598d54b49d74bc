// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with coordinate grids and sampling masks.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("The {name} grid has no coordinates")]
    Empty { name: &'static str },

    #[error("The {name} grid has a non-finite coordinate ({value}) at index {index}")]
    NonFinite {
        name: &'static str,
        index: usize,
        value: f64,
    },

    #[error("The {name} grid isn't strictly increasing at index {index} ({prev} then {value})")]
    NotIncreasing {
        name: &'static str,
        index: usize,
        prev: f64,
        value: f64,
    },

    #[error("The {name} grid must be evenly spaced; spacing {spacing} at index {index} differs from the first spacing {first}")]
    UnevenSpacing {
        name: &'static str,
        index: usize,
        spacing: f64,
        first: f64,
    },

    #[error("The {name} grid needs at least {need} coordinates to have a spacing, but it has {have}")]
    TooFewForSpacing {
        name: &'static str,
        need: usize,
        have: usize,
    },

    #[error("Cannot make an evenly spaced grid from {start} to {stop} with {num} samples")]
    BadLinspace { start: f64, stop: f64, num: usize },

    #[error("No sampled indices were supplied; at least one transform-domain coordinate must be sampled")]
    NoSamples,

    #[error("Sampled index {index} is out of range; the sampling grid only has {len} coordinates")]
    SampleIndexOutOfRange { index: usize, len: usize },

    #[error("Sampled index {index} was supplied more than once")]
    DuplicateSampleIndex { index: usize },

    #[error("Expected {expected} visibilities, but got {got}")]
    VisibilityLength { expected: usize, got: usize },
}
