// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Power-law weighting of sampled coordinates.
//!
//! Each sample at transform-domain coordinate u is weighted by |u|^exponent.
//! An exponent of 0 is natural weighting. Positive exponents down-weight the
//! short baselines near u = 0, which narrows the PSF main lobe at the cost of
//! larger sidelobes; negative exponents do the opposite.


use log::{debug, warn};
use ndarray::prelude::*;

use crate::{clean::CleanError, operator::MeasurementOperator, psf::Psf};

/// Get the weight `|u|^exponent` of every coordinate. Weights that aren't
/// finite (e.g. u = 0 with a negative exponent) are set to 0.
pub fn power_law_weights(uv: ArrayView1<f64>, exponent: f64) -> Result<Array1<f64>, CleanError> {
    if !exponent.is_finite() {
        return Err(CleanError::InvalidExponent(exponent));
    }

    let mut num_discarded = 0;
    let weights = uv.mapv(|u| {
        let w = u.abs().powf(exponent);
        if w.is_finite() {
            w
        } else {
            num_discarded += 1;
            0.0
        }
    });
    if num_discarded > 0 {
        warn!("{num_discarded} sample weights with exponent {exponent} weren't finite; they have been set to 0");
    }
    Ok(weights)
}

/// Get a copy of `op` with its sample weights multiplied by `|u|^exponent`.
/// `op` itself is untouched, so it's safe to use while another deconvolution
/// is in progress.
pub fn weighted_operator(
    op: &MeasurementOperator,
    exponent: f64,
) -> Result<MeasurementOperator, CleanError> {
    let weights = power_law_weights(op.uv_coords(), exponent)? * &op.weights();
    Ok(op.with_weights(weights)?)
}

/// Build the PSF of `op` with power-law weighting applied to its samples. The
/// PSF is normalised by its own (weighted) peak.
pub fn weighted_psf(op: &MeasurementOperator, exponent: f64) -> Result<Psf, CleanError> {
    let weighted = weighted_operator(op, exponent)?;
    let psf = Psf::new(&weighted)?;
    debug!(
        "Weighting exponent {exponent}: PSF peak {:e}, main-lobe width {:?}",
        psf.peak(),
        psf.main_lobe_width()
    );
    Ok(psf)
}
