// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Hogbom CLEAN, used for minor cycles.

use log::{debug, trace};
use ndarray::prelude::*;

use super::{check_finite, CleanError, CleanStatus, CycleKind, HogbomParams, IterationLimitExceeded};
use crate::{math::argmax_abs, psf::Psf};

/// The output of a Hogbom minor cycle.
#[derive(Debug, Clone)]
pub struct HogbomResult {
    /// The flux removed from the residual at each pixel. Adding this to a
    /// model gives the model after this cycle.
    pub model_delta: Array1<f64>,

    /// The residual image after the final subtraction.
    pub residual: Array1<f64>,

    /// The number of PSF subtractions done.
    pub iterations: u32,

    /// The absolute residual peak before every subtraction, plus the peak
    /// that ended the cycle. It is non-increasing only for PSFs whose sidelobes
    /// can't push a neighbouring pixel above the current peak.
    pub peak_history: Vec<f64>,

    pub status: CleanStatus,

    /// Set if the iteration cap was hit.
    pub warning: Option<IterationLimitExceeded>,
}

/// Run Hogbom CLEAN on a residual image.
///
/// Until the absolute residual peak is at or below `params.tolerance` (or
/// `params.max_iterations` subtractions have been done), find the pixel with
/// the largest absolute residual (ties go to the lowest index), add `gain`
/// times its value to the model at that pixel, and subtract the same amount of
/// the normalised PSF centred on that pixel from the residual.
///
/// The input residual isn't modified.
pub fn hogbom(
    residual: ArrayView1<f64>,
    psf: &Psf,
    params: &HogbomParams,
) -> Result<HogbomResult, CleanError> {
    params.validate()?;
    let n = residual.len();
    psf.check_covers(n)?;
    check_finite("residual", residual)?;

    let mut residual = residual.to_owned();
    let mut model_delta = Array1::<f64>::zeros(n);
    let mut peak_history = vec![];
    let mut iterations = 0;

    let (status, peak) = loop {
        // Searching. check_covers guarantees that there is at least one pixel.
        let (pixel, value) = match argmax_abs(residual.view()) {
            Some(p) => p,
            None => unreachable!("the residual image is not empty"),
        };
        let peak = value.abs();
        peak_history.push(peak);
        if peak <= params.tolerance {
            break (CleanStatus::Converged, peak);
        }
        if iterations == params.max_iterations {
            break (CleanStatus::IterationLimit, peak);
        }

        // Subtracting.
        let flux = params.gain * value;
        residual.scaled_add(-flux, &psf.window(pixel, n));
        model_delta[pixel] += flux;
        iterations += 1;
        trace!("Minor iteration {iterations}: removed {flux:e} at pixel {pixel}");
    };

    let warning = match status {
        CleanStatus::Converged => {
            debug!("Minor cycle converged after {iterations} iterations (peak {peak:e})");
            None
        }
        CleanStatus::IterationLimit => {
            let w = IterationLimitExceeded {
                kind: CycleKind::Minor,
                max_iterations: params.max_iterations,
                peak,
                tolerance: params.tolerance,
            };
            debug!("{w}");
            Some(w)
        }
    };

    Ok(HogbomResult {
        model_delta,
        residual,
        iterations,
        peak_history,
        status,
        warning,
    })
}
