// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Levenberg-Marquardt fitting of a Gaussian to the PSF main lobe.

use log::{debug, trace};
use ndarray::prelude::*;

use super::{CleanBeam, FitError, RestoreParams, FWHM_PER_SIGMA};
use crate::psf::Psf;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 0.1;

/// Fit `a * exp(-x^2 / (2 sigma^2))` to the samples of the PSF main lobe,
/// where x is the offset from the PSF peak.
pub(super) fn fit_main_lobe(psf: &Psf, params: &RestoreParams) -> Result<CleanBeam, FitError> {
    let lobe = psf.main_lobe_indices();
    if lobe.len() < 2 {
        return Err(FitError::EmptyMainLobe);
    }
    if lobe.start == 0 || lobe.end == psf.len() {
        return Err(FitError::MainLobeNotIsolated);
    }

    let x_centre = psf.grid().coords()[psf.centre()];
    let x = psf.grid().coords().slice(s![lobe.clone()]).mapv(|x| x - x_centre);
    let y = psf.values().slice(s![lobe]).to_owned();

    // Start from the half-power width if it's available, otherwise the extent
    // of the main lobe.
    let mut sigma = match psf.main_lobe_width() {
        Some(w) => w / FWHM_PER_SIGMA,
        None => (x[x.len() - 1] - x[0]) / FWHM_PER_SIGMA,
    };
    let mut amplitude = 1.0;
    let mut lambda = LAMBDA_INIT;
    let mut cost = sum_sq_residuals(x.view(), y.view(), amplitude, sigma);
    trace!("Clean-beam fit start: amplitude {amplitude}, sigma {sigma:e}, cost {cost:e}");

    for iteration in 1..=params.fit_max_iterations {
        // Normal equations with the analytic Jacobian.
        let mut jtj = [[0.0; 2]; 2];
        let mut jtr = [0.0; 2];
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            let e = gaussian(xi, 1.0, sigma);
            let d_amp = e;
            let d_sigma = amplitude * e * xi * xi / (sigma * sigma * sigma);
            let r = yi - amplitude * e;
            jtj[0][0] += d_amp * d_amp;
            jtj[0][1] += d_amp * d_sigma;
            jtj[1][1] += d_sigma * d_sigma;
            jtr[0] += d_amp * r;
            jtr[1] += d_sigma * r;
        }
        jtj[1][0] = jtj[0][1];
        // Marquardt's scaling keeps the damping independent of the units of x.
        jtj[0][0] *= 1.0 + lambda;
        jtj[1][1] *= 1.0 + lambda;

        let [d_amplitude, d_sigma] = match solve_2x2(&jtj, &jtr) {
            Some(d) => d,
            None => {
                lambda *= LAMBDA_UP;
                continue;
            }
        };
        let step_is_small = d_amplitude.abs() <= params.fit_tolerance * amplitude.abs()
            && d_sigma.abs() <= params.fit_tolerance * sigma.abs();

        let trial_amplitude = amplitude + d_amplitude;
        let trial_sigma = sigma + d_sigma;
        let trial_cost = sum_sq_residuals(x.view(), y.view(), trial_amplitude, trial_sigma);
        if trial_cost < cost {
            amplitude = trial_amplitude;
            sigma = trial_sigma;
            cost = trial_cost;
            lambda *= LAMBDA_DOWN;
        } else {
            lambda *= LAMBDA_UP;
        }
        trace!("Clean-beam fit iteration {iteration}: amplitude {amplitude}, sigma {sigma:e}, cost {cost:e}");

        if step_is_small {
            if !(amplitude.is_finite() && amplitude > 0.0 && sigma.is_finite() && sigma > 0.0) {
                return Err(FitError::BadParameters { amplitude, sigma });
            }
            debug!(
                "Clean beam fitted after {iteration} iterations: amplitude {amplitude}, sigma {sigma:e}"
            );
            return Ok(CleanBeam { amplitude, sigma });
        }
    }

    Err(FitError::NoConvergence {
        iterations: params.fit_max_iterations,
        amplitude,
        sigma,
    })
}

#[inline]
pub(super) fn gaussian(x: f64, amplitude: f64, sigma: f64) -> f64 {
    amplitude * (-x * x / (2.0 * sigma * sigma)).exp()
}

fn sum_sq_residuals(x: ArrayView1<f64>, y: ArrayView1<f64>, amplitude: f64, sigma: f64) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (yi - gaussian(xi, amplitude, sigma)).powi(2))
        .sum()
}

/// Solve a 2x2 linear system by Cramer's rule. `None` is returned if the
/// system is singular.
fn solve_2x2(a: &[[f64; 2]; 2], b: &[f64; 2]) -> Option<[f64; 2]> {
    let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
    let scale = a[0][0].abs().max(a[1][1].abs());
    if !det.is_finite() || det.abs() <= 1e-30 * scale * scale {
        return None;
    }
    Some([
        (b[0] * a[1][1] - a[0][1] * b[1]) / det,
        (a[0][0] * b[1] - a[1][0] * b[0]) / det,
    ])
}
