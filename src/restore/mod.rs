// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Restoration of CLEAN images.
//!
//! A CLEAN model is a set of point components, which isn't nice to look at.
//! The restored image is the model convolved with a "clean beam" (a Gaussian
//! fitted to the main lobe of the PSF, without any sidelobes) plus the
//! residual image.

mod error;
mod fit;

pub use error::FitError;

use itertools::Itertools;
use log::debug;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    clean::CleanError,
    constants::{DEFAULT_FIT_MAX_ITERATIONS, DEFAULT_FIT_TOLERANCE},
    grid::Grid,
    math::convolve_same,
    psf::Psf,
};

/// The ratio of a Gaussian's full width at half maximum to its standard
/// deviation, 2 sqrt(2 ln 2).
pub const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949_4;

lazy_static::lazy_static! {
    pub(crate) static ref BEAM_NORMALISATIONS: String = BeamNormalisation::iter().join(", ");
}

/// How the sampled clean beam is scaled before convolving with the model.
#[derive(
    Debug,
    Default,
    Display,
    EnumIter,
    EnumString,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BeamNormalisation {
    /// Keep the fitted amplitude, so a restored point source has the same peak
    /// as in the model.
    #[default]
    #[strum(serialize = "peak")]
    Peak,

    /// Scale the sampled beam to have unit sum, so that restoration conserves
    /// the total flux of the model.
    #[strum(serialize = "area")]
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestoreParams {
    pub normalisation: BeamNormalisation,

    /// The maximum number of Levenberg-Marquardt iterations used to fit the
    /// clean beam.
    pub fit_max_iterations: u32,

    /// The fit has converged when the steps of both parameters are smaller
    /// than this fraction of the parameters.
    pub fit_tolerance: f64,
}

impl Default for RestoreParams {
    fn default() -> Self {
        RestoreParams {
            normalisation: BeamNormalisation::default(),
            fit_max_iterations: DEFAULT_FIT_MAX_ITERATIONS,
            fit_tolerance: DEFAULT_FIT_TOLERANCE,
        }
    }
}

impl RestoreParams {
    pub fn validate(&self) -> Result<(), CleanError> {
        if !(self.fit_tolerance.is_finite() && self.fit_tolerance >= 0.0) {
            return Err(CleanError::InvalidTolerance {
                name: "fit",
                value: self.fit_tolerance,
            });
        }
        if self.fit_max_iterations == 0 {
            return Err(CleanError::NoIterations { name: "fit" });
        }
        Ok(())
    }
}

/// A Gaussian clean beam, `amplitude * exp(-x^2 / (2 sigma^2))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleanBeam {
    pub amplitude: f64,

    /// In the units of the image grid.
    pub sigma: f64,
}

impl CleanBeam {
    /// Fit a clean beam to the main lobe of a PSF: the contiguous samples
    /// around the peak that are above half power.
    pub fn fit(psf: &Psf, params: &RestoreParams) -> Result<CleanBeam, FitError> {
        params.validate()?;
        fit::fit_main_lobe(psf, params)
    }

    /// The full width of the beam at half of its maximum.
    pub fn fwhm(&self) -> f64 {
        FWHM_PER_SIGMA * self.sigma
    }

    /// Evaluate the beam at a single offset.
    pub fn evaluate_at(&self, x: f64) -> f64 {
        fit::gaussian(x, self.amplitude, self.sigma)
    }

    /// Evaluate the beam at every coordinate of a grid.
    pub fn evaluate(&self, grid: &Grid) -> Array1<f64> {
        grid.coords().mapv(|x| self.evaluate_at(x))
    }

    /// Sample the beam on `2 * image_len - 1` offsets spaced by `spacing` and
    /// centred on zero offset, ready for a "same" convolution with an image of
    /// `image_len` pixels.
    pub fn kernel(
        &self,
        image_len: usize,
        spacing: f64,
        normalisation: BeamNormalisation,
    ) -> Array1<f64> {
        let half = image_len.saturating_sub(1) as f64;
        let kernel = Array1::from_shape_fn((2 * image_len).saturating_sub(1), |j| {
            self.evaluate_at((j as f64 - half) * spacing)
        });
        match normalisation {
            BeamNormalisation::Peak => kernel,
            BeamNormalisation::Area => {
                let sum = kernel.sum();
                kernel / sum
            }
        }
    }
}

/// Restore a CLEAN model: fit a clean beam to the PSF main lobe, convolve the
/// model with it ("same" mode, so the result lines up with the image grid) and
/// add the residual. The fitted beam is also returned.
///
/// A [`FitError`] here doesn't invalidate the model or residual.
pub fn restore(
    model: ArrayView1<f64>,
    residual: ArrayView1<f64>,
    psf: &Psf,
    params: &RestoreParams,
) -> Result<(Array1<f64>, CleanBeam), FitError> {
    params.validate()?;
    let n = model.len();
    if residual.len() != n {
        return Err(CleanError::ImageLength {
            name: "residual",
            expected: n,
            got: residual.len(),
        }
        .into());
    }
    psf.check_covers(n)?;
    let spacing = psf.grid().spacing().map_err(CleanError::from)?;

    let beam = fit::fit_main_lobe(psf, params)?;
    debug!(
        "Restoring with a clean beam of amplitude {} and FWHM {:e}",
        beam.amplitude,
        beam.fwhm()
    );
    let kernel = beam.kernel(n, spacing, params.normalisation);
    let restored = convolve_same(model, kernel.view()) + residual;
    Ok((restored, beam))
}
