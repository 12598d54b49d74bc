// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! CLEAN deconvolution.
//!
//! Hogbom minor cycles greedily find the brightest residual pixel and subtract
//! a fraction of the PSF centred on it. This is cheap but approximate, so
//! Cotton-Schwab major cycles periodically throw away the image-domain
//! residual and recompute it exactly from the visibilities and the accumulated
//! model. Each major cycle only cleans to a fraction of its starting peak.
//!
//! Both loops are bounded by iteration caps. Hitting a cap isn't an error; the
//! partial model and residual are returned along with an
//! [`IterationLimitExceeded`] describing how far from convergence they are.

mod cotton_schwab;
mod error;
mod hogbom;

pub use cotton_schwab::{cotton_schwab, CottonSchwabResult};
pub use error::CleanError;
pub use hogbom::{hogbom, HogbomResult};

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;

use crate::{
    c64,
    constants::*,
    operator::MeasurementOperator,
    psf::{dirty_image, Psf},
    restore::{restore, CleanBeam, FitError, RestoreParams},
};

/// Parameters for a single Hogbom minor cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HogbomParams {
    /// The fraction of the residual peak removed per subtraction. Must lie in
    /// (0, 1].
    pub gain: f64,

    /// Stop once the absolute residual peak is at or below this value.
    pub tolerance: f64,

    /// The maximum number of subtractions.
    pub max_iterations: u32,
}

impl Default for HogbomParams {
    fn default() -> Self {
        HogbomParams {
            gain: DEFAULT_GAIN,
            tolerance: DEFAULT_MINOR_TOLERANCE,
            max_iterations: DEFAULT_MAX_MINOR_ITERATIONS,
        }
    }
}

impl HogbomParams {
    pub fn validate(&self) -> Result<(), CleanError> {
        validate_gain(self.gain)?;
        validate_tolerance("minor", self.tolerance)?;
        if self.max_iterations == 0 {
            return Err(CleanError::NoIterations { name: "minor" });
        }
        Ok(())
    }
}

/// Parameters for Cotton-Schwab CLEAN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CottonSchwabParams {
    /// The loop gain used by every minor cycle. Must lie in (0, 1].
    pub gain: f64,

    /// Each minor cycle cleans down to this fraction of the residual peak at
    /// the start of its major cycle. Must lie in (0, 1).
    pub peak_factor: f64,

    /// Stop once the absolute residual peak after a major cycle is at or below
    /// this value.
    pub major_tolerance: f64,

    /// The maximum number of major cycles.
    pub max_major_iterations: u32,

    /// The maximum number of subtractions in each minor cycle.
    pub max_minor_iterations: u32,
}

impl Default for CottonSchwabParams {
    fn default() -> Self {
        CottonSchwabParams {
            gain: DEFAULT_GAIN,
            peak_factor: DEFAULT_PEAK_FACTOR,
            major_tolerance: DEFAULT_MAJOR_TOLERANCE,
            max_major_iterations: DEFAULT_MAX_MAJOR_ITERATIONS,
            max_minor_iterations: DEFAULT_MAX_MINOR_ITERATIONS,
        }
    }
}

impl CottonSchwabParams {
    pub fn validate(&self) -> Result<(), CleanError> {
        validate_gain(self.gain)?;
        if !(self.peak_factor > 0.0 && self.peak_factor < 1.0) {
            return Err(CleanError::InvalidPeakFactor(self.peak_factor));
        }
        validate_tolerance("major", self.major_tolerance)?;
        if self.max_major_iterations == 0 {
            return Err(CleanError::NoIterations { name: "major" });
        }
        if self.max_minor_iterations == 0 {
            return Err(CleanError::NoIterations { name: "minor" });
        }
        Ok(())
    }

    /// The minor-cycle parameters for a major cycle starting with residual
    /// peak `peak`.
    pub(crate) fn minor_params(&self, peak: f64) -> HogbomParams {
        HogbomParams {
            gain: self.gain,
            tolerance: self.peak_factor * peak,
            max_iterations: self.max_minor_iterations,
        }
    }
}

fn validate_gain(gain: f64) -> Result<(), CleanError> {
    // Written this way so that NaN is rejected.
    if !(gain > 0.0 && gain <= 1.0) {
        return Err(CleanError::InvalidGain(gain));
    }
    Ok(())
}

fn validate_tolerance(name: &'static str, value: f64) -> Result<(), CleanError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(CleanError::InvalidTolerance { name, value });
    }
    Ok(())
}

/// Check that an image has no NaNs or infinities.
pub(crate) fn check_finite(name: &'static str, image: ArrayView1<f64>) -> Result<(), CleanError> {
    match image.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(CleanError::NonFiniteImage {
            name,
            index,
            value: image[index],
        }),
        None => Ok(()),
    }
}

/// Which CLEAN loop something refers to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleKind {
    Minor,
    Major,
}

/// How a CLEAN loop finished.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CleanStatus {
    /// The residual peak reached the tolerance.
    Converged,

    /// The iteration cap was reached first. Results are still valid, just
    /// under-converged.
    IterationLimit,
}

/// A CLEAN loop stopped at its iteration cap before reaching its tolerance.
/// This is a warning, not a failure: the caller decides whether the partial
/// results are good enough.
#[derive(Error, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[error("{kind} cycle didn't converge within {max_iterations} iterations; residual peak {peak:e} > tolerance {tolerance:e}")]
pub struct IterationLimitExceeded {
    pub kind: CycleKind,
    pub max_iterations: u32,
    pub peak: f64,
    pub tolerance: f64,
}

/// Everything needed to deconvolve any number of visibility sets measured with
/// the same sampling. Nothing in here is mutated by a deconvolution run, so a
/// `Deconvolver` can be shared between threads.
#[derive(Debug, Clone)]
pub struct Deconvolver {
    op: MeasurementOperator,
    psf: Psf,
}

impl Deconvolver {
    /// Build the PSF of `op` and check that it covers the image grid.
    pub fn new(op: MeasurementOperator) -> Result<Deconvolver, CleanError> {
        let psf = Psf::new(&op)?;
        psf.check_covers(op.image_grid().len())?;
        Ok(Deconvolver { op, psf })
    }

    pub fn operator(&self) -> &MeasurementOperator {
        &self.op
    }

    pub fn psf(&self) -> &Psf {
        &self.psf
    }

    /// The dirty image of the sampled visibilities `vis`.
    pub fn dirty_image(&self, vis: ArrayView1<c64>) -> Result<Array1<f64>, CleanError> {
        dirty_image(&self.op, &self.psf, vis)
    }

    /// Deconvolve the sampled visibilities `vis` with Cotton-Schwab CLEAN.
    pub fn clean(
        &self,
        vis: ArrayView1<c64>,
        params: &CottonSchwabParams,
    ) -> Result<CottonSchwabResult, CleanError> {
        cotton_schwab(vis, &self.op, &self.psf, params)
    }

    /// Restore the results of a CLEAN run with a beam fitted to this PSF. The
    /// fitted beam is returned alongside the restored image.
    pub fn restore(
        &self,
        result: &CottonSchwabResult,
        params: &RestoreParams,
    ) -> Result<(Array1<f64>, CleanBeam), FitError> {
        restore(result.model.view(), result.residual.view(), &self.psf, params)
    }
}
