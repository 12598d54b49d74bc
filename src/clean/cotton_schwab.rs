// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cotton-Schwab CLEAN: Hogbom minor cycles inside exact major cycles.

use log::{debug, info, warn};
use ndarray::prelude::*;
use serde::Serialize;

use super::{
    check_finite, hogbom, CleanError, CleanStatus, CottonSchwabParams, CycleKind,
    IterationLimitExceeded,
};
use crate::{
    c64,
    operator::MeasurementOperator,
    psf::{dirty_image, Psf},
};

/// The output of Cotton-Schwab CLEAN.
#[derive(Debug, Clone, Serialize)]
pub struct CottonSchwabResult {
    /// The CLEAN model: point-source fluxes on the image grid.
    pub model: Array1<f64>,

    /// The exact residual image of `model`, normalised by the PSF peak.
    pub residual: Array1<f64>,

    /// The dirty image that the deconvolution started from.
    pub dirty: Array1<f64>,

    /// The number of major cycles run.
    pub major_cycles: u32,

    /// The total number of minor-cycle subtractions over all major cycles.
    pub minor_iterations: u32,

    /// The absolute residual peak of the dirty image, followed by the absolute
    /// residual peak after each major cycle.
    pub major_peak_history: Vec<f64>,

    pub status: CleanStatus,

    /// Set if the major-cycle cap was hit.
    pub warning: Option<IterationLimitExceeded>,

    /// One entry for every minor cycle that stopped at its iteration cap
    /// before reaching its target peak, in the order they ran.
    pub minor_warnings: Vec<IterationLimitExceeded>,
}

fn abs_peak(image: ArrayView1<f64>) -> f64 {
    image.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

/// Deconvolve sampled visibilities with Cotton-Schwab CLEAN.
///
/// The dirty image is formed from `vis`. Then, until the absolute residual
/// peak is at or below `params.major_tolerance` (or
/// `params.max_major_iterations` major cycles have run), a Hogbom minor cycle
/// cleans the residual down to `params.peak_factor` times its current peak, its
/// components are added to the model, and the residual is recomputed exactly as
/// the dirty image of `vis - forward(model)`.
///
/// `psf` must be the PSF of `op`.
pub fn cotton_schwab(
    vis: ArrayView1<c64>,
    op: &MeasurementOperator,
    psf: &Psf,
    params: &CottonSchwabParams,
) -> Result<CottonSchwabResult, CleanError> {
    params.validate()?;
    let n = op.image_grid().len();
    psf.check_covers(n)?;

    let dirty = dirty_image(op, psf, vis)?;
    check_finite("dirty", dirty.view())?;

    let mut model = Array1::<f64>::zeros(n);
    let mut residual = dirty.clone();
    let mut peak = abs_peak(residual.view());
    let mut major_peak_history = vec![peak];
    let mut major_cycles = 0;
    let mut minor_iterations = 0;
    let mut minor_warnings = vec![];
    info!("Dirty image peak: {peak:e}");

    let status = loop {
        if peak <= params.major_tolerance {
            break CleanStatus::Converged;
        }
        if major_cycles == params.max_major_iterations {
            break CleanStatus::IterationLimit;
        }
        major_cycles += 1;

        // Minor cycle on an approximate residual.
        let minor = hogbom(residual.view(), psf, &params.minor_params(peak))?;
        minor_iterations += minor.iterations;
        model += &minor.model_delta;
        if let Some(w) = minor.warning {
            minor_warnings.push(w);
        }

        // Exact re-evaluation of the residual.
        let model_vis = op.forward(model.view())?;
        let residual_vis = &vis - &model_vis;
        residual = dirty_image(op, psf, residual_vis.view())?;
        peak = abs_peak(residual.view());
        major_peak_history.push(peak);

        debug!(
            "Major cycle {major_cycles}: {} minor iterations ({}), residual peak {peak:e}",
            minor.iterations, minor.status
        );
    };

    if !minor_warnings.is_empty() {
        warn!(
            "{} of {major_cycles} minor cycles stopped at their cap of {} iterations",
            minor_warnings.len(),
            params.max_minor_iterations
        );
    }

    let warning = match status {
        CleanStatus::Converged => {
            info!(
                "Converged after {major_cycles} major cycles ({minor_iterations} minor iterations); residual peak {peak:e}"
            );
            None
        }
        CleanStatus::IterationLimit => {
            let w = IterationLimitExceeded {
                kind: CycleKind::Major,
                max_iterations: params.max_major_iterations,
                peak,
                tolerance: params.major_tolerance,
            };
            warn!("{w}");
            Some(w)
        }
    };

    Ok(CottonSchwabResult {
        model,
        residual,
        dirty,
        major_cycles,
        minor_iterations,
        major_peak_history,
        status,
        warning,
        minor_warnings,
    })
}
