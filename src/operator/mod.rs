// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The measurement operator: an exact (direct, non-gridded) Fourier transform
//! between the image domain and the sampled transform-domain coordinates.
//!
//! For image coordinates x_j and sampled coordinates u_k with weights w_k:
//!
//! forward(m)\[k\] = Σ_j m_j exp(-2πi u_k x_j)
//!
//! adjoint(v)(x) = Re Σ_k w_k v_k exp(+2πi u_k x)
//!
//! Both are O(N·M); this is the most expensive work in the whole deconvolution,
//! so it's done in parallel. Each output element is accumulated sequentially
//! by a single thread, so results don't depend on the number of threads.

mod error;

pub use error::OperatorError;

use log::trace;
use ndarray::{prelude::*, Zip};

use crate::{c64, constants::TAU, grid::Grid, grid::SamplingMask, math::cexp};

/// An exact forward/adjoint transform pair. Never mutated once made, so it can
/// be shared between any number of concurrent deconvolution runs.
#[derive(Debug, Clone)]
pub struct MeasurementOperator {
    /// The image-domain (reconstruction) grid.
    image_grid: Grid,

    /// The sampled transform-domain coordinates.
    uv: Array1<f64>,

    /// Per-sample weights used by the adjoint. All ones unless re-weighted.
    weights: Array1<f64>,
}

impl MeasurementOperator {
    /// Make an operator for the sampled coordinates of `mask`, with unit
    /// weights.
    pub fn new(image_grid: Grid, mask: &SamplingMask) -> MeasurementOperator {
        let uv = mask.sampled_coords();
        let weights = Array1::ones(uv.len());
        MeasurementOperator {
            image_grid,
            uv,
            weights,
        }
    }

    /// Make an operator directly from sampled coordinates, with unit weights.
    pub fn from_sampled_grid(image_grid: Grid, uv: &Grid) -> MeasurementOperator {
        MeasurementOperator {
            image_grid,
            uv: uv.coords().to_owned(),
            weights: Array1::ones(uv.len()),
        }
    }

    /// Get a new operator with the same coordinates, but with these per-sample
    /// weights. `self` is left untouched.
    pub fn with_weights(&self, weights: Array1<f64>) -> Result<MeasurementOperator, OperatorError> {
        if weights.len() != self.uv.len() {
            return Err(OperatorError::WeightLength {
                expected: self.uv.len(),
                got: weights.len(),
            });
        }
        if let Some((index, &value)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(OperatorError::BadWeight { index, value });
        }

        Ok(MeasurementOperator {
            image_grid: self.image_grid.clone(),
            uv: self.uv.clone(),
            weights,
        })
    }

    pub fn image_grid(&self) -> &Grid {
        &self.image_grid
    }

    pub fn uv_coords(&self) -> ArrayView1<f64> {
        self.uv.view()
    }

    pub fn weights(&self) -> ArrayView1<f64> {
        self.weights.view()
    }

    pub fn num_samples(&self) -> usize {
        self.uv.len()
    }

    /// Transform an image-domain array into visibilities at the sampled
    /// coordinates.
    pub fn forward(&self, model: ArrayView1<f64>) -> Result<Array1<c64>, OperatorError> {
        if model.len() != self.image_grid.len() {
            return Err(OperatorError::ModelLength {
                expected: self.image_grid.len(),
                got: model.len(),
            });
        }

        // Models made by CLEAN are very sparse; only visit the components.
        let components: Vec<(f64, f64)> = model
            .iter()
            .zip(self.image_grid.coords())
            .filter(|(&m, _)| m != 0.0)
            .map(|(&m, &x)| (m, x))
            .collect();
        trace!(
            "Forward transform of {} components onto {} samples",
            components.len(),
            self.uv.len()
        );

        let mut vis = Array1::zeros(self.uv.len());
        Zip::from(&mut vis).and(&self.uv).par_for_each(|vis, &u| {
            *vis = components
                .iter()
                .fold(c64::default(), |acc, &(m, x)| acc + cexp(-TAU * u * x) * m);
        });
        Ok(vis)
    }

    /// Transform sampled visibilities back onto the image grid.
    pub fn adjoint(&self, vis: ArrayView1<c64>) -> Result<Array1<f64>, OperatorError> {
        self.adjoint_onto(vis, &self.image_grid)
    }

    /// Transform sampled visibilities onto an arbitrary grid (e.g. the PSF
    /// grid).
    pub fn adjoint_onto(
        &self,
        vis: ArrayView1<c64>,
        grid: &Grid,
    ) -> Result<Array1<f64>, OperatorError> {
        if vis.len() != self.uv.len() {
            return Err(OperatorError::VisibilityLength {
                expected: self.uv.len(),
                got: vis.len(),
            });
        }
        trace!(
            "Adjoint transform of {} samples onto {} pixels",
            self.uv.len(),
            grid.len()
        );

        // Fold the weights into the visibilities once.
        let weighted: Vec<(c64, f64)> = vis
            .iter()
            .zip(self.weights.iter())
            .zip(self.uv.iter())
            .filter(|((_, &w), _)| w != 0.0)
            .map(|((&v, &w), &u)| (v * w, u))
            .collect();

        let mut image = Array1::zeros(grid.len());
        Zip::from(&mut image)
            .and(grid.coords())
            .par_for_each(|pixel, &x| {
                *pixel = weighted
                    .iter()
                    .fold(0.0, |acc, &(v, u)| acc + (v * cexp(TAU * u * x)).re);
            });
        Ok(image)
    }
}
