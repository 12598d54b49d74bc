// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The point-spread function (PSF) and the dirty image.
//!
//! The PSF is the adjoint transform of the sampling indicator. It's evaluated
//! on a grid of offsets twice the extent of the image grid, so that it can be
//! centred on any image pixel during minor-cycle subtraction. All consumers
//! use the PSF normalised by its peak; the un-normalised peak is kept to
//! normalise dirty and residual images the same way.


use log::{debug, warn};
use ndarray::{prelude::*, Zip};

use crate::{c64, clean::CleanError, grid::Grid, operator::MeasurementOperator};

/// A PSF normalised so that its peak is exactly 1.
#[derive(Debug, Clone)]
pub struct Psf {
    /// The grid of offsets that the PSF is evaluated on.
    grid: Grid,

    /// The normalised PSF values.
    values: Array1<f64>,

    /// The index of the PSF peak (zero offset).
    centre: usize,

    /// The un-normalised peak of the PSF.
    peak: f64,
}

impl Psf {
    /// Build the PSF of a measurement operator by applying its adjoint to the
    /// sampling indicator, evaluated on the PSF grid of the operator's image
    /// grid.
    pub fn new(op: &MeasurementOperator) -> Result<Psf, CleanError> {
        let psf_grid = op.image_grid().psf_grid()?;
        let indicator = Array1::from_elem(op.num_samples(), c64::new(1.0, 0.0));
        let raw = op.adjoint_onto(indicator.view(), &psf_grid)?;
        Psf::from_unnormalised(psf_grid, raw)
    }

    /// Make a PSF out of un-normalised values on `grid`. The values are
    /// normalised by their peak. If several samples share the peak value (e.g.
    /// aliases of a regularly sampled transform domain), the one closest to
    /// zero offset is the centre.
    pub fn from_unnormalised(grid: Grid, raw: Array1<f64>) -> Result<Psf, CleanError> {
        if grid.len() != raw.len() {
            return Err(CleanError::PsfLength {
                grid_len: grid.len(),
                values_len: raw.len(),
            });
        }

        let offsets = grid.coords();
        let mut centre = 0;
        let mut peak = raw[0];
        for (i, (&v, &x)) in raw.iter().zip(offsets.iter()).enumerate().skip(1) {
            let is_tie = (v - peak).abs() <= 1e-12 * peak.abs();
            if (v > peak && !is_tie)
                || (is_tie && x.abs() < offsets[centre].abs())
                || peak.is_nan()
            {
                centre = i;
                peak = v;
            }
        }
        if !peak.is_finite() || peak <= 0.0 {
            return Err(CleanError::BadPsfPeak(peak));
        }
        if offsets[centre] != 0.0 {
            warn!(
                "The PSF peak is at offset {} rather than zero offset",
                offsets[centre]
            );
        }
        debug!("PSF peak {peak} at index {centre} of {}", raw.len());

        Ok(Psf {
            values: raw / peak,
            grid,
            centre,
            peak,
        })
    }

    /// The grid of offsets that the PSF is evaluated on.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The normalised PSF values; the value at [`Psf::centre`] is 1.
    pub fn values(&self) -> ArrayView1<f64> {
        self.values.view()
    }

    /// The index of the PSF peak.
    pub fn centre(&self) -> usize {
        self.centre
    }

    /// The peak of the PSF before normalisation. Dirty and residual images are
    /// divided by this.
    pub fn peak(&self) -> f64 {
        self.peak
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check that the PSF can be shifted onto every pixel of an image with
    /// `image_len` pixels without running out of bounds.
    pub fn check_covers(&self, image_len: usize) -> Result<(), CleanError> {
        if image_len == 0 || self.centre + 1 < image_len || self.len() - self.centre < image_len
        {
            return Err(CleanError::PsfTooShort {
                psf_len: self.len(),
                centre: self.centre,
                image_len,
            });
        }
        Ok(())
    }

    /// The `image_len` PSF samples that line up with an image when the PSF
    /// centre sits on image pixel `pixel`. [`Psf::check_covers`] must have
    /// succeeded for `image_len`.
    pub(crate) fn window(&self, pixel: usize, image_len: usize) -> ArrayView1<f64> {
        let start = self.centre - pixel;
        self.values.slice(s![start..start + image_len])
    }

    /// Convolve an image with this PSF directly, i.e.
    /// `out[i] = Σ_j image[j] * psf(x_i - x_j)`. This is what the measurement
    /// operator's round trip does (up to normalisation) for on-grid images.
    pub fn convolve_image(&self, image: ArrayView1<f64>) -> Result<Array1<f64>, CleanError> {
        let n = image.len();
        self.check_covers(n)?;
        let components: Vec<(usize, f64)> = image
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| *v != 0.0)
            .collect();

        let mut out = Array1::zeros(n);
        Zip::indexed(&mut out).par_for_each(|i, out| {
            *out = components
                .iter()
                .map(|&(j, v)| v * self.values[self.centre + i - j])
                .sum();
        });
        Ok(out)
    }

    /// The full width of the main lobe at half of the peak, in the units of
    /// the PSF grid. The half-power crossings either side of the centre are
    /// found by linear interpolation. `None` is returned if the PSF doesn't
    /// fall below half power on both sides within its grid.
    pub fn main_lobe_width(&self) -> Option<f64> {
        let v = &self.values;
        let x = self.grid.coords();

        let right = (self.centre + 1..v.len())
            .find(|&i| v[i] < 0.5)
            .map(|i| interpolate_half(x[i - 1], v[i - 1], x[i], v[i]))?;
        let left = (0..self.centre)
            .rev()
            .find(|&i| v[i] < 0.5)
            .map(|i| interpolate_half(x[i + 1], v[i + 1], x[i], v[i]))?;
        Some(right - left)
    }

    /// The indices of the main lobe: the contiguous run of samples around the
    /// centre whose values are above half of the peak.
    pub fn main_lobe_indices(&self) -> std::ops::Range<usize> {
        let v = &self.values;
        let start = (0..self.centre)
            .rev()
            .find(|&i| v[i] <= 0.5)
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = (self.centre + 1..v.len())
            .find(|&i| v[i] <= 0.5)
            .unwrap_or(v.len());
        start..end
    }
}

/// Where does the line through (x0, y0) and (x1, y1) cross 0.5?
fn interpolate_half(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    x0 + (y0 - 0.5) / (y0 - y1) * (x1 - x0)
}

/// Make the dirty image of some sampled visibilities, i.e. the adjoint
/// transform of the visibilities normalised by the un-normalised PSF peak.
pub fn dirty_image(
    op: &MeasurementOperator,
    psf: &Psf,
    vis: ArrayView1<c64>,
) -> Result<Array1<f64>, CleanError> {
    let dirty = op.adjoint(vis)?;
    Ok(dirty / psf.peak())
}
