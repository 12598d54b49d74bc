// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Coordinate grids for the image and transform domains, and the sampling mask
//! that says which transform-domain coordinates were measured.

mod error;

pub use error::GridError;

use std::collections::HashSet;

use ndarray::prelude::*;
use vec1::Vec1;

use crate::{c64, constants::GRID_SPACING_RTOL};

/// An ordered, non-empty sequence of finite coordinates. Grids are immutable
/// once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    coords: Array1<f64>,
}

impl Grid {
    /// Make a new grid. The coordinates must be finite and strictly
    /// increasing.
    pub fn new<T: Into<Array1<f64>>>(coords: T) -> Result<Grid, GridError> {
        Self::new_named(coords.into(), "coordinate")
    }

    pub(crate) fn new_named(coords: Array1<f64>, name: &'static str) -> Result<Grid, GridError> {
        if coords.is_empty() {
            return Err(GridError::Empty { name });
        }
        for (index, &value) in coords.iter().enumerate() {
            if !value.is_finite() {
                return Err(GridError::NonFinite { name, index, value });
            }
        }
        for (index, pair) in coords.windows(2).into_iter().enumerate() {
            if pair[1] <= pair[0] {
                return Err(GridError::NotIncreasing {
                    name,
                    index: index + 1,
                    prev: pair[0],
                    value: pair[1],
                });
            }
        }
        Ok(Grid { coords })
    }

    /// Make an evenly spaced grid of `num` coordinates from `start` to `stop`
    /// (inclusive), like numpy's `linspace`.
    pub fn linspace(start: f64, stop: f64, num: usize) -> Result<Grid, GridError> {
        let bad = || GridError::BadLinspace { start, stop, num };
        match num {
            0 => Err(bad()),
            1 if start.is_finite() => Ok(Grid {
                coords: array![start],
            }),
            _ if !(start.is_finite() && stop.is_finite()) || stop <= start => Err(bad()),
            _ => {
                let step = (stop - start) / (num - 1) as f64;
                let coords = Array1::from_shape_fn(num, |i| start + i as f64 * step);
                Ok(Grid { coords })
            }
        }
    }

    /// Make an evenly spaced grid of `num` coordinates with spacing `step`,
    /// centred so that the coordinate at index `num / 2` is zero. e.g. 4
    /// coordinates with a spacing of 1 are \[-2, -1, 0, 1\].
    pub fn centred(num: usize, step: f64) -> Result<Grid, GridError> {
        if num == 0 || !step.is_finite() || step <= 0.0 {
            return Err(GridError::BadLinspace {
                start: 0.0,
                stop: step * num as f64,
                num,
            });
        }
        let half = (num / 2) as f64;
        Ok(Grid {
            coords: Array1::from_shape_fn(num, |i| (i as f64 - half) * step),
        })
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Always false; a grid has at least one coordinate.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn coords(&self) -> ArrayView1<f64> {
        self.coords.view()
    }

    pub fn first(&self) -> f64 {
        self.coords[0]
    }

    pub fn last(&self) -> f64 {
        self.coords[self.coords.len() - 1]
    }

    /// Get the spacing between consecutive coordinates. This fails if the grid
    /// has fewer than 2 coordinates or if the coordinates aren't evenly spaced.
    pub fn spacing(&self) -> Result<f64, GridError> {
        self.spacing_named("coordinate")
    }

    pub(crate) fn spacing_named(&self, name: &'static str) -> Result<f64, GridError> {
        if self.coords.len() < 2 {
            return Err(GridError::TooFewForSpacing {
                name,
                need: 2,
                have: self.coords.len(),
            });
        }
        let first = self.coords[1] - self.coords[0];
        for (index, pair) in self.coords.windows(2).into_iter().enumerate() {
            let spacing = pair[1] - pair[0];
            if ((spacing - first) / first).abs() > GRID_SPACING_RTOL {
                return Err(GridError::UnevenSpacing {
                    name,
                    index: index + 1,
                    spacing,
                    first,
                });
            }
        }
        Ok(first)
    }

    /// Build the PSF grid for this (image) grid. For an evenly spaced grid of
    /// N coordinates with spacing dx, this is the 2N-1 offsets
    /// `(j - (N - 1)) * dx`; zero offset is at index N-1, so a PSF evaluated on
    /// this grid can be shifted onto any image pixel without running out of
    /// bounds.
    ///
    /// A single-pixel image gets the single-offset PSF grid \[0\].
    pub fn psf_grid(&self) -> Result<Grid, GridError> {
        let n = self.len();
        if n == 1 {
            return Ok(Grid {
                coords: array![0.0],
            });
        }
        let dx = self.spacing_named("image")?;
        let centre = (n - 1) as f64;
        Ok(Grid {
            coords: Array1::from_shape_fn(2 * n - 1, |j| (j as f64 - centre) * dx),
        })
    }
}

impl TryFrom<Vec<f64>> for Grid {
    type Error = GridError;

    fn try_from(v: Vec<f64>) -> Result<Self, Self::Error> {
        Grid::new(v)
    }
}

/// Which transform-domain coordinates were measured. The sampled indices are
/// unique and sorted.
#[derive(Debug, Clone)]
pub struct SamplingMask {
    uv_grid: Grid,
    sampled_indices: Vec1<usize>,
    indicator: Array1<bool>,
}

impl SamplingMask {
    /// Make a new mask over `uv_grid`. Each index in `sampled_indices` must be
    /// in range and must appear only once. The order of the indices doesn't
    /// matter.
    pub fn new(uv_grid: Grid, sampled_indices: Vec<usize>) -> Result<SamplingMask, GridError> {
        let mut seen = HashSet::with_capacity(sampled_indices.len());
        for &index in &sampled_indices {
            if index >= uv_grid.len() {
                return Err(GridError::SampleIndexOutOfRange {
                    index,
                    len: uv_grid.len(),
                });
            }
            if !seen.insert(index) {
                return Err(GridError::DuplicateSampleIndex { index });
            }
        }
        let mut sampled_indices =
            Vec1::try_from_vec(sampled_indices).map_err(|_| GridError::NoSamples)?;
        sampled_indices.sort_unstable();

        let mut indicator = Array1::from_elem(uv_grid.len(), false);
        for &i in sampled_indices.iter() {
            indicator[i] = true;
        }

        Ok(SamplingMask {
            uv_grid,
            sampled_indices,
            indicator,
        })
    }

    /// Make a mask where every transform-domain coordinate is sampled.
    pub fn all(uv_grid: Grid) -> SamplingMask {
        let n = uv_grid.len();
        // A grid is never empty, so this can't fail.
        let sampled_indices = Vec1::try_from_vec((0..n).collect()).expect("grid is never empty");
        SamplingMask {
            uv_grid,
            sampled_indices,
            indicator: Array1::from_elem(n, true),
        }
    }

    /// Make a mask that samples a contiguous block of `num_sampled`
    /// coordinates centred on the middle of `uv_grid`.
    pub fn central(uv_grid: Grid, num_sampled: usize) -> Result<SamplingMask, GridError> {
        let n = uv_grid.len();
        if num_sampled == 0 {
            return Err(GridError::NoSamples);
        }
        if num_sampled > n {
            return Err(GridError::SampleIndexOutOfRange {
                index: num_sampled - 1,
                len: n,
            });
        }
        let start = (n - num_sampled) / 2;
        SamplingMask::new(uv_grid, (start..start + num_sampled).collect())
    }

    pub fn uv_grid(&self) -> &Grid {
        &self.uv_grid
    }

    pub fn sampled_indices(&self) -> &[usize] {
        self.sampled_indices.as_slice()
    }

    pub fn num_sampled(&self) -> usize {
        self.sampled_indices.len()
    }

    /// The boolean indicator over the full transform-domain grid.
    pub fn indicator(&self) -> ArrayView1<bool> {
        self.indicator.view()
    }

    /// The indicator as weights: 1 where sampled, 0 elsewhere.
    pub fn indicator_weights(&self) -> Array1<f64> {
        self.indicator.mapv(|s| if s { 1.0 } else { 0.0 })
    }

    /// The transform-domain coordinates that were sampled, in order.
    pub fn sampled_coords(&self) -> Array1<f64> {
        let uv = self.uv_grid.coords();
        self.sampled_indices.iter().map(|&i| uv[i]).collect()
    }

    /// Expand compact (sampled-only) visibilities into a full-length vector
    /// with zeros at unsampled coordinates.
    pub fn scatter(&self, vis: ArrayView1<c64>) -> Result<Array1<c64>, GridError> {
        if vis.len() != self.num_sampled() {
            return Err(GridError::VisibilityLength {
                expected: self.num_sampled(),
                got: vis.len(),
            });
        }
        let mut full = Array1::zeros(self.uv_grid.len());
        for (&i, &v) in self.sampled_indices.iter().zip(vis.iter()) {
            full[i] = v;
        }
        Ok(full)
    }

    /// Pick the sampled visibilities out of a full-length vector. Values at
    /// unsampled coordinates are ignored.
    pub fn gather(&self, full: ArrayView1<c64>) -> Result<Array1<c64>, GridError> {
        if full.len() != self.uv_grid.len() {
            return Err(GridError::VisibilityLength {
                expected: self.uv_grid.len(),
                got: full.len(),
            });
        }
        Ok(self.sampled_indices.iter().map(|&i| full[i]).collect())
    }
}
