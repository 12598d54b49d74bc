// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpful functions for tests.

use ndarray::prelude::*;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{c64, sky::simulate_visibilities, Grid, MeasurementOperator, PointSource, SamplingMask};

/// The number of image pixels in the test scenario.
pub(crate) const NUM_PIXELS: usize = 256;

/// The image pixels of the two test sources, with their amplitudes.
pub(crate) const SOURCES: [(usize, f64); 2] = [(100, 1.0), (160, 2.5)];

/// Everything needed to deconvolve the two-source test scenario.
pub(crate) struct Scenario {
    pub(crate) mask: SamplingMask,
    pub(crate) op: MeasurementOperator,
    pub(crate) sources: Vec<PointSource>,
    pub(crate) vis: Array1<c64>,
}

/// 300 integer transform-domain coordinates centred on zero, of which the
/// central 200 are sampled. The image grid has 256 pixels with spacing 1/600,
/// so the normalised PSF is `sin(πj/3) cot(πj/600) / 200` at a pixel offset
/// of j; this is zero at every multiple of 3. The sources are 60 pixels apart,
/// so neither one's PSF touches the other's pixel.
pub(crate) fn two_source_scenario() -> Scenario {
    let uv_grid = Grid::centred(300, 1.0).unwrap();
    let mask = SamplingMask::central(uv_grid, 200).unwrap();
    scenario(mask, &SOURCES)
}

/// Like [`two_source_scenario`], but 200 of the 300 transform-domain
/// coordinates are picked at random with `seed`, and the sources sit at the
/// given image pixels. The PSF has no regular nulls, so each source's
/// sidelobes land on the other.
pub(crate) fn irregular_scenario(seed: u64, sources: &[(usize, f64)]) -> Scenario {
    let uv_grid = Grid::centred(300, 1.0).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..uv_grid.len()).collect();
    indices.shuffle(&mut rng);
    indices.truncate(200);
    let mask = SamplingMask::new(uv_grid, indices).unwrap();
    scenario(mask, sources)
}

fn scenario(mask: SamplingMask, pixels: &[(usize, f64)]) -> Scenario {
    let image_grid = Grid::centred(NUM_PIXELS, 1.0 / 600.0).unwrap();
    let sources: Vec<PointSource> = pixels
        .iter()
        .map(|&(pixel, amplitude)| PointSource::new(image_grid.coords()[pixel], amplitude))
        .collect();
    let op = MeasurementOperator::new(image_grid, &mask);
    let vis = simulate_visibilities(&sources, &op);
    Scenario {
        mask,
        op,
        sources,
        vis,
    }
}

/// The normalised PSF of [`two_source_scenario`] at an integer pixel offset.
pub(crate) fn scenario_psf(offset: i64) -> f64 {
    if offset == 0 {
        return 1.0;
    }
    let j = offset as f64;
    let pi = std::f64::consts::PI;
    (pi * j / 3.0).sin() / (pi * j / 600.0).tan() / 200.0
}
