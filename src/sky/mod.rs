// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Point-source sky models. These supply the "true" signal and its exact
//! visibilities for demonstrations and tests; the deconvolution itself only
//! ever sees the visibilities.


use std::str::FromStr;

use log::warn;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{c64, constants::TAU, grid::Grid, math::cexp, operator::MeasurementOperator};

/// A point source of brightness `amplitude` at image-domain coordinate
/// `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSource {
    pub position: f64,
    pub amplitude: f64,
}

impl PointSource {
    pub fn new(position: f64, amplitude: f64) -> PointSource {
        PointSource {
            position,
            amplitude,
        }
    }
}

impl FromStr for PointSource {
    type Err = SkyError;

    /// Parse "position:amplitude", e.g. "-0.05:2.5".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SkyError::Parse(s.to_string());
        let (pos, amp) = s.split_once(':').ok_or_else(bad)?;
        let position: f64 = pos.trim().parse().map_err(|_| bad())?;
        let amplitude: f64 = amp.trim().parse().map_err(|_| bad())?;
        if !position.is_finite() || !amplitude.is_finite() {
            return Err(bad());
        }
        Ok(PointSource::new(position, amplitude))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkyError {
    #[error("Couldn't parse '{0}' as a point source; expected 'position:amplitude', e.g. '-0.05:2.5'")]
    Parse(String),

    #[error("A source at {position} is outside the image grid ({first} to {last})")]
    OutsideGrid { position: f64, first: f64, last: f64 },
}

/// Put point sources onto the nearest pixels of `grid`. Sources that share a
/// pixel are added together. A warning is logged for any source that isn't
/// within a millionth of a pixel of its pixel centre.
pub fn model_image(sources: &[PointSource], grid: &Grid) -> Result<Array1<f64>, SkyError> {
    let coords = grid.coords();
    let mut image = Array1::zeros(grid.len());
    for src in sources {
        let (first, last) = (grid.first(), grid.last());
        let tolerance = grid.spacing().map(|dx| 0.5 * dx).unwrap_or(0.0);
        if src.position < first - tolerance || src.position > last + tolerance {
            return Err(SkyError::OutsideGrid {
                position: src.position,
                first,
                last,
            });
        }

        let (i_pixel, distance) = coords
            .iter()
            .map(|&x| (x - src.position).abs())
            .enumerate()
            .fold((0, f64::INFINITY), |best, (i, d)| if d < best.1 { (i, d) } else { best });
        if let Ok(dx) = grid.spacing() {
            if distance > 1e-6 * dx {
                warn!(
                    "Source at {} isn't on a pixel centre; using pixel {i_pixel} ({})",
                    src.position, coords[i_pixel]
                );
            }
        }
        image[i_pixel] += src.amplitude;
    }
    Ok(image)
}

/// Get the exact visibilities of point sources at the sampled coordinates of
/// `op`. Sources needn't be on pixel centres.
pub fn simulate_visibilities(sources: &[PointSource], op: &MeasurementOperator) -> Array1<c64> {
    op.uv_coords()
        .iter()
        .map(|&u| {
            sources.iter().fold(c64::default(), |acc, src| {
                acc + cexp(-TAU * u * src.position) * src.amplitude
            })
        })
        .collect()
}
