// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `hyperclean` does all of its
calculations in double precision.
 */

pub use std::f64::consts::{PI, TAU};

/// The fraction of a residual peak removed by each minor-cycle subtraction.
pub const DEFAULT_GAIN: f64 = 0.1;

/// Minor cycles stop once the absolute residual peak is at or below this value
/// (when not overridden by a major cycle).
pub const DEFAULT_MINOR_TOLERANCE: f64 = 0.1;

/// The maximum number of subtractions in a single minor cycle.
pub const DEFAULT_MAX_MINOR_ITERATIONS: u32 = 200;

/// Each major cycle cleans down to this fraction of its starting residual
/// peak.
pub const DEFAULT_PEAK_FACTOR: f64 = 0.2;

/// Major cycles stop once the absolute residual peak is at or below this
/// value.
pub const DEFAULT_MAJOR_TOLERANCE: f64 = 0.01;

/// The maximum number of major cycles.
pub const DEFAULT_MAX_MAJOR_ITERATIONS: u32 = 10;

/// The default power-law exponent applied to sampling coordinates. 0 is
/// natural weighting.
pub const DEFAULT_WEIGHTING_EXPONENT: f64 = 0.0;

/// The maximum number of Levenberg-Marquardt iterations when fitting a clean
/// beam to the PSF main lobe.
pub const DEFAULT_FIT_MAX_ITERATIONS: u32 = 100;

/// The clean-beam fit has converged when the relative change of both
/// parameters is below this value.
pub const DEFAULT_FIT_TOLERANCE: f64 = 1e-10;

/// Two sample spacings that differ by less than this relative amount are
/// considered equal when checking that a grid is evenly spaced.
pub const GRID_SPACING_RTOL: f64 = 1e-6;
