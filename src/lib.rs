// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
CLEAN deconvolution of undersampled interferometric measurements.

The measurement process samples the Fourier transform of a one-dimensional
brightness distribution at a limited set of coordinates. Applying the adjoint
transform to these samples gives a "dirty" image, which is the true brightness
convolved with the instrument's point-spread function (PSF). `hyperclean`
removes the PSF with the CLEAN algorithm: cheap, approximate Hogbom minor
cycles in the image domain, corrected by exact Cotton-Schwab major cycles that
round trip through the measurement operator. The final model is restored with
a fitted, sidelobe-free clean beam.
 */

pub mod clean;
mod cli;
pub mod constants;
pub mod grid;
pub(crate) mod math;
pub mod operator;
pub mod psf;
pub mod restore;
pub mod sky;
#[cfg(test)]
mod tests;
pub mod weighting;

// Re-exports.
pub use clean::{
    cotton_schwab, hogbom, CleanError, CleanStatus, CottonSchwabParams, CottonSchwabResult,
    CycleKind, Deconvolver, HogbomParams, HogbomResult, IterationLimitExceeded,
};
pub use cli::{Hyperclean, HypercleanError};
pub use grid::{Grid, GridError, SamplingMask};
pub use operator::MeasurementOperator;
pub use psf::Psf;
pub use restore::{restore, BeamNormalisation, CleanBeam, FitError, RestoreParams};
pub use sky::PointSource;
pub use weighting::weighted_psf;

/// Double-precision complex numbers, used for all visibilities.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;
