// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all hyperclean-related errors. This should be the *only*
//! error enum that is publicly visible from the command-line interface.

use thiserror::Error;

use super::{clean::CleanArgsError, common::GridArgsError, psf::PsfArgsError};
use crate::{clean::CleanError, grid::GridError, restore::FitError, sky::SkyError};

/// The *only* publicly visible error from the hyperclean CLI.
#[derive(Error, Debug)]
pub enum HypercleanError {
    /// An error with the reconstruction or transform-domain grids.
    #[error("{0}\n\nCheck the GRIDS and SAMPLING arguments (see --help)")]
    Grid(String),

    /// An error with the point-source sky.
    #[error("{0}\n\nSources are written as OFFSET:AMPLITUDE, with the offset in pixels from the image centre")]
    Sky(String),

    /// An error setting up or running CLEAN.
    #[error("{0}")]
    Clean(String),

    /// An error restoring the CLEAN model.
    #[error("{0}\n\nThe model and residual images are still valid; try --no-restore")]
    Restore(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files must be toml or json, with the same keys as the long command-line arguments")]
    ArgFile(String),

    /// An error writing outputs.
    #[error("{0}")]
    Output(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<GridArgsError> for HypercleanError {
    fn from(e: GridArgsError) -> Self {
        match e {
            GridArgsError::Grid(e) => Self::from(e),
            GridArgsError::ZeroImageSize
            | GridArgsError::TooFewUv
            | GridArgsError::BadUvMax(_)
            | GridArgsError::BadPixelSize(_) => Self::Grid(e.to_string()),
        }
    }
}

impl From<CleanArgsError> for HypercleanError {
    fn from(e: CleanArgsError) -> Self {
        match e {
            CleanArgsError::NoSources => Self::Sky(e.to_string()),
            CleanArgsError::Sky(e) => Self::from(e),
        }
    }
}

impl From<PsfArgsError> for HypercleanError {
    fn from(e: PsfArgsError) -> Self {
        match e {
            PsfArgsError::NoExponents => Self::Clean(e.to_string()),
        }
    }
}

impl From<GridError> for HypercleanError {
    fn from(e: GridError) -> Self {
        Self::Grid(e.to_string())
    }
}

impl From<SkyError> for HypercleanError {
    fn from(e: SkyError) -> Self {
        Self::Sky(e.to_string())
    }
}

impl From<CleanError> for HypercleanError {
    fn from(e: CleanError) -> Self {
        match e {
            CleanError::Grid(e) => Self::from(e),
            _ => Self::Clean(e.to_string()),
        }
    }
}

impl From<FitError> for HypercleanError {
    fn from(e: FitError) -> Self {
        match e {
            FitError::Clean(e) => Self::from(e),
            FitError::EmptyMainLobe
            | FitError::MainLobeNotIsolated
            | FitError::NoConvergence { .. }
            | FitError::BadParameters { .. } => Self::Restore(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for HypercleanError {
    fn from(e: serde_json::Error) -> Self {
        Self::Output(e.to_string())
    }
}

impl From<toml::ser::Error> for HypercleanError {
    fn from(e: toml::ser::Error) -> Self {
        Self::ArgFile(e.to_string())
    }
}

impl From<std::io::Error> for HypercleanError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
