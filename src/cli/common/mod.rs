// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Both the `clean` and `psf`
//! subcommands need a reconstruction grid and a sampled transform-domain grid,
//! so the grid arguments are shared between them.

mod printers;
#[cfg(test)]
mod tests;

pub(super) use printers::{display_warnings, InfoPrinter, Warn};

use clap::Parser;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{
    grid::{Grid, SamplingMask},
    operator::MeasurementOperator,
    GridError,
};

pub(super) const DEFAULT_IMAGE_SIZE: usize = 256;
pub(super) const DEFAULT_NUM_UV: usize = 300;
pub(super) const DEFAULT_UV_MAX: f64 = 150.0;
pub(super) const DEFAULT_NUM_SAMPLED: usize = 200;

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref IMAGE_SIZE_HELP: String =
        format!("The number of pixels in the reconstructed image. Default: {DEFAULT_IMAGE_SIZE}");

    static ref NUM_UV_HELP: String =
        format!("The number of transform-domain coordinates, sampled or not. Default: {DEFAULT_NUM_UV}");

    static ref UV_MAX_HELP: String =
        format!("The extent of the transform-domain grid; coordinates are centred on zero and spaced by uv-max / (num-uv / 2). Default: {DEFAULT_UV_MAX}");

    static ref NUM_SAMPLED_HELP: String =
        format!("Sample this many contiguous transform-domain coordinates in the middle of the grid. Default: {DEFAULT_NUM_SAMPLED}");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(HypercleanError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(HypercleanError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(HypercleanError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Arguments describing the reconstruction grid and which transform-domain
/// coordinates were measured.
#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct GridArgs {
    #[clap(long, help = IMAGE_SIZE_HELP.as_str(), help_heading = "GRIDS")]
    pub(super) image_size: Option<usize>,

    /// The separation of image pixels. Default: 1 / (4 * uv-max), i.e. the
    /// image is sampled at twice the Nyquist rate.
    #[clap(long, help_heading = "GRIDS")]
    pub(super) pixel_size: Option<f64>,

    #[clap(long, help = NUM_UV_HELP.as_str(), help_heading = "GRIDS")]
    pub(super) num_uv: Option<usize>,

    #[clap(long, help = UV_MAX_HELP.as_str(), help_heading = "GRIDS")]
    pub(super) uv_max: Option<f64>,

    #[clap(long, help = NUM_SAMPLED_HELP.as_str(), help_heading = "SAMPLING")]
    pub(super) num_sampled: Option<usize>,

    /// The indices of the transform-domain coordinates that were sampled.
    /// Overrides --num-sampled.
    #[clap(long, multiple_values(true), help_heading = "SAMPLING")]
    pub(super) sampled_indices: Option<Vec<usize>>,
}

/// The grids and sampling described by [`GridArgs`].
pub(super) struct GridParams {
    pub(super) mask: SamplingMask,
    pub(super) op: MeasurementOperator,
}

#[derive(Error, Debug)]
pub(super) enum GridArgsError {
    #[error("The image size must be at least 1")]
    ZeroImageSize,

    #[error("The number of transform-domain coordinates must be at least 2")]
    TooFewUv,

    #[error("uv-max must be positive and finite; got {0}")]
    BadUvMax(f64),

    #[error("The pixel size must be positive and finite; got {0}")]
    BadPixelSize(f64),

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl GridArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            image_size: self.image_size.or(other.image_size),
            pixel_size: self.pixel_size.or(other.pixel_size),
            num_uv: self.num_uv.or(other.num_uv),
            uv_max: self.uv_max.or(other.uv_max),
            num_sampled: self.num_sampled.or(other.num_sampled),
            sampled_indices: self.sampled_indices.or(other.sampled_indices),
        }
    }

    pub(super) fn parse(self) -> Result<GridParams, GridArgsError> {
        let GridArgs {
            image_size,
            pixel_size,
            num_uv,
            uv_max,
            num_sampled,
            sampled_indices,
        } = self;

        let image_size = image_size.unwrap_or(DEFAULT_IMAGE_SIZE);
        if image_size == 0 {
            return Err(GridArgsError::ZeroImageSize);
        }
        let num_uv = num_uv.unwrap_or(DEFAULT_NUM_UV);
        if num_uv < 2 {
            return Err(GridArgsError::TooFewUv);
        }
        let uv_max = uv_max.unwrap_or(DEFAULT_UV_MAX);
        if !(uv_max.is_finite() && uv_max > 0.0) {
            return Err(GridArgsError::BadUvMax(uv_max));
        }
        let pixel_size = pixel_size.unwrap_or(1.0 / (4.0 * uv_max));
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(GridArgsError::BadPixelSize(pixel_size));
        }

        let image_grid = Grid::centred(image_size, pixel_size)?;
        let uv_grid = Grid::centred(num_uv, uv_max / (num_uv / 2) as f64)?;
        let mask = match sampled_indices {
            Some(indices) => SamplingMask::new(uv_grid, indices)?,
            None => SamplingMask::central(uv_grid, num_sampled.unwrap_or(DEFAULT_NUM_SAMPLED))?,
        };
        debug!(
            "{} of {} transform-domain coordinates are sampled",
            mask.num_sampled(),
            mask.uv_grid().len()
        );

        let mut printer = InfoPrinter::new("Grids".into());
        printer.push_block(vec![
            format!("Image: {image_size} pixels of size {pixel_size:e}").into(),
            format!(
                "       from {:e} to {:e}",
                image_grid.first(),
                image_grid.last()
            )
            .into(),
        ]);
        printer.push_block(vec![
            format!(
                "Transform domain: {} coordinates from {} to {}",
                mask.uv_grid().len(),
                mask.uv_grid().first(),
                mask.uv_grid().last()
            )
            .into(),
            format!("                  {} sampled", mask.num_sampled()).into(),
        ]);
        printer.display();

        let op = MeasurementOperator::new(image_grid, &mask);
        Ok(GridParams { mask, op })
    }
}
