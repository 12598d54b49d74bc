// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Compare the PSFs made by different power-law weightings of the same
//! sampling.

#[cfg(test)]
mod tests;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::{AppSettings, Parser};
use itertools::Itertools;
use log::{debug, info, trace};
use ndarray::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vec1::Vec1;

use super::common::{display_warnings, GridArgs, GridParams, InfoPrinter, Warn, ARG_FILE_HELP};
use crate::{
    constants::DEFAULT_WEIGHTING_EXPONENT, operator::MeasurementOperator, psf::Psf,
    weighting::weighted_psf, HypercleanError,
};

lazy_static::lazy_static! {
    static ref EXPONENTS_HELP: String =
        format!("Make a PSF for each of these power-law weighting exponents. Default: {DEFAULT_WEIGHTING_EXPONENT}");
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct PsfCliArgs {
    #[clap(long, multiple_values(true), help = EXPONENTS_HELP.as_str(), help_heading = "WEIGHTING")]
    pub(super) exponents: Option<Vec<f64>>,

    /// Write the PSFs and their main-lobe widths to this JSON file.
    #[clap(short, long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[clap(setting(AppSettings::AllowNegativeNumbers))]
pub(super) struct PsfArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "grid")]
    #[serde(default)]
    pub(super) grid_args: GridArgs,

    #[clap(flatten)]
    #[serde(rename = "psf")]
    #[serde(default)]
    pub(super) psf_args: PsfCliArgs,
}

#[derive(Error, Debug)]
pub(super) enum PsfArgsError {
    #[error("No weighting exponents were given")]
    NoExponents,
}

pub(super) struct PsfParams {
    pub(super) sampled_coords: Array1<f64>,
    pub(super) op: MeasurementOperator,
    pub(super) exponents: Vec1<f64>,
    pub(super) output: Option<PathBuf>,
}

#[derive(Serialize)]
struct WeightedPsf {
    exponent: f64,
    peak: f64,
    main_lobe_width: Option<f64>,
    values: Array1<f64>,
}

#[derive(Serialize)]
struct PsfOutput<'a> {
    sampled_coords: ArrayView1<'a, f64>,
    psf_coords: ArrayView1<'a, f64>,
    psfs: &'a [WeightedPsf],
}

impl PsfArgs {
    pub(super) fn merge(self) -> Result<PsfArgs, HypercleanError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let PsfArgs {
                args_file: _,
                grid_args,
                psf_args,
            } = unpack_arg_file!(arg_file);

            Ok(PsfArgs {
                args_file: None,
                grid_args: cli_args.grid_args.merge(grid_args),
                psf_args: PsfCliArgs {
                    exponents: cli_args.psf_args.exponents.or(psf_args.exponents),
                    output: cli_args.psf_args.output.or(psf_args.output),
                },
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<PsfParams, HypercleanError> {
        debug!("{:#?}", self);

        let PsfArgs {
            args_file: _,
            grid_args,
            psf_args: PsfCliArgs { exponents, output },
        } = self;

        let GridParams { mask, op } = grid_args.parse()?;

        let exponents = exponents.unwrap_or_else(|| vec![DEFAULT_WEIGHTING_EXPONENT]);
        let num_given = exponents.len();
        let exponents: Vec<f64> = exponents
            .into_iter()
            .unique_by(|e| e.to_bits())
            .collect();
        if exponents.len() != num_given {
            "Duplicate weighting exponents were ignored".warn();
        }
        let exponents = Vec1::try_from_vec(exponents).map_err(|_| PsfArgsError::NoExponents)?;

        let mut printer = InfoPrinter::new("PSF comparison".into());
        printer.push_line(format!("Weighting exponents: {}", exponents.iter().join(", ")).into());
        if let Some(output) = &output {
            printer.push_line(format!("Writing PSFs to {}", output.display()).into());
        }
        printer.display();
        display_warnings();

        Ok(PsfParams {
            sampled_coords: mask.sampled_coords(),
            op,
            exponents,
            output,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), HypercleanError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()
    }
}

impl PsfParams {
    pub(super) fn run(&self) -> Result<(), HypercleanError> {
        let psfs = self
            .exponents
            .as_slice()
            .par_iter()
            .map(|&exponent| weighted_psf(&self.op, exponent).map(|psf| (exponent, psf)))
            .collect::<Result<Vec<(f64, Psf)>, _>>()?;

        let psf_coords = match psfs.first() {
            Some((_, psf)) => psf.grid().coords().to_owned(),
            None => return Ok(()),
        };
        let psfs: Vec<WeightedPsf> = psfs
            .into_iter()
            .map(|(exponent, psf)| WeightedPsf {
                exponent,
                peak: psf.peak(),
                main_lobe_width: psf.main_lobe_width(),
                values: psf.values().to_owned(),
            })
            .collect();

        let mut printer = InfoPrinter::new("Main-lobe widths (FWHM)".into());
        printer.push_block(
            psfs.iter()
                .map(|p| match p.main_lobe_width {
                    Some(w) => format!("{:>6}: {w:e} (peak {:e})", p.exponent, p.peak).into(),
                    None => format!("{:>6}: unresolved (peak {:e})", p.exponent, p.peak).into(),
                })
                .collect(),
        );
        printer.display();
        for p in psfs.iter().filter(|p| p.main_lobe_width.is_none()) {
            format!(
                "The PSF for exponent {} doesn't fall below half power within its grid",
                p.exponent
            )
            .warn();
        }

        if let Some(output) = &self.output {
            let out = PsfOutput {
                sampled_coords: self.sampled_coords.view(),
                psf_coords: psf_coords.view(),
                psfs: &psfs,
            };
            let mut f = BufWriter::new(File::create(output)?);
            serde_json::to_writer_pretty(&mut f, &out)?;
            f.flush()?;
            info!("Wrote {}", output.display());
        }

        display_warnings();
        Ok(())
    }
}
