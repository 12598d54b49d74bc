// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulate the visibilities of point sources, deconvolve them with
//! Cotton-Schwab CLEAN and restore the result.

#[cfg(test)]
mod tests;

use std::{
    borrow::Cow,
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    str::FromStr,
};

use clap::Parser;
use log::{debug, info, trace};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{display_warnings, GridArgs, GridParams, InfoPrinter, Warn, ARG_FILE_HELP};
use crate::{
    clean::{CottonSchwabParams, CottonSchwabResult, Deconvolver},
    constants::*,
    restore::{BeamNormalisation, CleanBeam, RestoreParams, BEAM_NORMALISATIONS},
    sky::{model_image, simulate_visibilities, PointSource, SkyError},
    weighting::weighted_operator,
    HypercleanError,
};

const DEFAULT_SOURCES: [&str; 2] = ["-28:1.0", "32:2.5"];

lazy_static::lazy_static! {
    static ref SOURCES_HELP: String =
        format!("Point sources to simulate, as OFFSET:AMPLITUDE with the offset in pixels from the image centre. Offsets may be negative, so give this argument last. Default: {}", DEFAULT_SOURCES.join(" "));

    static ref GAIN_HELP: String =
        format!("The fraction of the residual peak removed by each minor-cycle subtraction, in (0, 1]. Default: {DEFAULT_GAIN}");

    static ref PEAK_FACTOR_HELP: String =
        format!("Each major cycle cleans down to this fraction of its starting residual peak, in (0, 1). Default: {DEFAULT_PEAK_FACTOR}");

    static ref MAJOR_TOLERANCE_HELP: String =
        format!("Stop once the absolute residual peak is at or below this value. Default: {DEFAULT_MAJOR_TOLERANCE}");

    static ref MAX_MAJOR_HELP: String =
        format!("The maximum number of major cycles. Default: {DEFAULT_MAX_MAJOR_ITERATIONS}");

    static ref MAX_MINOR_HELP: String =
        format!("The maximum number of subtractions in each minor cycle. Default: {DEFAULT_MAX_MINOR_ITERATIONS}");

    static ref WEIGHTING_HELP: String =
        format!("Weight each sample by |u|^exponent. 0 is natural weighting. Default: {DEFAULT_WEIGHTING_EXPONENT}");

    static ref NORMALISATION_HELP: String =
        format!("How the clean beam is scaled. Valid values: {}. Default: {}", *BEAM_NORMALISATIONS, BeamNormalisation::default());
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct CleanCliArgs {
    #[clap(long, multiple_values(true), allow_hyphen_values = true, help = SOURCES_HELP.as_str(), help_heading = "SKY")]
    pub(super) sources: Option<Vec<String>>,

    #[clap(long, help = GAIN_HELP.as_str(), help_heading = "CLEAN")]
    pub(super) gain: Option<f64>,

    #[clap(long, help = PEAK_FACTOR_HELP.as_str(), help_heading = "CLEAN")]
    pub(super) peak_factor: Option<f64>,

    #[clap(long, help = MAJOR_TOLERANCE_HELP.as_str(), help_heading = "CLEAN")]
    pub(super) major_tolerance: Option<f64>,

    #[clap(long, help = MAX_MAJOR_HELP.as_str(), help_heading = "CLEAN")]
    pub(super) max_major_iterations: Option<u32>,

    #[clap(long, help = MAX_MINOR_HELP.as_str(), help_heading = "CLEAN")]
    pub(super) max_minor_iterations: Option<u32>,

    #[clap(long, allow_hyphen_values = true, help = WEIGHTING_HELP.as_str(), help_heading = "CLEAN")]
    pub(super) weighting_exponent: Option<f64>,

    #[clap(long, help = NORMALISATION_HELP.as_str(), help_heading = "RESTORATION")]
    pub(super) beam_normalisation: Option<BeamNormalisation>,

    /// Don't fit a clean beam or make a restored image.
    #[clap(long, help_heading = "RESTORATION")]
    #[serde(default)]
    pub(super) no_restore: bool,

    /// Write the images, PSF and CLEAN statistics to this JSON file.
    #[clap(short, long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

impl CleanCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            sources: self.sources.or(other.sources),
            gain: self.gain.or(other.gain),
            peak_factor: self.peak_factor.or(other.peak_factor),
            major_tolerance: self.major_tolerance.or(other.major_tolerance),
            max_major_iterations: self.max_major_iterations.or(other.max_major_iterations),
            max_minor_iterations: self.max_minor_iterations.or(other.max_minor_iterations),
            weighting_exponent: self.weighting_exponent.or(other.weighting_exponent),
            beam_normalisation: self.beam_normalisation.or(other.beam_normalisation),
            no_restore: self.no_restore || other.no_restore,
            output: self.output.or(other.output),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct CleanArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "grid")]
    #[serde(default)]
    pub(super) grid_args: GridArgs,

    #[clap(flatten)]
    #[serde(rename = "clean")]
    #[serde(default)]
    pub(super) clean_args: CleanCliArgs,
}

#[derive(Error, Debug)]
pub(super) enum CleanArgsError {
    #[error("No point sources were given")]
    NoSources,

    #[error(transparent)]
    Sky(#[from] SkyError),
}

/// Everything needed to simulate, deconvolve and restore.
pub(super) struct CleanParams {
    pub(super) deconvolver: Deconvolver,
    pub(super) sources: Vec<PointSource>,
    pub(super) clean_params: CottonSchwabParams,
    pub(super) restore_params: Option<RestoreParams>,
    pub(super) output: Option<PathBuf>,
}

/// What gets written to the output JSON file.
#[derive(Serialize)]
struct CleanOutput<'a> {
    image_coords: ArrayView1<'a, f64>,
    sources: &'a [PointSource],
    psf_coords: ArrayView1<'a, f64>,
    psf: ArrayView1<'a, f64>,
    #[serde(flatten)]
    result: &'a CottonSchwabResult,
    restored: Option<&'a Array1<f64>>,
    clean_beam: Option<CleanBeam>,
}

impl CleanArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified
    /// into a single struct, preferring CLI arguments over those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<CleanArgs, HypercleanError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Ensure all of the file args are accounted for by pattern
            // matching.
            let CleanArgs {
                args_file: _,
                grid_args,
                clean_args,
            } = unpack_arg_file!(arg_file);

            Ok(CleanArgs {
                args_file: None,
                grid_args: cli_args.grid_args.merge(grid_args),
                clean_args: cli_args.clean_args.merge(clean_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    /// Parse the arguments into parameters ready for deconvolution.
    pub(super) fn parse(self) -> Result<CleanParams, HypercleanError> {
        debug!("{:#?}", self);

        let CleanArgs {
            args_file: _,
            grid_args,
            clean_args:
                CleanCliArgs {
                    sources,
                    gain,
                    peak_factor,
                    major_tolerance,
                    max_major_iterations,
                    max_minor_iterations,
                    weighting_exponent,
                    beam_normalisation,
                    no_restore,
                    output,
                },
        } = self;

        let GridParams { mask: _, op } = grid_args.parse()?;
        let pixel_size = op.image_grid().spacing()?;

        // Source offsets are in pixels; convert them to image coordinates.
        let sources = match sources {
            Some(s) => s,
            None => DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
        };
        if sources.is_empty() {
            return Err(CleanArgsError::NoSources.into());
        }
        let sources = sources
            .iter()
            .map(|s| {
                PointSource::from_str(s)
                    .map(|p| PointSource::new(p.position * pixel_size, p.amplitude))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(CleanArgsError::from)?;
        // Check that every source lands on the image.
        model_image(&sources, op.image_grid()).map_err(CleanArgsError::from)?;

        let mut sky_printer = InfoPrinter::new("Sky".into());
        sky_printer.push_block(
            sources
                .iter()
                .map(|s| {
                    format!(
                        "{:>+8.1} px ({:>+.6e}): {}",
                        s.position / pixel_size,
                        s.position,
                        s.amplitude
                    )
                    .into()
                })
                .collect(),
        );
        sky_printer.display();

        let clean_params = CottonSchwabParams {
            gain: gain.unwrap_or(DEFAULT_GAIN),
            peak_factor: peak_factor.unwrap_or(DEFAULT_PEAK_FACTOR),
            major_tolerance: major_tolerance.unwrap_or(DEFAULT_MAJOR_TOLERANCE),
            max_major_iterations: max_major_iterations.unwrap_or(DEFAULT_MAX_MAJOR_ITERATIONS),
            max_minor_iterations: max_minor_iterations.unwrap_or(DEFAULT_MAX_MINOR_ITERATIONS),
        };
        clean_params.validate()?;

        let weighting_exponent = weighting_exponent.unwrap_or(DEFAULT_WEIGHTING_EXPONENT);
        let op = if weighting_exponent == 0.0 {
            op
        } else {
            weighted_operator(&op, weighting_exponent)?
        };
        let deconvolver = Deconvolver::new(op)?;

        let restore_params = if no_restore {
            if beam_normalisation.is_some() {
                "--beam-normalisation has no effect with --no-restore".warn();
            }
            None
        } else {
            let p = RestoreParams {
                normalisation: beam_normalisation.unwrap_or_default(),
                ..Default::default()
            };
            p.validate()?;
            Some(p)
        };

        let mut clean_printer = InfoPrinter::new("Cotton-Schwab CLEAN set up".into());
        clean_printer.push_block(vec![
            format!("Loop gain: {}", clean_params.gain).into(),
            format!("Peak factor: {}", clean_params.peak_factor).into(),
            format!("Major-cycle tolerance: {:e}", clean_params.major_tolerance).into(),
            format!(
                "At most {} major cycles of {} minor iterations",
                clean_params.max_major_iterations, clean_params.max_minor_iterations
            )
            .into(),
        ]);
        clean_printer.push_line(format!("Weighting exponent: {weighting_exponent}").into());
        match (&restore_params, deconvolver.psf().main_lobe_width()) {
            (Some(p), Some(w)) => clean_printer.push_line(
                format!("Restoring with {} normalisation; PSF FWHM {w:e}", p.normalisation).into(),
            ),
            (Some(p), None) => clean_printer
                .push_line(format!("Restoring with {} normalisation", p.normalisation).into()),
            (None, _) => clean_printer.push_line("Not restoring".into()),
        }
        if let Some(output) = &output {
            clean_printer.push_line(format!("Writing results to {}", output.display()).into());
        }
        clean_printer.display();
        display_warnings();

        Ok(CleanParams {
            deconvolver,
            sources,
            clean_params,
            restore_params,
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

impl CleanParams {
    pub(super) fn run(&self) -> Result<(), HypercleanError> {
        let op = self.deconvolver.operator();
        let psf = self.deconvolver.psf();
        let vis = simulate_visibilities(&self.sources, op);
        let result = self.deconvolver.clean(vis.view(), &self.clean_params)?;

        let mut result_printer = InfoPrinter::new("CLEAN results".into());
        result_printer.push_block(vec![
            format!("Status: {}", result.status).into(),
            format!(
                "{} major cycles, {} minor iterations",
                result.major_cycles, result.minor_iterations
            )
            .into(),
            format!(
                "Residual peak: {:e}",
                result.major_peak_history.last().copied().unwrap_or_default()
            )
            .into(),
        ]);
        let pixel_size = op.image_grid().spacing()?;
        let components: Vec<Cow<'static, str>> = result
            .model
            .iter()
            .zip(op.image_grid().coords())
            .filter(|(m, _)| **m != 0.0)
            .map(|(&m, &x)| format!("{:>+8.1} px: {m:.6}", x / pixel_size).into())
            .collect();
        if components.is_empty() {
            result_printer.push_line("No CLEAN components".into());
        } else {
            result_printer.push_block(components);
        }
        result_printer.display();
        if let Some(warning) = &result.warning {
            warning.to_string().warn();
        }
        if !result.minor_warnings.is_empty() {
            format!(
                "{} minor cycles stopped at --max-minor-iterations before reaching their target peak",
                result.minor_warnings.len()
            )
            .warn();
        }

        let restored = match &self.restore_params {
            Some(p) => {
                let (restored, beam) = self.deconvolver.restore(&result, p)?;
                info!(
                    "Restored with a clean beam of amplitude {:.6} and FWHM {:e}",
                    beam.amplitude,
                    beam.fwhm()
                );
                Some((restored, beam))
            }
            None => None,
        };

        if let Some(output) = &self.output {
            let out = CleanOutput {
                image_coords: op.image_grid().coords(),
                sources: &self.sources,
                psf_coords: psf.grid().coords(),
                psf: psf.values(),
                result: &result,
                restored: restored.as_ref().map(|(r, _)| r),
                clean_beam: restored.as_ref().map(|(_, b)| *b),
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
