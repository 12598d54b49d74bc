// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests for the clean subcommand.

use std::{fs::File, io::Write};

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::TempDir;

use super::*;

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let f = File::open(path).unwrap();
    serde_json::from_reader(f).unwrap()
}

#[test]
fn test_default_args_make_the_two_source_sky() {
    let params = CleanArgs::parse_from(["clean"]).parse().unwrap();
    let dx = 1.0 / 600.0;

    assert_eq!(params.sources.len(), 2);
    assert_abs_diff_eq!(params.sources[0].position, -28.0 * dx, epsilon = 1e-12);
    assert_abs_diff_eq!(params.sources[0].amplitude, 1.0);
    assert_abs_diff_eq!(params.sources[1].position, 32.0 * dx, epsilon = 1e-12);
    assert_abs_diff_eq!(params.sources[1].amplitude, 2.5);

    let op = params.deconvolver.operator();
    assert_eq!(op.image_grid().len(), 256);
    assert_eq!(op.num_samples(), 200);
    assert_abs_diff_eq!(op.image_grid().spacing().unwrap(), dx, epsilon = 1e-15);
    assert_abs_diff_eq!(params.deconvolver.psf().peak(), 200.0, epsilon = 1e-9);

    assert_eq!(params.clean_params, CottonSchwabParams::default());
    assert_eq!(params.restore_params, Some(RestoreParams::default()));
    assert!(params.output.is_none());
}

#[test]
fn test_toml_arg_file_is_merged_with_cli_args() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("args.toml");
    let mut f = File::create(&arg_file).unwrap();
    f.write_all(
        indoc! {r#"
            [grid]
            image_size = 128
            num_sampled = 150

            [clean]
            sources = ["0:1.0", "10:0.5"]
            gain = 0.2
            beam_normalisation = "area"
        "#}
        .as_bytes(),
    )
    .unwrap();
    drop(f);

    #[rustfmt::skip]
    let args = CleanArgs::parse_from([
        "clean",
        &format!("{}", arg_file.display()),
        "--gain", "0.3",
        "--num-uv", "200",
    ])
    .merge()
    .unwrap();

    assert!(args.args_file.is_none());
    assert_eq!(args.grid_args.image_size, Some(128));
    assert_eq!(args.grid_args.num_sampled, Some(150));
    assert_eq!(args.grid_args.num_uv, Some(200));
    assert_eq!(
        args.clean_args.sources,
        Some(vec!["0:1.0".to_string(), "10:0.5".to_string()])
    );
    // The CLI wins.
    assert_eq!(args.clean_args.gain, Some(0.3));
    assert_eq!(
        args.clean_args.beam_normalisation,
        Some(BeamNormalisation::Area)
    );
    assert!(!args.clean_args.no_restore);

    let params = args.parse().unwrap();
    assert_eq!(params.sources.len(), 2);
    assert_abs_diff_eq!(params.sources[0].position, 0.0);
    assert_abs_diff_eq!(params.clean_params.gain, 0.3);
    assert_eq!(params.deconvolver.operator().image_grid().len(), 128);
    assert_eq!(params.deconvolver.operator().num_samples(), 150);
    assert_eq!(
        params.restore_params.map(|p| p.normalisation),
        Some(BeamNormalisation::Area)
    );
}

#[test]
fn test_json_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("args.json");
    let mut f = File::create(&arg_file).unwrap();
    f.write_all(
        indoc! {r#"
            {
                "clean": {
                    "max_major_iterations": 2,
                    "no_restore": true
                }
            }
        "#}
        .as_bytes(),
    )
    .unwrap();
    drop(f);

    let args = CleanArgs::parse_from(["clean", &format!("{}", arg_file.display())])
        .merge()
        .unwrap();
    assert_eq!(args.grid_args, GridArgs::default());
    assert_eq!(args.clean_args.max_major_iterations, Some(2));
    assert!(args.clean_args.no_restore);

    let params = args.parse().unwrap();
    assert_eq!(params.clean_params.max_major_iterations, 2);
    assert!(params.restore_params.is_none());
}

#[test]
fn test_arg_file_needs_a_known_extension() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("args.yaml");
    File::create(&arg_file).unwrap();

    let result = CleanArgs::parse_from(["clean", &format!("{}", arg_file.display())]).merge();
    assert!(matches!(result, Err(HypercleanError::ArgFile(_))));
}

#[test]
fn test_bad_arg_file_contents() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("args.toml");
    let mut f = File::create(&arg_file).unwrap();
    f.write_all(b"[clean]\ngain = \"lots\"\n").unwrap();
    drop(f);

    let result = CleanArgs::parse_from(["clean", &format!("{}", arg_file.display())]).merge();
    assert!(matches!(result, Err(HypercleanError::ArgFile(_))));
}

#[test]
fn test_bad_sources() {
    let result = CleanArgs::parse_from(["clean", "--sources", "1000:1.0"]).parse();
    assert!(matches!(result, Err(HypercleanError::Sky(_))));

    let result = CleanArgs::parse_from(["clean", "--sources", "0"]).parse();
    assert!(matches!(result, Err(HypercleanError::Sky(_))));

    let args = CleanArgs {
        clean_args: CleanCliArgs {
            sources: Some(vec![]),
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(matches!(args.parse(), Err(HypercleanError::Sky(_))));
}

#[test]
fn test_bad_clean_params() {
    let result = CleanArgs::parse_from(["clean", "--gain", "1.5"]).parse();
    assert!(matches!(result, Err(HypercleanError::Clean(_))));

    let result = CleanArgs::parse_from(["clean", "--peak-factor", "1"]).parse();
    assert!(matches!(result, Err(HypercleanError::Clean(_))));

    let result = CleanArgs::parse_from(["clean", "--max-minor-iterations", "0"]).parse();
    assert!(matches!(result, Err(HypercleanError::Clean(_))));
}

#[test]
fn test_bad_grid_args() {
    let result = CleanArgs::parse_from(["clean", "--image-size", "0"]).parse();
    assert!(matches!(result, Err(HypercleanError::Grid(_))));

    let result = CleanArgs::parse_from(["clean", "--num-sampled", "301"]).parse();
    assert!(matches!(result, Err(HypercleanError::Grid(_))));
}

#[test]
fn test_dry_run_writes_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("clean.json");

    let args = CleanArgs::parse_from(["clean", "--output", &format!("{}", output.display())]);
    let result = args.run(true);
    assert!(result.is_ok(), "result={:?} not ok", result.err().unwrap());
    assert!(!output.exists());
}

#[test]
fn test_clean_writes_json() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("clean.json");

    let args = CleanArgs::parse_from(["clean", "--output", &format!("{}", output.display())]);
    let result = args.run(false);
    assert!(result.is_ok(), "result={:?} not ok", result.err().unwrap());
    assert!(output.exists(), "output file not written");

    let json = read_json(&output);
    assert_eq!(json["status"], "Converged");
    assert_eq!(json["major_cycles"], 4);
    assert!(json["warning"].is_null());
    assert!(json["minor_warnings"].as_array().unwrap().is_empty());
    assert_eq!(json["sources"].as_array().unwrap().len(), 2);

    let model: Vec<f64> = json["model"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(model.len(), 256);
    assert_eq!(json["image_coords"]["data"].as_array().unwrap().len(), 256);
    assert_eq!(json["residual"]["data"].as_array().unwrap().len(), 256);
    assert_eq!(json["dirty"]["data"].as_array().unwrap().len(), 256);
    assert_eq!(json["psf"]["data"].as_array().unwrap().len(), 511);
    assert_eq!(json["psf_coords"]["data"].as_array().unwrap().len(), 511);
    for (i, &m) in model.iter().enumerate() {
        match i {
            100 => assert_abs_diff_eq!(m, 1.0, epsilon = 0.01),
            160 => assert_abs_diff_eq!(m, 2.5, epsilon = 0.025),
            _ => assert_abs_diff_eq!(m, 0.0),
        }
    }

    assert_eq!(json["restored"]["data"].as_array().unwrap().len(), 256);
    assert!(json["clean_beam"]["amplitude"].as_f64().unwrap() > 0.0);
    assert!(json["clean_beam"]["sigma"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_clean_without_restoring() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("clean.json");

    #[rustfmt::skip]
    let args = CleanArgs::parse_from([
        "clean",
        "--no-restore",
        "--max-major-iterations", "2",
        "--output", &format!("{}", output.display()),
    ]);
    let result = args.run(false);
    assert!(result.is_ok(), "result={:?} not ok", result.err().unwrap());

    let json = read_json(&output);
    assert_eq!(json["status"], "IterationLimit");
    assert_eq!(json["major_cycles"], 2);
    assert_eq!(json["warning"]["kind"], "Major");
    assert!(json["restored"].is_null());
    assert!(json["clean_beam"].is_null());
}

#[test]
fn test_capped_minor_cycles_are_reported() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("clean.json");

    #[rustfmt::skip]
    let args = CleanArgs::parse_from([
        "clean",
        "--no-restore",
        "--max-minor-iterations", "1",
        "--max-major-iterations", "3",
        "--output", &format!("{}", output.display()),
    ]);
    let result = args.run(false);
    assert!(result.is_ok(), "result={:?} not ok", result.err().unwrap());

    let json = read_json(&output);
    assert_eq!(json["major_cycles"], 3);
    let minor_warnings = json["minor_warnings"].as_array().unwrap();
    assert_eq!(minor_warnings.len(), 3);
    for w in minor_warnings {
        assert_eq!(w["kind"], "Minor");
        assert_eq!(w["max_iterations"], 1);
    }
}
