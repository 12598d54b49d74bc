// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::File;

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::TempDir;

use super::*;

#[test]
fn test_default_exponent_is_natural_weighting() {
    let params = PsfArgs::parse_from(["psf"]).parse().unwrap();
    assert_eq!(params.exponents.as_slice(), &[0.0]);
    assert_eq!(params.sampled_coords.len(), 200);
    assert_abs_diff_eq!(params.sampled_coords[0], -100.0);
    assert_abs_diff_eq!(params.sampled_coords[199], 99.0);
}

#[test]
fn test_duplicate_exponents_are_dropped() {
    let params = PsfArgs::parse_from(["psf", "--exponents", "0", "1", "0", "-0.5"])
        .parse()
        .unwrap();
    assert_eq!(params.exponents.as_slice(), &[0.0, 1.0, -0.5]);
}

#[test]
fn test_no_exponents() {
    let args = PsfArgs {
        psf_args: PsfCliArgs {
            exponents: Some(vec![]),
            output: None,
        },
        ..Default::default()
    };
    assert!(matches!(args.parse(), Err(HypercleanError::Clean(_))));
}

#[test]
fn test_toml_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("psf.toml");
    std::fs::write(
        &arg_file,
        indoc! {r#"
            [grid]
            num_sampled = 100

            [psf]
            exponents = [0.0, 0.5]
        "#},
    )
    .unwrap();

    let args = PsfArgs::parse_from(["psf", &format!("{}", arg_file.display())])
        .merge()
        .unwrap();
    assert_eq!(args.grid_args.num_sampled, Some(100));
    assert_eq!(args.psf_args.exponents, Some(vec![0.0, 0.5]));
    assert!(args.psf_args.output.is_none());

    let params = args.parse().unwrap();
    assert_eq!(params.op.num_samples(), 100);
}

#[test]
fn test_dry_run_writes_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("psf.json");
    let args = PsfArgs::parse_from(["psf", "--output", &format!("{}", output.display())]);
    let result = args.run(true);
    assert!(result.is_ok(), "result={:?} not ok", result.err().unwrap());
    assert!(!output.exists());
}

#[test]
fn test_psf_writes_json() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("psf.json");

    #[rustfmt::skip]
    let args = PsfArgs::parse_from([
        "psf",
        "--exponents", "0", "0.5", "1",
        "--output", &format!("{}", output.display()),
    ]);
    let result = args.run(false);
    assert!(result.is_ok(), "result={:?} not ok", result.err().unwrap());

    let json: serde_json::Value = serde_json::from_reader(File::open(&output).unwrap()).unwrap();
    assert_eq!(json["psf_coords"]["data"].as_array().unwrap().len(), 511);
    assert_eq!(json["sampled_coords"]["data"].as_array().unwrap().len(), 200);

    let psfs = json["psfs"].as_array().unwrap();
    assert_eq!(psfs.len(), 3);
    let widths: Vec<f64> = psfs
        .iter()
        .map(|p| p["main_lobe_width"].as_f64().unwrap())
        .collect();
    // Up-weighting long baselines narrows the main lobe.
    assert!(widths[0] > widths[1]);
    assert!(widths[1] > widths[2]);

    // Natural weighting: the peak is the number of samples.
    assert_eq!(psfs[0]["exponent"], 0.0);
    assert_abs_diff_eq!(psfs[0]["peak"].as_f64().unwrap(), 200.0, epsilon = 1e-9);
    let values = psfs[0]["values"]["data"].as_array().unwrap();
    assert_eq!(values.len(), 511);
    assert_abs_diff_eq!(values[255].as_f64().unwrap(), 1.0, epsilon = 1e-12);
}
