// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::*;

#[test]
fn test_clean_help() {
    let (stdout, stderr) = get_cmd_output(hyperclean().args(["clean", "--help"]).ok());
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("--gain"));
    assert!(stdout.contains("--no-restore"));
    assert!(stdout.contains("--num-sampled"));
}

#[test]
fn test_clean_two_sources() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("clean.json");

    let cmd = hyperclean()
        .args(["clean", "--output", &path_str(&output)])
        .ok();
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("hyperclean clean complete."), "{stdout}");
    assert!(output.exists(), "output file not written");

    let json = read_json(&output);
    assert_eq!(json["status"], "Converged");
    assert_eq!(json["major_cycles"], 4);
    let model = json["model"]["data"].as_array().unwrap();
    assert_eq!(model.len(), 256);
    assert_abs_diff_eq!(model[100].as_f64().unwrap(), 1.0, epsilon = 0.01);
    assert_abs_diff_eq!(model[160].as_f64().unwrap(), 2.5, epsilon = 0.025);
    assert_eq!(
        model.iter().filter(|m| m.as_f64().unwrap() != 0.0).count(),
        2
    );
}

#[test]
fn test_clean_dry_run_and_save_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("clean.json");
    let toml = tmp_dir.path().join("clean.toml");

    #[rustfmt::skip]
    let cmd = hyperclean()
        .args([
            "clean",
            "--dry-run",
            "--save-toml", &path_str(&toml),
            "--gain", "0.2",
            "--output", &path_str(&output),
        ])
        .ok();
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("Dry run -- exiting now."), "{stdout}");
    assert!(!output.exists());
    assert!(toml.exists());

    // The saved arguments reproduce the run.
    let contents = std::fs::read_to_string(&toml).unwrap();
    assert!(contents.contains("gain = 0.2"), "{contents}");

    let cmd = hyperclean()
        .args(["clean", &path_str(&toml)])
        .ok();
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("Loop gain: 0.2"), "{stdout}");
    assert!(output.exists());
}

#[test]
fn test_clean_bad_source_fails() {
    let output = hyperclean()
        .args(["clean", "--sources", "500:1.0"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = std::str::from_utf8(&output.stderr).unwrap();
    assert!(stderr.contains("outside the image grid"), "{stderr}");
}
