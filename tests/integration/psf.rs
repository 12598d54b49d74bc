// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::*;

#[test]
fn test_psf_widths() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("psf.json");

    #[rustfmt::skip]
    let cmd = hyperclean()
        .args([
            "psf",
            "--exponents", "-0.5", "0", "1",
            "--output", &path_str(&output),
        ])
        .ok();
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("Main-lobe widths"), "{stdout}");

    let json = read_json(&output);
    let psfs = json["psfs"].as_array().unwrap();
    assert_eq!(psfs.len(), 3);
    let widths: Vec<f64> = psfs
        .iter()
        .map(|p| p["main_lobe_width"].as_f64().unwrap())
        .collect();
    assert!(widths[0] > widths[1], "{widths:?}");
    assert!(widths[1] > widths[2], "{widths:?}");
}
