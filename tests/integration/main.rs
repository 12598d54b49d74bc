// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod clean;
mod psf;

use std::{
    path::Path,
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

fn hyperclean() -> Command {
    Command::cargo_bin("hyperclean").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

fn read_json<P: AsRef<Path>>(path: P) -> serde_json::Value {
    let f = std::fs::File::open(path).unwrap();
    serde_json::from_reader(f).unwrap()
}

fn path_str(p: &Path) -> String {
    format!("{}", p.display())
}

#[test]
fn test_help_lists_subcommands() {
    let (stdout, stderr) = get_cmd_output(hyperclean().arg("--help").ok());
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("clean"));
    assert!(stdout.contains("psf"));
}

#[test]
fn test_no_subcommand_is_an_error() {
    let output = hyperclean().output().unwrap();
    assert!(!output.status.success());
}
