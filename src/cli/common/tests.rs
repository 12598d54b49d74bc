// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the shared command-line arguments.

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_default_grids() {
    let GridParams { mask, op } = GridArgs::default().parse().unwrap();
    assert_eq!(op.image_grid().len(), DEFAULT_IMAGE_SIZE);
    assert_abs_diff_eq!(op.image_grid().spacing().unwrap(), 1.0 / 600.0, epsilon = 1e-15);
    assert_abs_diff_eq!(op.image_grid().coords()[DEFAULT_IMAGE_SIZE / 2], 0.0);

    assert_eq!(mask.uv_grid().len(), DEFAULT_NUM_UV);
    assert_abs_diff_eq!(mask.uv_grid().first(), -150.0);
    assert_abs_diff_eq!(mask.uv_grid().last(), 149.0);
    assert_eq!(mask.num_sampled(), DEFAULT_NUM_SAMPLED);
    assert_eq!(op.num_samples(), DEFAULT_NUM_SAMPLED);
    assert_abs_diff_eq!(op.uv_coords()[0], -100.0);
}

#[test]
fn test_sampled_indices_override() {
    let GridParams { mask, .. } = GridArgs {
        num_uv: Some(10),
        uv_max: Some(5.0),
        sampled_indices: Some(vec![7, 1, 3]),
        ..Default::default()
    }
    .parse()
    .unwrap();
    assert_eq!(mask.sampled_indices(), &[1, 3, 7]);
    assert_abs_diff_eq!(mask.sampled_coords(), ndarray::array![-4.0, -2.0, 2.0]);
}

#[test]
fn test_merge_prefers_cli() {
    let cli = GridArgs {
        image_size: Some(64),
        ..Default::default()
    };
    let file = GridArgs {
        image_size: Some(128),
        num_uv: Some(100),
        ..Default::default()
    };
    let merged = cli.merge(file);
    assert_eq!(merged.image_size, Some(64));
    assert_eq!(merged.num_uv, Some(100));
    assert_eq!(merged.uv_max, None);
}

#[test]
fn test_bad_grid_args() {
    let result = GridArgs {
        image_size: Some(0),
        ..Default::default()
    }
    .parse();
    assert!(matches!(result, Err(GridArgsError::ZeroImageSize)));

    let result = GridArgs {
        num_uv: Some(1),
        ..Default::default()
    }
    .parse();
    assert!(matches!(result, Err(GridArgsError::TooFewUv)));

    let result = GridArgs {
        uv_max: Some(-1.0),
        ..Default::default()
    }
    .parse();
    assert!(matches!(result, Err(GridArgsError::BadUvMax(_))));

    let result = GridArgs {
        pixel_size: Some(f64::INFINITY),
        ..Default::default()
    }
    .parse();
    assert!(matches!(result, Err(GridArgsError::BadPixelSize(_))));

    let result = GridArgs {
        num_sampled: Some(301),
        ..Default::default()
    }
    .parse();
    assert!(matches!(
        result,
        Err(GridArgsError::Grid(GridError::SampleIndexOutOfRange { .. }))
    ));

    let result = GridArgs {
        sampled_indices: Some(vec![1, 1]),
        ..Default::default()
    }
    .parse();
    assert!(matches!(
        result,
        Err(GridArgsError::Grid(GridError::DuplicateSampleIndex { index: 1 }))
    ));
}

#[test]
fn test_arg_file_types() {
    assert_eq!(*ARG_FILE_TYPES_COMMA_SEPARATED, "toml, json");
}
