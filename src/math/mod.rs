// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use ndarray::{prelude::*, Zip};

use crate::c64;

/// Complex exponential. The argument is assumed to be purely imaginary.
///
/// This function doesn't actually use complex numbers; it just returns the real
/// and imag components from Euler's formula (i.e. e^{ix} = cos{x} + i sin{x}).
///
/// # Examples
///
/// `assert_abs_diff_eq!(cexp(PI), c64::new(-1.0, 0.0));`
#[inline]
pub(crate) fn cexp(x: f64) -> c64 {
    let (im, re) = x.sin_cos();
    c64::new(re, im)
}

/// Find the index and value of the element with the largest absolute value.
/// Ties are resolved in favour of the first (lowest) index. `None` is returned
/// for an empty array.
///
/// NaNs are never selected; an array of only NaNs returns the first index.
pub(crate) fn argmax_abs(a: ArrayView1<f64>) -> Option<(usize, f64)> {
    let mut iter = a.iter().copied().enumerate();
    let (mut best_index, mut best_value) = iter.next()?;
    for (i, v) in iter {
        // Strictly greater, so that the first occurrence wins.
        if v.abs() > best_value.abs() || (best_value.is_nan() && !v.is_nan()) {
            best_index = i;
            best_value = v;
        }
    }
    Some((best_index, best_value))
}

/// Find the index and value of the largest element (not the largest absolute
/// value). Ties are resolved in favour of the first index.
#[cfg(test)]
pub(crate) fn argmax(a: ArrayView1<f64>) -> Option<(usize, f64)> {
    let mut iter = a.iter().copied().enumerate();
    let (mut best_index, mut best_value) = iter.next()?;
    for (i, v) in iter {
        if v > best_value || (best_value.is_nan() && !v.is_nan()) {
            best_index = i;
            best_value = v;
        }
    }
    Some((best_index, best_value))
}

/// Discrete linear convolution of `a` with `kernel`, returning only the
/// central part of the full convolution with the same length as `a` (like
/// numpy's "same" mode). Output index `i` corresponds to full-convolution
/// index `i + (K - 1) / 2`, where K is the kernel length.
pub(crate) fn convolve_same(a: ArrayView1<f64>, kernel: ArrayView1<f64>) -> Array1<f64> {
    let n = a.len();
    let k = kernel.len();
    let mut out = Array1::zeros(n);
    if n == 0 || k == 0 {
        return out;
    }
    let offset = (k - 1) / 2;

    Zip::indexed(&mut out).par_for_each(|i, out| {
        // full[m] = sum_j a[j] * kernel[m - j]
        let m = i + offset;
        let j_min = m.saturating_sub(k - 1);
        let j_max = m.min(n - 1);
        let mut sum = 0.0;
        for j in j_min..=j_max {
            sum += a[j] * kernel[m - j];
        }
        *out = sum;
    });
    out
}
