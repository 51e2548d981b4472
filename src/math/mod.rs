// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.

mod bessel;
mod fft;
mod masked;

pub use bessel::{bessel_j1, spherical_jn};
pub use fft::{fft2_transverse, fft_axis, fftn3, radial_dft};
pub use masked::{MaskedArray, MaskedArray1, MaskedArray2};

use ndarray::prelude::*;

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
pub fn cexp(x: f64) -> c64 {
    let (im, re) = x.sin_cos();
    c64::new(re, im)
}

/// The sample frequencies of a discrete Fourier transform of length `n` with
/// sample spacing `d`, in the same order that an FFT emits them (zero, then
/// positive, then negative frequencies).
///
/// # Examples
///
/// `assert_eq!(fftfreq(4, 0.5), array![0.0, 0.5, -1.0, -0.5]);`
pub fn fftfreq(n: usize, d: f64) -> Array1<f64> {
    if n == 0 {
        return Array1::zeros(0);
    }
    let norm = 1.0 / (n as f64 * d);
    let num_non_negative = (n - 1) / 2 + 1;
    Array1::from_iter((0..n).map(|i| {
        if i < num_non_negative {
            i as f64 * norm
        } else {
            -((n - i) as f64) * norm
        }
    }))
}

/// The mean spacing between consecutive radial coordinates. The sign is
/// discarded; radial coordinates derived from ascending frequencies descend.
pub fn mean_spacing(r: &[f64]) -> Option<f64> {
    match r {
        [] | [_] => None,
        [first, .., last] => Some((last - first).abs() / (r.len() - 1) as f64),
    }
}

/// The smallest absolute spacing between consecutive radial coordinates.
pub fn min_spacing(r: &[f64]) -> Option<f64> {
    r.windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .min_by(|a, b| a.total_cmp(b))
}

/// Build three full coordinate grids from three axes with matrix ("ij")
/// indexing, i.e. element `[i, j, k]` of the outputs holds `(x[i], y[j],
/// z[k])`.
pub fn meshgrid3(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    z: ArrayView1<f64>,
) -> (Array3<f64>, Array3<f64>, Array3<f64>) {
    let shape = (x.len(), y.len(), z.len());
    (
        Array3::from_shape_fn(shape, |(i, _, _)| x[i]),
        Array3::from_shape_fn(shape, |(_, j, _)| y[j]),
        Array3::from_shape_fn(shape, |(_, _, k)| z[k]),
    )
}

/// Population variance (no Bessel correction).
pub fn variance(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    Some(samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n)
}
