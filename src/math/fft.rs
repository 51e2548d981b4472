// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fourier transforms over the axes of 3D cubes.

use ndarray::{parallel::prelude::*, prelude::*, Zip};
use num_traits::Zero;
use rustfft::FftPlanner;

use super::cexp;
use crate::c64;

/// Forward FFT (no normalisation) along one axis of a complex cube, in place.
pub fn fft_axis(cube: &mut Array3<c64>, axis: usize) {
    let len = cube.len_of(Axis(axis));
    if len <= 1 {
        return;
    }
    let fft = FftPlanner::<f64>::new().plan_fft_forward(len);
    let scratch_len = fft.get_inplace_scratch_len();
    Zip::from(cube.lanes_mut(Axis(axis))).par_for_each(|mut lane| {
        let mut buffer: Vec<c64> = lane.iter().copied().collect();
        let mut scratch = vec![c64::zero(); scratch_len];
        fft.process_with_scratch(&mut buffer, &mut scratch);
        lane.iter_mut()
            .zip(buffer)
            .for_each(|(out, value)| *out = value);
    });
}

/// Forward FFT over both transverse axes (0 and 1) of a complex cube.
pub fn fft2_transverse(cube: &mut Array3<c64>) {
    fft_axis(cube, 0);
    fft_axis(cube, 1);
}

/// Forward FFT over all three axes of a real cube.
pub fn fftn3(cube: ArrayView3<f64>) -> Array3<c64> {
    let mut out = cube.mapv(|v| c64::new(v, 0.0));
    for axis in 0..3 {
        fft_axis(&mut out, axis);
    }
    out
}

/// Explicit discrete Fourier transform along the radial (last) axis of a real
/// cube sampled at arbitrary radial coordinates `r`. Output element `[i, j,
/// m]` is `sum_n exp(-i k_m r_n) cube[i, j, n]`, where `k` are angular
/// wavenumbers.
///
/// `r` must have the same length as the radial axis of the cube.
pub fn radial_dft(cube: ArrayView3<f64>, k: &[f64], r: &[f64]) -> Array3<c64> {
    let (nx, ny, nz) = cube.dim();
    debug_assert_eq!(nz, r.len());

    let kernel = Array2::from_shape_fn((k.len(), nz), |(m, n)| cexp(-k[m] * r[n]));
    let mut out = Array3::zeros((nx, ny, k.len()));
    out.outer_iter_mut()
        .into_par_iter()
        .zip(cube.outer_iter().into_par_iter())
        .for_each(|(mut out_plane, in_plane)| {
            for (mut out_lane, in_lane) in out_plane.outer_iter_mut().zip(in_plane.outer_iter()) {
                for (out_elem, kernel_row) in out_lane.iter_mut().zip(kernel.outer_iter()) {
                    *out_elem = kernel_row
                        .iter()
                        .zip(in_lane.iter())
                        .fold(c64::zero(), |acc, (&w, &x)| acc + w * x);
                }
            }
        });
    out
}
