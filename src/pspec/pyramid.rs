// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The "pyramid" approximation: a patch of fixed angular size is physically
//! wider the further away it is, so every radial sample gets its own
//! transverse wavenumber grid. The variation of the radial extent with angle
//! is ignored.

use log::debug;
use ndarray::prelude::*;

use super::{check_radial, PspecError};
use crate::{
    binning::{bin_from_meshgrid, BinnedPowerSpectrum},
    constants::TAU,
    cosmology::CosmologyModel,
    math::{fft2_transverse, fftfreq, mean_spacing, radial_dft},
};

/// Estimate the binned 1D power spectrum of a cube cut from a patch of
/// angular `radius` (radians) at comoving distances `r_mpc` and redshifts
/// `redshifts`.
///
/// `radial_freqs` (cycles per Mpc, one per radial sample) default to the DFT
/// frequencies of the mean radial spacing. The transverse width at each
/// distance is `2 * radius` times the angular-diameter distance.
#[allow(clippy::too_many_arguments)]
pub fn pyramid_pspec(
    cube: ArrayView3<f64>,
    radius: f64,
    r_mpc: &[f64],
    redshifts: &[f64],
    cosmo: &dyn CosmologyModel,
    radial_freqs: Option<&[f64]>,
    num_bins: usize,
    sigma: bool,
) -> Result<BinnedPowerSpectrum, PspecError> {
    let (nx, ny, nz) = cube.dim();
    if cube.is_empty() {
        return Err(PspecError::EmptyCube);
    }
    check_radial(r_mpc, nz)?;
    if redshifts.len() != nz {
        return Err(PspecError::RadialLengthMismatch {
            what: "redshifts",
            got: redshifts.len(),
            expected: nz,
        });
    }

    let freqs: Vec<f64> = match radial_freqs {
        Some(f) if f.len() != nz => {
            return Err(PspecError::RadialLengthMismatch {
                what: "radial frequencies",
                got: f.len(),
                expected: nz,
            })
        }
        Some(f) => f.to_vec(),
        None => {
            let spacing = mean_spacing(r_mpc)
                .filter(|d| *d > 0.0)
                .ok_or(PspecError::DegenerateRadialSpacing)?;
            fftfreq(nz, spacing).to_vec()
        }
    };
    let kz: Vec<f64> = freqs.iter().map(|f| TAU * f).collect();

    let mut transformed = radial_dft(cube, &kz, r_mpc);
    fft2_transverse(&mut transformed);

    // Transverse widths [Mpc] at each radial sample.
    let widths: Vec<f64> = redshifts
        .iter()
        .map(|&z| 2.0 * radius * cosmo.angular_diameter_distance(z))
        .collect();
    debug!(
        "Pyramid transverse widths from {} to {} Mpc",
        widths[0],
        widths[nz - 1]
    );
    let kx_per_channel: Vec<Array1<f64>> = widths
        .iter()
        .map(|&l| fftfreq(nx, l / nx as f64) * TAU)
        .collect();
    let ky_per_channel: Vec<Array1<f64>> = widths
        .iter()
        .map(|&l| fftfreq(ny, l / ny as f64) * TAU)
        .collect();
    let kx = Array3::from_shape_fn((nx, ny, nz), |(i, _, n)| kx_per_channel[n][i]);
    let ky = Array3::from_shape_fn((nx, ny, nz), |(_, j, n)| ky_per_channel[n][j]);
    let kz = Array3::from_shape_fn((nx, ny, nz), |(_, _, n)| kz[n]);

    let norm = 1.0 / (nx * ny * nz) as f64;
    let power = transformed.mapv(|v| v.norm_sqr() * norm);
    Ok(bin_from_meshgrid(
        power.view(),
        kx.view(),
        ky.view(),
        kz.view(),
        num_bins,
        sigma,
    )?)
}
