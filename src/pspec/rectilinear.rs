// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Power spectra of rectilinear cubes.

use log::debug;
use ndarray::prelude::*;

use super::{check_radial, BoxDims, Normalisation, PowerCube, PspecError};
use crate::{
    binning::BinnedPowerSpectrum,
    constants::TAU,
    math::{fft2_transverse, fftfreq, fftn3, mean_spacing, radial_dft},
};

/// Compute the 3D power cube of `cube`, whose physical extent is `dims`.
///
/// Without `r_mpc`, all three axes are assumed to be uniformly sampled and are
/// FFTed. With `r_mpc` (one distance per radial sample), the radial axis is
/// transformed with an explicit DFT against those distances, using radial
/// frequencies derived from their mean spacing; for uniformly-spaced distances
/// the two paths agree.
///
/// `num_bins` only enters the cosmological normalisation.
pub fn r_pspec_3d(
    cube: ArrayView3<f64>,
    dims: BoxDims,
    r_mpc: Option<&[f64]>,
    num_bins: usize,
    normalisation: Normalisation,
) -> Result<PowerCube, PspecError> {
    dims.validate()?;
    if cube.is_empty() {
        return Err(PspecError::EmptyCube);
    }
    let (nx, ny, nz) = cube.dim();
    let dx = dims.lx / nx as f64;
    let dy = dims.ly / ny as f64;
    let dz = dims.lz / nz as f64;

    let (kfact, voxel_volume, pfact) = match normalisation {
        Normalisation::Cosmological => (
            TAU,
            dx * dy * dz,
            1.0 / (dims.volume() * num_bins as f64),
        ),
        Normalisation::Pixel => (1.0, 1.0, 1.0 / (nx * ny * nz) as f64),
    };
    let kx = fftfreq(nx, dx) * kfact;
    let ky = fftfreq(ny, dy) * kfact;

    let (kz, transformed) = match r_mpc {
        Some(r_mpc) => {
            check_radial(r_mpc, nz)?;
            let spacing = mean_spacing(r_mpc)
                .filter(|d| *d > 0.0)
                .ok_or(PspecError::DegenerateRadialSpacing)?;
            debug!("Mean radial spacing: {spacing} Mpc");
            let freqs = fftfreq(nz, spacing);
            let angular: Vec<f64> = freqs.iter().map(|f| TAU * f).collect();
            let mut transformed = radial_dft(cube, &angular, r_mpc);
            fft2_transverse(&mut transformed);
            (freqs * kfact, transformed)
        }
        None => (fftfreq(nz, dz) * kfact, fftn3(cube)),
    };

    let power = transformed.mapv(|v| (v * voxel_volume).norm_sqr() * pfact);
    Ok(PowerCube {
        kx,
        ky,
        kz,
        power,
    })
}

/// Estimate the binned 1D power spectrum of a rectilinear cube. See
/// [`r_pspec_3d`] for the meaning of the arguments.
pub fn r_pspec_1d(
    cube: ArrayView3<f64>,
    dims: BoxDims,
    r_mpc: Option<&[f64]>,
    num_bins: usize,
    sigma: bool,
    normalisation: Normalisation,
) -> Result<BinnedPowerSpectrum, PspecError> {
    r_pspec_3d(cube, dims, r_mpc, num_bins, normalisation)?.bin(num_bins, sigma)
}
