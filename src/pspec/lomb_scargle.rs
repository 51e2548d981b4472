// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Lomb-Scargle periodograms along the radial axis.
//!
//! The periodogram is the floating-mean generalisation of Scargle (1982) with
//! equal weights, in power-spectral-density normalisation: for uniformly
//! sampled data evaluated at a DFT frequency, the result is |X|^2 / N.

use log::debug;
use ndarray::{parallel::prelude::*, prelude::*};

use super::{check_radial, BoxDims, PowerCube, PspecError};
use crate::{
    binning::BinnedPowerSpectrum,
    c64,
    constants::TAU,
    math::{fft2_transverse, fftfreq},
};

/// Sums smaller than this are treated as degenerate.
const EPS: f64 = 1e-12;

/// Oversampling of the automatic frequency grid.
const SAMPLES_PER_PEAK: f64 = 5.0;

/// The automatic frequency grid for samples at `t`: spacing 1 / (5 T) for a
/// baseline T, starting half a spacing above zero and ending at the average
/// Nyquist frequency N / (2 T).
pub fn autofrequency(t: &[f64]) -> Result<Vec<f64>, PspecError> {
    let (lo, hi) = t
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let baseline = hi - lo;
    if !(baseline.is_finite() && baseline > 0.0) {
        return Err(PspecError::DegenerateRadialSpacing);
    }
    let df = 1.0 / (baseline * SAMPLES_PER_PEAK);
    let f_min = 0.5 * df;
    let f_max = 0.5 * t.len() as f64 / baseline;
    let num_freqs = 1 + ((f_max - f_min) / df).round_ties_even() as usize;
    Ok((0..num_freqs).map(|i| f_min + df * i as f64).collect())
}

/// The Lomb-Scargle periodogram of samples `y` taken at `t`, evaluated at
/// `freqs` (cycles per unit of `t`).
pub fn lomb_scargle_psd(t: &[f64], y: &[f64], freqs: &[f64]) -> Vec<f64> {
    debug_assert_eq!(t.len(), y.len());
    let n = t.len() as f64;
    let w = 1.0 / n;
    let mean = y.iter().sum::<f64>() * w;

    freqs
        .iter()
        .map(|&f| {
            let omega = TAU * f;

            // Phase offset tau, which decouples the sine and cosine terms.
            let (mut s, mut c, mut s2, mut c2) = (0.0, 0.0, 0.0, 0.0);
            for &ti in t {
                let (sin, cos) = (omega * ti).sin_cos();
                s += w * sin;
                c += w * cos;
                s2 += w * 2.0 * sin * cos;
                c2 += w * (cos * cos - sin * sin);
            }
            s2 -= 2.0 * s * c;
            c2 -= c * c - s * s;
            let omega_tau = 0.5 * s2.atan2(c2);

            let (mut yc, mut ys, mut cc, mut ss, mut c_tau, mut s_tau) =
                (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
            for (&ti, &yi) in t.iter().zip(y) {
                let (sin, cos) = (omega * ti - omega_tau).sin_cos();
                let yv = yi - mean;
                yc += w * yv * cos;
                ys += w * yv * sin;
                cc += w * cos * cos;
                ss += w * sin * sin;
                c_tau += w * cos;
                s_tau += w * sin;
            }
            cc -= c_tau * c_tau;
            ss -= s_tau * s_tau;

            let pc = if cc > EPS { yc * yc / cc } else { 0.0 };
            let ps = if ss > EPS { ys * ys / ss } else { 0.0 };
            0.5 * n * (pc + ps)
        })
        .collect()
}

/// Compute the 3D power cube of `cube` with a Lomb-Scargle periodogram along
/// the radial axis.
///
/// `radial_freqs` are in cycles per Mpc; if absent, the automatic grid for
/// `r_mpc` is used for every pixel. The square root of each periodogram is
/// transformed over the transverse axes and only strictly-positive transverse
/// wavenumbers are kept. Wavenumbers are angular (2π times the frequency).
pub fn ls_pspec_3d(
    cube: ArrayView3<f64>,
    dims: BoxDims,
    r_mpc: &[f64],
    radial_freqs: Option<&[f64]>,
) -> Result<PowerCube, PspecError> {
    dims.validate()?;
    if cube.is_empty() {
        return Err(PspecError::EmptyCube);
    }
    let (nx, ny, nz) = cube.dim();
    check_radial(r_mpc, nz)?;
    let kx = fftfreq(nx, dims.lx / nx as f64) * TAU;
    let ky = fftfreq(ny, dims.ly / ny as f64) * TAU;
    let kx: Array1<f64> = kx.iter().copied().filter(|k| *k > 0.0).collect();
    let ky: Array1<f64> = ky.iter().copied().filter(|k| *k > 0.0).collect();
    let (num_kx, num_ky) = (kx.len(), ky.len());
    if num_kx == 0 || num_ky == 0 {
        return Err(PspecError::TooFewTransversePixels { nx, ny });
    }

    let freqs = match radial_freqs {
        Some(f) => f.to_vec(),
        None => autofrequency(r_mpc)?,
    };
    if freqs.is_empty() {
        return Err(PspecError::NoPositiveWavenumbers);
    }
    debug!(
        "Lomb-Scargle over {} radial frequencies in [{}, {}] cycles/Mpc",
        freqs.len(),
        freqs[0],
        freqs[freqs.len() - 1]
    );

    let mut amplitudes = Array3::<c64>::zeros((nx, ny, freqs.len()));
    amplitudes
        .outer_iter_mut()
        .into_par_iter()
        .zip(cube.outer_iter().into_par_iter())
        .for_each(|(mut out_plane, in_plane)| {
            for (mut out_lane, in_lane) in out_plane.outer_iter_mut().zip(in_plane.outer_iter()) {
                let samples: Vec<f64> = in_lane.iter().copied().collect();
                let power = lomb_scargle_psd(r_mpc, &samples, &freqs);
                out_lane
                    .iter_mut()
                    .zip(power)
                    .for_each(|(out, p)| *out = c64::new(p.sqrt(), 0.0));
            }
        });
    fft2_transverse(&mut amplitudes);

    // The positive transverse wavenumbers directly follow the zero term.
    let norm = 1.0 / (num_kx * num_ky) as f64;
    let power = amplitudes
        .slice(s![1..=num_kx, 1..=num_ky, ..])
        .mapv(|v| v.norm_sqr() * norm);
    let kz = Array1::from_iter(freqs.iter().map(|f| TAU * f));

    Ok(PowerCube {
        kx,
        ky,
        kz,
        power,
    })
}

/// Estimate the binned 1D power spectrum of a cube with irregular radial
/// sampling. See [`ls_pspec_3d`].
pub fn ls_pspec_1d(
    cube: ArrayView3<f64>,
    dims: BoxDims,
    r_mpc: &[f64],
    num_bins: usize,
    sigma: bool,
    radial_freqs: Option<&[f64]>,
) -> Result<BinnedPowerSpectrum, PspecError> {
    ls_pspec_3d(cube, dims, r_mpc, radial_freqs)?.bin(num_bins, sigma)
}
