// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spherical-harmonic transforms of real HEALPix maps.
//!
//! Coefficients are stored for m >= 0 only (the negative orders of a real
//! field follow from a_{l,-m} = (-1)^m conj(a_lm)), in the usual HEALPix
//! triangular layout: all degrees of m = 0, then all degrees of m = 1, and so
//! on.

use ndarray::prelude::*;
use num_traits::Zero;
use rayon::prelude::*;

use super::{Healpix, HealpixError, Ring};
use crate::{c64, constants::PI, math::cexp};

/// The number of coefficients with l <= `lmax` and 0 <= m <= l.
pub fn alm_size(lmax: usize) -> usize {
    (lmax + 1) * (lmax + 2) / 2
}

/// The linear index of coefficient (l, m).
pub fn alm_index(l: usize, m: usize, lmax: usize) -> usize {
    debug_assert!(m <= l && l <= lmax);
    m * (2 * lmax + 1 - m) / 2 + l
}

/// The degree and order of every linear coefficient index.
pub fn alm_lm(lmax: usize) -> (Vec<usize>, Vec<usize>) {
    let size = alm_size(lmax);
    let mut ls = Vec::with_capacity(size);
    let mut ms = Vec::with_capacity(size);
    for m in 0..=lmax {
        for l in m..=lmax {
            ls.push(l);
            ms.push(m);
        }
    }
    (ls, ms)
}

/// Orthonormalised associated Legendre functions, lambda_lm(x) =
/// sqrt((2l+1)/(4 pi) (l-m)!/(l+m)!) P_l^m(x), including the Condon-Shortley
/// phase. Indexed with [`alm_index`].
fn legendre_table(x: f64, lmax: usize) -> Vec<f64> {
    let mut table = vec![0.0; alm_size(lmax)];
    let sin_theta = (1.0 - x * x).max(0.0).sqrt();

    let mut lambda_mm = (1.0 / (4.0 * PI)).sqrt();
    for m in 0..=lmax {
        if m > 0 {
            lambda_mm *= -((2 * m + 1) as f64 / (2 * m) as f64).sqrt() * sin_theta;
        }
        table[alm_index(m, m, lmax)] = lambda_mm;
        if m == lmax {
            break;
        }

        let mut prev2 = lambda_mm;
        let mut prev1 = x * ((2 * m + 3) as f64).sqrt() * lambda_mm;
        table[alm_index(m + 1, m, lmax)] = prev1;
        for l in m + 2..=lmax {
            let (lf, mf) = (l as f64, m as f64);
            let a = ((4.0 * lf * lf - 1.0) / (lf * lf - mf * mf)).sqrt();
            let b = (((lf - 1.0).powi(2) - mf * mf) / (4.0 * (lf - 1.0).powi(2) - 1.0)).sqrt();
            let current = a * (x * prev1 - b * prev2);
            table[alm_index(l, m, lmax)] = current;
            prev2 = prev1;
            prev1 = current;
        }
    }
    table
}

/// Decompose a real map into spherical-harmonic coefficients up to degree
/// `lmax`, by quadrature over pixel centres with equal pixel weights.
pub fn map2alm(
    healpix: &Healpix,
    map: ArrayView1<f64>,
    lmax: usize,
) -> Result<Array1<c64>, HealpixError> {
    healpix.check_map_len(map.len())?;
    let weight = healpix.pixel_area();

    let rings: Vec<Ring> = healpix.rings();
    let alm = rings
        .into_par_iter()
        .map(|ring| {
            // Fourier coefficients of the ring, F_m = sum_p T_p exp(-i m phi_p).
            let mut ring_fourier = vec![c64::zero(); lmax + 1];
            for pix in ring.first_pixel..ring.first_pixel + ring.num_pixels {
                let (_, phi) = healpix.pix2ang(pix);
                let step = cexp(-phi);
                let mut phase = c64::new(map[pix], 0.0);
                for coeff in ring_fourier.iter_mut() {
                    *coeff += phase;
                    phase *= step;
                }
            }

            let legendre = legendre_table(ring.z, lmax);
            let mut partial = Array1::<c64>::zeros(alm_size(lmax));
            for m in 0..=lmax {
                let f_m = ring_fourier[m] * weight;
                for l in m..=lmax {
                    let i = alm_index(l, m, lmax);
                    partial[i] += f_m * legendre[i];
                }
            }
            partial
        })
        .reduce(|| Array1::zeros(alm_size(lmax)), |a, b| a + b);
    Ok(alm)
}

/// Synthesise a real map from spherical-harmonic coefficients laid out as
/// [`map2alm`] produces them.
pub fn alm2map(healpix: &Healpix, alm: ArrayView1<c64>, lmax: usize) -> Array1<f64> {
    debug_assert_eq!(alm.len(), alm_size(lmax));
    let mut map = Array1::zeros(healpix.npix());
    for ring in healpix.rings() {
        let legendre = legendre_table(ring.z, lmax);
        // G_m = sum_l a_lm lambda_lm(z).
        let g: Vec<c64> = (0..=lmax)
            .map(|m| {
                (m..=lmax)
                    .map(|l| {
                        let i = alm_index(l, m, lmax);
                        alm[i] * legendre[i]
                    })
                    .sum()
            })
            .collect();
        for pix in ring.first_pixel..ring.first_pixel + ring.num_pixels {
            let (_, phi) = healpix.pix2ang(pix);
            let mut value = g[0].re;
            for (m, g_m) in g.iter().enumerate().skip(1) {
                value += 2.0 * (g_m * cexp(m as f64 * phi)).re;
            }
            map[pix] = value;
        }
    }
    map
}
