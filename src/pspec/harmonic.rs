// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Power spectra of HEALPix shells in spherical-harmonic and spherical-Bessel
//! space.
//!
//! A shell T(r, n) is decomposed into a_lm(r) per channel, then projected onto
//! spherical Bessel functions:
//!
//! T_lm(k) = sum_r r^2 j_l(k r) a_lm(r),   w_l(k) = sum_r j_l(k r)^2.
//!
//! The order-averaged power S_l(k) is normalised by w_l(k), and the isotropic
//! spectrum P(k) is the w^2-weighted mean of S_l(k) over degrees.

use log::{debug, trace};
use ndarray::{parallel::prelude::*, prelude::*};

use super::{check_radial, PspecError};
use crate::{
    c64,
    constants::TAU,
    healpix::{alm_lm, alm_size, map2alm, Healpix},
    math::{fftfreq, min_spacing, spherical_jn, MaskedArray1, MaskedArray2},
};

/// The result of [`tlmk_transform`].
#[derive(Debug, Clone)]
pub struct RadialHarmonicTransform {
    /// Transform coefficients with shape (Nlm, Nk), rows in the triangular
    /// (l, m) layout of [`crate::healpix::alm_index`].
    pub tlmk: Array2<c64>,

    /// Normalisation weights with shape (lmax + 1, Nk). Zero where the mode
    /// was skipped.
    pub wlk: Array2<f64>,

    /// The (strictly positive) radial wavenumbers \[Mpc^-1\].
    pub wavenumbers: Array1<f64>,

    /// The degree of each row of `tlmk`.
    pub degrees: Vec<usize>,

    /// The order of each row of `tlmk`.
    pub orders: Vec<usize>,
}

impl RadialHarmonicTransform {
    pub fn lmax(&self) -> usize {
        self.wlk.nrows() - 1
    }

    /// See [`slk_calc`].
    pub fn slk(&self) -> Result<MaskedArray2, PspecError> {
        slk_calc(self.tlmk.view(), self.wlk.view(), &self.degrees, &self.orders)
    }

    /// The isotropic power spectrum, one value per wavenumber. See
    /// [`pk_sphere`].
    pub fn power_spectrum(&self) -> Result<MaskedArray1, PspecError> {
        pk_sphere(&self.slk()?, self.wlk.view())
    }
}

/// Transform a shell with shape (Npix, Nchannels) into spherical-Bessel
/// space.
///
/// `r_mpc` holds the comoving distance of each channel. Without
/// `wavenumbers`, the DFT wavenumbers of the smallest channel spacing are
/// used. Only strictly-positive wavenumbers are kept either way. `lmax`
/// defaults to `3 * nside - 1`.
///
/// Modes with l > k * max(r) are negligible and are skipped; their
/// coefficients and weights are exactly zero.
pub fn tlmk_transform(
    shell: ArrayView2<f64>,
    healpix: &Healpix,
    r_mpc: &[f64],
    wavenumbers: Option<&[f64]>,
    lmax: Option<usize>,
) -> Result<RadialHarmonicTransform, PspecError> {
    let (num_pixels, num_channels) = shell.dim();
    healpix.check_map_len(num_pixels)?;
    check_radial(r_mpc, num_channels)?;
    let lmax = lmax.unwrap_or_else(|| healpix.default_lmax());

    let wavenumbers: Array1<f64> = match wavenumbers {
        Some(k) => k.iter().copied().filter(|k| *k > 0.0).collect(),
        None => {
            let spacing = min_spacing(r_mpc)
                .filter(|d| *d > 0.0)
                .ok_or(PspecError::DegenerateRadialSpacing)?;
            debug!("Minimum radial spacing: {spacing} Mpc");
            fftfreq(num_channels, spacing)
                .iter()
                .map(|f| TAU * f)
                .filter(|k| *k > 0.0)
                .collect()
        }
    };
    if wavenumbers.is_empty() {
        return Err(PspecError::NoPositiveWavenumbers);
    }
    let num_k = wavenumbers.len();

    // a_lm per channel, shape (Nlm, Nchannels).
    let mut alms = Array2::<c64>::zeros((alm_size(lmax), num_channels));
    for (i_chan, mut alm_column) in alms.axis_iter_mut(Axis(1)).enumerate() {
        alm_column.assign(&map2alm(healpix, shell.column(i_chan), lmax)?);
    }

    // Bessel kernels r^2 j_l(k r), shape (lmax + 1, Nk, Nchannels).
    let r_max = r_mpc.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut kernels = Array3::<f64>::zeros((lmax + 1, num_k, num_channels));
    let mut wlk = Array2::<f64>::zeros((lmax + 1, num_k));
    kernels
        .outer_iter_mut()
        .into_par_iter()
        .zip(wlk.outer_iter_mut().into_par_iter())
        .enumerate()
        .for_each(|(l, (mut kernel_l, mut wlk_l))| {
            for (i_k, &k) in wavenumbers.iter().enumerate() {
                if l as f64 > k * r_max {
                    trace!("Skipping l = {l}, k = {k}");
                    continue;
                }
                let mut weight = 0.0;
                for (i_r, &r) in r_mpc.iter().enumerate() {
                    let j = spherical_jn(l, k * r);
                    kernel_l[[i_k, i_r]] = r * r * j;
                    weight += j * j;
                }
                wlk_l[i_k] = weight;
            }
        });

    let (degrees, orders) = alm_lm(lmax);
    let mut tlmk = Array2::<c64>::zeros((alm_size(lmax), num_k));
    tlmk.outer_iter_mut()
        .into_par_iter()
        .zip(alms.outer_iter().into_par_iter())
        .zip(degrees.par_iter())
        .for_each(|((mut tlmk_row, alm), &l)| {
            let kernel_l = kernels.index_axis(Axis(0), l);
            for (t, kernel_lk) in tlmk_row.iter_mut().zip(kernel_l.outer_iter()) {
                *t = kernel_lk
                    .iter()
                    .zip(alm.iter())
                    .map(|(&b, &a)| a * b)
                    .sum();
            }
        });

    Ok(RadialHarmonicTransform {
        tlmk,
        wlk,
        wavenumbers,
        degrees,
        orders,
    })
}

/// The 2D power spectrum S_l(k): |T_lm(k)|^2 summed over all orders -l..=l
/// (the m > 0 coefficients stand in for their negative-order partners), divided
/// by 2l + 1 and by w_l(k). Entries with zero weight are masked.
pub fn slk_calc(
    tlmk: ArrayView2<c64>,
    wlk: ArrayView2<f64>,
    degrees: &[usize],
    orders: &[usize],
) -> Result<MaskedArray2, PspecError> {
    let (num_lm, num_k) = tlmk.dim();
    if degrees.len() != num_lm || orders.len() != num_lm {
        return Err(PspecError::ShapeMismatch {
            what: "degree and order indices",
            got: vec![degrees.len(), orders.len()],
            expected: vec![num_lm, num_lm],
        });
    }
    let num_l = wlk.nrows();
    if wlk.ncols() != num_k || degrees.iter().any(|&l| l >= num_l) {
        return Err(PspecError::ShapeMismatch {
            what: "weights",
            got: wlk.shape().to_vec(),
            expected: vec![degrees.iter().max().map_or(0, |l| l + 1), num_k],
        });
    }

    let mut slk = Array2::<f64>::zeros((num_l, num_k));
    for ((row, &l), &m) in tlmk.outer_iter().zip(degrees).zip(orders) {
        let multiplicity = if m == 0 { 1.0 } else { 2.0 };
        let mut slk_l = slk.row_mut(l);
        slk_l.zip_mut_with(&row, |s, t| *s += multiplicity * t.norm_sqr());
    }
    for ((l, _), s) in slk.indexed_iter_mut() {
        *s /= (2 * l + 1) as f64;
    }
    slk.zip_mut_with(&wlk, |s, &w| {
        if w != 0.0 {
            *s /= w;
        }
    });
    let mask = wlk.mapv(|w| w == 0.0);
    Ok(MaskedArray2::new(slk, mask))
}

/// Collapse S_l(k) to an isotropic spectrum P(k) = sum_l w^2 S / sum_l w^2.
/// Wavenumbers without any weight are masked.
pub fn pk_sphere(slk: &MaskedArray2, wlk: ArrayView2<f64>) -> Result<MaskedArray1, PspecError> {
    if slk.data().shape() != wlk.shape() {
        return Err(PspecError::ShapeMismatch {
            what: "weights",
            got: wlk.shape().to_vec(),
            expected: slk.data().shape().to_vec(),
        });
    }
    let w2 = wlk.mapv(|w| w * w);
    // Masked entries hold zero and have zero weight.
    let numerator = (&w2 * &slk.filled(0.0)).sum_axis(Axis(0));
    let norm = w2.sum_axis(Axis(0));
    let mask = norm.mapv(|n| n == 0.0);
    let pk = Array1::from_iter(
        numerator
            .iter()
            .zip(norm.iter())
            .map(|(&p, &n)| if n == 0.0 { 0.0 } else { p / n }),
    );
    Ok(MaskedArray1::new(pk, mask))
}
