// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reduce power cubes to 1D power spectra by binning in |k|.
//!
//! The range of |k| is split into equal-width bins spanning the data, so bin
//! edges depend on the wavenumbers supplied. Callers that need identical bins
//! across calls must supply identical wavenumbers. Bins without any samples
//! are masked.
//!
//! There are two entrypoints depending on how the wavenumbers are supplied:
//! [`bin_from_grids`] takes one wavenumber axis per cube axis and builds the
//! full coordinate grid itself, whereas [`bin_from_meshgrid`] takes wavenumber
//! grids with the same shape as the cube.

mod error;

pub use error::BinError;

use log::trace;
use ndarray::prelude::*;

use crate::math::{meshgrid3, MaskedArray1};

/// A binned 1D power spectrum.
#[derive(Debug, Clone)]
pub struct BinnedPowerSpectrum {
    /// The centre of each |k| bin.
    pub k_bins: Array1<f64>,

    /// The mean power in each bin. Empty bins are masked.
    pub power: MaskedArray1,

    /// The standard deviation of the power in each bin, if requested. Empty
    /// bins are masked.
    pub errors: Option<MaskedArray1>,

    /// The number of samples that landed in each bin.
    pub counts: Vec<usize>,
}

impl BinnedPowerSpectrum {
    pub fn num_bins(&self) -> usize {
        self.k_bins.len()
    }
}

/// Running mean and variance (Welford's algorithm).
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Population variance.
    fn variance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.m2 / self.count as f64)
    }
}

/// Compute the mean (and optionally the standard deviation) of `samples` in
/// `num_bins` equal-width bins of `magnitudes`. The bins span the minimum to
/// the maximum magnitude; the maximum itself lands in the last bin.
pub fn binned_statistic(
    magnitudes: &[f64],
    samples: &[f64],
    num_bins: usize,
    sigma: bool,
) -> Result<BinnedPowerSpectrum, BinError> {
    if num_bins == 0 {
        return Err(BinError::ZeroBins);
    }
    if magnitudes.len() != samples.len() {
        return Err(BinError::LengthMismatch {
            magnitudes: magnitudes.len(),
            samples: samples.len(),
        });
    }
    if magnitudes.is_empty() {
        return Err(BinError::NoSamples);
    }
    if magnitudes.iter().any(|k| !k.is_finite()) {
        return Err(BinError::NonFiniteMagnitude);
    }

    let (mut lo, mut hi) = magnitudes
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &k| {
            (lo.min(k), hi.max(k))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / num_bins as f64;
    trace!("Binning {} samples into {num_bins} bins over [{lo}, {hi}]", samples.len());

    let mut accumulators = vec![Accumulator::default(); num_bins];
    for (&k, &p) in magnitudes.iter().zip(samples) {
        let i_bin = (((k - lo) / width).floor() as usize).min(num_bins - 1);
        accumulators[i_bin].push(p);
    }

    let k_bins = Array1::from_shape_fn(num_bins, |i| lo + (i as f64 + 0.5) * width);
    let mask = Array1::from_iter(accumulators.iter().map(|a| a.count == 0));
    let power = MaskedArray1::new(
        Array1::from_iter(accumulators.iter().map(|a| a.mean().unwrap_or(0.0))),
        mask.clone(),
    );
    let errors = sigma.then(|| {
        MaskedArray1::new(
            Array1::from_iter(
                accumulators
                    .iter()
                    .map(|a| a.variance().map(f64::sqrt).unwrap_or(0.0)),
            ),
            mask,
        )
    });

    Ok(BinnedPowerSpectrum {
        k_bins,
        power,
        errors,
        counts: accumulators.iter().map(|a| a.count).collect(),
    })
}

/// Bin a power cube whose wavenumbers are given as one axis per cube
/// dimension. Axis lengths must match the cube's dimensions.
pub fn bin_from_grids(
    pk: ArrayView3<f64>,
    kx: ArrayView1<f64>,
    ky: ArrayView1<f64>,
    kz: ArrayView1<f64>,
    num_bins: usize,
    sigma: bool,
) -> Result<BinnedPowerSpectrum, BinError> {
    let (nx, ny, nz) = pk.dim();
    for (axis, (got, expected)) in [(kx.len(), nx), (ky.len(), ny), (kz.len(), nz)]
        .into_iter()
        .enumerate()
    {
        if got != expected {
            return Err(BinError::AxisMismatch {
                axis,
                got,
                expected,
            });
        }
    }

    let (kx, ky, kz) = meshgrid3(kx, ky, kz);
    bin_from_meshgrid(pk, kx.view(), ky.view(), kz.view(), num_bins, sigma)
}

/// Bin a power cube whose wavenumbers are given as full grids, each with the
/// same shape as the cube.
pub fn bin_from_meshgrid(
    pk: ArrayView3<f64>,
    kx: ArrayView3<f64>,
    ky: ArrayView3<f64>,
    kz: ArrayView3<f64>,
    num_bins: usize,
    sigma: bool,
) -> Result<BinnedPowerSpectrum, BinError> {
    let expected = shape3(pk.shape());
    for (axis, shape) in [kx.shape(), ky.shape(), kz.shape()].into_iter().enumerate() {
        let got = shape3(shape);
        if got != expected {
            return Err(BinError::GridMismatch {
                axis,
                got,
                expected,
            });
        }
    }

    let magnitudes: Vec<f64> = kx
        .iter()
        .zip(ky.iter())
        .zip(kz.iter())
        .map(|((x, y), z)| (x * x + y * y + z * z).sqrt())
        .collect();
    let samples: Vec<f64> = pk.iter().copied().collect();
    binned_statistic(&magnitudes, &samples, num_bins, sigma)
}

fn shape3(shape: &[usize]) -> [usize; 3] {
    [shape[0], shape[1], shape[2]]
}
