// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! HEALPix sky models: one or more full-sky shells sharing a frequency axis.

mod error;

pub use error::SkyError;

use log::debug;
use ndarray::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{
    cosmology::{comoving_voxel_volume, freq_to_redshift, CosmologyModel},
    healpix::Healpix,
};

/// Sky brightness with shape (Nskies, Npix, Nfreqs).
#[derive(Debug, Clone)]
pub struct SkyModel {
    healpix: Healpix,
    freqs_hz: Vec<f64>,
    data: Array3<f64>,
}

impl SkyModel {
    pub fn new(data: Array3<f64>, freqs_hz: Vec<f64>) -> Result<SkyModel, SkyError> {
        let (num_skies, num_pixels, num_freqs) = data.dim();
        if num_skies == 0 || num_freqs == 0 {
            return Err(SkyError::Empty);
        }
        if freqs_hz.len() != num_freqs {
            return Err(SkyError::FrequencyCountMismatch {
                got: freqs_hz.len(),
                expected: num_freqs,
            });
        }
        let healpix = Healpix::from_npix(num_pixels)?;
        Ok(SkyModel {
            healpix,
            freqs_hz,
            data,
        })
    }

    /// A sky model holding a single (Npix, Nfreqs) shell.
    pub fn from_shell(shell: Array2<f64>, freqs_hz: Vec<f64>) -> Result<SkyModel, SkyError> {
        SkyModel::new(shell.insert_axis(Axis(0)), freqs_hz)
    }

    /// Independent zero-mean Gaussian noise with standard deviation `sigma` in
    /// every pixel and channel.
    pub fn gaussian_noise<R: Rng>(
        healpix: Healpix,
        freqs_hz: Vec<f64>,
        num_skies: usize,
        sigma: f64,
        rng: &mut R,
    ) -> Result<SkyModel, SkyError> {
        let sigmas = vec![sigma; freqs_hz.len()];
        SkyModel::gaussian_noise_with_sigmas(healpix, freqs_hz, num_skies, &sigmas, rng)
    }

    /// Gaussian noise that is white in comoving volume. The standard deviation
    /// is `sigma` in the central channel and scales as sqrt(dV_mid / dV) in
    /// the others, where dV is the comoving volume of a pixel-sized voxel.
    /// Frequencies must be evenly spaced; the first spacing is the channel
    /// width.
    pub fn gaussian_noise_voxel_scaled<R: Rng>(
        healpix: Healpix,
        freqs_hz: Vec<f64>,
        num_skies: usize,
        sigma: f64,
        cosmo: &dyn CosmologyModel,
        rng: &mut R,
    ) -> Result<SkyModel, SkyError> {
        let dnu = match freqs_hz.as_slice() {
            [f0, f1, ..] => f1 - f0,
            _ => return Err(SkyError::NeedChannelWidth),
        };
        let omega = healpix.pixel_area();
        let volumes = freqs_hz
            .iter()
            .map(|&f| Ok(comoving_voxel_volume(cosmo, freq_to_redshift(f)?, dnu, omega)))
            .collect::<Result<Vec<f64>, SkyError>>()?;
        let reference = volumes[volumes.len() / 2];
        debug!("Reference voxel volume: {reference} Mpc^3");
        let sigmas: Vec<f64> = volumes.iter().map(|v| sigma * (reference / v).sqrt()).collect();
        SkyModel::gaussian_noise_with_sigmas(healpix, freqs_hz, num_skies, &sigmas, rng)
    }

    fn gaussian_noise_with_sigmas<R: Rng>(
        healpix: Healpix,
        freqs_hz: Vec<f64>,
        num_skies: usize,
        sigmas: &[f64],
        rng: &mut R,
    ) -> Result<SkyModel, SkyError> {
        let mut data = Array3::zeros((num_skies, healpix.npix(), freqs_hz.len()));
        for (mut channel, &sigma) in data.axis_iter_mut(Axis(2)).zip(sigmas) {
            if !(sigma.is_finite() && sigma >= 0.0) {
                return Err(SkyError::InvalidSigma(sigma));
            }
            let normal = Normal::new(0.0, sigma).map_err(|_| SkyError::InvalidSigma(sigma))?;
            channel.iter_mut().for_each(|v| *v = normal.sample(rng));
        }
        SkyModel::new(data, freqs_hz)
    }

    pub fn healpix(&self) -> Healpix {
        self.healpix
    }

    pub fn freqs_hz(&self) -> &[f64] {
        &self.freqs_hz
    }

    pub fn num_skies(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn data(&self) -> ArrayView3<f64> {
        self.data.view()
    }

    /// The (Npix, Nfreqs) shell of one sky.
    pub fn shell(&self, i_sky: usize) -> ArrayView2<f64> {
        self.data.index_axis(Axis(0), i_sky)
    }
}
