// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The HEALPix full-sphere pixelisation, RING ordering only.
//!
//! Pixel geometry comes from `scorus`. Angles are in radians; `theta` is the
//! colatitude and `phi` the longitude.

mod error;
mod projection;
mod sht;

pub use error::HealpixError;
pub use projection::CartesianProjection;
pub use sht::{alm2map, alm_index, alm_lm, alm_size, map2alm};

use rayon::prelude::*;
use scorus::{
    coordinates::SphCoord,
    healpix::{
        pix::{ang2pix_ring, pix2ang_ring, pix2ring_ring, pix2vec_ring, ring2z_ring},
        utils::{nside2npix, nside2nring},
    },
};

use crate::constants::*;

/// A pixelisation of the sphere with `12 * nside^2` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Healpix {
    nside: usize,
}

/// An iso-latitude ring of pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    /// The index of the first pixel in the ring.
    pub first_pixel: usize,
    /// The number of pixels in the ring.
    pub num_pixels: usize,
    /// The cosine of the ring's colatitude.
    pub z: f64,
}

impl Healpix {
    /// Nside must be a positive power of two.
    pub fn new(nside: usize) -> Result<Healpix, HealpixError> {
        if !nside.is_power_of_two() {
            return Err(HealpixError::InvalidNside(nside));
        }
        Ok(Healpix { nside })
    }

    /// Infer the resolution parameter from the number of pixels in a map.
    pub fn from_npix(npix: usize) -> Result<Healpix, HealpixError> {
        let nside = ((npix as f64 / 12.0).sqrt().round()) as usize;
        if !nside.is_power_of_two() || nside2npix(nside) != npix {
            return Err(HealpixError::PixelCountMismatch {
                nside,
                expected: 12 * nside * nside,
                got: npix,
            });
        }
        Ok(Healpix { nside })
    }

    pub fn nside(&self) -> usize {
        self.nside
    }

    pub fn npix(&self) -> usize {
        nside2npix(self.nside)
    }

    pub fn num_rings(&self) -> usize {
        nside2nring(self.nside)
    }

    /// The solid angle of a single pixel \[steradians\].
    pub fn pixel_area(&self) -> f64 {
        4.0 * PI / self.npix() as f64
    }

    /// The approximate angular size of a pixel \[radians\].
    pub fn resolution(&self) -> f64 {
        self.pixel_area().sqrt()
    }

    /// The default maximum spherical-harmonic degree for maps of this
    /// resolution.
    pub fn default_lmax(&self) -> usize {
        3 * self.nside - 1
    }

    /// Ensure that a map has the right number of pixels for this resolution.
    pub fn check_map_len(&self, len: usize) -> Result<(), HealpixError> {
        if len != self.npix() {
            return Err(HealpixError::PixelCountMismatch {
                nside: self.nside,
                expected: self.npix(),
                got: len,
            });
        }
        Ok(())
    }

    pub fn check_pixel(&self, pix: usize) -> Result<(), HealpixError> {
        if pix >= self.npix() {
            return Err(HealpixError::PixelOutOfRange {
                got: pix,
                nside: self.nside,
                npix: self.npix(),
            });
        }
        Ok(())
    }

    /// All rings from the north pole to the south pole. RING ordering stores
    /// each ring's pixels contiguously.
    pub fn rings(&self) -> Vec<Ring> {
        let mut counts = vec![0_usize; self.num_rings()];
        // Ring numbers start at 1.
        (0..self.npix()).for_each(|pix| counts[pix2ring_ring(self.nside, pix) - 1] += 1);

        let mut first_pixel = 0;
        counts
            .into_iter()
            .enumerate()
            .map(|(i, num_pixels)| {
                let ring = Ring {
                    first_pixel,
                    num_pixels,
                    z: ring2z_ring::<f64>(self.nside, i + 1),
                };
                first_pixel += num_pixels;
                ring
            })
            .collect()
    }

    /// Get the colatitude and longitude of a pixel centre.
    pub fn pix2ang(&self, pix: usize) -> (f64, f64) {
        let ang = pix2ang_ring::<f64>(self.nside, pix);
        (ang.pol, ang.az)
    }

    /// Get the unit vector pointing at a pixel centre.
    pub fn pix2vec(&self, pix: usize) -> [f64; 3] {
        let v = pix2vec_ring::<f64>(self.nside, pix);
        [v.x, v.y, v.z]
    }

    /// Get the pixel containing the direction with colatitude `theta` and
    /// longitude `phi`.
    pub fn ang2pix(&self, theta: f64, phi: f64) -> usize {
        ang2pix_ring::<f64>(self.nside, SphCoord::new(theta, phi.rem_euclid(TAU)))
    }

    /// Get the pixel containing the direction of `v`, which need not be
    /// normalised.
    pub fn vec2pix(&self, v: [f64; 3]) -> usize {
        let (theta, phi) = vec2ang(v);
        self.ang2pix(theta, phi)
    }

    /// Get all pixels whose centres lie within `radius` radians of the
    /// direction `centre`, in ascending order.
    pub fn query_disc(&self, centre: [f64; 3], radius: f64) -> Result<Vec<usize>, HealpixError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(HealpixError::InvalidRadius(radius));
        }
        let centre = normalise(centre);
        let cos_radius = radius.min(PI).cos();
        // Only rings overlapping the disc's band of colatitude can contribute.
        let theta_c = centre[2].clamp(-1.0, 1.0).acos();
        let (theta_min, theta_max) = (theta_c - radius, theta_c + radius);
        Ok(self
            .rings()
            .into_par_iter()
            .filter(|ring| {
                let theta = ring.z.clamp(-1.0, 1.0).acos();
                theta >= theta_min - 1e-12 && theta <= theta_max + 1e-12
            })
            .flat_map_iter(|ring| ring.first_pixel..ring.first_pixel + ring.num_pixels)
            .filter(|&pix| dot(self.pix2vec(pix), centre) >= cos_radius)
            .collect())
    }
}

/// Convert a colatitude and longitude to a unit vector.
pub fn ang2vec(theta: f64, phi: f64) -> [f64; 3] {
    let (s_theta, c_theta) = theta.sin_cos();
    let (s_phi, c_phi) = phi.sin_cos();
    [s_theta * c_phi, s_theta * s_phi, c_theta]
}

/// Convert a vector to a colatitude and longitude. The longitude is in
/// [0, 2π).
pub fn vec2ang(v: [f64; 3]) -> (f64, f64) {
    let v = normalise(v);
    (v[2].clamp(-1.0, 1.0).acos(), v[1].atan2(v[0]).rem_euclid(TAU))
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn normalise(v: [f64; 3]) -> [f64; 3] {
    let norm = dot(v, v).sqrt();
    [v[0] / norm, v[1] / norm, v[2] / norm]
}
