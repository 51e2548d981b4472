// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Power-spectrum estimators.
//!
//! Cartesian cubes are indexed (x, y, radial). Three strategies turn a cube
//! into a power cube before binning in |k|:
//!
//! - [`r_pspec_1d`]: FFTs, or an explicit DFT along the radial axis when the
//!   radial coordinates are supplied;
//! - [`ls_pspec_1d`]: a Lomb-Scargle periodogram along the radial axis, for
//!   irregular radial sampling;
//! - [`pyramid_pspec`]: an explicit radial DFT with transverse wavenumbers
//!   that shrink as the patch widens with distance.
//!
//! [`r_pspec_sphere`] cuts patches out of a HEALPix shell and feeds them to
//! one of these. [`tlmk_transform`], [`slk_calc`] and [`pk_sphere`] instead
//! work directly in spherical-harmonic space.

mod error;
mod harmonic;
mod lomb_scargle;
mod pyramid;
mod rectilinear;
mod sphere;

pub use error::PspecError;
pub use harmonic::{pk_sphere, slk_calc, tlmk_transform, RadialHarmonicTransform};
pub use lomb_scargle::{autofrequency, lomb_scargle_psd, ls_pspec_1d, ls_pspec_3d};
pub use pyramid::pyramid_pspec;
pub use rectilinear::{r_pspec_1d, r_pspec_3d};
pub use sphere::{r_pspec_sphere, PatchGeometry, RadialMethod, SphereSpectrumConfig};

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// Physical side lengths of a Cartesian box \[Mpc\].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxDims {
    pub lx: f64,
    pub ly: f64,
    pub lz: f64,
}

impl BoxDims {
    pub fn new(lx: f64, ly: f64, lz: f64) -> Result<BoxDims, PspecError> {
        let dims = BoxDims { lx, ly, lz };
        dims.validate()?;
        Ok(dims)
    }

    /// A cube with all sides `l` long.
    pub fn cube(l: f64) -> Result<BoxDims, PspecError> {
        BoxDims::new(l, l, l)
    }

    fn validate(&self) -> Result<(), PspecError> {
        if [self.lx, self.ly, self.lz]
            .iter()
            .all(|l| l.is_finite() && *l > 0.0)
        {
            Ok(())
        } else {
            Err(PspecError::InvalidBoxDims {
                lx: self.lx,
                ly: self.ly,
                lz: self.lz,
            })
        }
    }

    pub fn volume(&self) -> f64 {
        self.lx * self.ly * self.lz
    }
}

/// Normalisation conventions for Cartesian power spectra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalisation {
    /// Wavenumbers in cycles per unit length; power divided by the number of
    /// voxels.
    #[default]
    Pixel,

    /// Angular wavenumbers (scaled by 2π); transforms multiplied by the voxel
    /// volume and power divided by the box volume and the number of bins.
    Cosmological,
}

/// An unbinned 3D power spectrum with one wavenumber axis per cube axis.
#[derive(Debug, Clone)]
pub struct PowerCube {
    pub kx: Array1<f64>,
    pub ky: Array1<f64>,
    pub kz: Array1<f64>,
    pub power: Array3<f64>,
}

impl PowerCube {
    pub fn bin(
        &self,
        num_bins: usize,
        sigma: bool,
    ) -> Result<crate::binning::BinnedPowerSpectrum, PspecError> {
        Ok(crate::binning::bin_from_grids(
            self.power.view(),
            self.kx.view(),
            self.ky.view(),
            self.kz.view(),
            num_bins,
            sigma,
        )?)
    }
}

/// Ensure that radial coordinates match the cube's radial axis and can
/// define a spacing.
fn check_radial(r_mpc: &[f64], num_channels: usize) -> Result<(), PspecError> {
    if r_mpc.len() != num_channels {
        return Err(PspecError::RadialLengthMismatch {
            what: "radial distances",
            got: r_mpc.len(),
            expected: num_channels,
        });
    }
    if num_channels < 2 {
        return Err(PspecError::TooFewChannels(num_channels));
    }
    Ok(())
}
