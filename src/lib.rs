// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Power-spectrum estimation and visibility simulation for HEALPix skies.

The power-spectrum side takes either full-sky shells (Npix, Nfreqs) or
rectilinear cubes and estimates the spherically-averaged power spectrum P(k),
via a spherical-Bessel/harmonic decomposition ([`pspec::tlmk_transform`]) or
via Cartesian transforms of projected patches ([`pspec::r_pspec_sphere`]).

The simulation side ([`observatory`], [`beam`], [`visibility`]) integrates
beam-weighted, fringe-weighted sky brightness to give per-baseline
visibilities.
 */

pub mod beam;
pub mod binning;
pub mod constants;
pub mod cosmology;
mod error;
pub mod healpix;
pub mod math;
pub mod observatory;
pub mod pspec;
pub mod sky;
pub mod visibility;

// Re-exports.
pub use binning::BinnedPowerSpectrum;
pub use cosmology::{CosmologyModel, FlatLambdaCdm};
pub use error::EorskyError;
pub use healpix::Healpix;
pub use math::{MaskedArray1, MaskedArray2};
pub use observatory::{Observatory, ObservatoryConfig};
pub use sky::SkyModel;
pub use visibility::Visibilities;

#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;
