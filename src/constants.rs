// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Calculations should stay in double
precision for as long as possible.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Speed of light \[metres/second\].
pub const VEL_C: f64 = 299_792_458.0;

/// Speed of light \[kilometres/second\]. Used with Hubble constants in
/// km/s/Mpc.
pub const VEL_C_KM_S: f64 = VEL_C / 1000.0;

/// Rest frequency of the neutral-hydrogen hyperfine transition \[Hz\].
pub const F21_HZ: f64 = 1_420_405_751.768;

/// Stefan-Boltzmann constant \[W m^-2 K^-4\].
pub const STEFAN_BOLTZMANN: f64 = 5.670_374_419e-8;

/// Newtonian constant of gravitation \[m^3 kg^-1 s^-2\].
pub const GRAV_CONST: f64 = 6.674_30e-11;

/// One megaparsec \[metres\].
pub const MPC_M: f64 = 3.085_677_581_491_367e22;

/// Ratio of the massless-neutrino to photon energy density per effective
/// neutrino species, 7/8 (4/11)^(4/3).
pub const NEUTRINO_PHOTON_RATIO: f64 = 0.227_107_317_660_239_6;

/// Conversion factor between a Gaussian's FWHM and its standard deviation.
pub const FWHM_FACTOR: f64 = 2.354_820_045_030_949_3;

/// Default number of wavenumber bins for 1D power spectra.
pub const DEFAULT_NUM_K_BINS: usize = 100;

/// Julian date of the J2000 epoch.
pub const J2000_JD: f64 = 2_451_545.0;
