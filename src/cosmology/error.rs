// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with cosmological models.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CosmologyError {
    #[error("The Hubble constant must be positive, but got {0} km/s/Mpc")]
    InvalidHubbleConstant(f64),

    #[error("The matter density parameter must be in [0, 1], but got {0}")]
    InvalidMatterDensity(f64),

    #[error("The CMB temperature and effective number of neutrino species must be non-negative (got {tcmb0} K, {neff})")]
    InvalidRadiation { tcmb0: f64, neff: f64 },

    #[error("Frequencies must be positive, but got {0} Hz")]
    InvalidFrequency(f64),
}
