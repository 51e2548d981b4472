// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with sky models.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkyError {
    #[error("The sky model has {got} frequencies, but its data has {expected} channels")]
    FrequencyCountMismatch { got: usize, expected: usize },

    #[error("A sky model needs at least one sky and one frequency")]
    Empty,

    #[error("Noise standard deviation must be non-negative and finite, but got {0}")]
    InvalidSigma(f64),

    #[error("At least two frequencies are needed to determine a channel width")]
    NeedChannelWidth,

    #[error("{0}")]
    Healpix(#[from] crate::healpix::HealpixError),

    #[error("{0}")]
    Cosmology(#[from] crate::cosmology::CosmologyError),
}
