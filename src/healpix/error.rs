// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with the HEALPix pixelisation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealpixError {
    #[error("Nside must be a positive power of two, but got {0}")]
    InvalidNside(usize),

    #[error("A map with Nside {nside} has {expected} pixels, but got {got}")]
    PixelCountMismatch {
        nside: usize,
        expected: usize,
        got: usize,
    },

    #[error("Pixel index {got} is out of range for Nside {nside} ({npix} pixels)")]
    PixelOutOfRange { got: usize, nside: usize, npix: usize },

    #[error("The angular radius must be positive and finite, but got {0} radians")]
    InvalidRadius(f64),
}
