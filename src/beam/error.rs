// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with beam calculations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeamError {
    #[error("A Gaussian beam needs exactly one of a width (sigma) or a FWHM")]
    GaussianWidth,

    #[error("The Gaussian beam width must be positive and finite, but got {0} radians")]
    InvalidWidth(f64),

    #[error("The Airy beam dish diameter must be positive and finite, but got {0} m")]
    InvalidDiameter(f64),
}
