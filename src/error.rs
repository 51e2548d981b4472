// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all eorsky-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EorskyError {
    #[error("{0}")]
    Bin(#[from] crate::binning::BinError),

    #[error("{0}")]
    Healpix(#[from] crate::healpix::HealpixError),

    #[error("{0}")]
    Cosmology(#[from] crate::cosmology::CosmologyError),

    #[error("{0}")]
    Sky(#[from] crate::sky::SkyError),

    #[error("{0}")]
    Pspec(#[from] crate::pspec::PspecError),

    #[error("{0}")]
    Beam(#[from] crate::beam::BeamError),

    #[error("{0}")]
    Observatory(#[from] crate::observatory::ObservatoryError),

    #[error("{0}")]
    Visibility(#[from] crate::visibility::VisibilityError),
}
