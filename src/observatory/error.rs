// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with observatory geometry.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservatoryError {
    #[error("Latitude must be within [-90, 90] degrees, but got {0}")]
    InvalidLatitude(f64),

    #[error("The field of view must be within (0, 360] degrees, but got {0}")]
    InvalidFov(f64),

    #[error("Observing frequencies must be positive and finite and there must be at least one")]
    InvalidFrequencies,

    #[error("The field of view has not been set")]
    MissingFov,

    #[error("The primary beam has not been set")]
    MissingBeam,

    #[error("No pointings have been set")]
    NoPointings,

    #[error("The observatory has no baselines")]
    NoBaselines,

    #[error("Antenna number {0} appears more than once")]
    DuplicateAntenna(u32),

    #[error("No antennas matched the requested selection {0:?}")]
    EmptySelection(Vec<u32>),

    #[error("Antenna number {0} was selected but is not in the array")]
    UnknownAntenna(u32),

    #[error("The redundancy tolerance must be positive and finite, but got {0} metres")]
    InvalidRedundancyTolerance(f64),

    #[error(transparent)]
    Beam(#[from] crate::beam::BeamError),

    #[error(transparent)]
    Healpix(#[from] crate::healpix::HealpixError),
}
