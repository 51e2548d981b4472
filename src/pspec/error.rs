// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with power-spectrum estimation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PspecError {
    #[error("Frequency data must be provided to use the Lomb-Scargle method")]
    LombScargleNeedsFrequencies,

    #[error("Frequency data must be provided to use the pyramid method")]
    PyramidNeedsFrequencies,

    #[error("Box dimensions, frequencies or an angular-diameter distance must be provided")]
    MissingGeometry,

    #[error("Box dimensions must be positive and finite, but got {lx} x {ly} x {lz} Mpc")]
    InvalidBoxDims { lx: f64, ly: f64, lz: f64 },

    #[error("Expected {expected} {what}, but got {got}")]
    RadialLengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("At least two radial samples are needed, but got {0}")]
    TooFewChannels(usize),

    #[error("At least three transverse pixels per side are needed to keep positive wavenumbers, but got {nx} x {ny}")]
    TooFewTransversePixels { nx: usize, ny: usize },

    #[error("No strictly-positive radial wavenumbers are available")]
    NoPositiveWavenumbers,

    #[error("The {what} have shape {got:?}, but {expected:?} was expected")]
    ShapeMismatch {
        what: &'static str,
        got: Vec<usize>,
        expected: Vec<usize>,
    },

    #[error("The number of sections must be at least 1")]
    ZeroSections,

    #[error("No candidate pixels were supplied for section centres")]
    NoCandidatePixels,

    #[error("The angular radius must be positive and finite, but got {0} degrees")]
    InvalidRadius(f64),

    #[error("The cube contains no cells")]
    EmptyCube,

    #[error("The radial distances do not span a non-zero range")]
    DegenerateRadialSpacing,

    #[error("{0}")]
    Bin(#[from] crate::binning::BinError),

    #[error("{0}")]
    Healpix(#[from] crate::healpix::HealpixError),

    #[error("{0}")]
    Cosmology(#[from] crate::cosmology::CosmologyError),
}
