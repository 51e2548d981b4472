// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with binning statistics.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BinError {
    #[error("Cannot bin into zero bins")]
    ZeroBins,

    #[error("Nothing to bin; the sample array is empty")]
    NoSamples,

    #[error("Got {magnitudes} wavenumber magnitudes but {samples} samples")]
    LengthMismatch { magnitudes: usize, samples: usize },

    #[error("Wavenumber axis {axis} has {got} elements, but the power cube's axis has {expected}")]
    AxisMismatch {
        axis: usize,
        got: usize,
        expected: usize,
    },

    #[error("Wavenumber grid {axis} has shape {got:?}, but the power cube has shape {expected:?}")]
    GridMismatch {
        axis: usize,
        got: [usize; 3],
        expected: [usize; 3],
    },

    #[error("Wavenumber magnitudes must be finite")]
    NonFiniteMagnitude,
}
