// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with generating visibilities.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisibilityError {
    #[error("The sky model has {sky} frequencies but the observatory has {observatory}")]
    FrequencyCountMismatch { sky: usize, observatory: usize },

    #[error("Sky frequency {sky} Hz doesn't match observatory frequency {observatory} Hz")]
    FrequencyMismatch { sky: f64, observatory: f64 },

    #[error("Asked for {0} worker threads; at least one is needed")]
    NoThreads(usize),

    #[error("Time index {got} is out of range; there are {num_times} time steps")]
    BadTimeIndex { got: usize, num_times: usize },

    #[error("Baseline index {got} is out of range; there are {num_baselines} baselines")]
    BadBaselineIndex { got: usize, num_baselines: usize },

    #[error("Sky index {got} is out of range; there are {num_skies} skies")]
    BadSkyIndex { got: usize, num_skies: usize },

    #[error("Need at least two time steps to correlate, but got {0}")]
    TooFewTimes(usize),

    #[error(transparent)]
    Observatory(#[from] crate::observatory::ObservatoryError),

    #[error(transparent)]
    Bin(#[from] crate::binning::BinError),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    ProgressTemplate(#[from] indicatif::style::TemplateError),
}
