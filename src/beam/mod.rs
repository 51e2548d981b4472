// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to abstract primary-beam calculations.
//!
//! [`PrimaryBeam`] is a trait detailing how to get beam responses for a set of
//! sky directions and frequencies. By making this trait, the visibility
//! integrator does not need to care which beam model it was handed. The only
//! implementor in this crate is [`AnalyticBeam`], which covers uniform,
//! Gaussian and Airy responses.
//!
//! All responses are power responses normalised to 1 at zenith.

mod analytic;
mod error;

pub use analytic::AnalyticBeam;
pub use error::BeamError;

use log::debug;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::FWHM_FACTOR;

/// Supported beam types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamType {
    /// A response of 1 everywhere.
    Uniform,

    /// A Gaussian in zenith angle with a frequency-independent width.
    Gaussian,

    /// The Airy pattern of a uniformly-illuminated circular aperture.
    Airy,
}

/// A trait abstracting beam code functions.
pub trait PrimaryBeam: Sync + Send {
    /// Get the type of beam.
    fn beam_type(&self) -> BeamType;

    /// Calculate the beam response for each direction and frequency. `az` and
    /// `za` are in radians and must have the same length. The returned array
    /// has shape (num. directions, num. frequencies).
    fn beam_val(&self, az: &[f64], za: &[f64], freqs_hz: &[f64]) -> Array2<f64>;
}

/// A serialisable description of a beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BeamConfig {
    Uniform,

    /// Exactly one of `sigma_deg` and `fwhm_deg` must be given.
    Gaussian {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sigma_deg: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fwhm_deg: Option<f64>,
    },

    Airy {
        diameter_m: f64,
    },
}

impl BeamConfig {
    /// Create the beam object described by this config.
    pub fn build(&self) -> Result<Box<dyn PrimaryBeam>, BeamError> {
        let beam = match *self {
            BeamConfig::Uniform => AnalyticBeam::uniform(),
            BeamConfig::Gaussian {
                sigma_deg: Some(sigma),
                fwhm_deg: None,
            } => AnalyticBeam::gaussian(sigma.to_radians())?,
            BeamConfig::Gaussian {
                sigma_deg: None,
                fwhm_deg: Some(fwhm),
            } => {
                debug!("Converting Gaussian FWHM {fwhm}° to a width");
                AnalyticBeam::gaussian((fwhm / FWHM_FACTOR).to_radians())?
            }
            BeamConfig::Gaussian { .. } => return Err(BeamError::GaussianWidth),
            BeamConfig::Airy { diameter_m } => AnalyticBeam::airy(diameter_m)?,
        };
        Ok(Box::new(beam))
    }
}
