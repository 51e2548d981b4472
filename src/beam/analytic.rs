// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code for analytic beam calculations.

use log::debug;
use ndarray::prelude::*;
use rayon::prelude::*;

use super::{BeamError, BeamType, PrimaryBeam};
use crate::{
    constants::{PI, VEL_C},
    math::bessel_j1,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Uniform,
    /// Width in radians.
    Gaussian { sigma: f64 },
    /// Dish diameter in metres.
    Airy { diameter: f64 },
}

/// A beam whose response is a closed-form function of zenith angle (and, for
/// the Airy beam, frequency). Azimuth is ignored; all shapes are azimuthally
/// symmetric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticBeam {
    shape: Shape,
}

impl AnalyticBeam {
    pub fn uniform() -> AnalyticBeam {
        AnalyticBeam {
            shape: Shape::Uniform,
        }
    }

    /// A Gaussian beam `exp(-za² / 2σ²)`. `sigma` is in radians.
    pub fn gaussian(sigma: f64) -> Result<AnalyticBeam, BeamError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(BeamError::InvalidWidth(sigma));
        }
        debug!("Gaussian beam with sigma = {}°", sigma.to_degrees());
        Ok(AnalyticBeam {
            shape: Shape::Gaussian { sigma },
        })
    }

    /// An Airy beam `(2 J1(x) / x)²` with `x = π D sin(za) ν / c`.
    pub fn airy(diameter_m: f64) -> Result<AnalyticBeam, BeamError> {
        if !(diameter_m.is_finite() && diameter_m > 0.0) {
            return Err(BeamError::InvalidDiameter(diameter_m));
        }
        debug!("Airy beam with dish diameter {diameter_m} m");
        Ok(AnalyticBeam {
            shape: Shape::Airy {
                diameter: diameter_m,
            },
        })
    }

    /// The response in a single direction at a single frequency.
    pub fn response(&self, za: f64, freq_hz: f64) -> f64 {
        match self.shape {
            Shape::Uniform => 1.0,
            Shape::Gaussian { sigma } => (-za * za / (2.0 * sigma * sigma)).exp(),
            Shape::Airy { diameter } => {
                let x = PI * diameter * za.sin() * freq_hz / VEL_C;
                if x.abs() < 1e-10 {
                    1.0
                } else {
                    let j = 2.0 * bessel_j1(x) / x;
                    j * j
                }
            }
        }
    }
}

impl PrimaryBeam for AnalyticBeam {
    fn beam_type(&self) -> BeamType {
        match self.shape {
            Shape::Uniform => BeamType::Uniform,
            Shape::Gaussian { .. } => BeamType::Gaussian,
            Shape::Airy { .. } => BeamType::Airy,
        }
    }

    fn beam_val(&self, az: &[f64], za: &[f64], freqs_hz: &[f64]) -> Array2<f64> {
        debug_assert_eq!(az.len(), za.len());
        let mut out = Array2::zeros((za.len(), freqs_hz.len()));
        out.outer_iter_mut()
            .into_par_iter()
            .zip(za.par_iter())
            .for_each(|(mut row, &za)| {
                row.iter_mut()
                    .zip(freqs_hz)
                    .for_each(|(r, &freq)| *r = self.response(za, freq));
            });
        out
    }
}
