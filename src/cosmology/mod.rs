// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cosmological distance conversions.
//!
//! Anything needing distances takes a [`CosmologyModel`] explicitly; there is
//! no global cosmology. [`FlatLambdaCdm`] is the only supplied model. All
//! distances are in Mpc.

mod error;

pub use error::CosmologyError;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Number of Simpson intervals used per unit redshift when integrating
/// distances.
const INTERVALS_PER_UNIT_Z: f64 = 512.0;

/// Conversions between redshift and distance.
pub trait CosmologyModel: Send + Sync {
    /// The dimensionless Hubble parameter, E(z) = H(z) / H0.
    fn efunc(&self, z: f64) -> f64;

    /// c / H0 \[Mpc\].
    fn hubble_distance(&self) -> f64;

    /// Line-of-sight comoving distance to redshift `z` \[Mpc\].
    fn comoving_distance(&self, z: f64) -> f64 {
        self.hubble_distance() * integrate_inverse_efunc(|z| self.efunc(z), z)
    }

    /// Angular-diameter distance to redshift `z` \[Mpc\]. Flat geometry is
    /// assumed unless a model says otherwise.
    fn angular_diameter_distance(&self, z: f64) -> f64 {
        self.comoving_distance(z) / (1.0 + z)
    }

    /// Comoving volume per unit redshift per unit solid angle at `z`
    /// \[Mpc^3 sr^-1\].
    fn differential_comoving_volume(&self, z: f64) -> f64 {
        let d_c = self.comoving_distance(z);
        self.hubble_distance() * d_c * d_c / self.efunc(z)
    }
}

/// Composite Simpson integration of 1/E(z') from 0 to `z`.
fn integrate_inverse_efunc<F: Fn(f64) -> f64>(efunc: F, z: f64) -> f64 {
    if z == 0.0 {
        return 0.0;
    }
    // Simpson's rule needs an even number of intervals.
    let n = (((z.abs() * INTERVALS_PER_UNIT_Z).ceil() as usize).max(16) + 1) & !1;
    let h = z / n as f64;
    let mut sum = 1.0 / efunc(0.0) + 1.0 / efunc(z);
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight / efunc(i as f64 * h);
    }
    sum * h / 3.0
}

/// A spatially-flat Lambda-CDM cosmology with photons and massless neutrinos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlatLambdaCdmParams", into = "FlatLambdaCdmParams")]
pub struct FlatLambdaCdm {
    /// Hubble constant \[km/s/Mpc\].
    h0: f64,
    /// Matter density today, in units of the critical density.
    om0: f64,
    /// CMB temperature today \[K\].
    tcmb0: f64,
    /// Effective number of neutrino species.
    neff: f64,

    // Derived densities.
    ogamma0: f64,
    onu0: f64,
    ode0: f64,
}

/// The user-facing parameters of a [`FlatLambdaCdm`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlatLambdaCdmParams {
    h0: f64,
    om0: f64,
    #[serde(default = "default_tcmb0")]
    tcmb0: f64,
    #[serde(default = "default_neff")]
    neff: f64,
}

fn default_tcmb0() -> f64 {
    2.725
}

fn default_neff() -> f64 {
    3.04
}

impl TryFrom<FlatLambdaCdmParams> for FlatLambdaCdm {
    type Error = CosmologyError;

    fn try_from(p: FlatLambdaCdmParams) -> Result<Self, Self::Error> {
        FlatLambdaCdm::new(p.h0, p.om0, p.tcmb0, p.neff)
    }
}

impl From<FlatLambdaCdm> for FlatLambdaCdmParams {
    fn from(c: FlatLambdaCdm) -> Self {
        FlatLambdaCdmParams {
            h0: c.h0,
            om0: c.om0,
            tcmb0: c.tcmb0,
            neff: c.neff,
        }
    }
}

impl FlatLambdaCdm {
    pub fn new(h0: f64, om0: f64, tcmb0: f64, neff: f64) -> Result<FlatLambdaCdm, CosmologyError> {
        if !h0.is_finite() || h0 <= 0.0 {
            return Err(CosmologyError::InvalidHubbleConstant(h0));
        }
        if !(0.0..=1.0).contains(&om0) {
            return Err(CosmologyError::InvalidMatterDensity(om0));
        }
        if !(tcmb0 >= 0.0 && neff >= 0.0) {
            return Err(CosmologyError::InvalidRadiation { tcmb0, neff });
        }
        Ok(FlatLambdaCdm::from_valid_params(h0, om0, tcmb0, neff))
    }

    fn from_valid_params(h0: f64, om0: f64, tcmb0: f64, neff: f64) -> FlatLambdaCdm {
        // Critical density today [kg m^-3].
        let h0_si = h0 * 1000.0 / MPC_M;
        let critical_density = 3.0 * h0_si * h0_si / (8.0 * PI * GRAV_CONST);
        // Photon mass density today [kg m^-3].
        let photon_density = 4.0 * STEFAN_BOLTZMANN / VEL_C.powi(3) * tcmb0.powi(4);
        let ogamma0 = photon_density / critical_density;
        let onu0 = NEUTRINO_PHOTON_RATIO * neff * ogamma0;
        let ode0 = 1.0 - om0 - ogamma0 - onu0;

        FlatLambdaCdm {
            h0,
            om0,
            tcmb0,
            neff,
            ogamma0,
            onu0,
            ode0,
        }
    }

    /// The WMAP 9-year cosmology (Hinshaw et al. 2013, table 4).
    pub fn wmap9() -> FlatLambdaCdm {
        FlatLambdaCdm::from_valid_params(69.32, 0.2865, default_tcmb0(), default_neff())
    }

    pub fn h0(&self) -> f64 {
        self.h0
    }

    pub fn om0(&self) -> f64 {
        self.om0
    }

    /// Dark-energy density today, in units of the critical density.
    pub fn ode0(&self) -> f64 {
        self.ode0
    }

    /// Photon plus neutrino density today, in units of the critical density.
    pub fn or0(&self) -> f64 {
        self.ogamma0 + self.onu0
    }
}

impl Default for FlatLambdaCdm {
    fn default() -> Self {
        FlatLambdaCdm::wmap9()
    }
}

impl CosmologyModel for FlatLambdaCdm {
    fn efunc(&self, z: f64) -> f64 {
        let zp1 = 1.0 + z;
        (self.om0 * zp1.powi(3) + self.or0() * zp1.powi(4) + self.ode0).sqrt()
    }

    fn hubble_distance(&self) -> f64 {
        VEL_C_KM_S / self.h0
    }
}

/// The redshift of 21-cm emission observed at `freq_hz`.
pub fn freq_to_redshift(freq_hz: f64) -> Result<f64, CosmologyError> {
    if !freq_hz.is_finite() || freq_hz <= 0.0 {
        return Err(CosmologyError::InvalidFrequency(freq_hz));
    }
    Ok(F21_HZ / freq_hz - 1.0)
}

/// The comoving volume of a voxel \[Mpc^3\] centred (in frequency) on the
/// 21-cm redshift `z`, `dnu_hz` wide and subtending `omega_sr` steradians.
pub fn comoving_voxel_volume(
    cosmo: &dyn CosmologyModel,
    z: f64,
    dnu_hz: f64,
    omega_sr: f64,
) -> f64 {
    let nu0 = F21_HZ / (1.0 + z) - dnu_hz / 2.0;
    let nu1 = nu0 + dnu_hz;
    let dz = F21_HZ * (1.0 / nu0 - 1.0 / nu1);
    cosmo.differential_comoving_volume(z) * dz * omega_sr
}
