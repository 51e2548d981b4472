// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Observatory geometry: antennas, baselines, pointings and the visible patch
//! of sky.
//!
//! All positions are local east-north-up (ENU) coordinates in metres. Sky
//! directions are described by azimuth (east of north) and zenith angle, both
//! in radians. Sidereal time and the equatorial to horizon conversion come
//! from `marlu`.

mod error;

pub use error::ObservatoryError;

use hifitime::{Duration, Epoch};
use itertools::Itertools;
use log::{debug, info, trace};
use marlu::{precession::get_lmst, RADec, ENH, UVW};
use ndarray::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    beam::{BeamConfig, PrimaryBeam},
    c64,
    constants::{FRAC_PI_2, TAU, VEL_C},
    healpix::{ang2vec, Healpix},
    math::cexp,
};

/// A position in local east-north-up coordinates \[metres\].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Enu {
    pub e: f64,
    pub n: f64,
    pub u: f64,
}

impl Enu {
    fn dot(self, v: [f64; 3]) -> f64 {
        self.e * v[0] + self.n * v[1] + self.u * v[2]
    }

    fn norm(self) -> f64 {
        self.dot([self.e, self.n, self.u]).sqrt()
    }

    fn reversed(self) -> Enu {
        Enu {
            e: -self.e,
            n: -self.n,
            u: -self.u,
        }
    }

    fn to_enh(self) -> ENH {
        ENH {
            e: self.e,
            n: self.n,
            h: self.u,
        }
    }
}

impl std::ops::Sub for Enu {
    type Output = Enu;

    fn sub(self, rhs: Enu) -> Enu {
        Enu {
            e: self.e - rhs.e,
            n: self.n - rhs.n,
            u: self.u - rhs.u,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Antenna {
    pub number: u32,
    pub position: Enu,
}

/// The separation between two antennas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub ant1: u32,
    pub ant2: u32,

    /// `ant2`'s position minus `ant1`'s position.
    pub enu: Enu,
}

impl Baseline {
    pub fn new(ant1: &Antenna, ant2: &Antenna) -> Baseline {
        Baseline {
            ant1: ant1.number,
            ant2: ant2.number,
            enu: ant2.position - ant1.position,
        }
    }

    /// The baseline vector in wavelengths at `freq_hz`, phased to zenith.
    pub fn uvw(&self, freq_hz: f64) -> [f64; 3] {
        let scale = freq_hz / VEL_C;
        [self.enu.e * scale, self.enu.n * scale, self.enu.u * scale]
    }

    /// The baseline's projection onto the direction (`az`, `za`) \[metres\].
    pub fn delay_length(&self, az: f64, za: f64) -> f64 {
        self.enu.dot(enu_direction(az, za))
    }

    /// `exp(2πi b·ŝ / λ)` for the direction (`az`, `za`).
    pub fn fringe(&self, az: f64, za: f64, freq_hz: f64) -> c64 {
        cexp(TAU * self.delay_length(az, za) * freq_hz / VEL_C)
    }
}

/// The unit vector towards (`az`, `za`) in ENU coordinates.
pub fn enu_direction(az: f64, za: f64) -> [f64; 3] {
    let (s_az, c_az) = az.sin_cos();
    let (s_za, c_za) = za.sin_cos();
    [s_az * s_za, c_az * s_za, c_za]
}

/// Which baselines to keep when forming them from a list of antennas. The
/// stages apply in field order; an empty selection keeps every pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaselineSelection {
    /// Use exactly these (ant1, ant2) pairs instead of every pair.
    #[serde(default)]
    pub pairs: Option<Vec<(u32, u32)>>,

    /// Keep only baselines involving at least one of these antennas.
    #[serde(default)]
    pub antennas: Option<Vec<u32>>,

    /// Keep the first baseline of each redundant group. Two baselines are
    /// redundant if their separations (or one's and the other's reverse)
    /// differ by less than this many metres.
    #[serde(default)]
    pub redundancy_tol_m: Option<f64>,
}

/// Form cross-correlation baselines from `antennas`. By default, every pair
/// (a1, a2) with a1 > a2 by antenna number is used, in ascending order of
/// a2 and then a1.
pub fn baselines_from_antennas(
    antennas: &[Antenna],
    selection: Option<&BaselineSelection>,
) -> Result<Vec<Baseline>, ObservatoryError> {
    let mut antennas = antennas.to_vec();
    antennas.sort_unstable_by_key(|a| a.number);
    if let Some((a, _)) = antennas
        .iter()
        .tuple_windows()
        .find(|(a, b)| a.number == b.number)
    {
        return Err(ObservatoryError::DuplicateAntenna(a.number));
    }
    let find = |number: u32| {
        antennas
            .binary_search_by_key(&number, |a| a.number)
            .map(|i| &antennas[i])
            .map_err(|_| ObservatoryError::UnknownAntenna(number))
    };

    let selection = selection.cloned().unwrap_or_default();
    let mut baselines: Vec<Baseline> = match &selection.pairs {
        Some(pairs) => pairs
            .iter()
            .map(|&(a1, a2)| Ok(Baseline::new(find(a1)?, find(a2)?)))
            .collect::<Result<_, ObservatoryError>>()?,
        None => antennas
            .iter()
            .tuple_combinations()
            .map(|(low, high)| Baseline::new(high, low))
            .collect(),
    };

    if let Some(sel) = &selection.antennas {
        if !antennas.iter().any(|a| sel.contains(&a.number)) {
            return Err(ObservatoryError::EmptySelection(sel.clone()));
        }
        baselines.retain(|bl| sel.contains(&bl.ant1) || sel.contains(&bl.ant2));
    }

    if let Some(tol) = selection.redundancy_tol_m {
        if !(tol.is_finite() && tol > 0.0) {
            return Err(ObservatoryError::InvalidRedundancyTolerance(tol));
        }
        let mut unique: Vec<Baseline> = Vec::with_capacity(baselines.len());
        for bl in baselines {
            let redundant = unique.iter().any(|kept| {
                (bl.enu - kept.enu).norm() < tol || (bl.enu - kept.enu.reversed()).norm() < tol
            });
            if redundant {
                trace!("Baseline ({}, {}) is redundant", bl.ant1, bl.ant2);
            } else {
                unique.push(bl);
            }
        }
        baselines = unique;
    }

    debug!(
        "Formed {} baselines from {} antennas",
        baselines.len(),
        antennas.len()
    );
    Ok(baselines)
}

/// A pointing centre on the sky at an instant. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointing {
    pub ra: f64,
    pub dec: f64,
    pub epoch: Epoch,
}

impl Pointing {
    /// The pointing centre as a unit vector in equatorial coordinates.
    pub fn to_vec(&self) -> [f64; 3] {
        ang2vec(FRAC_PI_2 - self.dec, self.ra)
    }

    pub fn radec(&self) -> RADec {
        RADec {
            ra: self.ra,
            dec: self.dec,
        }
    }
}

/// Local mean sidereal time \[radians\] at `longitude_rad` east. UT1 is taken
/// to be UTC.
pub fn local_mean_sidereal_time(epoch: Epoch, longitude_rad: f64) -> f64 {
    get_lmst(longitude_rad, epoch, Duration::from_seconds(0.0)).rem_euclid(TAU)
}

/// The pixels within the field of view of a pointing, along with their
/// azimuths and zenith angles \[radians\].
#[derive(Debug, Clone, Default)]
pub struct FieldOfView {
    pub pixels: Vec<usize>,
    pub az: Vec<f64>,
    pub za: Vec<f64>,
}

impl FieldOfView {
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// A serialisable description of an [`Observatory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservatoryConfig {
    pub latitude_deg: f64,
    pub longitude_deg: f64,

    /// The full width of the visible patch \[degrees\].
    #[serde(default)]
    pub fov_deg: Option<f64>,

    pub antennas: Vec<Antenna>,

    #[serde(default)]
    pub selection: Option<BaselineSelection>,

    pub freqs_hz: Vec<f64>,

    #[serde(default)]
    pub beam: Option<BeamConfig>,
}

/// An interferometer at a site, with a beam and a set of pointings.
pub struct Observatory {
    latitude_deg: f64,
    longitude_deg: f64,
    baselines: Vec<Baseline>,
    freqs_hz: Vec<f64>,
    fov_deg: Option<f64>,
    beam: Option<Box<dyn PrimaryBeam>>,
    pointings: Vec<Pointing>,
}

impl std::fmt::Debug for Observatory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observatory")
            .field("latitude_deg", &self.latitude_deg)
            .field("longitude_deg", &self.longitude_deg)
            .field("num_baselines", &self.baselines.len())
            .field("num_freqs", &self.freqs_hz.len())
            .field("fov_deg", &self.fov_deg)
            .field("beam", &self.beam.as_ref().map(|b| b.beam_type()))
            .field("num_pointings", &self.pointings.len())
            .finish()
    }
}

impl Observatory {
    pub fn new(
        latitude_deg: f64,
        longitude_deg: f64,
        baselines: Vec<Baseline>,
        freqs_hz: Vec<f64>,
    ) -> Result<Observatory, ObservatoryError> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(ObservatoryError::InvalidLatitude(latitude_deg));
        }
        if freqs_hz.is_empty() || freqs_hz.iter().any(|f| !(f.is_finite() && *f > 0.0)) {
            return Err(ObservatoryError::InvalidFrequencies);
        }
        Ok(Observatory {
            latitude_deg,
            longitude_deg,
            baselines,
            freqs_hz,
            fov_deg: None,
            beam: None,
            pointings: vec![],
        })
    }

    pub fn from_config(config: &ObservatoryConfig) -> Result<Observatory, ObservatoryError> {
        let baselines = baselines_from_antennas(&config.antennas, config.selection.as_ref())?;
        let mut obs = Observatory::new(
            config.latitude_deg,
            config.longitude_deg,
            baselines,
            config.freqs_hz.clone(),
        )?;
        if let Some(fov) = config.fov_deg {
            obs.set_fov(fov)?;
        }
        if let Some(beam) = &config.beam {
            obs.set_beam(beam.build()?);
        }
        Ok(obs)
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    pub fn baselines(&self) -> &[Baseline] {
        &self.baselines
    }

    pub fn freqs_hz(&self) -> &[f64] {
        &self.freqs_hz
    }

    pub fn fov_deg(&self) -> Option<f64> {
        self.fov_deg
    }

    pub fn beam(&self) -> Option<&dyn PrimaryBeam> {
        self.beam.as_deref()
    }

    pub fn pointings(&self) -> &[Pointing] {
        &self.pointings
    }

    /// Set the full width of the visible patch \[degrees\].
    pub fn set_fov(&mut self, fov_deg: f64) -> Result<(), ObservatoryError> {
        if !(fov_deg > 0.0 && fov_deg <= 360.0) {
            return Err(ObservatoryError::InvalidFov(fov_deg));
        }
        self.fov_deg = Some(fov_deg);
        Ok(())
    }

    pub fn set_beam(&mut self, beam: Box<dyn PrimaryBeam>) {
        debug!("Using a {:?} beam", beam.beam_type());
        self.beam = Some(beam);
    }

    /// Point at zenith at each of `times`.
    pub fn set_pointings(&mut self, times: &[Epoch]) {
        let longitude = self.longitude_deg.to_radians();
        let dec = self.latitude_deg.to_radians();
        self.pointings = times
            .iter()
            .map(|&epoch| Pointing {
                ra: local_mean_sidereal_time(epoch, longitude),
                dec,
                epoch,
            })
            .collect();
        info!("Set {} zenith pointings", self.pointings.len());
    }

    /// Find the pixels within half the field of view of `pointing` and get
    /// their azimuths and zenith angles at the pointing's epoch.
    pub fn calc_azza(
        &self,
        healpix: &Healpix,
        pointing: &Pointing,
    ) -> Result<FieldOfView, ObservatoryError> {
        let fov = self.fov_deg.ok_or(ObservatoryError::MissingFov)?;
        let pixels = healpix.query_disc(pointing.to_vec(), (fov / 2.0).to_radians())?;

        let lst = local_mean_sidereal_time(pointing.epoch, self.longitude_deg.to_radians());
        let latitude = self.latitude_deg.to_radians();
        let (az, za): (Vec<f64>, Vec<f64>) = pixels
            .par_iter()
            .map(|&pix| {
                let (theta, phi) = healpix.pix2ang(pix);
                let azel = RADec {
                    ra: phi,
                    dec: FRAC_PI_2 - theta,
                }
                .to_hadec(lst)
                .to_azel(latitude);
                (azel.az.rem_euclid(TAU), azel.za())
            })
            .unzip();
        trace!("{} pixels in the field of view", pixels.len());
        Ok(FieldOfView { pixels, az, za })
    }

    /// The (u, v, w) coordinates of every baseline \[metres\], phased to
    /// `pointing`.
    pub fn baseline_uvws(&self, pointing: &Pointing) -> Vec<UVW> {
        let lst = local_mean_sidereal_time(pointing.epoch, self.longitude_deg.to_radians());
        let latitude = self.latitude_deg.to_radians();
        let phase_centre = pointing.radec().to_hadec(lst);
        self.baselines
            .iter()
            .map(|bl| UVW::from_xyz(bl.enu.to_enh().to_xyz(latitude), phase_centre))
            .collect()
    }

    /// `Σ A² Ω_pix` over the field of view of the first pointing, for each
    /// frequency.
    pub fn beam_squared_integral(
        &self,
        healpix: &Healpix,
    ) -> Result<Array1<f64>, ObservatoryError> {
        let beam = self.beam().ok_or(ObservatoryError::MissingBeam)?;
        let pointing = self.pointings.first().ok_or(ObservatoryError::NoPointings)?;
        let fov = self.calc_azza(healpix, pointing)?;
        let vals = beam.beam_val(&fov.az, &fov.za, &self.freqs_hz);
        Ok(vals.mapv(|v| v * v).sum_axis(Axis(0)) * healpix.pixel_area())
    }
}
