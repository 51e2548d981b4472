// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Power spectra of HEALPix shells from projected sky patches.

use log::{debug, info, warn};
use ndarray::prelude::*;
use rand::{seq::SliceRandom, Rng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ls_pspec_1d, pyramid_pspec, r_pspec_1d, BoxDims, Normalisation, PspecError};
use crate::{
    binning::BinnedPowerSpectrum,
    constants::DEFAULT_NUM_K_BINS,
    cosmology::{freq_to_redshift, CosmologyModel},
    healpix::{CartesianProjection, Healpix},
    math::MaskedArray1,
};

/// How the radial axis of each projected cube is transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadialMethod {
    /// [`r_pspec_1d`].
    #[default]
    Rectilinear,

    /// [`ls_pspec_1d`]. Needs frequencies.
    LombScargle,

    /// [`pyramid_pspec`]. Needs frequencies.
    Pyramid,
}

/// Settings for [`r_pspec_sphere`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SphereSpectrumConfig {
    /// Angular radius of each patch \[degrees\].
    pub radius_deg: f64,

    /// The number of independent patches to average over.
    #[serde(default = "default_num_sections")]
    pub num_sections: usize,

    #[serde(default)]
    pub method: RadialMethod,

    #[serde(default = "default_num_bins")]
    pub num_bins: usize,

    /// Only used by the rectilinear method.
    #[serde(default)]
    pub normalisation: Normalisation,

    /// Pixels that patch centres are drawn from. All pixels if absent.
    #[serde(default)]
    pub candidate_pixels: Option<Vec<usize>>,

    /// Radial frequencies \[cycles/Mpc\] for the Lomb-Scargle method.
    #[serde(default)]
    pub radial_freqs: Option<Vec<f64>>,
}

fn default_num_sections() -> usize {
    1
}

fn default_num_bins() -> usize {
    DEFAULT_NUM_K_BINS
}

impl SphereSpectrumConfig {
    pub fn new(radius_deg: f64) -> SphereSpectrumConfig {
        SphereSpectrumConfig {
            radius_deg,
            num_sections: default_num_sections(),
            method: RadialMethod::default(),
            num_bins: default_num_bins(),
            normalisation: Normalisation::default(),
            candidate_pixels: None,
            radial_freqs: None,
        }
    }
}

/// What is known about the physical extent of the shell. At least one of
/// `dims`, `freqs_hz` and `distance_mpc` is needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchGeometry {
    /// Physical box dimensions \[Mpc\], used as given.
    pub dims: Option<BoxDims>,

    /// The frequency of each channel \[Hz\]. Distances follow from the 21-cm
    /// redshift.
    pub freqs_hz: Option<Vec<f64>>,

    /// The comoving distance of each channel \[Mpc\], overriding distances
    /// derived from frequencies.
    pub r_mpc: Option<Vec<f64>>,

    /// A fixed angular-diameter distance \[Mpc\]; the box is then a cube
    /// `2 * radius * distance` on a side.
    pub distance_mpc: Option<f64>,
}

/// Everything needed to process one section.
struct ResolvedGeometry {
    dims: BoxDims,
    r_mpc: Option<Vec<f64>>,
    redshifts: Option<Vec<f64>>,
}

fn resolve_geometry(
    geometry: &PatchGeometry,
    radius: f64,
    method: RadialMethod,
    num_channels: usize,
    cosmo: &dyn CosmologyModel,
) -> Result<ResolvedGeometry, PspecError> {
    match (method, &geometry.freqs_hz) {
        (RadialMethod::LombScargle, None) => return Err(PspecError::LombScargleNeedsFrequencies),
        (RadialMethod::Pyramid, None) => return Err(PspecError::PyramidNeedsFrequencies),
        _ => (),
    }

    let redshifts = match &geometry.freqs_hz {
        Some(freqs) => {
            if freqs.len() != num_channels {
                return Err(PspecError::RadialLengthMismatch {
                    what: "frequencies",
                    got: freqs.len(),
                    expected: num_channels,
                });
            }
            Some(
                freqs
                    .iter()
                    .map(|&f| freq_to_redshift(f))
                    .collect::<Result<Vec<f64>, _>>()?,
            )
        }
        None => None,
    };
    let comoving = |zs: &[f64]| -> Vec<f64> {
        zs.iter().map(|&z| cosmo.comoving_distance(z)).collect()
    };

    let mut r_mpc = geometry.r_mpc.clone();
    let dims = match (geometry.dims, &redshifts, geometry.distance_mpc) {
        (Some(dims), _, _) => dims,
        (None, Some(zs), _) => {
            let r = r_mpc.get_or_insert_with(|| comoving(zs));
            let (r_lo, r_hi) = r
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                    (lo.min(x), hi.max(x))
                });
            let mean_z = zs.iter().sum::<f64>() / zs.len() as f64;
            let width = 2.0 * radius * cosmo.angular_diameter_distance(mean_z);
            BoxDims::new(width, width, r_hi - r_lo)?
        }
        (None, None, Some(distance)) => BoxDims::cube(2.0 * radius * distance)?,
        (None, None, None) => return Err(PspecError::MissingGeometry),
    };
    if r_mpc.is_none() && method != RadialMethod::Rectilinear {
        if let Some(zs) = &redshifts {
            r_mpc = Some(comoving(zs));
        }
    }
    debug!(
        "Box dimensions: {:.3} x {:.3} x {:.3} Mpc",
        dims.lx, dims.ly, dims.lz
    );

    Ok(ResolvedGeometry {
        dims,
        r_mpc,
        redshifts,
    })
}

/// Estimate the power spectrum of a HEALPix shell with shape (Npix,
/// Nchannels) by projecting patches of it onto Cartesian grids.
///
/// For each of `config.num_sections` sections, a centre pixel is drawn from
/// `rng`, the pixels within `config.radius_deg` of it are projected onto a
/// tangent-plane grid cropped to their bounding box, and the resulting cube
/// goes through the selected radial method. Each bin is averaged over the
/// sections in which it is valid; the bin centres of the last section are
/// reported.
pub fn r_pspec_sphere<R: Rng>(
    shell: ArrayView2<f64>,
    healpix: &Healpix,
    config: &SphereSpectrumConfig,
    geometry: &PatchGeometry,
    cosmo: &dyn CosmologyModel,
    rng: &mut R,
) -> Result<BinnedPowerSpectrum, PspecError> {
    let (num_pixels, num_channels) = shell.dim();
    healpix.check_map_len(num_pixels)?;
    if config.num_sections == 0 {
        return Err(PspecError::ZeroSections);
    }
    if !(config.radius_deg.is_finite() && config.radius_deg > 0.0) {
        return Err(PspecError::InvalidRadius(config.radius_deg));
    }
    let radius = config.radius_deg.to_radians();
    let resolved = resolve_geometry(geometry, radius, config.method, num_channels, cosmo)?;
    if let Some(r) = &resolved.r_mpc {
        if r.len() != num_channels {
            return Err(PspecError::RadialLengthMismatch {
                what: "radial distances",
                got: r.len(),
                expected: num_channels,
            });
        }
    }

    // Draw all of the centres up front so that the sections can be processed
    // in any order.
    let centres: Vec<usize> = match &config.candidate_pixels {
        Some(candidates) => {
            for &pix in candidates {
                healpix.check_pixel(pix)?;
            }
            (0..config.num_sections)
                .map(|_| candidates.choose(rng).copied())
                .collect::<Option<Vec<usize>>>()
                .ok_or(PspecError::NoCandidatePixels)?
        }
        None => (0..config.num_sections)
            .map(|_| rng.gen_range(0..num_pixels))
            .collect(),
    };
    info!(
        "Estimating power spectra of {} section(s) with radius {}°",
        centres.len(),
        config.radius_deg
    );

    let spectra = centres
        .par_iter()
        .enumerate()
        .map(|(i_section, &centre_pix)| {
            let cube = project_section(shell, healpix, centre_pix, radius)?;
            debug!(
                "Section {i_section}: centre pixel {centre_pix}, cube {:?}",
                cube.dim()
            );
            section_spectrum(cube.view(), config, &resolved, radius, cosmo)
        })
        .collect::<Result<Vec<_>, PspecError>>()?;

    Ok(average_sections(spectra))
}

/// Project the disc of `radius` around `centre_pix` onto a Cartesian cube,
/// cropped to the bounding box of the disc's pixels.
fn project_section(
    shell: ArrayView2<f64>,
    healpix: &Healpix,
    centre_pix: usize,
    radius: f64,
) -> Result<Array3<f64>, PspecError> {
    let centre = healpix.pix2vec(centre_pix);
    let disc = healpix.query_disc(centre, radius)?;
    let projection = CartesianProjection::for_disc(healpix, centre, radius)?;

    let (i_min, i_max, j_min, j_max) = disc
        .iter()
        .filter_map(|&pix| projection.vec2ij(healpix.pix2vec(pix)))
        .fold(None, |bounds, (i, j)| match bounds {
            None => Some((i, i, j, j)),
            Some((i0, i1, j0, j1)) => Some((i0.min(i), i1.max(i), j0.min(j), j1.max(j))),
        })
        .ok_or(PspecError::EmptyCube)?;

    let pixel_grid = projection.pixel_grid(healpix);
    let pixel_grid = pixel_grid.slice(s![i_min..=i_max, j_min..=j_max]);
    let (ni, nj) = pixel_grid.dim();
    Ok(Array3::from_shape_fn(
        (ni, nj, shell.ncols()),
        |(i, j, c)| shell[[pixel_grid[[i, j]], c]],
    ))
}

fn section_spectrum(
    cube: ArrayView3<f64>,
    config: &SphereSpectrumConfig,
    geometry: &ResolvedGeometry,
    radius: f64,
    cosmo: &dyn CosmologyModel,
) -> Result<BinnedPowerSpectrum, PspecError> {
    let r_mpc = geometry.r_mpc.as_deref();
    match config.method {
        RadialMethod::Rectilinear => r_pspec_1d(
            cube,
            geometry.dims,
            r_mpc,
            config.num_bins,
            true,
            config.normalisation,
        ),
        RadialMethod::LombScargle => ls_pspec_1d(
            cube,
            geometry.dims,
            r_mpc.ok_or(PspecError::LombScargleNeedsFrequencies)?,
            config.num_bins,
            true,
            config.radial_freqs.as_deref(),
        ),
        RadialMethod::Pyramid => pyramid_pspec(
            cube,
            radius,
            r_mpc.ok_or(PspecError::PyramidNeedsFrequencies)?,
            geometry
                .redshifts
                .as_deref()
                .ok_or(PspecError::PyramidNeedsFrequencies)?,
            cosmo,
            None,
            config.num_bins,
            true,
        ),
    }
}

/// Average spectra bin by bin over the spectra in which each bin is valid.
/// `spectra` must not be empty.
pub(super) fn average_sections(spectra: Vec<BinnedPowerSpectrum>) -> BinnedPowerSpectrum {
    let num_bins = spectra.iter().map(|s| s.num_bins()).max().unwrap_or(0);
    let mut power_sum = Array1::<f64>::zeros(num_bins);
    let mut error_sum = Array1::<f64>::zeros(num_bins);
    let mut valid = vec![0_usize; num_bins];
    let mut counts = vec![0_usize; num_bins];

    for spectrum in &spectra {
        for (i, p) in spectrum.power.iter().enumerate() {
            if let Some(p) = p {
                power_sum[i] += p;
                error_sum[i] += spectrum
                    .errors
                    .as_ref()
                    .and_then(|e| e.get(i))
                    .unwrap_or(0.0);
                valid[i] += 1;
            }
        }
        for (total, count) in counts.iter_mut().zip(&spectrum.counts) {
            *total += count;
        }
    }

    if let Some((last, others)) = spectra.split_last() {
        let differs = others.iter().any(|s| {
            s.k_bins
                .iter()
                .zip(last.k_bins.iter())
                .any(|(a, b)| (a - b).abs() > 1e-9 * b.abs().max(1.0))
        });
        if differs {
            warn!("Sections have different wavenumber bins; averaging them bin by bin anyway");
        }
    }
    let k_bins = spectra
        .last()
        .map(|s| s.k_bins.clone())
        .unwrap_or_else(|| Array1::zeros(num_bins));

    let mask = Array1::from_iter(valid.iter().map(|&v| v == 0));
    let divide = |sum: Array1<f64>| {
        Array1::from_iter(
            sum.iter()
                .zip(&valid)
                .map(|(&s, &v)| if v == 0 { 0.0 } else { s / v as f64 }),
        )
    };
    BinnedPowerSpectrum {
        k_bins,
        power: MaskedArray1::new(divide(power_sum), mask.clone()),
        errors: Some(MaskedArray1::new(divide(error_sum), mask)),
        counts,
    }
}
