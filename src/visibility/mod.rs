// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visibility generation.
//!
//! For each pointing, every pixel within the field of view contributes
//! `I(p, ν) A(p, ν) exp(2πi b·ŝ/λ) Ω_pix` to each baseline's visibility. Time
//! steps are independent, so each is modelled by its own task writing into
//! its own slab of the output array.

mod error;
#[cfg(test)]
mod tests;

pub use error::VisibilityError;

use hifitime::Epoch;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};
use ndarray::prelude::*;
use rayon::prelude::*;

use crate::{
    beam::PrimaryBeam,
    binning::binned_statistic,
    c64,
    constants::{TAU, VEL_C},
    math::{cexp, MaskedArray1},
    observatory::{Baseline, Observatory, ObservatoryError, Pointing},
    sky::SkyModel,
};

/// Simulated visibilities.
#[derive(Debug, Clone)]
pub struct Visibilities {
    /// Shape (num. times × num. baselines, num. skies, num. frequencies).
    /// Rows are time-major: all baselines of the first time step come first.
    pub data: Array3<c64>,

    /// The time of each row.
    pub times: Vec<Epoch>,

    /// The observatory baseline index of each row.
    pub baseline_indices: Vec<usize>,

    pub num_baselines: usize,
}

impl Visibilities {
    pub fn num_times(&self) -> usize {
        self.times.len() / self.num_baselines
    }

    /// All baselines at time step `i_time`, with shape (num. baselines, num.
    /// skies, num. frequencies).
    pub fn timestep(&self, i_time: usize) -> Result<ArrayView3<c64>, VisibilityError> {
        let num_times = self.num_times();
        if i_time >= num_times {
            return Err(VisibilityError::BadTimeIndex {
                got: i_time,
                num_times,
            });
        }
        let start = i_time * self.num_baselines;
        Ok(self.data.slice(s![start..start + self.num_baselines, .., ..]))
    }

    /// A single baseline and sky over all times, with shape (num. times, num.
    /// frequencies).
    pub fn baseline(
        &self,
        i_baseline: usize,
        i_sky: usize,
    ) -> Result<ArrayView2<c64>, VisibilityError> {
        if i_baseline >= self.num_baselines {
            return Err(VisibilityError::BadBaselineIndex {
                got: i_baseline,
                num_baselines: self.num_baselines,
            });
        }
        let num_skies = self.data.len_of(Axis(1));
        if i_sky >= num_skies {
            return Err(VisibilityError::BadSkyIndex {
                got: i_sky,
                num_skies,
            });
        }
        let step = self.num_baselines as isize;
        Ok(self.data.slice(s![i_baseline..;step, i_sky, ..]))
    }

    /// Correlate the visibility power spectra `|V(ν)|²` of every pair of time
    /// steps for one baseline and sky, then average the correlation
    /// coefficients in `num_bins` bins of time lag.
    pub fn lag_correlation(
        &self,
        i_baseline: usize,
        i_sky: usize,
        num_bins: usize,
    ) -> Result<LagCorrelation, VisibilityError> {
        let vis = self.baseline(i_baseline, i_sky)?;
        let num_times = vis.len_of(Axis(0));
        if num_times < 2 {
            return Err(VisibilityError::TooFewTimes(num_times));
        }

        // Centre and normalise each row's |V|² so a dot product is Pearson's r.
        let rows: Vec<Vec<f64>> = vis
            .outer_iter()
            .map(|row| {
                let power: Vec<f64> = row.iter().map(|v| v.norm_sqr()).collect();
                let mean = power.iter().sum::<f64>() / power.len() as f64;
                let centred: Vec<f64> = power.iter().map(|p| p - mean).collect();
                let norm = centred.iter().map(|c| c * c).sum::<f64>().sqrt();
                centred.into_iter().map(|c| c / norm).collect()
            })
            .collect();

        let t0 = self.times[0];
        let minutes: Vec<f64> = self
            .times
            .iter()
            .skip(i_baseline)
            .step_by(self.num_baselines)
            .map(|&t| (t - t0).to_seconds() / 60.0)
            .collect();

        let mut lags = Vec::with_capacity(num_times * num_times);
        let mut coeffs = Vec::with_capacity(num_times * num_times);
        for (row_i, &t_i) in rows.iter().zip(&minutes) {
            for (row_j, &t_j) in rows.iter().zip(&minutes) {
                let r: f64 = row_i.iter().zip(row_j).map(|(a, b)| a * b).sum();
                if r.is_finite() {
                    lags.push(t_j - t_i);
                    coeffs.push(r);
                }
            }
        }
        debug!(
            "Binning {} correlation coefficients into {num_bins} lag bins",
            coeffs.len()
        );

        let binned = binned_statistic(&lags, &coeffs, num_bins, false)?;
        Ok(LagCorrelation {
            lags_min: binned.k_bins,
            correlation: binned.power,
            counts: binned.counts,
        })
    }
}

/// Correlation coefficients averaged in bins of time lag.
#[derive(Debug, Clone)]
pub struct LagCorrelation {
    /// The centre of each lag bin \[minutes\].
    pub lags_min: Array1<f64>,

    /// The mean correlation coefficient in each bin. Empty bins are masked.
    pub correlation: MaskedArray1,

    pub counts: Vec<usize>,
}

impl Observatory {
    /// Generate visibilities of `sky` for every pointing and baseline.
    ///
    /// `num_threads` fixes the size of the worker pool; `None` uses rayon's
    /// default. The fov, beam and pointings must have been set.
    pub fn make_visibilities(
        &self,
        sky: &SkyModel,
        num_threads: Option<usize>,
        show_progress: bool,
    ) -> Result<Visibilities, VisibilityError> {
        let beam = self.beam().ok_or(ObservatoryError::MissingBeam)?;
        self.fov_deg().ok_or(ObservatoryError::MissingFov)?;
        if self.pointings().is_empty() {
            return Err(ObservatoryError::NoPointings.into());
        }
        if self.baselines().is_empty() {
            return Err(ObservatoryError::NoBaselines.into());
        }
        self.check_sky_freqs(sky.freqs_hz())?;

        let num_times = self.pointings().len();
        let num_baselines = self.baselines().len();
        let num_skies = sky.num_skies();
        let num_freqs = self.freqs_hz().len();
        info!(
            "Modelling {num_times} times × {num_baselines} baselines × {num_skies} skies × {num_freqs} frequencies"
        );

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = num_threads {
            if n == 0 {
                return Err(VisibilityError::NoThreads(n));
            }
            builder = builder.num_threads(n);
        }
        let pool = builder.build()?;
        debug!("Using {} worker threads", pool.current_num_threads());

        let progress = ProgressBar::new(num_times as _)
            .with_style(
                ProgressStyle::default_bar()
                    .template(
                        "{msg}: [{wide_bar:.blue}] {pos:2}/{len:2} timesteps ({elapsed_precise}<{eta_precise})",
                    )?
                    .progress_chars("=> "),
            )
            .with_position(0)
            .with_message("Visibilities");
        progress.set_draw_target(if show_progress {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        });

        let mut data = Array3::zeros((num_times * num_baselines, num_skies, num_freqs));
        pool.install(|| {
            data.axis_chunks_iter_mut(Axis(0), num_baselines)
                .into_par_iter()
                .zip(self.pointings().par_iter())
                .try_for_each(|(vis_bsf, pointing)| {
                    self.model_timestep(vis_bsf, sky, beam, pointing)?;
                    progress.inc(1);
                    Ok::<_, VisibilityError>(())
                })
        })?;
        progress.finish_with_message("Finished generating visibilities");

        let times = self
            .pointings()
            .iter()
            .flat_map(|p| std::iter::repeat(p.epoch).take(num_baselines))
            .collect();
        let baseline_indices = (0..num_times).flat_map(|_| 0..num_baselines).collect();
        Ok(Visibilities {
            data,
            times,
            baseline_indices,
            num_baselines,
        })
    }

    fn check_sky_freqs(&self, sky_freqs: &[f64]) -> Result<(), VisibilityError> {
        if sky_freqs.len() != self.freqs_hz().len() {
            return Err(VisibilityError::FrequencyCountMismatch {
                sky: sky_freqs.len(),
                observatory: self.freqs_hz().len(),
            });
        }
        for (&sky, &observatory) in sky_freqs.iter().zip(self.freqs_hz()) {
            if (sky - observatory).abs() > 1e-9 * observatory {
                return Err(VisibilityError::FrequencyMismatch { sky, observatory });
            }
        }
        Ok(())
    }

    /// Model all baselines for a single pointing. `vis_bsf` has shape (num.
    /// baselines, num. skies, num. frequencies).
    fn model_timestep(
        &self,
        mut vis_bsf: ArrayViewMut3<c64>,
        sky: &SkyModel,
        beam: &dyn PrimaryBeam,
        pointing: &Pointing,
    ) -> Result<(), ObservatoryError> {
        let healpix = sky.healpix();
        let freqs = self.freqs_hz();
        let fov = self.calc_azza(&healpix, pointing)?;
        let beam_vals = beam.beam_val(&fov.az, &fov.za, freqs);

        // Beam-weighted brightness of the visible pixels, (sky, pixel, freq).
        let omega = healpix.pixel_area();
        let sky_data = sky.data();
        let weighted = Array3::from_shape_fn(
            (sky.num_skies(), fov.len(), freqs.len()),
            |(i_sky, i_pix, i_freq)| {
                sky_data[(i_sky, fov.pixels[i_pix], i_freq)] * beam_vals[(i_pix, i_freq)] * omega
            },
        );

        vis_bsf
            .outer_iter_mut()
            .into_par_iter()
            .zip(self.baselines().par_iter())
            .for_each(|(vis_sf, baseline)| {
                model_baseline(vis_sf, baseline, weighted.view(), &fov.az, &fov.za, freqs)
            });
        Ok(())
    }
}

fn model_baseline(
    mut vis_sf: ArrayViewMut2<c64>,
    baseline: &Baseline,
    weighted: ArrayView3<f64>,
    az: &[f64],
    za: &[f64],
    freqs_hz: &[f64],
) {
    let delays: Vec<f64> = az
        .iter()
        .zip(za)
        .map(|(&az, &za)| baseline.delay_length(az, za))
        .collect();
    let mut fringes = vec![c64::default(); delays.len()];
    for (i_freq, &freq) in freqs_hz.iter().enumerate() {
        let scale = TAU * freq / VEL_C;
        fringes
            .iter_mut()
            .zip(&delays)
            .for_each(|(f, &d)| *f = cexp(scale * d));
        for (i_sky, weighted_pf) in weighted.outer_iter().enumerate() {
            vis_sf[(i_sky, i_freq)] = weighted_pf
                .column(i_freq)
                .iter()
                .zip(&fringes)
                .map(|(&w, &f)| f * w)
                .sum();
        }
    }
}
