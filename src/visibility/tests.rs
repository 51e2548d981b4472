// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use hifitime::{Duration, Epoch};
use ndarray::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use super::*;
use crate::{
    beam::AnalyticBeam,
    constants::J2000_JD,
    healpix::Healpix,
    observatory::{Antenna, Enu},
};

const FREQS: [f64; 3] = [100e6, 125e6, 150e6];

fn antenna(number: u32, e: f64, n: f64) -> Antenna {
    Antenna {
        number,
        position: Enu { e, n, u: 0.0 },
    }
}

fn times(num_times: usize, step_minutes: f64) -> Vec<Epoch> {
    let t0 = Epoch::from_jde_utc(J2000_JD);
    (0..num_times)
        .map(|i| t0 + Duration::from_seconds(60.0 * step_minutes * i as f64))
        .collect()
}

fn observatory(baselines: Vec<Baseline>, beam: AnalyticBeam) -> Observatory {
    let mut obs =
        Observatory::new(-30.7215277777, 21.4283055554, baselines, FREQS.to_vec()).unwrap();
    obs.set_fov(45.0).unwrap();
    obs.set_beam(Box::new(beam));
    obs.set_pointings(&times(3, 10.0));
    obs
}

fn two_baselines() -> Vec<Baseline> {
    let a0 = antenna(0, 0.0, 0.0);
    let a1 = antenna(1, 0.0, 14.6);
    let a2 = antenna(2, 14.6, 0.0);
    vec![Baseline::new(&a1, &a0), Baseline::new(&a2, &a0)]
}

#[test]
fn zero_sky_gives_zero_visibilities() {
    let obs = observatory(two_baselines(), AnalyticBeam::uniform());
    let healpix = Healpix::new(16).unwrap();
    let sky =
        SkyModel::new(Array3::zeros((2, healpix.npix(), FREQS.len())), FREQS.to_vec()).unwrap();
    let vis = obs.make_visibilities(&sky, Some(2), false).unwrap();

    assert_eq!(vis.data.dim(), (3 * 2, 2, 3));
    assert_eq!(vis.num_times(), 3);
    assert_eq!(vis.baseline_indices, vec![0, 1, 0, 1, 0, 1]);
    let pointings = obs.pointings();
    assert_eq!(
        vis.times,
        vec![
            pointings[0].epoch,
            pointings[0].epoch,
            pointings[1].epoch,
            pointings[1].epoch,
            pointings[2].epoch,
            pointings[2].epoch
        ]
    );
    assert!(vis.data.iter().all(|v| *v == c64::default()));

    assert_eq!(vis.timestep(2).unwrap().dim(), (2, 2, 3));
    assert!(matches!(
        vis.timestep(3),
        Err(VisibilityError::BadTimeIndex {
            got: 3,
            num_times: 3
        })
    ));
}

#[test]
fn uniform_sky_on_zero_length_baseline_is_the_beam_integral() {
    let a = antenna(0, 5.0, 5.0);
    let b = antenna(1, 5.0, 5.0);
    let obs = observatory(vec![Baseline::new(&b, &a)], AnalyticBeam::gaussian(0.2).unwrap());
    let healpix = Healpix::new(16).unwrap();
    let sky =
        SkyModel::new(Array3::ones((1, healpix.npix(), FREQS.len())), FREQS.to_vec()).unwrap();
    let vis = obs.make_visibilities(&sky, None, false).unwrap();

    let fov = obs.calc_azza(&healpix, &obs.pointings()[0]).unwrap();
    let beam = obs.beam().unwrap().beam_val(&fov.az, &fov.za, &FREQS);
    let expected = beam.column(0).sum() * healpix.pixel_area();
    for &v in vis.timestep(0).unwrap().iter() {
        assert_abs_diff_eq!(v.re, expected, epsilon = 1e-10);
        assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-10);
    }
}

#[test]
fn point_source_matches_direct_sum() {
    let baselines = two_baselines();
    let obs = observatory(baselines.clone(), AnalyticBeam::airy(14.0).unwrap());
    let healpix = Healpix::new(32).unwrap();

    // A single bright pixel at the first pointing centre.
    let pointing = obs.pointings()[0];
    let pix = healpix.vec2pix(pointing.to_vec());
    let mut data = Array3::zeros((1, healpix.npix(), FREQS.len()));
    data.slice_mut(s![0, pix, ..]).assign(&array![1.0, 2.0, 3.0]);
    let sky = SkyModel::new(data, FREQS.to_vec()).unwrap();
    let vis = obs.make_visibilities(&sky, Some(1), false).unwrap();

    let fov = obs.calc_azza(&healpix, &pointing).unwrap();
    let i = fov.pixels.iter().position(|&p| p == pix).unwrap();
    let (az, za) = (fov.az[i], fov.za[i]);
    let beam = AnalyticBeam::airy(14.0).unwrap();
    for (i_bl, bl) in baselines.iter().enumerate() {
        for (i_freq, &freq) in FREQS.iter().enumerate() {
            let expected = bl.fringe(az, za, freq)
                * (i_freq as f64 + 1.0)
                * beam.response(za, freq)
                * healpix.pixel_area();
            assert_abs_diff_eq!(vis.data[(i_bl, 0, i_freq)], expected, epsilon = 1e-14);
        }
    }
}

#[test]
fn reversed_baselines_are_conjugate() {
    let a = antenna(0, 0.0, 0.0);
    let b = antenna(1, 8.0, 11.0);
    let obs = observatory(
        vec![Baseline::new(&a, &b), Baseline::new(&b, &a)],
        AnalyticBeam::gaussian(0.3).unwrap(),
    );
    let mut rng = StdRng::seed_from_u64(3);
    let sky = SkyModel::gaussian_noise(Healpix::new(16).unwrap(), FREQS.to_vec(), 1, 1.0, &mut rng)
        .unwrap();
    let vis = obs.make_visibilities(&sky, Some(2), false).unwrap();
    for t in 0..vis.num_times() {
        let step = vis.timestep(t).unwrap();
        for i_freq in 0..FREQS.len() {
            assert_abs_diff_eq!(
                step[(0, 0, i_freq)],
                step[(1, 0, i_freq)].conj(),
                epsilon = 1e-12
            );
        }
    }
}

#[test]
fn results_do_not_depend_on_thread_count() {
    let obs = observatory(two_baselines(), AnalyticBeam::gaussian(0.25).unwrap());
    let mut rng = StdRng::seed_from_u64(11);
    let sky = SkyModel::gaussian_noise(Healpix::new(16).unwrap(), FREQS.to_vec(), 2, 2.0, &mut rng)
        .unwrap();
    let serial = obs.make_visibilities(&sky, Some(1), false).unwrap();
    let parallel = obs.make_visibilities(&sky, Some(4), false).unwrap();
    assert_eq!(serial.data, parallel.data);
}

#[test]
fn configuration_errors_are_reported() {
    let healpix = Healpix::new(8).unwrap();
    let sky =
        SkyModel::new(Array3::zeros((1, healpix.npix(), FREQS.len())), FREQS.to_vec()).unwrap();

    let mut obs = Observatory::new(0.0, 0.0, two_baselines(), FREQS.to_vec()).unwrap();
    assert!(matches!(
        obs.make_visibilities(&sky, None, false),
        Err(VisibilityError::Observatory(ObservatoryError::MissingBeam))
    ));
    obs.set_beam(Box::new(AnalyticBeam::uniform()));
    assert!(matches!(
        obs.make_visibilities(&sky, None, false),
        Err(VisibilityError::Observatory(ObservatoryError::MissingFov))
    ));
    obs.set_fov(30.0).unwrap();
    assert!(matches!(
        obs.make_visibilities(&sky, None, false),
        Err(VisibilityError::Observatory(ObservatoryError::NoPointings))
    ));
    obs.set_pointings(&times(2, 1.0));
    assert!(matches!(
        obs.make_visibilities(&sky, Some(0), false),
        Err(VisibilityError::NoThreads(0))
    ));

    let wrong_count =
        SkyModel::new(Array3::zeros((1, healpix.npix(), 2)), vec![100e6, 125e6]).unwrap();
    assert!(matches!(
        obs.make_visibilities(&wrong_count, None, false),
        Err(VisibilityError::FrequencyCountMismatch {
            sky: 2,
            observatory: 3
        })
    ));
    let wrong_freqs =
        SkyModel::new(Array3::zeros((1, healpix.npix(), 3)), vec![100e6, 125e6, 175e6]).unwrap();
    assert!(matches!(
        obs.make_visibilities(&wrong_freqs, None, false),
        Err(VisibilityError::FrequencyMismatch { .. })
    ));

    let mut empty = Observatory::new(0.0, 0.0, vec![], FREQS.to_vec()).unwrap();
    empty.set_beam(Box::new(AnalyticBeam::uniform()));
    empty.set_fov(30.0).unwrap();
    empty.set_pointings(&times(1, 1.0));
    assert!(matches!(
        empty.make_visibilities(&sky, None, false),
        Err(VisibilityError::Observatory(ObservatoryError::NoBaselines))
    ));
}

#[test]
fn lag_correlation_is_one_at_zero_lag_and_symmetric() {
    let mut obs = observatory(two_baselines(), AnalyticBeam::gaussian(0.2).unwrap());
    obs.set_pointings(&times(5, 10.0));
    let mut rng = StdRng::seed_from_u64(5);
    let sky = SkyModel::gaussian_noise(Healpix::new(16).unwrap(), FREQS.to_vec(), 1, 1.0, &mut rng)
        .unwrap();
    let vis = obs.make_visibilities(&sky, None, false).unwrap();

    let corr = vis.lag_correlation(1, 0, 9).unwrap();
    assert_eq!(corr.lags_min.len(), 9);
    // Lags run from -40 to 40 minutes; the middle bin only holds zero lag.
    assert_abs_diff_eq!(corr.lags_min[4], 0.0, epsilon = 1e-9);
    assert_eq!(corr.counts[4], 5);
    assert_abs_diff_eq!(corr.correlation.get(4).unwrap(), 1.0, epsilon = 1e-12);
    // ±10 minutes.
    assert_eq!(corr.counts[3], 4);
    assert_eq!(corr.counts[5], 4);
    assert_abs_diff_eq!(
        corr.correlation.get(3).unwrap(),
        corr.correlation.get(5).unwrap(),
        epsilon = 1e-12
    );
    for r in corr.correlation.compressed() {
        assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(&r));
    }

    assert!(matches!(
        vis.lag_correlation(2, 0, 9),
        Err(VisibilityError::BadBaselineIndex { .. })
    ));
    assert!(matches!(
        vis.lag_correlation(0, 1, 9),
        Err(VisibilityError::BadSkyIndex { .. })
    ));
}

#[test]
fn point_source_at_centre_has_zero_phase_on_zero_length_baseline() {
    let a = antenna(0, 3.0, -2.0);
    let b = antenna(1, 3.0, -2.0);
    let obs = observatory(vec![Baseline::new(&b, &a)], AnalyticBeam::airy(6.0).unwrap());
    let healpix = Healpix::new(16).unwrap();
    let pix = healpix.vec2pix(obs.pointings()[0].to_vec());
    let mut data = Array3::zeros((1, healpix.npix(), FREQS.len()));
    data.slice_mut(s![0, pix, ..]).fill(5.0);
    let sky = SkyModel::new(data, FREQS.to_vec()).unwrap();

    let vis = obs.make_visibilities(&sky, None, false).unwrap();
    for &v in vis.timestep(0).unwrap().iter() {
        assert!(v.re > 0.0);
        assert_eq!(v.arg(), 0.0);
    }
}
