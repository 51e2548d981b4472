// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visibilities of noise skies, from an observatory config to simulated data.

use approx::assert_relative_eq;
use hifitime::Epoch;
use rand::{rngs::StdRng, SeedableRng};

use eorsky::{
    constants::J2000_JD, EorskyError, Healpix, Observatory, ObservatoryConfig, SkyModel,
};

use super::init_logger;

const CONFIG: &str = r#"
latitude_deg = -30.7215277777
longitude_deg = 21.4283055554
fov_deg = 60.0
freqs_hz = [100e6, 110e6, 120e6, 130e6]
beam = { type = "gaussian", sigma_deg = 8.0 }

[[antennas]]
number = 0
position = { e = 0.0, n = 0.0, u = 0.0 }

[[antennas]]
number = 1
position = { e = 0.0, n = 14.6, u = 0.0 }
"#;

/// For white noise of variance σ², <|V|²> = σ² Ω_pix Σ A² Ω_pix.
#[test]
fn noise_visibility_variance_matches_beam_integral() -> Result<(), EorskyError> {
    init_logger();
    let config: ObservatoryConfig = toml::from_str(CONFIG).unwrap();
    let mut obs = Observatory::from_config(&config)?;
    assert_eq!(obs.baselines().len(), 1);
    obs.set_pointings(&[Epoch::from_jde_utc(J2000_JD)]);

    let healpix = Healpix::new(32)?;
    let sigma = 2.0;
    let num_skies = 100;
    let mut rng = StdRng::seed_from_u64(200);
    let sky = SkyModel::gaussian_noise(
        healpix,
        config.freqs_hz.clone(),
        num_skies,
        sigma,
        &mut rng,
    )?;

    let vis = obs.make_visibilities(&sky, Some(2), false)?;
    assert_eq!(vis.data.dim(), (1, num_skies, 4));

    let bsq = obs.beam_squared_integral(&healpix)?;
    let expected = sigma * sigma * healpix.pixel_area() * bsq.mean().unwrap();
    let measured = vis.data.iter().map(|v| v.norm_sqr()).sum::<f64>() / vis.data.len() as f64;
    assert_relative_eq!(measured, expected, max_relative = 0.25);
    Ok(())
}

#[test]
fn noise_visibilities_decorrelate_with_time() -> Result<(), EorskyError> {
    init_logger();
    let config: ObservatoryConfig = toml::from_str(CONFIG).unwrap();
    let mut obs = Observatory::from_config(&config)?;
    let t0 = Epoch::from_jde_utc(J2000_JD);
    let times: Vec<Epoch> = (0..6)
        .map(|i| t0 + hifitime::Duration::from_seconds(1800.0 * i as f64))
        .collect();
    obs.set_pointings(&times);

    let mut rng = StdRng::seed_from_u64(201);
    let sky = SkyModel::gaussian_noise(
        Healpix::new(16)?,
        config.freqs_hz.clone(),
        1,
        1.0,
        &mut rng,
    )?;
    let vis = obs.make_visibilities(&sky, None, false)?;
    assert_eq!(vis.num_times(), 6);

    let corr = vis.lag_correlation(0, 0, 11)?;
    assert_eq!(corr.lags_min.len(), 11);
    // Zero lag sits in the middle bin.
    assert_relative_eq!(corr.correlation.get(5).unwrap(), 1.0, max_relative = 1e-12);
    Ok(())
}
