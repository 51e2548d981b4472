// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Power spectra of synthetic skies, from sky generation to binned P(k).

use rand::{rngs::StdRng, SeedableRng};

use eorsky::{
    cosmology::freq_to_redshift,
    pspec::{r_pspec_sphere, tlmk_transform, PatchGeometry, RadialMethod, SphereSpectrumConfig},
    CosmologyModel, EorskyError, FlatLambdaCdm, Healpix, SkyModel,
};

use super::init_logger;

/// Descending frequencies, so comoving distances ascend.
fn freqs(num_channels: usize) -> Vec<f64> {
    (0..num_channels)
        .map(|i| 150e6 - 0.4e6 * i as f64)
        .collect()
}

#[test]
fn harmonic_spectrum_of_a_noise_sky() -> Result<(), EorskyError> {
    init_logger();
    let healpix = Healpix::new(8)?;
    let freqs = freqs(16);
    let cosmo = FlatLambdaCdm::wmap9();
    let mut rng = StdRng::seed_from_u64(100);
    let sky =
        SkyModel::gaussian_noise_voxel_scaled(healpix, freqs.clone(), 1, 1.0, &cosmo, &mut rng)?;

    let r_mpc = freqs
        .iter()
        .map(|&f| Ok(cosmo.comoving_distance(freq_to_redshift(f)?)))
        .collect::<Result<Vec<f64>, EorskyError>>()?;
    for pair in r_mpc.windows(2) {
        assert!(pair[1] > pair[0]);
    }

    let transform = tlmk_transform(sky.shell(0), &healpix, &r_mpc, None, None)?;
    let pk = transform.power_spectrum()?;
    assert_eq!(pk.len(), transform.wavenumbers.len());
    assert!(pk.count_valid() > 0);
    assert!(pk.compressed().iter().all(|p| p.is_finite() && *p >= 0.0));
    Ok(())
}

#[test]
fn sphere_spectrum_from_a_config_file() -> Result<(), EorskyError> {
    init_logger();
    let config: SphereSpectrumConfig = toml::from_str(
        r#"
radius_deg = 15.0
num_sections = 2
method = "lomb_scargle"
num_bins = 6
normalisation = "cosmological"
"#,
    )
    .unwrap();
    assert_eq!(config.method, RadialMethod::LombScargle);

    let healpix = Healpix::new(16)?;
    let freqs = freqs(12);
    let cosmo = FlatLambdaCdm::wmap9();
    let mut rng = StdRng::seed_from_u64(101);
    let sky = SkyModel::gaussian_noise(healpix, freqs.clone(), 1, 1.0, &mut rng)?;
    let geometry = PatchGeometry {
        freqs_hz: Some(freqs),
        ..Default::default()
    };

    let pk = r_pspec_sphere(sky.shell(0), &healpix, &config, &geometry, &cosmo, &mut rng)?;
    assert_eq!(pk.num_bins(), 6);
    assert!(pk.power.count_valid() > 0);
    assert!(pk.power.compressed().iter().all(|p| p.is_finite() && *p >= 0.0));
    let errors = pk.errors.expect("sigma is always requested for patches");
    assert_eq!(errors.len(), 6);
    Ok(())
}

#[test]
fn missing_geometry_is_an_error() {
    init_logger();
    let healpix = Healpix::new(4).unwrap();
    let mut rng = StdRng::seed_from_u64(102);
    let sky = SkyModel::gaussian_noise(healpix, freqs(4), 1, 1.0, &mut rng).unwrap();
    let result = r_pspec_sphere(
        sky.shell(0),
        &healpix,
        &SphereSpectrumConfig::new(20.0),
        &PatchGeometry::default(),
        &FlatLambdaCdm::wmap9(),
        &mut rng,
    );
    let err: EorskyError = result.unwrap_err().into();
    assert!(matches!(err, EorskyError::Pspec(_)));
}
