// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bessel functions.
//!
//! Spherical Bessel functions of the first kind are evaluated with upward
//! recurrence when the argument exceeds the order (where upward recurrence is
//! stable) and with Miller's downward recurrence otherwise. Tiny arguments use
//! the leading terms of the power series.

/// Recurrence values larger than this are rescaled during downward recurrence.
const RESCALE_THRESHOLD: f64 = 1e250;

/// Arguments below this use the small-argument series.
const SMALL_ARG: f64 = 1e-6;

/// Spherical Bessel function of the first kind, j_l(x).
///
/// # Examples
///
/// `assert_abs_diff_eq!(spherical_jn(0, 1.0), 1.0_f64.sin());`
pub fn spherical_jn(l: usize, x: f64) -> f64 {
    if x == 0.0 {
        return if l == 0 { 1.0 } else { 0.0 };
    }
    let ax = x.abs();
    let value = if ax < SMALL_ARG {
        small_arg_series(l, ax)
    } else if ax > l as f64 {
        upward_recurrence(l, ax)
    } else {
        miller_recurrence(l, ax)
    };
    // j_l(-x) = (-1)^l j_l(x).
    if x < 0.0 && l % 2 == 1 {
        -value
    } else {
        value
    }
}

/// j_l(x) ~ x^l / (2l+1)!! (1 - x^2 / (2 (2l + 3))).
fn small_arg_series(l: usize, x: f64) -> f64 {
    let leading = (1..=l).fold(1.0, |acc, k| acc * x / (2 * k + 1) as f64);
    leading * (1.0 - x * x / (2.0 * (2 * l + 3) as f64))
}

fn upward_recurrence(l: usize, x: f64) -> f64 {
    let (s, c) = x.sin_cos();
    let j0 = s / x;
    if l == 0 {
        return j0;
    }
    let mut j_prev = j0;
    let mut j = s / (x * x) - c / x;
    for n in 1..l {
        let j_next = (2 * n + 1) as f64 / x * j - j_prev;
        j_prev = j;
        j = j_next;
    }
    j
}

fn miller_recurrence(l: usize, x: f64) -> f64 {
    let start = l + 20 + (40.0 * (l as f64 + 1.0)).sqrt() as usize;

    let mut f_l = 0.0;
    let mut f_next = 0.0;
    let mut f = 1e-30;
    let mut n = start;
    loop {
        if n == l {
            f_l = f;
        }
        if n == 0 {
            break;
        }
        let f_prev = (2 * n + 1) as f64 / x * f - f_next;
        f_next = f;
        f = f_prev;
        n -= 1;

        if f.abs() > RESCALE_THRESHOLD {
            f /= RESCALE_THRESHOLD;
            f_next /= RESCALE_THRESHOLD;
            f_l /= RESCALE_THRESHOLD;
        }
    }

    // `f` and `f_next` are now proportional to j_0 and j_1. Normalise with
    // whichever is further from a zero crossing.
    let (s, c) = x.sin_cos();
    let j0 = s / x;
    let j1 = s / (x * x) - c / x;
    if j0.abs() >= j1.abs() {
        f_l * j0 / f
    } else {
        f_l * j1 / f_next
    }
}

/// Bessel function of the first kind of order one, J_1(x). Uses the rational
/// approximations from Numerical Recipes; absolute accuracy is ~1e-8.
pub fn bessel_j1(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 8.0 {
        let y = x * x;
        let num = x
            * (72362614232.0
                + y * (-7895059235.0
                    + y * (242396853.1
                        + y * (-2972611.439 + y * (15704.48260 + y * (-30.16036606))))));
        let den = 144725228442.0
            + y * (2300535178.0
                + y * (18583304.74 + y * (99447.43394 + y * (376.9991397 + y * 1.0))));
        num / den
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - 2.356194491;
        let p = 1.0
            + y * (0.183105e-2
                + y * (-0.3516396496e-4 + y * (0.2457520174e-5 + y * (-0.240337019e-6))));
        let q = 0.04687499995
            + y * (-0.2002690873e-3
                + y * (0.8449199096e-5 + y * (-0.88228987e-6 + y * 0.105787412e-6)));
        let ans = (0.636619772 / ax).sqrt() * (xx.cos() * p - z * xx.sin() * q);
        if x < 0.0 {
            -ans
        } else {
            ans
        }
    }
}
