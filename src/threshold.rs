// mumr: Find maximal unique matches with an enhanced suffix array
//
// Copyright 2025 mumr contributors.

// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.

// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
//! The minimum anchor length that separates real matches from random ones.
//!
//! Short exact matches between two sequences occur by chance alone. The
//! cutoff below which a match is considered random follows the shortest
//! unique substring (shustring) length distribution of Haubold et al.
//! (2009), parameterized by the GC content and length of the reference.

/// Calculates the minimum anchor length.
///
/// `p` is the probability with which an anchor is allowed to be random,
/// `gc` the relative amount of GC in the reference and `l` the length of
/// the reference. Anchors shorter than the returned length are expected
/// to occur by chance with probability greater than `p` and are skipped
/// by the driver.
pub fn min_anchor_length(p: f64, gc: f64, l: usize) -> usize {
    let mut x: usize = 1;

    let mut prop = 0.0;
    while prop < 1.0 - p {
        prop = shustring_cdf(x, gc / 2.0, l);
        x += 1;
    }

    x
}

/// The probability that the longest shustring is no longer than `x`.
///
/// Computes `P{X <= x}` where `X` is the length of the longest shortest
/// unique substring over all positions of a random sequence with length
/// `l` and half-GC content `p`. See Haubold et al. (2009) for the
/// derivation.
///
/// The sum saturates at 1 very quickly; it is clamped and the loop exits
/// as soon as that happens, which also keeps the binomial coefficients
/// small.
pub fn shustring_cdf(x: usize, p: f64, l: usize) -> f64 {
    let xx = x as f64;
    let ll = l as f64;

    let mut s = 0.0;
    for k in 0..=x {
        let kk = k as f64;
        let t = p.powf(kk) * (0.5 - p).powf(xx - kk);

        s += 2f64.powf(xx) * (t * (1.0 - t).powf(ll)) * binomial_coefficient(x, k) as f64;
        if s >= 1.0 {
            s = 1.0;
            break;
        }
    }

    s
}

/// Binomial coefficient of `n` and `k` as an exact integer.
///
/// The inputs stay small in practice because the CDF above exits early,
/// so an exact running product beats pulling in a numerics crate. On the
/// (theoretical) inputs that would overflow, the coefficient saturates;
/// the CDF clamps to 1 long before the exact value matters there.
fn binomial_coefficient(n: usize, k: usize) -> u64 {
    if n == 0 || k > n {
        return 0;
    }

    if k == 0 || k == n {
        return 1;
    }

    let k = k.min(n - k) as u64;
    let n = n as u64;

    let mut res: u64 = 1;
    for i in 1..=k {
        res = match res.checked_mul(n - k + i) {
            Some(v) => v / i,
            None => return u64::MAX,
        };
    }

    res
}
