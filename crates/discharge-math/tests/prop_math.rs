// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Property-Based Tests (proptest) for discharge-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for discharge-math using proptest.
//!
//! Covers: Poisson-Thomas solve, Householder QR, banded LU.

use discharge_math::banded::BandedMatrix;
use discharge_math::qr::DenseQr;
use discharge_math::tridiag::poisson_thomas;
use ndarray::{Array1, Array2};
use proptest::prelude::*;

proptest! {
    /// poisson_thomas solution satisfies the interior difference
    /// equations for any source and endpoint values.
    #[test]
    fn poisson_thomas_satisfies_difference_equations(
        n in 1usize..40,
        v0 in -5.0f64..5.0,
        v1 in -5.0f64..5.0,
        phase in 0.0f64..6.0,
    ) {
        let dx = 0.25;
        let fin: Vec<f64> = (0..n).map(|i| (i as f64 * 0.9 + phase).sin()).collect();
        let mut yout = vec![0.0; n];
        poisson_thomas(&fin, &mut yout, dx, v0, v1);

        for i in 0..n {
            let left = if i == 0 { v0 } else { yout[i - 1] };
            let right = if i == n - 1 { v1 } else { yout[i + 1] };
            let lhs = left - 2.0 * yout[i] + right;
            prop_assert!(
                (lhs - fin[i] * dx * dx).abs() < 1e-9,
                "row {}: lhs = {}, rhs = {}", i, lhs, fin[i] * dx * dx
            );
        }
    }

    /// QR back-solve reproduces b for diagonally dominant systems.
    #[test]
    fn qr_solve_residual_small(n in 2usize..20, seed in 0u64..500) {
        // Deterministic pseudo-random fill, diagonally dominant.
        let mut state = seed.wrapping_mul(0x9E3779B97F4A7C15).wrapping_add(1);
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state as f64 / u64::MAX as f64) - 0.5
        };
        let mut a = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                a[[i, j]] = next();
            }
            a[[i, i]] += n as f64;
        }
        let b = Array1::from_shape_fn(n, |_| next());

        let qr = DenseQr::factor(&a).unwrap();
        let x = qr.solve(&b).unwrap();
        let ax = a.dot(&x);
        for i in 0..n {
            prop_assert!((ax[i] - b[i]).abs() < 1e-8,
                "row {}: Ax = {}, b = {}", i, ax[i], b[i]);
        }
    }

    /// Banded LU agrees with the band matvec on Poisson-like systems.
    #[test]
    fn banded_lu_solve_matches_matvec(nx in 3usize..8, ny in 3usize..8) {
        let n = nx * ny;
        let mut m = BandedMatrix::new(n, ny, ny);
        for i in 0..nx {
            for j in 0..ny {
                let row = i * ny + j;
                let interior = i > 0 && i < nx - 1 && j > 0 && j < ny - 1;
                if interior {
                    m.set(row, row, -4.0).unwrap();
                    m.set(row, row - ny, 1.0).unwrap();
                    m.set(row, row + ny, 1.0).unwrap();
                    m.set(row, row - 1, 1.0).unwrap();
                    m.set(row, row + 1, 1.0).unwrap();
                } else {
                    m.set(row, row, 1.0).unwrap();
                }
            }
        }
        let b = Array1::from_shape_fn(n, |i| ((i * 7 % 13) as f64) - 6.0);
        let check = m.clone();
        let x = m.factor().unwrap().solve(&b).unwrap();
        let ax = check.matvec(&x);
        for i in 0..n {
            prop_assert!((ax[i] - b[i]).abs() < 1e-8, "row {} mismatch", i);
        }
    }
}
