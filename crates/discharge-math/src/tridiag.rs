// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Tridiag
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Thomas algorithm specialized to the 1D Poisson stencil.
//!
//! The system has sub/super diagonals 1 and main diagonal -2 (the dx^2
//! factor is folded into the right-hand side), so the forward sweep
//! carries a single scalar `cprime` instead of a full modified-diagonal
//! array and the back sweep rebuilds it by the inverse recurrence.

/// In-place Thomas solve over the `n` interior nodes of a Poisson
/// problem with fixed endpoint values `ylhs` and `yrhs`.
///
/// - `fin`: interior source term [n]
/// - `yout`: interior solution [n], overwritten
///
/// Solves `y[i-1] - 2 y[i] + y[i+1] = fin[i] * dx^2` with `y[-1] = ylhs`
/// and `y[n] = yrhs`.
pub fn poisson_thomas(fin: &[f64], yout: &mut [f64], dx: f64, ylhs: f64, yrhs: f64) {
    let n = fin.len();
    assert!(n > 0, "interior size must be > 0");
    assert_eq!(yout.len(), n);

    let dx2 = dx * dx;

    if n == 1 {
        yout[0] = (fin[0] * dx2 - ylhs - yrhs) / -2.0;
        return;
    }

    let mut cprime = -0.5;

    yout[0] = (fin[0] * dx2 - ylhs) / -2.0;

    for i in 1..n - 1 {
        yout[i] = (fin[i] * dx2 - yout[i - 1]) / (-2.0 - cprime);
        cprime = 1.0 / (-2.0 - cprime);
    }

    yout[n - 1] = ((fin[n - 1] * dx2 - yrhs) - yout[n - 2]) / (-2.0 - cprime);

    for i in (1..n - 1).rev() {
        yout[i] -= cprime * yout[i + 1];
        cprime = -2.0 - 1.0 / cprime;
    }

    yout[0] -= -0.5 * yout[1];
}
