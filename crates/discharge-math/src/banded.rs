// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Banded
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Banded LU factorization without pivoting.
//!
//! The row-per-cell 2D Poisson matrix couples each cell to its four
//! neighbors, so with row-major cell ordering the bandwidth equals the
//! grid width and never grows during elimination. Factorization is done
//! once; the factors are kept for the solver's lifetime.
//!
//! Entry A[i][j] lives at `band[[ku + i - j, j]]` for
//! `j - ku <= i <= j + kl`.

use discharge_types::error::{DischargeError, DischargeResult};
use ndarray::{Array1, Array2};

/// Band-stored square matrix under assembly.
#[derive(Debug, Clone)]
pub struct BandedMatrix {
    n: usize,
    kl: usize,
    ku: usize,
    band: Array2<f64>,
}

impl BandedMatrix {
    pub fn new(n: usize, kl: usize, ku: usize) -> Self {
        BandedMatrix {
            n,
            kl,
            ku,
            band: Array2::zeros((kl + ku + 1, n)),
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    fn in_band(&self, i: usize, j: usize) -> bool {
        i < self.n && j < self.n && i + self.ku >= j && j + self.kl >= i
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) -> DischargeResult<()> {
        if !self.in_band(i, j) {
            return Err(DischargeError::PreconditionViolated(format!(
                "entry ({i}, {j}) outside band kl={}, ku={}, n={}",
                self.kl, self.ku, self.n
            )));
        }
        self.band[[self.ku + i - j, j]] = value;
        Ok(())
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        if self.in_band(i, j) {
            self.band[[self.ku + i - j, j]]
        } else {
            0.0
        }
    }

    /// Matrix-vector product, used to verify factorizations in tests.
    pub fn matvec(&self, x: &Array1<f64>) -> Array1<f64> {
        let mut y = Array1::zeros(self.n);
        for i in 0..self.n {
            let j0 = i.saturating_sub(self.kl);
            let j1 = (i + self.ku).min(self.n - 1);
            let mut s = 0.0;
            for j in j0..=j1 {
                s += self.get(i, j) * x[j];
            }
            y[i] = s;
        }
        y
    }

    /// LU-factor in place without pivoting.
    ///
    /// The Poisson assembly is diagonally dominant row-wise, so no
    /// pivoting is needed; a vanishing pivot means the discretized
    /// operator itself is singular and setup fails.
    pub fn factor(mut self) -> DischargeResult<BandedLu> {
        let scale = self.band.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if scale == 0.0 {
            return Err(DischargeError::SolverSetupFailed(
                "empty matrix".to_string(),
            ));
        }
        let tol = scale * 1e-10;

        let n = self.n;
        let kl = self.kl;
        let ku = self.ku;

        for k in 0..n {
            let pivot = self.band[[ku, k]];
            if pivot.abs() <= tol {
                return Err(DischargeError::SolverSetupFailed(format!(
                    "vanishing pivot at row {k}"
                )));
            }
            let imax = (k + kl).min(n - 1);
            for i in k + 1..=imax {
                let l = self.band[[ku + i - k, k]] / pivot;
                self.band[[ku + i - k, k]] = l;
                let jmax = (k + ku).min(n - 1);
                for j in k + 1..=jmax {
                    let akj = self.band[[ku + k - j, j]];
                    if akj != 0.0 {
                        self.band[[ku + i - j, j]] -= l * akj;
                    }
                }
            }
        }

        Ok(BandedLu {
            n,
            kl,
            ku,
            band: self.band,
        })
    }
}

/// Factored form: unit lower triangle below the diagonal, U on and above.
#[derive(Debug, Clone)]
pub struct BandedLu {
    n: usize,
    kl: usize,
    ku: usize,
    band: Array2<f64>,
}

impl BandedLu {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn solve(&self, b: &Array1<f64>) -> DischargeResult<Array1<f64>> {
        if b.len() != self.n {
            return Err(DischargeError::ShapeMismatch {
                context: "banded solve".to_string(),
                expected: vec![self.n],
                got: vec![b.len()],
            });
        }

        let n = self.n;
        let kl = self.kl;
        let ku = self.ku;
        let mut x = b.clone();

        for k in 0..n {
            let imax = (k + kl).min(n - 1);
            for i in k + 1..=imax {
                x[i] -= self.band[[ku + i - k, k]] * x[k];
            }
        }

        for k in (0..n).rev() {
            let jmax = (k + ku).min(n - 1);
            let mut s = x[k];
            for j in k + 1..=jmax {
                s -= self.band[[ku + k - j, j]] * x[j];
            }
            x[k] = s / self.band[[ku, k]];
        }

        Ok(x)
    }
}
