// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — QR
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Dense Householder QR factorization.
//!
//! Factors a square matrix once and keeps Q^T and R for repeated
//! back-solves. Rank-deficient systems (the periodic Laplacian has a
//! constant nullspace) are handled by pinning components with a
//! negligible pivot to zero during back-substitution, which yields a
//! particular solution of any consistent right-hand side.

use discharge_types::error::{DischargeError, DischargeResult};
use ndarray::{Array1, Array2};

/// Relative pivot threshold below which a diagonal of R is treated as zero.
const RANK_TOL: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct DenseQr {
    qt: Array2<f64>,
    r: Array2<f64>,
    n: usize,
}

impl DenseQr {
    /// Factor a square matrix A = QR by Householder reflections.
    pub fn factor(a: &Array2<f64>) -> DischargeResult<Self> {
        let (rows, cols) = a.dim();
        if rows != cols {
            return Err(DischargeError::ShapeMismatch {
                context: "QR factorization".to_string(),
                expected: vec![rows, rows],
                got: vec![rows, cols],
            });
        }
        if a.iter().any(|v| !v.is_finite()) {
            return Err(DischargeError::SolverSetupFailed(
                "matrix contains non-finite entries".to_string(),
            ));
        }

        let n = rows;
        let mut r = a.clone();
        let mut qt = Array2::eye(n);
        let mut w = vec![0.0; n];

        for k in 0..n {
            let mut norm2 = 0.0;
            for i in k..n {
                norm2 += r[[i, k]] * r[[i, k]];
            }
            let norm = norm2.sqrt();
            if norm == 0.0 {
                continue;
            }

            let alpha = if r[[k, k]] >= 0.0 { -norm } else { norm };
            w[k] = r[[k, k]] - alpha;
            for i in k + 1..n {
                w[i] = r[[i, k]];
            }
            let wnorm2: f64 = w[k..n].iter().map(|v| v * v).sum();
            if wnorm2 == 0.0 {
                continue;
            }
            let beta = 2.0 / wnorm2;

            for j in k..n {
                let mut dot = 0.0;
                for i in k..n {
                    dot += w[i] * r[[i, j]];
                }
                let s = beta * dot;
                for i in k..n {
                    r[[i, j]] -= s * w[i];
                }
            }
            for j in 0..n {
                let mut dot = 0.0;
                for i in k..n {
                    dot += w[i] * qt[[i, j]];
                }
                let s = beta * dot;
                for i in k..n {
                    qt[[i, j]] -= s * w[i];
                }
            }
        }

        Ok(DenseQr { qt, r, n })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Solve Ax = b using the stored factors.
    ///
    /// Diagonal entries of R below the rank tolerance pin the
    /// corresponding solution component to zero.
    pub fn solve(&self, b: &Array1<f64>) -> DischargeResult<Array1<f64>> {
        if b.len() != self.n {
            return Err(DischargeError::ShapeMismatch {
                context: "QR solve".to_string(),
                expected: vec![self.n],
                got: vec![b.len()],
            });
        }

        let y = self.qt.dot(b);
        let max_diag = (0..self.n)
            .map(|i| self.r[[i, i]].abs())
            .fold(0.0_f64, f64::max);
        let tol = RANK_TOL * max_diag.max(f64::MIN_POSITIVE);

        let mut x = Array1::zeros(self.n);
        for k in (0..self.n).rev() {
            let rkk = self.r[[k, k]];
            if rkk.abs() <= tol {
                x[k] = 0.0;
                continue;
            }
            let mut s = y[k];
            for j in k + 1..self.n {
                s -= self.r[[k, j]] * x[j];
            }
            x[k] = s / rkk;
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn residual(a: &Array2<f64>, x: &Array1<f64>, b: &Array1<f64>) -> f64 {
        let ax = a.dot(x);
        (&ax - b).iter().map(|v| v.abs()).fold(0.0, f64::max)
    }

    #[test]
    fn test_qr_solves_small_full_rank_system() {
        let a = array![[4.0, 1.0, 0.0], [1.0, 3.0, -1.0], [0.0, -1.0, 2.0]];
        let b = array![1.0, -2.0, 0.5];
        let qr = DenseQr::factor(&a).unwrap();
        let x = qr.solve(&b).unwrap();
        assert!(residual(&a, &x, &b) < 1e-12, "residual too large");
    }

    #[test]
    fn test_qr_factors_are_reused_across_solves() {
        let a = array![[2.0, -1.0], [-1.0, 2.0]];
        let qr = DenseQr::factor(&a).unwrap();
        for rhs in [array![1.0, 0.0], array![0.0, 1.0], array![3.0, -3.0]] {
            let x = qr.solve(&rhs).unwrap();
            assert!(residual(&a, &x, &rhs) < 1e-12);
        }
    }

    #[test]
    fn test_qr_singular_consistent_system() {
        // Periodic 1D Laplacian, n = 4: rank 3, nullspace = constants.
        let a = array![
            [-2.0, 1.0, 0.0, 1.0],
            [1.0, -2.0, 1.0, 0.0],
            [0.0, 1.0, -2.0, 1.0],
            [1.0, 0.0, 1.0, -2.0]
        ];
        // b orthogonal to the constant vector -> consistent.
        let b = array![1.0, -1.0, 1.0, -1.0];
        let qr = DenseQr::factor(&a).unwrap();
        let x = qr.solve(&b).unwrap();
        assert!(
            residual(&a, &x, &b) < 1e-10,
            "particular solution should satisfy the consistent system"
        );
    }

    #[test]
    fn test_qr_rejects_non_square() {
        let a = Array2::<f64>::zeros((3, 2));
        assert!(DenseQr::factor(&a).is_err());
    }

    #[test]
    fn test_qr_rejects_non_finite() {
        let mut a = Array2::<f64>::eye(3);
        a[[1, 1]] = f64::NAN;
        assert!(DenseQr::factor(&a).is_err());
    }

    #[test]
    fn test_qr_solve_shape_mismatch() {
        let a = Array2::<f64>::eye(3);
        let qr = DenseQr::factor(&a).unwrap();
        let b = Array1::<f64>::zeros(4);
        assert!(qr.solve(&b).is_err());
    }
}
