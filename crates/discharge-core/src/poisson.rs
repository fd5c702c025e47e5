// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Poisson
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Electrostatic Poisson solvers.
//!
//! Three solvers cover the supported geometries:
//! - [`SymmetricPoissonSolver1D`]: periodic 1D, factored once by dense
//!   Householder QR with the wrap encoded as explicit matrix entries.
//! - [`DirichletPoissonSolver1D`]: bounded 1D, O(N) Thomas sweep with
//!   fixed endpoint potentials.
//! - [`StructPoissonSolver2D`]: structured 2D with rectangular regions
//!   of Internal/External/Dirichlet/Neumann cells, factored once by
//!   banded LU.
//!
//! The 1D solvers operate on the caller-scaled source term (drivers
//! pass `-rho/eps0`); the 2D solver applies `-rho/eps0` itself at
//! non-boundary cells.

use discharge_math::banded::{BandedLu, BandedMatrix};
use discharge_math::qr::DenseQr;
use discharge_math::tridiag::poisson_thomas;
use discharge_types::constants::EPS0;
use discharge_types::error::{DischargeError, DischargeResult};
use discharge_types::grid::GridProp2D;
use discharge_types::vec::IntVec2;
use ndarray::{Array1, Array2};

/// Periodic 1D Poisson solver.
///
/// The matrix is the (1, -2, 1)/dx^2 stencil with wrap entries at
/// (0, N-1) and (N-1, 0); it is singular with a constant nullspace, so
/// solutions are returned in the zero-mean gauge.
pub struct SymmetricPoissonSolver1D {
    n: usize,
    dx: f64,
    qr: DenseQr,
    phi: Array1<f64>,
    solved: bool,
}

impl SymmetricPoissonSolver1D {
    pub fn new(n: usize, dx: f64) -> DischargeResult<Self> {
        if n < 3 {
            return Err(DischargeError::PreconditionViolated(format!(
                "periodic solver needs n >= 3, got {n}"
            )));
        }
        if !dx.is_finite() || dx <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "grid spacing must be finite and > 0, got {dx}"
            )));
        }

        let dx2 = dx * dx;
        let mut mat = Array2::zeros((n, n));
        for i in 0..n {
            mat[[i, i]] = -2.0 / dx2;
            if i < n - 1 {
                mat[[i + 1, i]] = 1.0 / dx2;
                mat[[i, i + 1]] = 1.0 / dx2;
            }
        }
        mat[[n - 1, 0]] = 1.0 / dx2;
        mat[[0, n - 1]] = 1.0 / dx2;

        let qr = DenseQr::factor(&mat)?;
        Ok(SymmetricPoissonSolver1D {
            n,
            dx,
            qr,
            phi: Array1::zeros(n),
            solved: false,
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Solve for the potential and cache it for [`Self::grad`].
    pub fn solve(&mut self, rho: &Array1<f64>) -> DischargeResult<Array1<f64>> {
        if rho.len() != self.n {
            return Err(DischargeError::ShapeMismatch {
                context: "periodic Poisson solve".to_string(),
                expected: vec![self.n],
                got: vec![rho.len()],
            });
        }
        let mut phi = self.qr.solve(rho)?;
        let mean = phi.sum() / self.n as f64;
        phi.mapv_inplace(|v| v - mean);
        self.phi = phi.clone();
        self.solved = true;
        Ok(phi)
    }

    /// Electric field of the last solve: central differences with wrap,
    /// negated, with the first cell pinned to the last for periodic
    /// symmetry.
    pub fn grad(&self) -> DischargeResult<Array1<f64>> {
        if !self.solved {
            return Err(DischargeError::SolverNotReady(
                "grad requires a prior solve".to_string(),
            ));
        }
        let n = self.n;
        let two_dx = 2.0 * self.dx;
        let mut e = Array1::zeros(n);
        for i in 0..n {
            let left = self.phi[(i + n - 1) % n];
            let right = self.phi[(i + 1) % n];
            e[i] = -(right - left) / two_dx;
        }
        e[0] = e[n - 1];
        Ok(e)
    }
}

/// Bounded 1D Poisson solver with fixed endpoint potentials.
pub struct DirichletPoissonSolver1D {
    n: usize,
    dx: f64,
}

impl DirichletPoissonSolver1D {
    pub fn new(n: usize, dx: f64) -> DischargeResult<Self> {
        if n < 3 {
            return Err(DischargeError::PreconditionViolated(format!(
                "Dirichlet solver needs n >= 3, got {n}"
            )));
        }
        if !dx.is_finite() || dx <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "grid spacing must be finite and > 0, got {dx}"
            )));
        }
        Ok(DirichletPoissonSolver1D { n, dx })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Solve with `phi[0] = v0` and `phi[n-1] = v1` pinned exactly.
    pub fn solve(&self, rho: &Array1<f64>, v0: f64, v1: f64) -> DischargeResult<Array1<f64>> {
        if rho.len() != self.n {
            return Err(DischargeError::ShapeMismatch {
                context: "Dirichlet Poisson solve".to_string(),
                expected: vec![self.n],
                got: vec![rho.len()],
            });
        }
        let n = self.n;
        let fin: Vec<f64> = rho.iter().skip(1).take(n - 2).copied().collect();
        let mut interior = vec![0.0; n - 2];
        poisson_thomas(&fin, &mut interior, self.dx, v0, v1);

        let mut out = Array1::zeros(n);
        out[0] = v0;
        for (i, y) in interior.into_iter().enumerate() {
            out[i + 1] = y;
        }
        out[n - 1] = v1;
        Ok(out)
    }

    /// Electric field: central differences on the interior, two-point
    /// linear extrapolation at the electrodes.
    pub fn efield(&self, phi: &Array1<f64>) -> DischargeResult<Array1<f64>> {
        if phi.len() != self.n {
            return Err(DischargeError::ShapeMismatch {
                context: "Dirichlet E-field".to_string(),
                expected: vec![self.n],
                got: vec![phi.len()],
            });
        }
        let n = self.n;
        let mut e = Array1::zeros(n);
        for i in 1..n - 1 {
            e[i] = -(phi[i + 1] - phi[i - 1]) / (2.0 * self.dx);
        }
        e[0] = 2.0 * e[1] - e[2];
        e[n - 1] = 2.0 * e[n - 2] - e[n - 3];
        Ok(e)
    }
}

/// Cell classification of the structured 2D domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Internal,
    External,
    BoundaryDirichlet,
    BoundaryNeumann,
}

/// Rectangular region of cells, interpreted in list order: later
/// regions override earlier ones where they overlap.
pub struct Region {
    pub kind: CellKind,
    pub lower_left: IntVec2,
    pub upper_right: IntVec2,
    /// Boundary value supplier, sampled once per solve for Dirichlet
    /// regions.
    pub input: Option<Box<dyn Fn() -> f64>>,
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("kind", &self.kind)
            .field("lower_left", &self.lower_left)
            .field("upper_right", &self.upper_right)
            .field("input", &self.input.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Region {
    pub fn internal(lower_left: IntVec2, upper_right: IntVec2) -> Self {
        Region {
            kind: CellKind::Internal,
            lower_left,
            upper_right,
            input: None,
        }
    }

    pub fn external(lower_left: IntVec2, upper_right: IntVec2) -> Self {
        Region {
            kind: CellKind::External,
            lower_left,
            upper_right,
            input: None,
        }
    }

    pub fn dirichlet(
        lower_left: IntVec2,
        upper_right: IntVec2,
        input: Box<dyn Fn() -> f64>,
    ) -> Self {
        Region {
            kind: CellKind::BoundaryDirichlet,
            lower_left,
            upper_right,
            input: Some(input),
        }
    }

    pub fn neumann(lower_left: IntVec2, upper_right: IntVec2) -> Self {
        Region {
            kind: CellKind::BoundaryNeumann,
            lower_left,
            upper_right,
            input: None,
        }
    }
}

/// Structured 2D Poisson solver over region-tagged cells.
///
/// Assembles one row per cell and factors the banded system once at
/// construction; the factors live for the solver's lifetime.
#[derive(Debug)]
pub struct StructPoissonSolver2D {
    prop: GridProp2D,
    cells: Array2<CellKind>,
    region_id: Array2<i32>,
    regions: Vec<Region>,
    lu: BandedLu,
}

impl StructPoissonSolver2D {
    pub fn new(prop: GridProp2D, regions: Vec<Region>) -> DischargeResult<Self> {
        let [nx, ny] = prop.extents;

        for (rid, region) in regions.iter().enumerate() {
            if region.kind == CellKind::BoundaryDirichlet && region.input.is_none() {
                return Err(DischargeError::PreconditionViolated(format!(
                    "Dirichlet region {rid} has no input callable"
                )));
            }
        }

        // Paint: later regions override earlier ones.
        let mut cells = Array2::from_elem((nx, ny), CellKind::Internal);
        let mut region_id = Array2::from_elem((nx, ny), -1_i32);
        for (rid, region) in regions.iter().enumerate() {
            let x0 = region.lower_left.x.max(0) as usize;
            let y0 = region.lower_left.y.max(0) as usize;
            let x1 = (region.upper_right.x.min(nx as i32 - 1)).max(-1);
            let y1 = (region.upper_right.y.min(ny as i32 - 1)).max(-1);
            if x1 < x0 as i32 || y1 < y0 as i32 {
                continue;
            }
            for i in x0..=x1 as usize {
                for j in y0..=y1 as usize {
                    cells[[i, j]] = region.kind;
                    region_id[[i, j]] = rid as i32;
                }
            }
        }

        let lu = Self::assemble(&prop, &cells)?.factor()?;

        Ok(StructPoissonSolver2D {
            prop,
            cells,
            region_id,
            regions,
            lu,
        })
    }

    fn assemble(prop: &GridProp2D, cells: &Array2<CellKind>) -> DischargeResult<BandedMatrix> {
        let [nx, ny] = prop.extents;
        let ax = 1.0 / (prop.dx.x * prop.dx.x);
        let ay = 1.0 / (prop.dx.y * prop.dx.y);

        let mut mat = BandedMatrix::new(nx * ny, ny, ny);
        let row_of = |i: usize, j: usize| i * ny + j;

        for i in 0..nx {
            for j in 0..ny {
                let row = row_of(i, j);
                match cells[[i, j]] {
                    CellKind::External | CellKind::BoundaryDirichlet => {
                        mat.set(row, row, 1.0)?;
                    }
                    CellKind::Internal => {
                        if i == 0 || i == nx - 1 || j == 0 || j == ny - 1 {
                            return Err(DischargeError::PreconditionViolated(format!(
                                "internal cell ({i}, {j}) on the domain rim has no closing boundary region"
                            )));
                        }
                        mat.set(row, row, -2.0 * (ax + ay))?;
                        mat.set(row, row_of(i - 1, j), ax)?;
                        mat.set(row, row_of(i + 1, j), ax)?;
                        mat.set(row, row_of(i, j - 1), ay)?;
                        mat.set(row, row_of(i, j + 1), ay)?;
                    }
                    CellKind::BoundaryNeumann => {
                        mat.set(row, row, -2.0 * (ax + ay))?;
                        // Missing neighbors fold onto their mirror image,
                        // the homogeneous-Neumann reflection.
                        let neighbors: [(i32, i32, f64); 4] =
                            [(-1, 0, ax), (1, 0, ax), (0, -1, ay), (0, 1, ay)];
                        for (di, dj, coeff) in neighbors {
                            let ni = i as i32 + di;
                            let nj = j as i32 + dj;
                            let inside = ni >= 0 && ni < nx as i32 && nj >= 0 && nj < ny as i32;
                            let (ti, tj) = if inside {
                                (ni, nj)
                            } else {
                                (i as i32 - di, j as i32 - dj)
                            };
                            if ti < 0 || ti >= nx as i32 || tj < 0 || tj >= ny as i32 {
                                return Err(DischargeError::PreconditionViolated(format!(
                                    "Neumann cell ({i}, {j}) has no in-domain reflection"
                                )));
                            }
                            let col = row_of(ti as usize, tj as usize);
                            let prev = mat.get(row, col);
                            mat.set(row, col, prev + coeff)?;
                        }
                    }
                }
            }
        }
        Ok(mat)
    }

    pub fn prop(&self) -> &GridProp2D {
        &self.prop
    }

    pub fn cell(&self, i: usize, j: usize) -> CellKind {
        self.cells[[i, j]]
    }

    /// Solve for the potential given the charge density on the domain.
    pub fn solve(&self, rho: &Array2<f64>) -> DischargeResult<Array2<f64>> {
        let [nx, ny] = self.prop.extents;
        if rho.dim() != (nx, ny) {
            return Err(DischargeError::ShapeMismatch {
                context: "2D Poisson solve".to_string(),
                expected: vec![nx, ny],
                got: vec![rho.dim().0, rho.dim().1],
            });
        }

        // Dirichlet inputs are sampled exactly once per solve.
        let sampled: Vec<f64> = self
            .regions
            .iter()
            .map(|r| match (&r.kind, &r.input) {
                (CellKind::BoundaryDirichlet, Some(f)) => f(),
                _ => 0.0,
            })
            .collect();

        let mut rhs = Array1::zeros(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                let row = i * ny + j;
                rhs[row] = match self.cells[[i, j]] {
                    CellKind::Internal | CellKind::BoundaryNeumann => -rho[[i, j]] / EPS0,
                    CellKind::BoundaryDirichlet => {
                        let rid = self.region_id[[i, j]];
                        sampled[rid as usize]
                    }
                    CellKind::External => 0.0,
                };
            }
        }

        let x = self.lu.solve(&rhs)?;
        let mut out = Array2::zeros((nx, ny));
        for i in 0..nx {
            for j in 0..ny {
                out[[i, j]] = x[i * ny + j];
            }
        }
        Ok(out)
    }
}
