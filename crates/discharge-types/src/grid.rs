// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Uniform structured grids holding one scalar per cell.

use crate::error::{DischargeError, DischargeResult};
use crate::vec::Vec2;
use ndarray::{Array1, Array2};

/// Geometric description of a 2D grid without its data buffer.
#[derive(Debug, Clone, Copy)]
pub struct GridProp2D {
    pub extents: [usize; 2],
    pub dx: Vec2,
}

impl GridProp2D {
    pub fn new(extents: [usize; 2], dx: Vec2) -> DischargeResult<Self> {
        if extents[0] < 2 || extents[1] < 2 {
            return Err(DischargeError::PreconditionViolated(format!(
                "grid extents must be >= 2 per axis, got {extents:?}"
            )));
        }
        if dx.x <= 0.0 || dx.y <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "grid spacing must be > 0, got ({}, {})",
                dx.x, dx.y
            )));
        }
        Ok(GridProp2D { extents, dx })
    }
}

/// 1D uniform grid with spacing `dx` over `n` nodes.
#[derive(Debug, Clone)]
pub struct UniformGrid1D {
    pub dx: f64,
    pub data: Array1<f64>,
}

impl UniformGrid1D {
    pub fn new(n: usize, dx: f64) -> DischargeResult<Self> {
        if n < 2 {
            return Err(DischargeError::PreconditionViolated(format!(
                "1D grid needs n >= 2, got {n}"
            )));
        }
        if dx <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "grid spacing must be > 0, got {dx}"
            )));
        }
        Ok(UniformGrid1D {
            dx,
            data: Array1::zeros(n),
        })
    }

    pub fn n(&self) -> usize {
        self.data.len()
    }

    /// Physical extent of the grid, node 0 to node n-1.
    pub fn length(&self) -> f64 {
        self.dx * (self.n() - 1) as f64
    }

    pub fn zero(&mut self) {
        self.data.fill(0.0);
    }

    /// Cell index containing position `x`. Caller keeps x within the domain.
    pub fn cell_of(&self, x: f64) -> usize {
        (x / self.dx).floor() as usize
    }
}

/// 2D uniform grid; `data` is indexed `[i, j]` with i along x and j along y.
#[derive(Debug, Clone)]
pub struct UniformGrid2D {
    pub prop: GridProp2D,
    pub data: Array2<f64>,
}

impl UniformGrid2D {
    pub fn new(prop: GridProp2D) -> Self {
        UniformGrid2D {
            prop,
            data: Array2::zeros((prop.extents[0], prop.extents[1])),
        }
    }

    pub fn nx(&self) -> usize {
        self.prop.extents[0]
    }

    pub fn ny(&self) -> usize {
        self.prop.extents[1]
    }

    pub fn zero(&mut self) {
        self.data.fill(0.0);
    }

    /// Cell index pair containing `pos`, unclamped.
    pub fn cell_of(&self, pos: Vec2) -> (i64, i64) {
        (
            (pos.x / self.prop.dx.x).floor() as i64,
            (pos.y / self.prop.dx.y).floor() as i64,
        )
    }
}
