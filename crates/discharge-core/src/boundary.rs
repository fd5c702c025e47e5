// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Boundary
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Geometric boundary reactions.
//!
//! [`TiledBoundary2D`] labels every grid cell with the boundary tile
//! occupying it and precomputes, by multi-source BFS, which tile is
//! nearest to each interior cell. Per step it walks a species and
//! reacts particles that left the interior: absorbing tiles delete by
//! tail-swap (invoking an optional callback first), specular tiles
//! mirror the particle across the tile face and negate the normal
//! velocity component.

use std::collections::VecDeque;

use discharge_types::error::{DischargeError, DischargeResult};
use discharge_types::grid::GridProp2D;
use discharge_types::species::{ChargedSpecies1D3V, ChargedSpecies2D3V};
use discharge_types::vec::{IntVec2, Vec2, Vec3};
use ndarray::Array2;

/// Cell tag: interior of the domain.
pub const CELL_INTERNAL: u8 = 0;
/// Cell tag: outside the domain.
pub const CELL_EXTERNAL: u8 = u8::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Specular,
    Absorbing,
}

/// Axis-aligned boundary tile over an inclusive cell rectangle.
#[derive(Debug, Clone, Copy)]
pub struct TiledBoundary {
    pub lower_left: IntVec2,
    pub upper_right: IntVec2,
    pub kind: BoundaryKind,
}

/// Reflection plane of a specular tile: the face adjacent to interior
/// cells, normal along `axis` (0 = x, 1 = y).
#[derive(Debug, Clone, Copy)]
struct Face {
    axis: usize,
    plane: f64,
}

#[derive(Debug)]
pub struct TiledBoundary2D {
    prop: GridProp2D,
    boundaries: Vec<TiledBoundary>,
    faces: Vec<Option<Face>>,
    cells: Array2<u8>,
    distance_cells: Array2<u8>,
    pub dt: f64,
    pub empty_box: bool,
}

impl TiledBoundary2D {
    /// Build the cell map for `boundaries` on the grid described by
    /// `prop`. With `empty_box` the whole outer rim absorbs, in
    /// addition to any explicit tiles.
    pub fn new(
        prop: GridProp2D,
        boundaries: Vec<TiledBoundary>,
        dt: f64,
        empty_box: bool,
    ) -> DischargeResult<Self> {
        let [nx, ny] = prop.extents;

        let mut boundaries = boundaries;
        if empty_box {
            let (xm, ym) = (nx as i32 - 1, ny as i32 - 1);
            for (ll, ur) in [
                (IntVec2::new(0, 0), IntVec2::new(0, ym)),
                (IntVec2::new(xm, 0), IntVec2::new(xm, ym)),
                (IntVec2::new(0, 0), IntVec2::new(xm, 0)),
                (IntVec2::new(0, ym), IntVec2::new(xm, ym)),
            ] {
                boundaries.push(TiledBoundary {
                    lower_left: ll,
                    upper_right: ur,
                    kind: BoundaryKind::Absorbing,
                });
            }
        }

        if boundaries.is_empty() {
            return Err(DischargeError::PreconditionViolated(
                "boundary engine needs at least one tile or empty_box".to_string(),
            ));
        }
        if boundaries.len() > (CELL_EXTERNAL - 1) as usize {
            return Err(DischargeError::PreconditionViolated(format!(
                "too many boundary tiles: {}",
                boundaries.len()
            )));
        }

        let mut cells = Array2::from_elem((nx, ny), CELL_INTERNAL);
        for (k, b) in boundaries.iter().enumerate() {
            let id = (k + 1) as u8;
            if let Some((x0, x1, y0, y1)) = clamp_rect(b.lower_left, b.upper_right, nx, ny) {
                for i in x0..=x1 {
                    for j in y0..=y1 {
                        cells[[i, j]] = id;
                    }
                }
            }
        }

        let distance_cells = bfs_distance(&cells, boundaries.len() as u8);

        let faces = boundaries
            .iter()
            .map(|b| match b.kind {
                BoundaryKind::Absorbing => Ok(None),
                BoundaryKind::Specular => specular_face(&prop, &cells, b).map(Some),
            })
            .collect::<DischargeResult<Vec<_>>>()?;

        Ok(TiledBoundary2D {
            prop,
            boundaries,
            faces,
            cells,
            distance_cells,
            dt,
            empty_box,
        })
    }

    pub fn boundaries(&self) -> &[TiledBoundary] {
        &self.boundaries
    }

    /// Tag of cell (i, j): `CELL_INTERNAL`, a tile id, or
    /// `CELL_EXTERNAL` outside the grid.
    pub fn cell(&self, i: i32, j: i32) -> u8 {
        let [nx, ny] = self.prop.extents;
        if i < 0 || j < 0 || i >= nx as i32 || j >= ny as i32 {
            return CELL_EXTERNAL;
        }
        self.cells[[i as usize, j as usize]]
    }

    /// Tag of the cell containing `pos`.
    pub fn cell_at(&self, pos: Vec2) -> u8 {
        let i = (pos.x / self.prop.dx.x).floor();
        let j = (pos.y / self.prop.dx.y).floor();
        if !i.is_finite() || !j.is_finite() {
            return CELL_EXTERNAL;
        }
        self.cell(i as i32, j as i32)
    }

    /// Id of the nearest boundary tile to interior cell (i, j), as
    /// computed by the multi-source BFS (0 if unreachable).
    pub fn nearest_boundary(&self, i: i32, j: i32) -> u8 {
        let [nx, ny] = self.prop.extents;
        if i < 0 || j < 0 || i >= nx as i32 || j >= ny as i32 {
            return 0;
        }
        self.distance_cells[[i as usize, j as usize]]
    }

    /// React all particles that left the interior.
    pub fn apply(&self, species: &mut ChargedSpecies2D3V) {
        self.apply_with(species, |_, _, _| {});
    }

    /// React all particles that left the interior, invoking `callback`
    /// with `(tile_id, position, velocity)` before each absorption.
    pub fn apply_with<F: FnMut(u8, Vec2, Vec3)>(
        &self,
        species: &mut ChargedSpecies2D3V,
        mut callback: F,
    ) {
        let [nx, ny] = self.prop.extents;

        let mut i = 0;
        while i < species.n() {
            let pos = species.x()[i];
            let tag = self.cell_at(pos);
            if tag == CELL_INTERNAL {
                i += 1;
                continue;
            }

            let id = if tag == CELL_EXTERNAL {
                let ci = ((pos.x / self.prop.dx.x).floor() as i64).clamp(0, nx as i64 - 1);
                let cj = ((pos.y / self.prop.dx.y).floor() as i64).clamp(0, ny as i64 - 1);
                let rim = self.cells[[ci as usize, cj as usize]];
                if rim == CELL_INTERNAL {
                    self.distance_cells[[ci as usize, cj as usize]]
                } else {
                    rim
                }
            } else {
                tag
            };

            if id == 0 {
                // No tile claims this escape path; drop the particle.
                species.remove(i);
                continue;
            }

            let tile = &self.boundaries[(id - 1) as usize];
            match tile.kind {
                BoundaryKind::Absorbing => {
                    callback(id, pos, species.v()[i]);
                    species.remove(i);
                }
                BoundaryKind::Specular => {
                    if let Some(face) = self.faces[(id - 1) as usize] {
                        let x = &mut species.x_mut()[i];
                        match face.axis {
                            0 => x.x = 2.0 * face.plane - x.x,
                            _ => x.y = 2.0 * face.plane - x.y,
                        }
                        let v = &mut species.v_mut()[i];
                        match face.axis {
                            0 => v.x = -v.x,
                            _ => v.y = -v.y,
                        }
                    }
                    i += 1;
                }
            }
        }
    }
}

/// Clamp an inclusive tile rectangle to the grid; None if disjoint.
fn clamp_rect(
    ll: IntVec2,
    ur: IntVec2,
    nx: usize,
    ny: usize,
) -> Option<(usize, usize, usize, usize)> {
    let x0 = ll.x.max(0);
    let y0 = ll.y.max(0);
    let x1 = ur.x.min(nx as i32 - 1);
    let y1 = ur.y.min(ny as i32 - 1);
    if x1 < x0 || y1 < y0 {
        return None;
    }
    Some((x0 as usize, x1 as usize, y0 as usize, y1 as usize))
}

/// Multi-source BFS over interior cells. The FIFO queue is seeded with
/// all tile cells in ascending id order, which makes ties resolve to
/// the lowest id deterministically.
fn bfs_distance(cells: &Array2<u8>, n_tiles: u8) -> Array2<u8> {
    let (nx, ny) = cells.dim();
    let mut dist = Array2::from_elem((nx, ny), 0_u8);
    let mut queue: VecDeque<(usize, usize, u8)> = VecDeque::new();

    for id in 1..=n_tiles {
        for i in 0..nx {
            for j in 0..ny {
                if cells[[i, j]] == id {
                    dist[[i, j]] = id;
                    queue.push_back((i, j, id));
                }
            }
        }
    }

    while let Some((i, j, id)) = queue.pop_front() {
        let mut visit = |ni: i64, nj: i64| {
            if ni < 0 || nj < 0 || ni >= nx as i64 || nj >= ny as i64 {
                return;
            }
            let (ni, nj) = (ni as usize, nj as usize);
            if cells[[ni, nj]] == CELL_INTERNAL && dist[[ni, nj]] == 0 {
                dist[[ni, nj]] = id;
                queue.push_back((ni, nj, id));
            }
        };
        let (ii, jj) = (i as i64, j as i64);
        visit(ii - 1, jj);
        visit(ii + 1, jj);
        visit(ii, jj - 1);
        visit(ii, jj + 1);
    }

    dist
}

/// Reflection face of a specular tile: the side whose neighboring cells
/// are interior.
fn specular_face(
    prop: &GridProp2D,
    cells: &Array2<u8>,
    tile: &TiledBoundary,
) -> DischargeResult<Face> {
    let [nx, ny] = prop.extents;
    let (x0, x1, y0, y1) = clamp_rect(tile.lower_left, tile.upper_right, nx, ny).ok_or_else(
        || {
            DischargeError::PreconditionViolated(
                "specular tile lies outside the domain".to_string(),
            )
        },
    )?;

    let col_internal = |i: usize| (y0..=y1).any(|j| cells[[i, j]] == CELL_INTERNAL);
    let row_internal = |j: usize| (x0..=x1).any(|i| cells[[i, j]] == CELL_INTERNAL);

    if x0 > 0 && col_internal(x0 - 1) {
        return Ok(Face {
            axis: 0,
            plane: x0 as f64 * prop.dx.x,
        });
    }
    if x1 + 1 < nx && col_internal(x1 + 1) {
        return Ok(Face {
            axis: 0,
            plane: (x1 + 1) as f64 * prop.dx.x,
        });
    }
    if y0 > 0 && row_internal(y0 - 1) {
        return Ok(Face {
            axis: 1,
            plane: y0 as f64 * prop.dx.y,
        });
    }
    if y1 + 1 < ny && row_internal(y1 + 1) {
        return Ok(Face {
            axis: 1,
            plane: (y1 + 1) as f64 * prop.dx.y,
        });
    }
    Err(DischargeError::PreconditionViolated(
        "specular tile has no interior-facing side".to_string(),
    ))
}

/// Delete 1D particles outside `[xmin, xmax]`; returns the number removed.
pub fn apply_absorbing_boundary(
    species: &mut ChargedSpecies1D3V,
    xmin: f64,
    xmax: f64,
) -> usize {
    let mut removed = 0;
    let mut i = 0;
    while i < species.n() {
        let x = species.x()[i];
        if x < xmin || x > xmax {
            species.remove(i);
            removed += 1;
        } else {
            i += 1;
        }
    }
    removed
}

/// Reflect 1D particles at the walls of `[xmin, xmax]`.
pub fn apply_symmetric_boundary(species: &mut ChargedSpecies1D3V, xmin: f64, xmax: f64) {
    let n = species.n();
    for i in 0..n {
        let x = species.x()[i];
        if x < xmin {
            species.x_mut()[i] = 2.0 * xmin - x;
            species.v_mut()[i].x = -species.v()[i].x;
        } else if x > xmax {
            species.x_mut()[i] = 2.0 * xmax - x;
            species.v_mut()[i].x = -species.v()[i].x;
        }
    }
}
