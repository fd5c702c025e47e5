//! Linear grid-to-particle gather and particle-to-grid scatter.
//!
//! Callers keep particle positions inside `[0, (n-1)*dx)`; boundaries
//! react escaping particles before the next gather.

use discharge_types::constants::Q_ELECTRON;
use discharge_types::error::{DischargeError, DischargeResult};
use discharge_types::grid::{UniformGrid1D, UniformGrid2D};
use discharge_types::species::{ChargedSpecies1D3V, ChargedSpecies2D3V};
use discharge_types::vec::Vec2;

/// Gather the 1D field onto each particle's force buffer.
pub fn field_at_particles(field: &UniformGrid1D, species: &mut ChargedSpecies1D3V) {
    let n = species.n();
    let dx = field.dx;
    let last = field.n() - 2;

    for i in 0..n {
        let xp = species.x()[i];
        let il = ((xp / dx).floor() as usize).min(last);
        let xl = il as f64 * dx;
        let xr = (il + 1) as f64 * dx;
        species.f_mut()[i] =
            field.data[il] * (xr - xp) / dx + field.data[il + 1] * (xp - xl) / dx;
    }
}

/// Gather the 2D field components onto each particle's force buffer.
pub fn field_at_particles_2d(
    field_x: &UniformGrid2D,
    field_y: &UniformGrid2D,
    species: &mut ChargedSpecies2D3V,
) {
    let n = species.n();
    let dx = field_x.prop.dx.x;
    let dy = field_x.prop.dx.y;
    let li = field_x.nx() - 2;
    let lj = field_x.ny() - 2;

    for p in 0..n {
        let pos = species.x()[p];
        let i0 = ((pos.x / dx).floor() as usize).min(li);
        let j0 = ((pos.y / dy).floor() as usize).min(lj);
        let tx = pos.x / dx - i0 as f64;
        let ty = pos.y / dy - j0 as f64;

        let bilinear = |g: &UniformGrid2D| -> f64 {
            (1.0 - tx) * ((1.0 - ty) * g.data[[i0, j0]] + ty * g.data[[i0, j0 + 1]])
                + tx * ((1.0 - ty) * g.data[[i0 + 1, j0]] + ty * g.data[[i0 + 1, j0 + 1]])
        };
        species.f_mut()[p] = Vec2::new(bilinear(field_x), bilinear(field_y));
    }
}

/// Scatter unit shape weights onto the grid (number density in
/// particles per node, not yet weighted or volume-normalized).
pub fn deposit_density(species: &ChargedSpecies1D3V, grid: &mut UniformGrid1D) {
    grid.zero();
    let dx = grid.dx;
    let last = grid.n() - 2;

    for &xp in species.x() {
        let il = ((xp / dx).floor() as usize).min(last);
        let xl = il as f64 * dx;
        let xr = (il + 1) as f64 * dx;
        grid.data[il] += (xr - xp) / dx;
        grid.data[il + 1] += (xp - xl) / dx;
    }
}

/// Bilinear scatter of unit shape weights onto a 2D grid.
pub fn deposit_density_2d(species: &ChargedSpecies2D3V, grid: &mut UniformGrid2D) {
    grid.zero();
    let dx = grid.prop.dx.x;
    let dy = grid.prop.dx.y;
    let li = grid.nx() - 2;
    let lj = grid.ny() - 2;

    for pos in species.x() {
        let i0 = ((pos.x / dx).floor() as usize).min(li);
        let j0 = ((pos.y / dy).floor() as usize).min(lj);
        let tx = pos.x / dx - i0 as f64;
        let ty = pos.y / dy - j0 as f64;

        grid.data[[i0, j0]] += (1.0 - tx) * (1.0 - ty);
        grid.data[[i0, j0 + 1]] += (1.0 - tx) * ty;
        grid.data[[i0 + 1, j0]] += tx * (1.0 - ty);
        grid.data[[i0 + 1, j0 + 1]] += tx * ty;
    }
}

/// Form the charge density `rho = e * weight * (n_i - n_e) / cell volume`.
pub fn charge_density(
    particle_weight: f64,
    ion_density: &UniformGrid1D,
    electron_density: &UniformGrid1D,
    out: &mut UniformGrid1D,
) -> DischargeResult<()> {
    if ion_density.n() != electron_density.n() || ion_density.n() != out.n() {
        return Err(DischargeError::ShapeMismatch {
            context: "charge_density".to_string(),
            expected: vec![out.n()],
            got: vec![ion_density.n(), electron_density.n()],
        });
    }
    let k = Q_ELECTRON * particle_weight / out.dx;
    for i in 0..out.n() {
        out.data[i] = k * (ion_density.data[i] - electron_density.data[i]);
    }
    Ok(())
}

/// 2D counterpart of [`charge_density`]; cell volume is `dx * dy`.
pub fn charge_density_2d(
    particle_weight: f64,
    ion_density: &UniformGrid2D,
    electron_density: &UniformGrid2D,
    out: &mut UniformGrid2D,
) -> DischargeResult<()> {
    if ion_density.data.dim() != electron_density.data.dim()
        || ion_density.data.dim() != out.data.dim()
    {
        return Err(DischargeError::ShapeMismatch {
            context: "charge_density_2d".to_string(),
            expected: vec![out.nx(), out.ny()],
            got: vec![ion_density.nx(), ion_density.ny()],
        });
    }
    let k = Q_ELECTRON * particle_weight / (out.prop.dx.x * out.prop.dx.y);
    for ((i, j), v) in out.data.indexed_iter_mut() {
        *v = k * (ion_density.data[[i, j]] - electron_density.data[[i, j]]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use discharge_types::grid::GridProp2D;
    use discharge_types::vec::Vec3;

    #[test]
    fn test_gather_weights_partition_of_unity() {
        let mut field = UniformGrid1D::new(6, 0.5).unwrap();
        field.data.fill(3.0);

        let mut s = ChargedSpecies1D3V::new(-1.0, 1.0).unwrap();
        for xp in [0.0, 0.1, 0.49, 1.26, 2.499] {
            s.add(xp, Vec3::default());
        }
        field_at_particles(&field, &mut s);
        // Constant field gathers to the constant exactly when the two
        // linear weights sum to one.
        for (i, &f) in s.f().iter().enumerate() {
            assert!((f - 3.0).abs() < 1e-15, "particle {i}: f = {f}");
        }
    }

    #[test]
    fn test_gather_linear_field_is_exact() {
        let mut field = UniformGrid1D::new(5, 1.0).unwrap();
        for i in 0..5 {
            field.data[i] = 2.0 * i as f64;
        }
        let mut s = ChargedSpecies1D3V::new(-1.0, 1.0).unwrap();
        s.add(1.5, Vec3::default());
        s.add(3.25, Vec3::default());
        field_at_particles(&field, &mut s);
        assert!((s.f()[0] - 3.0).abs() < 1e-14);
        assert!((s.f()[1] - 6.5).abs() < 1e-14);
    }

    #[test]
    fn test_scatter_gather_roundtrip_on_node() {
        // A particle exactly on a node deposits weight 1 there and
        // gathers back the nodal value.
        let mut grid = UniformGrid1D::new(8, 0.25).unwrap();
        let mut s = ChargedSpecies1D3V::new(-1.0, 1.0).unwrap();
        s.add(0.75, Vec3::default()); // node 3
        deposit_density(&s, &mut grid);
        assert!((grid.data[3] - 1.0).abs() < 1e-15);
        assert!((grid.data.sum() - 1.0).abs() < 1e-15);

        field_at_particles(&grid, &mut s);
        assert!((s.f()[0] - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_scatter_splits_between_nodes() {
        let mut grid = UniformGrid1D::new(4, 1.0).unwrap();
        let mut s = ChargedSpecies1D3V::new(-1.0, 1.0).unwrap();
        s.add(1.25, Vec3::default());
        deposit_density(&s, &mut grid);
        assert!((grid.data[1] - 0.75).abs() < 1e-15);
        assert!((grid.data[2] - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_charge_density_sign_and_scale() {
        let mut ni = UniformGrid1D::new(3, 0.5).unwrap();
        let mut ne = UniformGrid1D::new(3, 0.5).unwrap();
        let mut rho = UniformGrid1D::new(3, 0.5).unwrap();
        ni.data[1] = 2.0;
        ne.data[1] = 0.5;
        charge_density(1.0e5, &ni, &ne, &mut rho).unwrap();
        let expected = Q_ELECTRON * 1.0e5 * 1.5 / 0.5;
        assert!((rho.data[1] - expected).abs() < expected * 1e-12);
        assert_eq!(rho.data[0], 0.0);
    }

    #[test]
    fn test_charge_density_shape_mismatch() {
        let ni = UniformGrid1D::new(4, 0.5).unwrap();
        let ne = UniformGrid1D::new(3, 0.5).unwrap();
        let mut rho = UniformGrid1D::new(4, 0.5).unwrap();
        assert!(charge_density(1.0, &ni, &ne, &mut rho).is_err());
    }

    #[test]
    fn test_gather_2d_constant_field() {
        let prop = GridProp2D::new([5, 4], Vec2::new(0.5, 0.5)).unwrap();
        let mut ex = UniformGrid2D::new(prop);
        let mut ey = UniformGrid2D::new(prop);
        ex.data.fill(2.0);
        ey.data.fill(-1.0);

        let mut s = ChargedSpecies2D3V::new(-1.0, 1.0).unwrap();
        s.add(Vec2::new(0.7, 1.1), Vec3::default());
        field_at_particles_2d(&ex, &ey, &mut s);
        assert!((s.f()[0].x - 2.0).abs() < 1e-14);
        assert!((s.f()[0].y + 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_deposit_2d_conserves_total_weight() {
        let prop = GridProp2D::new([6, 6], Vec2::new(1.0, 1.0)).unwrap();
        let mut grid = UniformGrid2D::new(prop);
        let mut s = ChargedSpecies2D3V::new(1.0, 1.0).unwrap();
        s.add(Vec2::new(1.3, 2.8), Vec3::default());
        s.add(Vec2::new(4.0, 4.0), Vec3::default());
        s.add(Vec2::new(0.1, 0.9), Vec3::default());
        deposit_density_2d(&s, &mut grid);
        assert!((grid.data.sum() - 3.0).abs() < 1e-12);
    }
}
