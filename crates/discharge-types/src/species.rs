// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Species
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Structure-of-arrays particle populations.
//!
//! Positions, velocities and the gathered force live in parallel flat
//! arrays so the pusher and collision loops stream through memory.
//! Deletion is unordered swap-remove; `q` and `m` are fixed for the
//! lifetime of the species.

use crate::constants::K_BOLTZMANN;
use crate::error::{DischargeError, DischargeResult};
use crate::vec::{Vec2, Vec3};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Population with 1D positions and 3D velocities.
#[derive(Debug, Clone)]
pub struct ChargedSpecies1D3V {
    x: Vec<f64>,
    v: Vec<Vec3>,
    f: Vec<f64>,
    q: f64,
    m: f64,
}

impl ChargedSpecies1D3V {
    pub fn new(q: f64, m: f64) -> DischargeResult<Self> {
        if !m.is_finite() || m <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "species mass must be finite and > 0, got {m}"
            )));
        }
        if !q.is_finite() {
            return Err(DischargeError::PreconditionViolated(
                "species charge must be finite".to_string(),
            ));
        }
        Ok(ChargedSpecies1D3V {
            x: Vec::new(),
            v: Vec::new(),
            f: Vec::new(),
            q,
            m,
        })
    }

    pub fn n(&self) -> usize {
        self.x.len()
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn x_mut(&mut self) -> &mut [f64] {
        &mut self.x
    }

    pub fn v(&self) -> &[Vec3] {
        &self.v
    }

    pub fn v_mut(&mut self) -> &mut [Vec3] {
        &mut self.v
    }

    pub fn f(&self) -> &[f64] {
        &self.f
    }

    pub fn f_mut(&mut self) -> &mut [f64] {
        &mut self.f
    }

    pub fn add(&mut self, x: f64, v: Vec3) {
        self.x.push(x);
        self.v.push(v);
        self.f.push(0.0);
    }

    /// Unordered removal: the last particle takes the vacated slot.
    pub fn remove(&mut self, idx: usize) {
        self.x.swap_remove(idx);
        self.v.swap_remove(idx);
        self.f.swap_remove(idx);
    }

    /// Seed `count` particles with uniform positions in `(x0, x1)` and
    /// Maxwellian velocities at `temperature` [K].
    pub fn add_maxwellian<R: Rng>(
        &mut self,
        count: usize,
        temperature: f64,
        x0: f64,
        x1: f64,
        rng: &mut R,
    ) -> DischargeResult<()> {
        if !(temperature >= 0.0) {
            return Err(DischargeError::PreconditionViolated(format!(
                "seed temperature must be >= 0, got {temperature}"
            )));
        }
        if !(x1 > x0) {
            return Err(DischargeError::PreconditionViolated(format!(
                "seed range must satisfy x1 > x0, got ({x0}, {x1})"
            )));
        }
        let sigma = (K_BOLTZMANN * temperature / self.m).sqrt();
        let thermal = Normal::new(0.0, sigma).map_err(|e| {
            DischargeError::PreconditionViolated(format!("thermal distribution: {e}"))
        })?;
        for _ in 0..count {
            let x = x0 + (x1 - x0) * rng.gen::<f64>();
            let v = Vec3::new(
                thermal.sample(rng),
                thermal.sample(rng),
                thermal.sample(rng),
            );
            self.add(x, v);
        }
        Ok(())
    }
}

/// Population with 2D positions and 3D velocities.
///
/// In cylindrical problems positions are read as (z, r) and velocities
/// as (vz, vr, vtheta).
#[derive(Debug, Clone)]
pub struct ChargedSpecies2D3V {
    x: Vec<Vec2>,
    v: Vec<Vec3>,
    f: Vec<Vec2>,
    q: f64,
    m: f64,
}

impl ChargedSpecies2D3V {
    pub fn new(q: f64, m: f64) -> DischargeResult<Self> {
        if !m.is_finite() || m <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "species mass must be finite and > 0, got {m}"
            )));
        }
        if !q.is_finite() {
            return Err(DischargeError::PreconditionViolated(
                "species charge must be finite".to_string(),
            ));
        }
        Ok(ChargedSpecies2D3V {
            x: Vec::new(),
            v: Vec::new(),
            f: Vec::new(),
            q,
            m,
        })
    }

    pub fn n(&self) -> usize {
        self.x.len()
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn x(&self) -> &[Vec2] {
        &self.x
    }

    pub fn x_mut(&mut self) -> &mut [Vec2] {
        &mut self.x
    }

    pub fn v(&self) -> &[Vec3] {
        &self.v
    }

    pub fn v_mut(&mut self) -> &mut [Vec3] {
        &mut self.v
    }

    pub fn f(&self) -> &[Vec2] {
        &self.f
    }

    pub fn f_mut(&mut self) -> &mut [Vec2] {
        &mut self.f
    }

    pub fn add(&mut self, x: Vec2, v: Vec3) {
        self.x.push(x);
        self.v.push(v);
        self.f.push(Vec2::default());
    }

    pub fn remove(&mut self, idx: usize) {
        self.x.swap_remove(idx);
        self.v.swap_remove(idx);
        self.f.swap_remove(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_species_arrays_stay_in_sync() {
        let mut s = ChargedSpecies1D3V::new(-1.0, 1.0).unwrap();
        for i in 0..5 {
            s.add(i as f64, Vec3::new(1.0, 0.0, 0.0));
        }
        assert_eq!(s.n(), 5);
        assert_eq!(s.x().len(), s.v().len());
        assert_eq!(s.x().len(), s.f().len());
    }

    #[test]
    fn test_swap_remove_moves_last_particle() {
        let mut s = ChargedSpecies1D3V::new(-1.0, 1.0).unwrap();
        s.add(0.0, Vec3::new(0.0, 0.0, 0.0));
        s.add(1.0, Vec3::new(1.0, 0.0, 0.0));
        s.add(2.0, Vec3::new(2.0, 0.0, 0.0));
        s.remove(0);
        assert_eq!(s.n(), 2);
        assert_eq!(s.x()[0], 2.0);
        assert_eq!(s.v()[0].x, 2.0);
    }

    #[test]
    fn test_species_rejects_nonpositive_mass() {
        assert!(ChargedSpecies1D3V::new(-1.0, 0.0).is_err());
        assert!(ChargedSpecies2D3V::new(1.0, -5.0).is_err());
    }

    #[test]
    fn test_maxwellian_seed_positions_in_range() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut s = ChargedSpecies1D3V::new(-1.0, 9.109e-31).unwrap();
        s.add_maxwellian(200, 300.0, 0.0, 0.025, &mut rng).unwrap();
        assert_eq!(s.n(), 200);
        assert!(s.x().iter().all(|&x| (0.0..0.025).contains(&x)));
        // Thermal spread should be of order sqrt(kT/m) ~ 6.7e4 m/s
        let vbar =
            s.v().iter().map(|v| v.x.abs()).sum::<f64>() / 200.0;
        assert!(vbar > 1.0e4 && vbar < 3.0e5, "vbar = {vbar}");
    }

    #[test]
    fn test_maxwellian_seed_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut s = ChargedSpecies1D3V::new(-1.0, 1.0).unwrap();
        assert!(s.add_maxwellian(5, -1.0, 0.0, 1.0, &mut rng).is_err());
        assert!(s.add_maxwellian(5, 300.0, 1.0, 1.0, &mut rng).is_err());
    }
}
