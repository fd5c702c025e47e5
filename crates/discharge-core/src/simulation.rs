// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Simulation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-step driver for the 1D bounded discharge.
//!
//! Each step executes strictly in order: charge deposition, Poisson
//! solve, field interpolation, push, boundary reactions, collisions.
//! The driver owns all grids and species; components borrow them one
//! at a time.

use discharge_types::config::DischargeConfig;
use discharge_types::constants::{EPS0, M_ELECTRON, Q_ELECTRON};
use discharge_types::error::DischargeResult;
use discharge_types::grid::UniformGrid1D;
use discharge_types::species::ChargedSpecies1D3V;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::boundary::apply_absorbing_boundary;
use crate::interpolate::{charge_density, deposit_density, field_at_particles};
use crate::mcc::MonteCarloCollisions;
use crate::poisson::DirichletPoissonSolver1D;
use crate::pusher::move_particles;

/// Bounded 1D discharge between two fixed-potential electrodes.
pub struct Discharge1D {
    config: DischargeConfig,
    pub electrons: ChargedSpecies1D3V,
    pub ions: ChargedSpecies1D3V,
    electron_density: UniformGrid1D,
    ion_density: UniformGrid1D,
    rho: UniformGrid1D,
    efield: UniformGrid1D,
    solver: DirichletPoissonSolver1D,
    mcc: Option<MonteCarloCollisions>,
    phi: Array1<f64>,
    steps_done: u64,
    pub absorbed_electrons: u64,
    pub absorbed_ions: u64,
    pub collision_events: u64,
}

impl Discharge1D {
    /// Build and seed a discharge from its problem description.
    pub fn new(config: DischargeConfig) -> DischargeResult<Self> {
        config.validate()?;
        let n = config.n_cells;
        let dx = config.dx();

        let mut electrons = ChargedSpecies1D3V::new(-Q_ELECTRON, M_ELECTRON)?;
        let mut ions = ChargedSpecies1D3V::new(Q_ELECTRON, config.gas.mass)?;

        let mut rng = StdRng::seed_from_u64(config.rng_seed);
        electrons.add_maxwellian(
            config.n_seed,
            config.seed_temperature_e,
            0.0,
            config.length,
            &mut rng,
        )?;
        ions.add_maxwellian(
            config.n_seed,
            config.seed_temperature_i,
            0.0,
            config.length,
            &mut rng,
        )?;

        Ok(Discharge1D {
            electrons,
            ions,
            electron_density: UniformGrid1D::new(n, dx)?,
            ion_density: UniformGrid1D::new(n, dx)?,
            rho: UniformGrid1D::new(n, dx)?,
            efield: UniformGrid1D::new(n, dx)?,
            solver: DirichletPoissonSolver1D::new(n, dx)?,
            mcc: None,
            phi: Array1::zeros(n),
            steps_done: 0,
            absorbed_electrons: 0,
            absorbed_ions: 0,
            collision_events: 0,
            config,
        })
    }

    /// Attach a collision model; without one the discharge runs
    /// collisionless.
    pub fn set_collisions(&mut self, mcc: MonteCarloCollisions) {
        self.mcc = Some(mcc);
    }

    pub fn config(&self) -> &DischargeConfig {
        &self.config
    }

    pub fn steps_done(&self) -> u64 {
        self.steps_done
    }

    /// Potential of the last step.
    pub fn phi(&self) -> &Array1<f64> {
        &self.phi
    }

    /// Electric field of the last step.
    pub fn efield(&self) -> &UniformGrid1D {
        &self.efield
    }

    /// Advance the discharge by one timestep.
    pub fn step(&mut self) -> DischargeResult<()> {
        let dt = self.config.dt;

        // 1. Charge deposition.
        deposit_density(&self.electrons, &mut self.electron_density);
        deposit_density(&self.ions, &mut self.ion_density);
        charge_density(
            self.config.weight,
            &self.ion_density,
            &self.electron_density,
            &mut self.rho,
        )?;

        // 2. Poisson solve on the scaled source -rho/eps0.
        let source = self.rho.data.mapv(|v| -v / EPS0);
        self.phi = self.solver.solve(
            &source,
            self.config.voltage_left,
            self.config.voltage_right,
        )?;
        self.efield.data = self.solver.efield(&self.phi)?;

        // 3. Field interpolation.
        field_at_particles(&self.efield, &mut self.electrons);
        field_at_particles(&self.efield, &mut self.ions);

        // 4. Push.
        move_particles(&mut self.electrons, dt);
        move_particles(&mut self.ions, dt);

        // 5. Electrode absorption.
        self.absorbed_electrons +=
            apply_absorbing_boundary(&mut self.electrons, 0.0, self.config.length) as u64;
        self.absorbed_ions +=
            apply_absorbing_boundary(&mut self.ions, 0.0, self.config.length) as u64;

        // 6. Collisions.
        if let Some(mcc) = self.mcc.as_mut() {
            self.collision_events +=
                mcc.collide_electrons(&mut self.electrons, &mut self.ions)? as u64;
            self.collision_events += mcc.collide_ions(&mut self.ions)? as u64;
        }

        self.steps_done += 1;
        Ok(())
    }

    /// Advance the discharge by `n` timesteps.
    pub fn run(&mut self, n: u64) -> DischargeResult<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcc::{CollisionKind, CollisionReaction};
    use discharge_types::config::NeutralGas;

    const HE_MASS: f64 = 6.67e-27;

    fn small_config() -> DischargeConfig {
        DischargeConfig {
            name: "unit".to_string(),
            n_cells: 32,
            length: 0.02,
            dt: 5.0e-11,
            weight: 1.0e4,
            n_seed: 300,
            seed_temperature_e: 30_000.0,
            seed_temperature_i: 300.0,
            voltage_left: 0.0,
            voltage_right: -50.0,
            gas: NeutralGas {
                density: 1.0e21,
                temperature: 300.0,
                mass: HE_MASS,
            },
            rng_seed: 7,
        }
    }

    fn helium_reactions() -> (CollisionReaction, CollisionReaction, CollisionReaction, CollisionReaction)
    {
        let el = CollisionReaction::new(
            vec![0.1, 1.0, 10.0, 100.0],
            vec![6.0e-20, 6.5e-20, 5.0e-20, 2.0e-20],
            0.0,
            CollisionKind::Elastic,
        )
        .unwrap();
        let iz = CollisionReaction::new(
            vec![24.6, 50.0, 100.0],
            vec![0.0, 2.5e-21, 3.0e-21],
            24.6,
            CollisionKind::Ionization,
        )
        .unwrap();
        let iso = CollisionReaction::new(
            vec![0.1, 10.0],
            vec![4.0e-19, 3.0e-19],
            0.0,
            CollisionKind::IonIsotropic,
        )
        .unwrap();
        let bs = CollisionReaction::new(
            vec![0.1, 10.0],
            vec![4.0e-19, 3.0e-19],
            0.0,
            CollisionKind::IonBackscatter,
        )
        .unwrap();
        (el, iz, iso, bs)
    }

    #[test]
    fn test_driver_seeds_populations() {
        let sim = Discharge1D::new(small_config()).unwrap();
        assert_eq!(sim.electrons.n(), 300);
        assert_eq!(sim.ions.n(), 300);
        assert!(sim
            .electrons
            .x()
            .iter()
            .all(|&x| (0.0..0.02).contains(&x)));
    }

    #[test]
    fn test_step_ordering_produces_field_and_keeps_particles_in_domain() {
        let mut sim = Discharge1D::new(small_config()).unwrap();
        sim.run(5).unwrap();
        assert_eq!(sim.steps_done(), 5);

        // Applied -50 V across the gap leaves a nonzero field.
        let emax = sim
            .efield()
            .data
            .iter()
            .fold(0.0_f64, |a, v| a.max(v.abs()));
        assert!(emax > 0.0);

        // Electrode potentials are pinned every solve.
        assert_eq!(sim.phi()[0], 0.0);
        assert_eq!(sim.phi()[31], -50.0);

        // Survivors are inside the gap (absorption ran after the push).
        let l = sim.config().length;
        assert!(sim.electrons.x().iter().all(|&x| (0.0..=l).contains(&x)));
        assert!(sim.ions.x().iter().all(|&x| (0.0..=l).contains(&x)));
    }

    #[test]
    fn test_collisional_run_counts_events() {
        let config = small_config();
        let (el, iz, iso, bs) = helium_reactions();
        let mcc = MonteCarloCollisions::new(
            config.collision_config(),
            el,
            vec![],
            iz,
            iso,
            bs,
        )
        .unwrap();

        let mut sim = Discharge1D::new(config).unwrap();
        sim.set_collisions(mcc);
        sim.run(50).unwrap();
        assert!(
            sim.collision_events > 0,
            "a collisional run should record events"
        );
    }

    #[test]
    fn test_runs_are_deterministic_under_fixed_seed() {
        let run = || {
            let config = small_config();
            let (el, iz, iso, bs) = helium_reactions();
            let mcc = MonteCarloCollisions::new(
                config.collision_config(),
                el,
                vec![],
                iz,
                iso,
                bs,
            )
            .unwrap();
            let mut sim = Discharge1D::new(config).unwrap();
            sim.set_collisions(mcc);
            sim.run(20).unwrap();
            (
                sim.electrons.n(),
                sim.ions.n(),
                sim.collision_events,
                sim.phi().to_vec(),
            )
        };
        assert_eq!(run(), run());
    }
}
