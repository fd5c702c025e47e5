// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — MCC
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Null-collision Monte-Carlo scattering against a uniform neutral
//! background.
//!
//! A constant upper bound nu' on the total collision frequency is
//! calibrated once over the union of tabulated cross-section energies.
//! Per step only an expected fraction `1 - exp(-nu' dt)` of the
//! population is sampled; each sampled particle picks a reaction branch
//! from cumulative frequency ratios, with the remainder a null event
//! that leaves the particle untouched.
//!
//! Energy bookkeeping for the electron branches:
//! - elastic: heavy-target loss fraction `(2 m/M)(1 - cos chi)`;
//! - excitation: threshold subtracted, remainder kept by the electron;
//! - ionization: threshold subtracted, remainder split equally between
//!   the scattered and ejected electron; the new ion starts at rest.

use discharge_types::config::CollisionConfig;
use discharge_types::constants::{M_ELECTRON, Q_ELECTRON};
use discharge_types::error::{DischargeError, DischargeResult};
use discharge_types::species::ChargedSpecies1D3V;
use discharge_types::vec::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Incident directions closer than this to the z pole use the floored
/// `sin zeta` below instead of the exact (vanishing) value.
const POLE_EPS: f64 = 1e-12;
const SIN_ZETA_MIN: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    Elastic,
    Excitation,
    Ionization,
    IonIsotropic,
    IonBackscatter,
}

/// Tabulated cross section with its reaction threshold.
#[derive(Debug, Clone)]
pub struct CollisionReaction {
    pub energy: Vec<f64>,
    pub cross_section: Vec<f64>,
    pub energy_threshold: f64,
    pub kind: CollisionKind,
}

impl CollisionReaction {
    pub fn new(
        energy: Vec<f64>,
        cross_section: Vec<f64>,
        energy_threshold: f64,
        kind: CollisionKind,
    ) -> DischargeResult<Self> {
        let reaction = CollisionReaction {
            energy,
            cross_section,
            energy_threshold,
            kind,
        };
        reaction.validate()?;
        Ok(reaction)
    }

    fn validate(&self) -> DischargeResult<()> {
        if self.energy.is_empty() {
            return Err(DischargeError::PreconditionViolated(
                "cross-section table must be non-empty".to_string(),
            ));
        }
        if self.energy.len() != self.cross_section.len() {
            return Err(DischargeError::PreconditionViolated(format!(
                "cross-section table lengths differ: {} energies, {} values",
                self.energy.len(),
                self.cross_section.len()
            )));
        }
        if self.energy.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DischargeError::PreconditionViolated(
                "cross-section energies must be strictly increasing".to_string(),
            ));
        }
        if self
            .energy
            .iter()
            .chain(self.cross_section.iter())
            .any(|v| !v.is_finite())
        {
            return Err(DischargeError::PreconditionViolated(
                "cross-section table contains non-finite values".to_string(),
            ));
        }
        if !self.energy_threshold.is_finite() || self.energy_threshold < 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "energy threshold must be finite and >= 0, got {}",
                self.energy_threshold
            )));
        }
        Ok(())
    }

    /// Linear interpolation of the cross section at `energy` [eV],
    /// clamped to the table ends.
    pub fn at(&self, energy: f64) -> f64 {
        let e = &self.energy;
        let s = &self.cross_section;
        if energy <= e[0] {
            return s[0];
        }
        if energy >= e[e.len() - 1] {
            return s[s.len() - 1];
        }
        let k = e.partition_point(|&x| x < energy);
        let (x0, x1) = (e[k - 1], e[k]);
        let (y0, y1) = (s[k - 1], s[k]);
        y0 + (energy - x0) * (y1 - y0) / (x1 - x0)
    }
}

/// Null-collision MCC over electrons and ions.
pub struct MonteCarloCollisions {
    config: CollisionConfig,
    el_cs: CollisionReaction,
    exc_cs: Vec<CollisionReaction>,
    iz_cs: CollisionReaction,
    iso_cs: CollisionReaction,
    bs_cs: CollisionReaction,
    nu_prime_e: f64,
    p_null_e: f64,
    nu_prime_i: f64,
    p_null_i: f64,
    rng: StdRng,
}

impl MonteCarloCollisions {
    pub fn new(
        config: CollisionConfig,
        el_cs: CollisionReaction,
        exc_cs: Vec<CollisionReaction>,
        iz_cs: CollisionReaction,
        iso_cs: CollisionReaction,
        bs_cs: CollisionReaction,
    ) -> DischargeResult<Self> {
        config.validate()?;
        for (reaction, expected) in [
            (&el_cs, CollisionKind::Elastic),
            (&iz_cs, CollisionKind::Ionization),
            (&iso_cs, CollisionKind::IonIsotropic),
            (&bs_cs, CollisionKind::IonBackscatter),
        ] {
            reaction.validate()?;
            if reaction.kind != expected {
                return Err(DischargeError::PreconditionViolated(format!(
                    "reaction slot expects {expected:?}, got {:?}",
                    reaction.kind
                )));
            }
        }
        for exc in &exc_cs {
            exc.validate()?;
            if exc.kind != CollisionKind::Excitation {
                return Err(DischargeError::PreconditionViolated(format!(
                    "excitation slot got {:?}",
                    exc.kind
                )));
            }
        }

        let rng = StdRng::seed_from_u64(config.seed);
        let mut mcc = MonteCarloCollisions {
            config,
            el_cs,
            exc_cs,
            iz_cs,
            iso_cs,
            bs_cs,
            nu_prime_e: 0.0,
            p_null_e: 0.0,
            nu_prime_i: 0.0,
            p_null_i: 0.0,
            rng,
        };
        mcc.nu_prime_e = mcc.calc_nu_prime_electrons();
        mcc.p_null_e = p_null(mcc.nu_prime_e, mcc.config.dt);
        mcc.nu_prime_i = mcc.calc_nu_prime_ions();
        mcc.p_null_i = p_null(mcc.nu_prime_i, mcc.config.dt);
        Ok(mcc)
    }

    pub fn nu_prime_electrons(&self) -> f64 {
        self.nu_prime_e
    }

    pub fn p_null_electrons(&self) -> f64 {
        self.p_null_e
    }

    pub fn nu_prime_ions(&self) -> f64 {
        self.nu_prime_i
    }

    pub fn p_null_ions(&self) -> f64 {
        self.p_null_i
    }

    fn total_cs_electrons(&self, energy: f64) -> f64 {
        let mut cs = self.el_cs.at(energy) + self.iz_cs.at(energy);
        for exc in &self.exc_cs {
            cs += exc.at(energy);
        }
        cs
    }

    fn total_cs_ions(&self, energy: f64) -> f64 {
        self.iso_cs.at(energy) + self.bs_cs.at(energy)
    }

    /// Relative ion-neutral speed at energy `t` [eV]; the factor 4 is
    /// the reduced-mass convention for equal-mass collision pairs.
    fn ion_speed_of(&self, t: f64) -> f64 {
        (4.0 * Q_ELECTRON * t.max(0.0) / self.config.neutral_mass).sqrt()
    }

    /// Maximal electron collision frequency over the union of all
    /// tabulated energies.
    fn calc_nu_prime_electrons(&self) -> f64 {
        let mut nu_prime = 0.0_f64;
        let tables = std::iter::once(&self.el_cs)
            .chain(std::iter::once(&self.iz_cs))
            .chain(self.exc_cs.iter());
        for table in tables {
            for &energy in &table.energy {
                let nu = self.config.n_neutral
                    * self.total_cs_electrons(energy)
                    * speed_from_energy(energy, M_ELECTRON);
                nu_prime = nu_prime.max(nu);
            }
        }
        nu_prime
    }

    fn calc_nu_prime_ions(&self) -> f64 {
        let mut nu_prime = 0.0_f64;
        for table in [&self.iso_cs, &self.bs_cs] {
            for &energy in &table.energy {
                let nu =
                    self.config.n_neutral * self.total_cs_ions(energy) * self.ion_speed_of(energy);
                nu_prime = nu_prime.max(nu);
            }
        }
        nu_prime
    }

    fn frequency_ratio_electron(&self, reaction: &CollisionReaction, t: f64, m: f64) -> f64 {
        self.config.n_neutral * reaction.at(t) * speed_from_energy(t, m) / self.nu_prime_e
    }

    /// Number of particles to sample this step: floor of the expected
    /// count plus a Bernoulli draw on the fractional part.
    fn null_collision_count(&mut self, n: usize, p_null: f64) -> usize {
        let expected = p_null * n as f64;
        let mut count = expected.floor() as usize;
        if self.rng.gen::<f64>() < expected - count as f64 {
            count += 1;
        }
        count.min(n)
    }

    /// Apply electron-neutral collisions; ionization appends an
    /// electron-ion pair to both species. Returns the number of
    /// non-null events.
    pub fn collide_electrons(
        &mut self,
        electrons: &mut ChargedSpecies1D3V,
        ions: &mut ChargedSpecies1D3V,
    ) -> DischargeResult<usize> {
        let n = electrons.n();
        if n == 0 || self.nu_prime_e == 0.0 {
            return Ok(0);
        }

        let n_null = self.null_collision_count(n, self.p_null_e);
        let picks = rand::seq::index::sample(&mut self.rng, n, n_null);
        let m = electrons.m();
        let neutral_mass = self.config.neutral_mass;
        let mut events = 0;

        for idx in picks {
            let v_in = electrons.v()[idx];
            let t = 0.5 * m * v_in.norm_squared() / Q_ELECTRON;
            let r1 = self.rng.gen::<f64>();

            // Elastic branch.
            let mut fr = self.frequency_ratio_electron(&self.el_cs, t, m);
            if r1 <= fr {
                let chi = (1.0 - 2.0 * self.rng.gen::<f64>()).acos();
                let phi = 2.0 * PI * self.rng.gen::<f64>();
                let dir = isotropic_scatter(v_in, chi, phi);
                let delta = (2.0 * m / neutral_mass) * (1.0 - chi.cos());
                electrons.v_mut()[idx] = dir.scaled(speed_from_energy(t * (1.0 - delta), m));
                events += 1;
                continue;
            }

            // Excitation branches; a selected branch below threshold is
            // a null event.
            let mut handled = false;
            for k in 0..self.exc_cs.len() {
                let fr0 = fr;
                fr += self.frequency_ratio_electron(&self.exc_cs[k], t, m);
                if r1 > fr0 && r1 <= fr {
                    let threshold = self.exc_cs[k].energy_threshold;
                    if t >= threshold {
                        let chi = (1.0 - 2.0 * self.rng.gen::<f64>()).acos();
                        let phi = 2.0 * PI * self.rng.gen::<f64>();
                        let dir = isotropic_scatter(v_in, chi, phi);
                        electrons.v_mut()[idx] =
                            dir.scaled(speed_from_energy(t - threshold, m));
                        events += 1;
                    }
                    handled = true;
                    break;
                }
            }
            if handled {
                continue;
            }

            // Ionization branch; anything beyond the last ratio is a
            // null collision.
            let fr0 = fr;
            fr += self.frequency_ratio_electron(&self.iz_cs, t, m);
            if r1 > fr0 && r1 <= fr && t >= self.iz_cs.energy_threshold {
                let x = electrons.x()[idx];
                let t_half = (t - self.iz_cs.energy_threshold) / 2.0;
                let vmag = speed_from_energy(t_half, m);

                let chi = (1.0 - 2.0 * self.rng.gen::<f64>()).acos();
                let phi = 2.0 * PI * self.rng.gen::<f64>();
                electrons.v_mut()[idx] = isotropic_scatter(v_in, chi, phi).scaled(vmag);

                let chi_new = (1.0 - 2.0 * self.rng.gen::<f64>()).acos();
                let phi_new = 2.0 * PI * self.rng.gen::<f64>();
                electrons.add(x, isotropic_scatter(v_in, chi_new, phi_new).scaled(vmag));

                // The ejected ion starts from the cold background.
                ions.add(x, Vec3::default());
                events += 1;
            }
        }

        Ok(events)
    }

    /// Apply ion-neutral collisions. Returns the number of non-null
    /// events.
    pub fn collide_ions(&mut self, ions: &mut ChargedSpecies1D3V) -> DischargeResult<usize> {
        let n = ions.n();
        if n == 0 || self.nu_prime_i == 0.0 {
            return Ok(0);
        }

        let n_null = self.null_collision_count(n, self.p_null_i);
        let picks = rand::seq::index::sample(&mut self.rng, n, n_null);
        let m = ions.m();
        let mut events = 0;

        for idx in picks {
            let v = ions.v()[idx];
            let t = 0.5 * m * v.norm_squared() / Q_ELECTRON;
            let r1 = self.rng.gen::<f64>();

            let g = self.ion_speed_of(t);
            let fr_iso = self.config.n_neutral * self.iso_cs.at(t) * g / self.nu_prime_i;
            let fr_bs = fr_iso + self.config.n_neutral * self.bs_cs.at(t) * g / self.nu_prime_i;

            if r1 <= fr_iso {
                // Isotropic: new direction on the sphere, same speed.
                let speed = v.norm();
                let cos_theta = 1.0 - 2.0 * self.rng.gen::<f64>();
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
                let phi = 2.0 * PI * self.rng.gen::<f64>();
                ions.v_mut()[idx] = Vec3::new(
                    speed * sin_theta * phi.cos(),
                    speed * sin_theta * phi.sin(),
                    speed * cos_theta,
                );
                events += 1;
            } else if r1 <= fr_bs {
                let v = &mut ions.v_mut()[idx];
                v.x = -v.x;
                v.y = -v.y;
                v.z = -v.z;
                events += 1;
            }
        }

        Ok(events)
    }
}

fn p_null(nu_prime: f64, dt: f64) -> f64 {
    1.0 - (-nu_prime * dt).exp()
}

/// Speed of a particle of mass `m` at kinetic energy `t` [eV].
fn speed_from_energy(t: f64, m: f64) -> f64 {
    (2.0 * Q_ELECTRON * t.max(0.0) / m).sqrt()
}

/// Rotate the direction of `v` by polar angle `chi` and azimuth `phi`
/// around the incident direction.
///
/// Near the z pole `sin zeta` vanishes; the incident direction is
/// tilted by the small polar angle `SIN_ZETA_MIN` so the rotation stays
/// finite and the result stays a unit vector.
fn isotropic_scatter(v: Vec3, chi: f64, phi: f64) -> Vec3 {
    let mut vn = v.normalized();
    if vn.z.abs() > 1.0 - POLE_EPS {
        vn = Vec3::new(
            SIN_ZETA_MIN,
            0.0,
            vn.z.signum() * (1.0 - SIN_ZETA_MIN * SIN_ZETA_MIN).sqrt(),
        );
    }
    let sin_zeta = (vn.x * vn.x + vn.y * vn.y).sqrt().max(SIN_ZETA_MIN);

    let (sin_chi, cos_chi) = chi.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();

    Vec3::new(
        vn.x * cos_chi + (vn.y * sin_chi * sin_phi + vn.x * vn.z * sin_chi * cos_phi) / sin_zeta,
        vn.y * cos_chi - (vn.x * sin_chi * sin_phi - vn.y * vn.z * sin_chi * cos_phi) / sin_zeta,
        vn.z * cos_chi - (vn.x * vn.x + vn.y * vn.y) * sin_chi * cos_phi / sin_zeta,
    )
}
