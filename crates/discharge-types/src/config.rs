// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{DischargeError, DischargeResult};

/// Background neutral gas description.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NeutralGas {
    /// Number density [m^-3].
    pub density: f64,
    /// Gas temperature [K].
    pub temperature: f64,
    /// Atom mass [kg].
    pub mass: f64,
}

/// Parameters of the null-collision scheme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CollisionConfig {
    /// Collision timestep [s].
    pub dt: f64,
    /// Neutral number density [m^-3].
    pub n_neutral: f64,
    /// Neutral temperature [K].
    pub neutral_temperature: f64,
    /// Neutral mass [kg].
    pub neutral_mass: f64,
    /// Seed of the per-simulation random stream.
    pub seed: u64,
}

impl CollisionConfig {
    pub fn validate(&self) -> DischargeResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "collision dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        if !self.n_neutral.is_finite() || self.n_neutral <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "n_neutral must be finite and > 0, got {}",
                self.n_neutral
            )));
        }
        if !self.neutral_temperature.is_finite() || self.neutral_temperature < 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "neutral_temperature must be finite and >= 0, got {}",
                self.neutral_temperature
            )));
        }
        if !self.neutral_mass.is_finite() || self.neutral_mass <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "neutral_mass must be finite and > 0, got {}",
                self.neutral_mass
            )));
        }
        Ok(())
    }
}

/// Description of a 1D benchmark discharge between two electrodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DischargeConfig {
    pub name: String,
    /// Number of grid nodes.
    pub n_cells: usize,
    /// Electrode gap [m].
    pub length: f64,
    /// Timestep [s].
    pub dt: f64,
    /// Macro-particle weight.
    pub weight: f64,
    /// Initial macro-particles per species.
    pub n_seed: usize,
    /// Electron seed temperature [K].
    pub seed_temperature_e: f64,
    /// Ion seed temperature [K].
    pub seed_temperature_i: f64,
    /// Fixed potential at the left electrode [V].
    pub voltage_left: f64,
    /// Fixed potential at the right electrode [V].
    pub voltage_right: f64,
    pub gas: NeutralGas,
    /// Seed of the per-simulation random stream.
    pub rng_seed: u64,
}

impl DischargeConfig {
    /// Load from a JSON problem file.
    pub fn from_file(path: &str) -> DischargeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DischargeResult<()> {
        if self.n_cells < 3 {
            return Err(DischargeError::PreconditionViolated(format!(
                "n_cells must be >= 3, got {}",
                self.n_cells
            )));
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "length must be finite and > 0, got {}",
                self.length
            )));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(DischargeError::PreconditionViolated(format!(
                "weight must be finite and > 0, got {}",
                self.weight
            )));
        }
        self.collision_config().validate()
    }

    /// Grid node spacing [m].
    pub fn dx(&self) -> f64 {
        self.length / (self.n_cells - 1) as f64
    }

    /// Collision parameters derived from this problem description.
    pub fn collision_config(&self) -> CollisionConfig {
        CollisionConfig {
            dt: self.dt,
            n_neutral: self.gas.density,
            neutral_temperature: self.gas.temperature,
            neutral_mass: self.gas.mass,
            seed: self.rng_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helium_benchmark() -> DischargeConfig {
        DischargeConfig {
            name: "ccp-benchmark".to_string(),
            n_cells: 128,
            length: 0.067,
            dt: 1.0 / (400.0 * 13.56e6),
            weight: 1.0e5,
            n_seed: 512,
            seed_temperature_e: 30_000.0,
            seed_temperature_i: 300.0,
            voltage_left: 0.0,
            voltage_right: 0.0,
            gas: NeutralGas {
                density: 9.64e20,
                temperature: 300.0,
                mass: 6.67e-27,
            },
            rng_seed: 42,
        }
    }

    #[test]
    fn test_config_roundtrip_json() {
        let cfg = helium_benchmark();
        let text = serde_json::to_string(&cfg).unwrap();
        let back: DischargeConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.name, cfg.name);
        assert_eq!(back.n_cells, cfg.n_cells);
        assert!((back.gas.mass - cfg.gas.mass).abs() < 1e-40);
    }

    #[test]
    fn test_config_dx_spans_gap() {
        let cfg = helium_benchmark();
        assert!((cfg.dx() * (cfg.n_cells - 1) as f64 - cfg.length).abs() < 1e-15);
    }

    #[test]
    fn test_config_validation_catches_bad_fields() {
        let mut cfg = helium_benchmark();
        cfg.n_cells = 2;
        assert!(cfg.validate().is_err());

        let mut cfg = helium_benchmark();
        cfg.dt = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = helium_benchmark();
        cfg.gas.density = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_collision_config_inherits_gas() {
        let cfg = helium_benchmark();
        let cc = cfg.collision_config();
        assert_eq!(cc.n_neutral, cfg.gas.density);
        assert_eq!(cc.neutral_mass, cfg.gas.mass);
        assert_eq!(cc.seed, cfg.rng_seed);
        assert!(cc.validate().is_ok());
    }
}
