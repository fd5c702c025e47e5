// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Discharge Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Electrostatic PIC/MCC simulation kernel.
//!
//! Per timestep: charge deposition, Poisson solve, field gather,
//! particle push, boundary reactions, Monte-Carlo collisions.

pub mod boundary;
pub mod interpolate;
pub mod mcc;
pub mod poisson;
pub mod pusher;
pub mod simulation;
