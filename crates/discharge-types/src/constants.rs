// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Values from https://physics.nist.gov/cuu/Constants/Table/allascii.txt

/// Elementary charge [C]
pub const Q_ELECTRON: f64 = 1.602176634e-19;

/// eV <-> Joule conversion factor
pub const EV_TO_J: f64 = Q_ELECTRON;

/// Electron mass [kg]
pub const M_ELECTRON: f64 = 9.1093837139e-31;

/// Vacuum permittivity [F/m]
pub const EPS0: f64 = 8.8541878188e-12;

/// Boltzmann constant [J/K]
pub const K_BOLTZMANN: f64 = 1.380649e-23;
