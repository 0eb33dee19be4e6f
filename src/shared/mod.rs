//! Geteilte, layer-neutrale Mathematik.
//!
//! Reine Funktionen ohne Abhängigkeit auf `core`, damit Geometrie,
//! Höhenprofil und Spurbreiten dieselben Bausteine nutzen können.

mod numeric;
mod polynomial;

pub use numeric::{minimize_scalar, wrap_angle, wrap_angle_positive};
pub use numeric::{CLOSEST_OFFSET_EPS, COARSE_SCAN_STEPS, GOLDEN_SECTION_MAX_ITERS};
pub use polynomial::Poly3;
