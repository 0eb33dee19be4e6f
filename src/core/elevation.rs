//! Höhenprofil einer Straße und Steigungs-Sampling.
//!
//! Das Profil ist eine s-geordnete Folge kubischer Polynome; an einer
//! Position gilt der Eintrag mit dem größten `s0 ≤ s`. Ein leeres Profil
//! bedeutet flache Straße auf Höhe 0.

use crate::shared::Poly3;

/// Höhenprofil: `s → Höhe` als stückweise kubisches Polynom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElevationProfile {
    entries: Vec<Poly3>,
}

impl ElevationProfile {
    /// Flaches Profil (Höhe konstant 0).
    pub fn flat() -> Self {
        Self::default()
    }

    /// Baut ein Profil aus Einträgen; sortiert nach `s0`.
    pub fn from_entries(mut entries: Vec<Poly3>) -> Self {
        entries.sort_by(|a, b| a.s0.total_cmp(&b.s0));
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Eintrag mit dem größten `s0 ≤ s`.
    fn entry_at(&self, s: f64) -> Option<&Poly3> {
        let idx = self.entries.partition_point(|e| e.s0 <= s);
        if idx == 0 {
            // Vor dem ersten Eintrag gilt der erste (klemmt nach unten)
            self.entries.first()
        } else {
            self.entries.get(idx - 1)
        }
    }

    /// Höhe an der Bogenlänge `s`.
    pub fn height_at(&self, s: f64) -> f64 {
        self.entry_at(s).map_or(0.0, |e| e.eval(s))
    }

    /// Steigung `dh/ds` an der Bogenlänge `s`.
    pub fn slope_at(&self, s: f64) -> f64 {
        self.entry_at(s).map_or(0.0, |e| e.eval_derivative(s))
    }
}
