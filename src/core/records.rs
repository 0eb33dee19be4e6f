//! s-geordnete Attribut-Records pro Straße: Markierungen, Tempolimits, Signale.
//!
//! Abfragen laufen über binäre Suche: "größter Eintrag mit s ≤ Abfrage-s"
//! (nearest-below) bzw. symmetrisch nearest-above, plus Bereichs-Slices für
//! Enumerationen entlang eines Straßenabschnitts.

use serde::{Deserialize, Serialize};

/// Record mit einer Bogenlängen-Position.
pub trait SRecord {
    fn s(&self) -> f64;
}

/// s-sortierter Record-Index einer Straße.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordIndex<T: SRecord> {
    entries: Vec<T>,
}

impl<T: SRecord> Default for RecordIndex<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: SRecord> RecordIndex<T> {
    /// Baut den Index; sortiert stabil nach s.
    pub fn from_entries(mut entries: Vec<T>) -> Self {
        entries.sort_by(|a, b| a.s().total_cmp(&b.s()));
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Größter Eintrag mit `s ≤ query`.
    pub fn nearest_below(&self, query: f64) -> Option<&T> {
        let idx = self.entries.partition_point(|e| e.s() <= query);
        idx.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Kleinster Eintrag mit `s ≥ query`.
    pub fn nearest_above(&self, query: f64) -> Option<&T> {
        let idx = self.entries.partition_point(|e| e.s() < query);
        self.entries.get(idx)
    }

    /// Größter Eintrag mit `s ≤ query`, der das Prädikat erfüllt.
    ///
    /// Läuft vom Einstiegspunkt rückwärts; die Record-Listen pro Straße sind
    /// kurz genug, dass der lineare Anteil nicht ins Gewicht fällt.
    pub fn nearest_below_where(&self, query: f64, pred: impl Fn(&T) -> bool) -> Option<&T> {
        let idx = self.entries.partition_point(|e| e.s() <= query);
        self.entries[..idx].iter().rev().find(|e| pred(e))
    }

    /// Alle Einträge mit `lo ≤ s ≤ hi`, aufsteigend nach s.
    pub fn in_range(&self, lo: f64, hi: f64) -> &[T] {
        let start = self.entries.partition_point(|e| e.s() < lo);
        let end = self.entries.partition_point(|e| e.s() <= hi);
        &self.entries[start..end]
    }
}

/// Art der Spurbegrenzungs-Markierung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneMarking {
    None,
    Broken,
    Solid,
    SolidSolid,
    SolidBroken,
    BrokenSolid,
    BrokenBroken,
    BottsDots,
    Grass,
    Curb,
}

/// Farbe der Markierung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkingColor {
    Standard,
    White,
    Yellow,
    Blue,
    Green,
    Red,
}

/// Markierungs-Record: beschreibt die äußere Begrenzung einer Spur ab `s`.
///
/// Der Record von Spur-Index 0 ist die Mittellinien-Markierung.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneMarkingRecord {
    pub s: f64,
    pub lane_id: i32,
    pub marking: LaneMarking,
    pub color: MarkingColor,
    /// Strichbreite in Metern
    pub width: f64,
}

impl SRecord for LaneMarkingRecord {
    fn s(&self) -> f64 {
        self.s
    }
}

/// Tempolimit-Record: gilt ab `s` bis zum nächsten Record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRecord {
    pub s: f64,
    /// Höchstgeschwindigkeit in m/s
    pub speed: f64,
}

impl SRecord for SpeedRecord {
    fn s(&self) -> f64 {
        self.s
    }
}

/// Signaltyp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    TrafficLight,
    StopSign,
    YieldSign,
    SpeedSign,
    Other,
}

/// Signal-Record an einer festen Bogenlängen-Position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub s: f64,
    pub signal_id: u64,
    pub kind: SignalKind,
}

impl SRecord for SignalRecord {
    fn s(&self) -> f64 {
        self.s
    }
}
