//! Einzelne Fahrspur: Typ, Breitenverlauf und Graph-Verweise.

use serde::{Deserialize, Serialize};

use crate::shared::Poly3;

/// Spurtyp; die Diskriminanten bilden eine Bitmaske für Filterabfragen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum LaneType {
    /// Referenzlinie bzw. Platzhalter ohne Breite (Spur-Index 0)
    None = 1 << 0,
    Driving = 1 << 1,
    Shoulder = 1 << 2,
    Sidewalk = 1 << 3,
    Biking = 1 << 4,
    Parking = 1 << 5,
    Border = 1 << 6,
    Median = 1 << 7,
    Rail = 1 << 8,
}

impl LaneType {
    pub fn as_mask(self) -> LaneTypeMask {
        LaneTypeMask(self as u32)
    }
}

/// Bitmaske über Spurtypen für die Locator-Filterung.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneTypeMask(pub u32);

impl LaneTypeMask {
    /// Alle echten Spurtypen; `None`-Platzhalter sind bewusst ausgenommen.
    pub const ANY: Self = Self(!(LaneType::None as u32));
    pub const DRIVING: Self = Self(LaneType::Driving as u32);

    pub fn matches(self, lane_type: LaneType) -> bool {
        self.0 & (lane_type as u32) != 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl From<LaneType> for LaneTypeMask {
    fn from(value: LaneType) -> Self {
        value.as_mask()
    }
}

/// Arena-Schlüssel einer Spur: `(Straßen-Id, Spur-Index)`.
///
/// Vorgänger/Nachfolger werden als Schlüssel gehalten, nicht als Referenzen,
/// damit zyklische Netztopologien beim Aufbau unproblematisch sind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneKey {
    pub road_id: u64,
    pub lane_id: i32,
}

impl LaneKey {
    pub fn new(road_id: u64, lane_id: i32) -> Self {
        Self { road_id, lane_id }
    }
}

/// Fahrspur innerhalb einer LaneSection.
///
/// Negative Indizes liegen rechts der Referenzlinie (in Richtung wachsender
/// Bogenlänge) und fahren vorwärts; positive Indizes liegen links und fahren
/// entgegen. `successor`/`predecessor` zeigen in Fahrtrichtung der Spur.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub index: i32,
    pub lane_type: LaneType,
    /// Breitenverlauf, s-lokal zur Section, sortiert nach `s0`
    pub widths: Vec<Poly3>,
    pub predecessor: Option<LaneKey>,
    pub successor: Option<LaneKey>,
}

impl Lane {
    pub fn new(index: i32, lane_type: LaneType, widths: Vec<Poly3>) -> Self {
        let mut widths = widths;
        widths.sort_by(|a, b| a.s0.total_cmp(&b.s0));
        Self {
            index,
            lane_type,
            widths,
            predecessor: None,
            successor: None,
        }
    }

    /// Referenzlinien-Platzhalter (Index 0, Breite 0).
    pub fn center() -> Self {
        Self::new(0, LaneType::None, Vec::new())
    }

    pub fn with_successor(mut self, key: LaneKey) -> Self {
        self.successor = Some(key);
        self
    }

    pub fn with_predecessor(mut self, key: LaneKey) -> Self {
        self.predecessor = Some(key);
        self
    }

    /// Spurbreite am s-lokalen Offset; nie negativ.
    pub fn width_at(&self, s_local: f64) -> f64 {
        let idx = self.widths.partition_point(|w| w.s0 <= s_local);
        let entry = if idx == 0 {
            self.widths.first()
        } else {
            self.widths.get(idx - 1)
        };
        entry.map_or(0.0, |w| w.eval(s_local).max(0.0))
    }

    /// Fährt die Spur entgegen wachsender Bogenlänge (linke Seite)?
    pub fn is_backward(&self) -> bool {
        self.index > 0
    }
}
