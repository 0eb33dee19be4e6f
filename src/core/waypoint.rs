//! Waypoint: Wertsemantik-Locator auf einer Spurmitte.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Locator `(Straße, Spur, Bogenlänge)` auf einer Spurmitte.
///
/// Waypoints halten keine Referenz ins Netzwerk; sie werden bei jeder
/// Verwendung neu aufgelöst und bleiben gültig, solange das Netzwerk lebt.
/// Gleichheit und Hash gehen über alle drei Felder (s über das Bitmuster),
/// damit Waypoints als Map-Schlüssel taugen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Waypoint {
    pub road_id: u64,
    pub lane_id: i32,
    pub s: f64,
}

impl Waypoint {
    pub fn new(road_id: u64, lane_id: i32, s: f64) -> Self {
        Self {
            road_id,
            lane_id,
            s,
        }
    }
}

impl PartialEq for Waypoint {
    fn eq(&self, other: &Self) -> bool {
        self.road_id == other.road_id
            && self.lane_id == other.lane_id
            && self.s.to_bits() == other.s.to_bits()
    }
}

impl Eq for Waypoint {}

impl Hash for Waypoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.road_id.hash(state);
        self.lane_id.hash(state);
        self.s.to_bits().hash(state);
    }
}
