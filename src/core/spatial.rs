//! Spatial-Index (KD-Tree) über abgetastete Referenzlinien.
//!
//! Punktabfragen müssen nicht jede Straße exakt projizieren: der Index
//! liefert eine Kandidatenmenge von Straßen, die anschließend exakt
//! verfeinert wird. Der Suchradius enthält die Abtastschrittweite, die
//! maximale Querschnittsausdehnung und die Höhenspanne des Netzes als
//! Sicherheitsmarge; damit ist die Kandidatenmenge garantiert eine
//! Obermenge der linearen Vollsuche.

use std::collections::{BTreeSet, HashMap};

use glam::DVec2;
use kiddo::{KdTree, SquaredEuclidean};

use crate::core::Road;

/// Abtastschrittweite der Referenzlinien in Metern.
pub const SPATIAL_SAMPLE_STEP: f64 = 2.0;

/// Abtastpunkt: Straße plus Bogenlänge.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RoadSample {
    road_id: u64,
    s: f64,
}

/// Read-only Spatial-Index über allen Straßen eines Netzwerks.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    samples: Vec<RoadSample>,
    /// Maximale halbe Querschnittsbreite über alle Sections
    lateral_margin: f64,
    /// Spannweite der Höhenprofile
    vertical_margin: f64,
}

impl SpatialIndex {
    /// Erstellt einen leeren Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            samples: Vec::new(),
            lateral_margin: 0.0,
            vertical_margin: 0.0,
        }
    }

    /// Baut den Index aus allen Straßen; Straßen in Id-Reihenfolge, damit
    /// der Aufbau deterministisch ist.
    pub fn from_roads(roads: &HashMap<u64, Road>) -> Self {
        let mut road_ids: Vec<u64> = roads.keys().copied().collect();
        road_ids.sort_unstable();

        let mut samples = Vec::new();
        let mut entries: Vec<[f64; 2]> = Vec::new();
        let mut lateral_margin = 0.0f64;
        let mut min_height = f64::INFINITY;
        let mut max_height = f64::NEG_INFINITY;

        for id in road_ids {
            let road = &roads[&id];
            let mut s = 0.0;
            loop {
                if let Some(pose) = road.location_at(s) {
                    samples.push(RoadSample { road_id: id, s });
                    entries.push([pose.position.x, pose.position.y]);
                }
                let h = road.elevation.height_at(s);
                min_height = min_height.min(h);
                max_height = max_height.max(h);

                if s >= road.length {
                    break;
                }
                s = (s + SPATIAL_SAMPLE_STEP).min(road.length);
            }

            for section in &road.sections {
                for probe in [section.s0, 0.5 * (section.s0 + section.s1), section.s1] {
                    let mut side_left = 0.0;
                    let mut side_right = 0.0;
                    for lane in section.lanes() {
                        let w = lane.width_at(probe - section.s0);
                        if lane.index > 0 {
                            side_left += w;
                        } else if lane.index < 0 {
                            side_right += w;
                        }
                    }
                    lateral_margin = lateral_margin.max(side_left).max(side_right);
                }
            }
        }

        let vertical_margin = if samples.is_empty() {
            0.0
        } else {
            (max_height - min_height).max(0.0)
        };

        Self {
            tree: (&entries).into(),
            samples,
            lateral_margin,
            vertical_margin,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Kandidatenstraßen für eine Punktabfrage, aufsteigend nach Id.
    ///
    /// Garantiert enthalten: jede Straße, deren nächstgelegene Spurmitte
    /// die global beste sein könnte.
    pub fn candidate_roads(&self, query: DVec2) -> Vec<u64> {
        if self.is_empty() {
            return Vec::new();
        }

        let nearest = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[query.x, query.y]);
        let best = nearest.distance.sqrt();
        let radius = best
            + SPATIAL_SAMPLE_STEP
            + 2.0 * self.lateral_margin
            + self.vertical_margin;

        let mut ids = BTreeSet::new();
        for hit in self
            .tree
            .within::<SquaredEuclidean>(&[query.x, query.y], radius * radius)
        {
            if let Some(sample) = self.samples.get(hit.item as usize) {
                ids.insert(sample.road_id);
            }
        }
        ids.into_iter().collect()
    }
}
