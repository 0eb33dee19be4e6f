//! Straße: Referenzlinie, Höhenprofil, LaneSections und Attribut-Records.

use glam::DVec2;

use crate::core::{
    DirectedPoint, ElevationProfile, GeometrySegment, LaneMarkingRecord, LaneSection, RecordIndex,
    SignalRecord, SpeedRecord,
};

/// Eine Straße des Netzwerks.
///
/// Die Segmente überdecken `[0, length)` lückenlos und in s-Reihenfolge,
/// die Sections partitionieren denselben Bereich (Builder-Invarianten).
#[derive(Debug, Clone)]
pub struct Road {
    pub id: u64,
    pub length: f64,
    /// Gesetzt, wenn die Straße eine Verbindungsstraße einer Junction ist
    pub junction_id: Option<u64>,
    pub segments: Vec<GeometrySegment>,
    pub elevation: ElevationProfile,
    pub sections: Vec<LaneSection>,
    pub markings: RecordIndex<LaneMarkingRecord>,
    pub speeds: RecordIndex<SpeedRecord>,
    pub signals: RecordIndex<SignalRecord>,
}

impl Road {
    /// Ist die Straße Teil einer Junction?
    pub fn is_junction(&self) -> bool {
        self.junction_id.is_some()
    }

    /// Segment, das die straßenglobale Bogenlänge `s` enthält.
    fn segment_at(&self, s: f64) -> Option<&GeometrySegment> {
        if self.segments.is_empty() {
            return None;
        }
        let idx = self.segments.partition_point(|seg| seg.s_start() <= s);
        self.segments.get(idx.saturating_sub(1))
    }

    /// Pose der Referenzlinie bei `s` (auf `[0, length]` geklemmt).
    pub fn location_at(&self, s: f64) -> Option<DirectedPoint> {
        let s = s.clamp(0.0, self.length);
        let segment = self.segment_at(s)?;
        Some(segment.location_at(s - segment.s_start()))
    }

    /// Nächstgelegener straßenglobaler Offset zu `point`: `(s, Distanz)`.
    ///
    /// Prüft alle Segmente in s-Reihenfolge; bei exakt gleicher Distanz
    /// gewinnt das kleinere s.
    pub fn closest_offset(&self, point: DVec2) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for segment in &self.segments {
            let (s_local, distance) = segment.closest_offset(point);
            let s_global = (segment.s_start() + s_local).min(self.length);
            match best {
                Some((_, d)) if distance >= d => {}
                _ => best = Some((s_global, distance)),
            }
        }
        best
    }

    /// Index der Section, die `s` in Fahrtrichtung enthält.
    ///
    /// Vorwärtsfahrende Spuren (Index < 0) lösen halboffen `[s0, s1)` auf,
    /// rückwärtsfahrende `(s0, s1]`; die Randsections schließen das
    /// jeweilige Straßenende mit ein. Damit landet ein Waypoint an einer
    /// Section-Grenze in der Section, in die er hineinfährt.
    pub fn section_index_at(&self, s: f64, backwards: bool) -> Option<usize> {
        if self.sections.is_empty() || s < 0.0 || s > self.length {
            return None;
        }
        if backwards {
            let idx = self.sections.partition_point(|sec| sec.s1 < s);
            let section = self.sections.get(idx)?;
            if s > section.s0 || idx == 0 {
                Some(idx)
            } else {
                None
            }
        } else {
            let idx = self
                .sections
                .partition_point(|sec| sec.s0 <= s)
                .saturating_sub(1);
            let section = self.sections.get(idx)?;
            if s < section.s1 || idx + 1 == self.sections.len() {
                Some(idx)
            } else {
                None
            }
        }
    }

    /// Section in Fahrtrichtung (siehe [`Road::section_index_at`]).
    pub fn section_at(&self, s: f64, backwards: bool) -> Option<&LaneSection> {
        self.section_index_at(s, backwards)
            .and_then(|idx| self.sections.get(idx))
    }

    /// Anzahl der Spuren (ohne Referenzlinien-Platzhalter).
    pub fn lane_count(&self) -> usize {
        self.sections
            .iter()
            .map(|sec| sec.lanes().filter(|l| l.index != 0).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Lane, LaneType};
    use crate::shared::Poly3;
    use approx::assert_relative_eq;
    use glam::DVec2;

    /// Gerade Straße der Länge 100 mit zwei Sections bei s = 60.
    fn two_section_road() -> Road {
        Road {
            id: 1,
            length: 100.0,
            junction_id: None,
            segments: vec![GeometrySegment::Line {
                s0: 0.0,
                start: DVec2::ZERO,
                heading: 0.0,
                length: 100.0,
            }],
            elevation: ElevationProfile::flat(),
            sections: vec![
                LaneSection::new(
                    0.0,
                    60.0,
                    vec![
                        Lane::center(),
                        Lane::new(-1, LaneType::Driving, vec![Poly3::constant(0.0, 3.5)]),
                        Lane::new(1, LaneType::Driving, vec![Poly3::constant(0.0, 3.5)]),
                    ],
                ),
                LaneSection::new(
                    60.0,
                    100.0,
                    vec![
                        Lane::center(),
                        Lane::new(-1, LaneType::Driving, vec![Poly3::constant(0.0, 3.5)]),
                        Lane::new(1, LaneType::Driving, vec![Poly3::constant(0.0, 3.5)]),
                    ],
                ),
            ],
            markings: RecordIndex::default(),
            speeds: RecordIndex::default(),
            signals: RecordIndex::default(),
        }
    }

    #[test]
    fn location_along_reference_line() {
        let road = two_section_road();
        let p = road.location_at(42.0).expect("Pose erwartet");
        assert_relative_eq!(p.position.x, 42.0);
        assert_relative_eq!(p.position.y, 0.0);
    }

    #[test]
    fn closest_offset_projects_onto_line() {
        let road = two_section_road();
        let (s, d) = road.closest_offset(DVec2::new(30.0, -2.0)).unwrap();
        assert_relative_eq!(s, 30.0);
        assert_relative_eq!(d, 2.0);
    }

    #[test]
    fn forward_resolution_is_half_open() {
        let road = two_section_road();
        assert_eq!(road.section_index_at(0.0, false), Some(0));
        assert_eq!(road.section_index_at(59.99, false), Some(0));
        // Grenze gehört vorwärts zur Folgesection
        assert_eq!(road.section_index_at(60.0, false), Some(1));
        // Straßenende schließt die letzte Section ein
        assert_eq!(road.section_index_at(100.0, false), Some(1));
        assert_eq!(road.section_index_at(100.01, false), None);
    }

    #[test]
    fn backward_resolution_mirrors_forward() {
        let road = two_section_road();
        // Rückwärts gehört die Grenze zur davorliegenden Section
        assert_eq!(road.section_index_at(60.0, true), Some(0));
        assert_eq!(road.section_index_at(60.01, true), Some(1));
        assert_eq!(road.section_index_at(0.0, true), Some(0));
        assert_eq!(road.section_index_at(100.0, true), Some(1));
    }

    #[test]
    fn lane_count_skips_center() {
        let road = two_section_road();
        assert_eq!(road.lane_count(), 4);
    }
}
