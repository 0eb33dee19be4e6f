//! Längsabschnitt einer Straße mit strukturell konstantem Querschnitt.

use std::collections::BTreeMap;

use crate::core::Lane;

/// LaneSection: Spur-Querschnitt über `[s0, s1)`.
///
/// Die letzte Section einer Straße schließt das Straßenende mit ein. Spuren
/// sind nach signiertem Index abgelegt; Index 0 ist die Referenzlinie.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSection {
    pub s0: f64,
    pub s1: f64,
    lanes: BTreeMap<i32, Lane>,
}

impl LaneSection {
    pub fn new(s0: f64, s1: f64, lanes: Vec<Lane>) -> Self {
        let lanes = lanes.into_iter().map(|l| (l.index, l)).collect();
        Self { s0, s1, lanes }
    }

    /// Länge des Abschnitts.
    pub fn span(&self) -> f64 {
        self.s1 - self.s0
    }

    pub fn lane(&self, index: i32) -> Option<&Lane> {
        self.lanes.get(&index)
    }

    pub(crate) fn lane_mut(&mut self, index: i32) -> Option<&mut Lane> {
        self.lanes.get_mut(&index)
    }

    /// Alle Spuren, aufsteigend nach Index (rechte Seite zuerst).
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.values()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Spurbreite am straßenglobalen `s`.
    pub fn lane_width(&self, index: i32, s: f64) -> Option<f64> {
        self.lane(index).map(|lane| lane.width_at(s - self.s0))
    }

    /// Signierter Querversatz der Spurmitte gegenüber der Referenzlinie.
    ///
    /// Positiv zeigt nach links (in Richtung wachsender Bogenlänge gesehen).
    /// Aufsummiert werden die Breiten aller Spuren zwischen Referenzlinie
    /// und Zielspur plus die halbe eigene Breite; Index 0 trägt nie Breite.
    pub fn lane_center_offset(&self, index: i32, s: f64) -> Option<f64> {
        let lane = self.lane(index)?;
        if index == 0 {
            return Some(0.0);
        }
        let s_local = s - self.s0;
        let dir = index.signum();
        let mut acc = 0.0;
        for inner in 1..index.abs() {
            if let Some(between) = self.lane(dir * inner) {
                acc += between.width_at(s_local);
            }
        }
        Some(dir as f64 * (acc + 0.5 * lane.width_at(s_local)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LaneType;
    use crate::shared::Poly3;
    use approx::assert_relative_eq;

    fn section_two_right_one_left() -> LaneSection {
        LaneSection::new(
            0.0,
            100.0,
            vec![
                Lane::center(),
                Lane::new(-1, LaneType::Driving, vec![Poly3::constant(0.0, 3.5)]),
                Lane::new(-2, LaneType::Sidewalk, vec![Poly3::constant(0.0, 2.0)]),
                Lane::new(1, LaneType::Driving, vec![Poly3::constant(0.0, 3.0)]),
            ],
        )
    }

    #[test]
    fn center_offsets_accumulate_widths() {
        let section = section_two_right_one_left();
        assert_relative_eq!(section.lane_center_offset(-1, 50.0).unwrap(), -1.75);
        assert_relative_eq!(section.lane_center_offset(-2, 50.0).unwrap(), -4.5);
        assert_relative_eq!(section.lane_center_offset(1, 50.0).unwrap(), 1.5);
        assert_relative_eq!(section.lane_center_offset(0, 50.0).unwrap(), 0.0);
    }

    #[test]
    fn missing_lane_has_no_offset() {
        let section = section_two_right_one_left();
        assert!(section.lane_center_offset(3, 50.0).is_none());
        assert!(section.lane_width(3, 50.0).is_none());
    }

    #[test]
    fn lanes_iterate_in_index_order() {
        let section = section_two_right_one_left();
        let indices: Vec<i32> = section.lanes().map(|l| l.index).collect();
        assert_eq!(indices, vec![-2, -1, 0, 1]);
    }

    #[test]
    fn width_lookup_is_section_local() {
        // Breitenverlauf startet bei s_lokal 0, Section beginnt global bei 40
        let section = LaneSection::new(
            40.0,
            80.0,
            vec![
                Lane::center(),
                Lane::new(-1, LaneType::Driving, vec![Poly3::new(0.0, 3.0, 0.05, 0.0, 0.0)]),
            ],
        );
        assert_relative_eq!(section.lane_width(-1, 40.0).unwrap(), 3.0);
        assert_relative_eq!(section.lane_width(-1, 60.0).unwrap(), 4.0);
    }
}
