//! Unveränderliches Straßennetzwerk und validierender Builder.
//!
//! Das Netzwerk entsteht einmalig über [`NetworkBuilder::finish`] und wird
//! danach nie mutiert. Alle Abfragen sind damit reine Funktionen über
//! `(Netzwerk, Argumente)` und ohne Locks beliebig parallelisierbar.

use std::collections::HashMap;

use anyhow::{bail, Result};

use crate::core::{GeoReference, Junction, LaneKey, Road, SpatialIndex};

/// Toleranz für Lücken/Überlappungen in Geometrie und Section-Partition.
const PARTITION_EPS: f64 = 1e-3;

/// Unveränderliches Aggregat aller Straßen, Junctions und der Geo-Referenz.
#[derive(Debug)]
pub struct RoadNetwork {
    roads: HashMap<u64, Road>,
    junctions: HashMap<u64, Junction>,
    geo_reference: GeoReference,
    spatial_index: SpatialIndex,
    /// Straßen-Ids aufsteigend, für deterministische Enumerationen
    road_order: Vec<u64>,
}

impl RoadNetwork {
    pub fn road(&self, id: u64) -> Option<&Road> {
        self.roads.get(&id)
    }

    pub fn junction(&self, id: u64) -> Option<&Junction> {
        self.junctions.get(&id)
    }

    /// Straßen in aufsteigender Id-Reihenfolge.
    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.road_order.iter().filter_map(|id| self.roads.get(id))
    }

    pub fn geo_reference(&self) -> &GeoReference {
        &self.geo_reference
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.spatial_index
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    /// Anzahl aller Spuren (ohne Referenzlinien-Platzhalter).
    pub fn lane_count(&self) -> usize {
        self.roads.values().map(Road::lane_count).sum()
    }
}

/// Aufbauphase des Netzwerks; [`NetworkBuilder::finish`] validiert die
/// Invarianten und liefert den fertigen read-only Wert.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    geo_reference: GeoReference,
    roads: HashMap<u64, Road>,
    junctions: HashMap<u64, Junction>,
}

impl NetworkBuilder {
    pub fn new(geo_reference: GeoReference) -> Self {
        Self {
            geo_reference,
            roads: HashMap::new(),
            junctions: HashMap::new(),
        }
    }

    /// Fügt eine Straße hinzu; eine doppelte Id ersetzt den alten Eintrag.
    pub fn add_road(&mut self, road: Road) -> &mut Self {
        let id = road.id;
        if self.roads.insert(id, road).is_some() {
            log::warn!("Strasse {} beim Aufbau ueberschrieben", id);
        }
        self
    }

    pub fn add_junction(&mut self, junction: Junction) -> &mut Self {
        self.junctions.insert(junction.id, junction);
        self
    }

    /// Validiert alle Invarianten und friert das Netzwerk ein.
    pub fn finish(self) -> Result<RoadNetwork> {
        for road in self.roads.values() {
            validate_road(road)?;
            validate_lane_links(road, &self.roads)?;
        }
        for junction in self.junctions.values() {
            validate_junction(junction, &self.roads)?;
        }
        for road in self.roads.values() {
            if let Some(jid) = road.junction_id {
                if !self.junctions.contains_key(&jid) {
                    bail!(
                        "Strasse {} verweist auf unbekannte Junction {}",
                        road.id,
                        jid
                    );
                }
            }
        }

        let spatial_index = SpatialIndex::from_roads(&self.roads);
        let mut road_order: Vec<u64> = self.roads.keys().copied().collect();
        road_order.sort_unstable();

        let network = RoadNetwork {
            roads: self.roads,
            junctions: self.junctions,
            geo_reference: self.geo_reference,
            spatial_index,
            road_order,
        };
        log::info!(
            "Strassennetzwerk aufgebaut: {} Strassen, {} Spuren, {} Junctions",
            network.road_count(),
            network.lane_count(),
            network.junction_count()
        );
        Ok(network)
    }
}

fn validate_road(road: &Road) -> Result<()> {
    if road.length < 0.0 {
        bail!("Strasse {}: negative Laenge {}", road.id, road.length);
    }
    if road.segments.is_empty() {
        bail!("Strasse {}: keine Geometrie-Segmente", road.id);
    }
    if road.sections.is_empty() {
        bail!("Strasse {}: keine LaneSections", road.id);
    }

    // Geometrie: s-geordnet, lückenlos, Gesamtlänge = Strassenlänge
    let mut cursor = 0.0;
    for segment in &road.segments {
        if (segment.s_start() - cursor).abs() > PARTITION_EPS {
            bail!(
                "Strasse {}: Geometrie-Luecke bei s = {} (erwartet {})",
                road.id,
                segment.s_start(),
                cursor
            );
        }
        if segment.length() <= 0.0 {
            bail!("Strasse {}: Segment ohne Laenge bei s = {}", road.id, cursor);
        }
        cursor = segment.s_end();
    }
    if (cursor - road.length).abs() > PARTITION_EPS {
        bail!(
            "Strasse {}: Geometrie endet bei {} statt {}",
            road.id,
            cursor,
            road.length
        );
    }

    // Sections: Partition von [0, length) ohne Lücken/Überlappungen
    let mut cursor = 0.0;
    for section in &road.sections {
        if (section.s0 - cursor).abs() > PARTITION_EPS {
            bail!(
                "Strasse {}: Section-Luecke bei s = {} (erwartet {})",
                road.id,
                section.s0,
                cursor
            );
        }
        if section.span() <= 0.0 {
            bail!("Strasse {}: leere Section bei s = {}", road.id, section.s0);
        }
        cursor = section.s1;

        validate_section(road, section)?;
    }
    if (cursor - road.length).abs() > PARTITION_EPS {
        bail!(
            "Strasse {}: Sections enden bei {} statt {}",
            road.id,
            cursor,
            road.length
        );
    }

    Ok(())
}

fn validate_section(road: &Road, section: &crate::core::LaneSection) -> Result<()> {
    if section.lane(0).is_none() {
        bail!(
            "Strasse {}: Section bei s = {} ohne Referenzlinien-Spur 0",
            road.id,
            section.s0
        );
    }

    // Indizes pro Seite lückenlos von der Mitte nach außen
    let indices: Vec<i32> = section.lanes().map(|l| l.index).collect();
    let max_left = indices.iter().copied().max().unwrap_or(0);
    let min_right = indices.iter().copied().min().unwrap_or(0);
    for expected in min_right..=max_left {
        if !indices.contains(&expected) {
            bail!(
                "Strasse {}: Section bei s = {} hat Spur-Luecke bei Index {}",
                road.id,
                section.s0,
                expected
            );
        }
    }

    // Breiten nie negativ (Stichproben an Anfang, Mitte, Ende)
    for lane in section.lanes() {
        for probe in [section.s0, 0.5 * (section.s0 + section.s1), section.s1] {
            for width in &lane.widths {
                if width.eval(probe - section.s0) < -PARTITION_EPS {
                    bail!(
                        "Strasse {}: Spur {} mit negativer Breite bei s = {}",
                        road.id,
                        lane.index,
                        probe
                    );
                }
            }
        }
    }
    Ok(())
}

fn validate_lane_links(road: &Road, roads: &HashMap<u64, Road>) -> Result<()> {
    for section in &road.sections {
        for lane in section.lanes() {
            for key in [lane.successor, lane.predecessor].into_iter().flatten() {
                let Some(target) = roads.get(&key.road_id) else {
                    bail!(
                        "Strasse {}, Spur {}: Verweis auf unbekannte Strasse {}",
                        road.id,
                        lane.index,
                        key.road_id
                    );
                };
                let known = target
                    .sections
                    .iter()
                    .any(|sec| sec.lane(key.lane_id).is_some());
                if !known {
                    bail!(
                        "Strasse {}, Spur {}: Verweis auf unbekannte Spur {} in Strasse {}",
                        road.id,
                        lane.index,
                        key.lane_id,
                        key.road_id
                    );
                }
            }
        }
    }
    Ok(())
}

fn validate_junction(junction: &Junction, roads: &HashMap<u64, Road>) -> Result<()> {
    let check = |key: &LaneKey| -> Result<()> {
        let Some(road) = roads.get(&key.road_id) else {
            bail!(
                "Junction {}: Verweis auf unbekannte Strasse {}",
                junction.id,
                key.road_id
            );
        };
        if !road
            .sections
            .iter()
            .any(|sec| sec.lane(key.lane_id).is_some())
        {
            bail!(
                "Junction {}: Verweis auf unbekannte Spur {} in Strasse {}",
                junction.id,
                key.lane_id,
                key.road_id
            );
        }
        Ok(())
    };

    for (incoming, targets) in junction.connections() {
        check(incoming)?;
        for target in targets {
            check(target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        ElevationProfile, GeometrySegment, Lane, LaneSection, LaneType, RecordIndex,
    };
    use crate::shared::Poly3;
    use glam::DVec2;

    fn simple_road(id: u64, length: f64) -> Road {
        Road {
            id,
            length,
            junction_id: None,
            segments: vec![GeometrySegment::Line {
                s0: 0.0,
                start: DVec2::ZERO,
                heading: 0.0,
                length,
            }],
            elevation: ElevationProfile::flat(),
            sections: vec![LaneSection::new(
                0.0,
                length,
                vec![
                    Lane::center(),
                    Lane::new(-1, LaneType::Driving, vec![Poly3::constant(0.0, 3.5)]),
                ],
            )],
            markings: RecordIndex::default(),
            speeds: RecordIndex::default(),
            signals: RecordIndex::default(),
        }
    }

    #[test]
    fn build_valid_network() {
        let mut builder = NetworkBuilder::new(GeoReference::default());
        builder.add_road(simple_road(1, 100.0));
        let network = builder.finish().expect("Netzwerk muss valide sein");
        assert_eq!(network.road_count(), 1);
        assert_eq!(network.lane_count(), 1);
        assert!(!network.spatial_index().is_empty());
    }

    #[test]
    fn section_gap_is_rejected() {
        let mut road = simple_road(1, 100.0);
        road.sections = vec![LaneSection::new(
            0.0,
            80.0,
            vec![
                Lane::center(),
                Lane::new(-1, LaneType::Driving, vec![Poly3::constant(0.0, 3.5)]),
            ],
        )];
        let mut builder = NetworkBuilder::new(GeoReference::default());
        builder.add_road(road);
        let err = builder.finish().unwrap_err();
        assert!(err.to_string().contains("Sections enden"), "war: {err}");
    }

    #[test]
    fn lane_index_gap_is_rejected() {
        let mut road = simple_road(1, 50.0);
        road.sections = vec![LaneSection::new(
            0.0,
            50.0,
            vec![
                Lane::center(),
                // -2 ohne -1: Querschnitt hat eine Lücke
                Lane::new(-2, LaneType::Driving, vec![Poly3::constant(0.0, 3.5)]),
            ],
        )];
        let mut builder = NetworkBuilder::new(GeoReference::default());
        builder.add_road(road);
        let err = builder.finish().unwrap_err();
        assert!(err.to_string().contains("Spur-Luecke"), "war: {err}");
    }

    #[test]
    fn dangling_successor_is_rejected() {
        let mut road = simple_road(1, 50.0);
        road.sections[0]
            .lane_mut(-1)
            .unwrap()
            .successor = Some(LaneKey::new(99, -1));
        let mut builder = NetworkBuilder::new(GeoReference::default());
        builder.add_road(road);
        let err = builder.finish().unwrap_err();
        assert!(err.to_string().contains("unbekannte Strasse 99"), "war: {err}");
    }

    #[test]
    fn junction_reference_must_exist() {
        let mut road = simple_road(1, 50.0);
        road.junction_id = Some(5);
        let mut builder = NetworkBuilder::new(GeoReference::default());
        builder.add_road(road);
        let err = builder.finish().unwrap_err();
        assert!(err.to_string().contains("unbekannte Junction 5"), "war: {err}");
    }

    #[test]
    fn missing_geometry_is_rejected() {
        let mut road = simple_road(1, 50.0);
        road.segments.clear();
        let mut builder = NetworkBuilder::new(GeoReference::default());
        builder.add_road(road);
        assert!(builder.finish().is_err());
    }

    #[test]
    fn roads_iterate_in_id_order() {
        let mut builder = NetworkBuilder::new(GeoReference::default());
        builder.add_road(simple_road(3, 10.0));
        builder.add_road(simple_road(1, 10.0));
        builder.add_road(simple_road(2, 10.0));
        let network = builder.finish().unwrap();
        let ids: Vec<u64> = network.roads().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
