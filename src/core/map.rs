//! Map-Fassade: die öffentliche Abfrageoberfläche des Straßennetzwerks.
//!
//! Löst Weltpositionen zu Waypoints auf, berechnet Weltposen, läuft den
//! Spurgraphen (Nachfolger, Distanz-Vorschub, Seitennachbarn) und erzeugt
//! Bulk-Produkte (Waypoint-Abtastung, Topologie-Kanten). Erwartetes
//! "nicht gefunden" ist immer `Option`/leerer `Vec`; ein `Err` bedeutet
//! einen ungültigen Waypoint und damit einen Vertragsbruch des Aufrufers.

use std::collections::VecDeque;
use std::f64::consts::PI;

use anyhow::{anyhow, bail, Result};
use glam::{DVec2, DVec3};

use crate::core::{
    GeoReference, Lane, LaneKey, LaneMarkingRecord, LaneSection, LaneType, LaneTypeMask, Road,
    RoadNetwork, SignalRecord, Waypoint,
};
use crate::shared::wrap_angle;

/// Weltpose eines Waypoints: Position plus Orientierung (Radiant).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: DVec3,
    /// Fahrtrichtung in der xy-Ebene
    pub yaw: f64,
    /// Steigungswinkel in Fahrtrichtung
    pub pitch: f64,
}

/// Lokator-Kandidat mit den Werten für Tie-Breaks und Innen-Check.
struct Candidate {
    distance: f64,
    lateral: f64,
    half_width: f64,
    waypoint: Waypoint,
}

/// Die Abfrage-Fassade über einem fertigen [`RoadNetwork`].
#[derive(Debug)]
pub struct Map {
    network: RoadNetwork,
}

impl Map {
    /// Übernimmt das fertig gebaute Netzwerk.
    pub fn new(network: RoadNetwork) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn geo_reference(&self) -> &GeoReference {
        self.network.geo_reference()
    }

    pub fn road_count(&self) -> usize {
        self.network.road_count()
    }

    pub fn lane_count(&self) -> usize {
        self.network.lane_count()
    }

    /// Ist die Straße Teil einer Junction?
    pub fn is_junction(&self, road_id: u64) -> bool {
        self.network.road(road_id).is_some_and(Road::is_junction)
    }

    // ── Lokator ─────────────────────────────────────────────────────────

    /// Nächstgelegener Waypoint auf einer Spur des gewünschten Typs,
    /// unabhängig davon, ob die Position innerhalb der Spur liegt.
    pub fn closest_waypoint_on_road(
        &self,
        location: DVec3,
        mask: LaneTypeMask,
    ) -> Option<Waypoint> {
        self.closest_candidate(location, mask).map(|c| c.waypoint)
    }

    /// Waypoint der Spur, in der die Position tatsächlich liegt.
    ///
    /// Zusätzlich zum Lokator muss der Querabstand zur Spurmitte höchstens
    /// die halbe Spurbreite betragen, sonst `None`.
    pub fn waypoint_at(&self, location: DVec3, mask: LaneTypeMask) -> Option<Waypoint> {
        self.closest_candidate(location, mask)
            .filter(|c| c.lateral <= c.half_width)
            .map(|c| c.waypoint)
    }

    fn closest_candidate(&self, location: DVec3, mask: LaneTypeMask) -> Option<Candidate> {
        let query = location.truncate();
        let mut road_ids = self.network.spatial_index().candidate_roads(query);
        if road_ids.is_empty() {
            road_ids = self.network.roads().map(|r| r.id).collect();
        }

        let mut best: Option<Candidate> = None;
        for road_id in road_ids {
            let Some(road) = self.network.road(road_id) else {
                continue;
            };
            let Some((s, _)) = road.closest_offset(query) else {
                continue;
            };
            let Some(section) = road.section_at(s, false) else {
                continue;
            };
            let Some(pose) = road.location_at(s) else {
                continue;
            };

            let left = DVec2::new(-pose.heading.sin(), pose.heading.cos());
            let height = road.elevation.height_at(s);
            let lateral_query = (query - pose.position).dot(left);

            for lane in section.lanes() {
                if lane.index == 0 || !mask.matches(lane.lane_type) {
                    continue;
                }
                let Some(offset) = section.lane_center_offset(lane.index, s) else {
                    continue;
                };
                let center = (pose.position + left * offset).extend(height);
                let candidate = Candidate {
                    distance: location.distance(center),
                    lateral: (lateral_query - offset).abs(),
                    half_width: 0.5 * lane.width_at(s - section.s0),
                    waypoint: Waypoint::new(road.id, lane.index, s),
                };
                if is_closer(&candidate, best.as_ref()) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    // ── Waypoint-Auflösung und Spurauskünfte ────────────────────────────

    /// Löst einen Waypoint gegen das Netzwerk auf.
    fn resolve(&self, wp: Waypoint) -> Result<(&Road, &LaneSection, &Lane)> {
        let road = self.network.road(wp.road_id).ok_or_else(|| {
            anyhow!("Ungueltiger Waypoint: unbekannte Strasse {}", wp.road_id)
        })?;
        if !(0.0..=road.length).contains(&wp.s) {
            bail!(
                "Ungueltiger Waypoint: s = {} ausserhalb von Strasse {} (Laenge {})",
                wp.s,
                wp.road_id,
                road.length
            );
        }
        let section = road
            .section_at(wp.s, wp.lane_id > 0)
            .ok_or_else(|| anyhow!("Ungueltiger Waypoint: keine Section bei s = {}", wp.s))?;
        let lane = section.lane(wp.lane_id).ok_or_else(|| {
            anyhow!(
                "Ungueltiger Waypoint: Spur {} existiert nicht in Strasse {} bei s = {}",
                wp.lane_id,
                wp.road_id,
                wp.s
            )
        })?;
        Ok((road, section, lane))
    }

    /// Spur eines Waypoints.
    pub fn lane_at(&self, wp: Waypoint) -> Result<&Lane> {
        self.resolve(wp).map(|(_, _, lane)| lane)
    }

    pub fn lane_type_at(&self, wp: Waypoint) -> Result<LaneType> {
        self.lane_at(wp).map(|lane| lane.lane_type)
    }

    /// Spurbreite am Waypoint.
    pub fn lane_width_at(&self, wp: Waypoint) -> Result<f64> {
        self.resolve(wp)
            .map(|(_, section, lane)| lane.width_at(wp.s - section.s0))
    }

    /// Weltpose des Waypoints auf der Spurmitte.
    ///
    /// Referenzlinien-Pose bei s, Querversatz der Spurmitte, Höhe und
    /// Steigung aus dem Höhenprofil. Linksseitige Spuren fahren entgegen
    /// wachsender Bogenlänge: Yaw um 180° gedreht, Pitch gespiegelt.
    pub fn compute_transform(&self, wp: Waypoint) -> Result<Transform> {
        let (road, section, lane) = self.resolve(wp)?;
        let pose = road
            .location_at(wp.s)
            .ok_or_else(|| anyhow!("Keine Referenzlinien-Pose bei s = {}", wp.s))?;
        let offset = section
            .lane_center_offset(lane.index, wp.s)
            .unwrap_or(0.0);

        let left = DVec2::new(-pose.heading.sin(), pose.heading.cos());
        let position = (pose.position + left * offset).extend(road.elevation.height_at(wp.s));
        let slope = road.elevation.slope_at(wp.s);

        let (yaw, pitch) = if lane.is_backward() {
            (wrap_angle(pose.heading + PI), -slope.atan())
        } else {
            (wrap_angle(pose.heading), slope.atan())
        };
        Ok(Transform {
            position,
            yaw,
            pitch,
        })
    }

    // ── Markierungen, Tempolimits, Signale ──────────────────────────────

    /// Markierungs-Records der linken und rechten Spurbegrenzung am Waypoint.
    ///
    /// Nearest-below über den s-Index der Straße; jede Seite kann fehlen.
    /// Der Record einer Spur beschreibt ihre äußere Begrenzung, die innere
    /// kommt von der nächsten Spur Richtung Mitte (Index 0 = Mittellinie).
    pub fn mark_records_at(
        &self,
        wp: Waypoint,
    ) -> Result<(Option<&LaneMarkingRecord>, Option<&LaneMarkingRecord>)> {
        let (road, _, lane) = self.resolve(wp)?;
        let own = road
            .markings
            .nearest_below_where(wp.s, |r| r.lane_id == wp.lane_id);
        let inner_id = wp.lane_id - wp.lane_id.signum();
        let inner = road
            .markings
            .nearest_below_where(wp.s, |r| r.lane_id == inner_id);

        if lane.index < 0 {
            Ok((inner, own))
        } else {
            Ok((own, inner))
        }
    }

    /// Markierungs-Records, die eine Bewegung von `origin` nach
    /// `destination` überstreicht, aufsteigend nach s.
    ///
    /// Beide Punkte werden typunabhängig aufgelöst. Liegen sie auf
    /// verschiedenen Straßen, wird auf die erste Straße geklippt: die
    /// Enumeration läuft bis zu deren Spurende in Fahrtrichtung.
    pub fn crossed_lane_markings(
        &self,
        origin: DVec3,
        destination: DVec3,
    ) -> Vec<LaneMarkingRecord> {
        let Some(wp_o) = self.closest_waypoint_on_road(origin, LaneTypeMask::ANY) else {
            return Vec::new();
        };
        let Some(wp_d) = self.closest_waypoint_on_road(destination, LaneTypeMask::ANY) else {
            return Vec::new();
        };
        let Some(road) = self.network.road(wp_o.road_id) else {
            return Vec::new();
        };

        let same_road = wp_o.road_id == wp_d.road_id;
        let (s_lo, s_hi) = if same_road {
            (wp_o.s.min(wp_d.s), wp_o.s.max(wp_d.s))
        } else if wp_o.lane_id > 0 {
            (0.0, wp_o.s)
        } else {
            (wp_o.s, road.length)
        };

        let lane_ids = if same_road {
            crossed_boundary_lanes(wp_o.lane_id, wp_d.lane_id)
        } else {
            vec![wp_o.lane_id]
        };

        road.markings
            .in_range(s_lo, s_hi)
            .iter()
            .filter(|r| r.s > s_lo && r.s < s_hi && lane_ids.contains(&r.lane_id))
            .copied()
            .collect()
    }

    /// Tempolimit am Waypoint (nearest-below), falls erfasst.
    pub fn speed_limit_at(&self, wp: Waypoint) -> Result<Option<f64>> {
        let (road, _, _) = self.resolve(wp)?;
        Ok(road.speeds.nearest_below(wp.s).map(|r| r.speed))
    }

    /// Signal-Records einer Straße im Bereich `[s_from, s_to]`.
    pub fn signals_in_range(
        &self,
        road_id: u64,
        s_from: f64,
        s_to: f64,
    ) -> Result<Vec<&SignalRecord>> {
        let road = self
            .network
            .road(road_id)
            .ok_or_else(|| anyhow!("Unbekannte Strasse {}", road_id))?;
        let (lo, hi) = if s_from <= s_to {
            (s_from, s_to)
        } else {
            (s_to, s_from)
        };
        Ok(road.signals.in_range(lo, hi).iter().collect())
    }

    // ── Graph-Traversierung ─────────────────────────────────────────────

    /// Eintritts-Waypoints der Folgespur(en).
    ///
    /// Innerhalb einer Straße ist das die Folgesection an der gemeinsamen
    /// Grenze. Zeigt der Nachfolger auf eine Junction-Straße, fächert das
    /// Ergebnis über alle passenden Junction-Verbindungen auf.
    pub fn successors(&self, wp: Waypoint) -> Result<Vec<Waypoint>> {
        let (road, section, lane) = self.resolve(wp)?;
        Ok(self.successor_entries(road, section, lane))
    }

    fn successor_entries(&self, road: &Road, section: &LaneSection, lane: &Lane) -> Vec<Waypoint> {
        let Some(succ) = lane.successor else {
            return Vec::new();
        };
        let boundary = if lane.is_backward() {
            section.s0
        } else {
            section.s1
        };
        let Some(succ_road) = self.network.road(succ.road_id) else {
            return Vec::new();
        };

        if let Some(junction_id) = succ_road.junction_id {
            let Some(junction) = self.network.junction(junction_id) else {
                return Vec::new();
            };
            let incoming = LaneKey::new(road.id, lane.index);
            junction
                .connections_from(incoming)
                .iter()
                .filter_map(|key| self.lane_entry_waypoint(*key))
                .collect()
        } else if succ.road_id == road.id {
            vec![Waypoint::new(road.id, succ.lane_id, boundary)]
        } else {
            self.lane_entry_waypoint(succ).into_iter().collect()
        }
    }

    /// Eintritts-Waypoint einer Spur am Straßenanfang in Fahrtrichtung.
    fn lane_entry_waypoint(&self, key: LaneKey) -> Option<Waypoint> {
        let road = self.network.road(key.road_id)?;
        let s = if key.lane_id > 0 { road.length } else { 0.0 };
        let section = road.section_at(s, key.lane_id > 0)?;
        section.lane(key.lane_id)?;
        Some(Waypoint::new(key.road_id, key.lane_id, s))
    }

    /// Waypoints in exakt `distance` Metern Fahrstrecke (muss > 0 sein).
    ///
    /// Reicht die Restlänge der Section nicht, wird sie konsumiert und mit
    /// der Restdistanz über alle Nachfolger weitergelaufen; ein Ergebnis
    /// pro erreichtem Pfad. Leer nur, wenn das Netz vorher endet.
    pub fn next_waypoints(&self, wp: Waypoint, distance: f64) -> Result<Vec<Waypoint>> {
        if !(distance > 0.0) {
            bail!("Distanz muss positiv sein (war {})", distance);
        }

        let mut results = Vec::new();
        let mut queue: VecDeque<(Waypoint, f64)> = VecDeque::new();
        queue.push_back((wp, distance));

        while let Some((current, remaining_distance)) = queue.pop_front() {
            let (road, section, lane) = self.resolve(current)?;
            let remaining_in_section = if lane.is_backward() {
                current.s - section.s0
            } else {
                section.s1 - current.s
            };

            if remaining_distance < remaining_in_section {
                let s_next = if lane.is_backward() {
                    current.s - remaining_distance
                } else {
                    current.s + remaining_distance
                };
                results.push(Waypoint::new(current.road_id, current.lane_id, s_next));
                continue;
            }

            let residual = remaining_distance - remaining_in_section;
            for successor in self.successor_entries(road, section, lane) {
                if residual > 0.0 {
                    queue.push_back((successor, residual));
                } else {
                    results.push(successor);
                }
            }
        }
        Ok(results)
    }

    /// Nachbarspur auf der linken Seite (in Fahrtrichtung der Spur).
    ///
    /// Der Referenzlinien-Platzhalter wird übersprungen; `None` auf der
    /// äußersten Spur oder wenn der Nachbar nicht befahrbar ist.
    pub fn left_neighbor(&self, wp: Waypoint) -> Result<Option<Waypoint>> {
        self.side_neighbor(wp, true)
    }

    /// Nachbarspur auf der rechten Seite (in Fahrtrichtung der Spur).
    pub fn right_neighbor(&self, wp: Waypoint) -> Result<Option<Waypoint>> {
        self.side_neighbor(wp, false)
    }

    fn side_neighbor(&self, wp: Waypoint, toward_left: bool) -> Result<Option<Waypoint>> {
        let (_, section, lane) = self.resolve(wp)?;
        if lane.index == 0 {
            return Ok(None);
        }

        // Links heißt für Vorwärtsspuren Richtung Mitte, für Rückwärtsspuren
        // von der Mitte weg; Index 0 wird übersprungen.
        let step = if lane.index < 0 { 1 } else { -1 };
        let step = if toward_left { step } else { -step };
        let mut target = lane.index + step;
        if target == 0 {
            target += step;
        }

        let Some(neighbor) = section.lane(target) else {
            return Ok(None);
        };
        if neighbor.lane_type != LaneType::Driving {
            return Ok(None);
        }
        Ok(Some(Waypoint::new(wp.road_id, target, wp.s)))
    }

    // ── Bulk-Produkte ───────────────────────────────────────────────────

    /// Waypoints aller Spuren im Abstand `approx_distance` (muss > 0 sein).
    ///
    /// Pro Spur und Section beginnend am Section-Eintritt in Fahrtrichtung;
    /// der Eintritts-Waypoint wird auch dann erzeugt, wenn der Abstand die
    /// Sectionlänge übersteigt.
    pub fn generate_waypoints(&self, approx_distance: f64) -> Result<Vec<Waypoint>> {
        if !(approx_distance > 0.0) {
            bail!("Abstand muss positiv sein (war {})", approx_distance);
        }

        let mut out = Vec::new();
        for road in self.network.roads() {
            for section in &road.sections {
                let span = section.span();
                for lane in section.lanes() {
                    if lane.index == 0 {
                        continue;
                    }
                    let (entry, dir) = if lane.is_backward() {
                        (section.s1, -1.0)
                    } else {
                        (section.s0, 1.0)
                    };
                    let mut offset = 0.0;
                    while offset < span {
                        out.push(Waypoint::new(road.id, lane.index, entry + dir * offset));
                        offset += approx_distance;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Minimaler Topologie-Graph: je Spur eine Kante vom Eintritt zum
    /// Eintritt auf der Nachfolgerseite.
    ///
    /// Bei Junction-Fan-out zählt die erste registrierte Verbindung;
    /// Sackgassen enden auf dem eigenen Spurende.
    pub fn generate_topology(&self) -> Vec<(Waypoint, Waypoint)> {
        let mut edges = Vec::new();
        for road in self.network.roads() {
            for section in &road.sections {
                for lane in section.lanes() {
                    if lane.index == 0 {
                        continue;
                    }
                    let (entry_s, exit_s) = if lane.is_backward() {
                        (section.s1, section.s0)
                    } else {
                        (section.s0, section.s1)
                    };
                    let entry = Waypoint::new(road.id, lane.index, entry_s);
                    let exit = self
                        .successor_entries(road, section, lane)
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| Waypoint::new(road.id, lane.index, exit_s));
                    edges.push((entry, exit));
                }
            }
        }
        edges
    }
}

/// Strikte Ordnung der Lokator-Kandidaten: Distanz, dann Straßen-Id, dann
/// Spur näher an der Mitte (negative Seite zuerst), dann kleineres s.
fn is_closer(candidate: &Candidate, best: Option<&Candidate>) -> bool {
    let Some(best) = best else {
        return true;
    };
    match candidate.distance.total_cmp(&best.distance) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => {
            let a = &candidate.waypoint;
            let b = &best.waypoint;
            (a.road_id, a.lane_id.abs(), a.lane_id, a.s.to_bits())
                < (b.road_id, b.lane_id.abs(), b.lane_id, b.s.to_bits())
        }
    }
}

/// Spur-Ids der Begrenzungs-Records, die ein Querwechsel von `from` nach
/// `to` überstreicht: je Nachbarpaar zählt der Record der mittennäheren
/// Spur (Index 0 für die Mittellinie).
fn crossed_boundary_lanes(from: i32, to: i32) -> Vec<i32> {
    if from == to {
        return vec![from];
    }
    let step = if to > from { 1 } else { -1 };
    let mut ids = Vec::new();
    let mut current = from;
    while current != to {
        let next = current + step;
        let boundary = if current.abs() <= next.abs() {
            current
        } else {
            next
        };
        if ids.last() != Some(&boundary) {
            ids.push(boundary);
        }
        current = next;
    }
    ids
}
