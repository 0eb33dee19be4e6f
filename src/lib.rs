//! Read-only Abfrage-Engine für OpenDRIVE-ähnliche Straßennetzwerke.
//!
//! Das Netzwerk (Straßen mit Referenzlinien-Geometrie, Höhenprofilen,
//! LaneSections und Junctions) wird einmalig über den [`NetworkBuilder`]
//! aufgebaut und danach nie mutiert; die [`Map`]-Fassade beantwortet
//! darüber Punkt-zu-Spur-Auflösung, Weltposen, Graph-Traversierung und
//! Bulk-Produkte (Waypoint-Abtastung, Topologie-Kanten). Alle Abfragen
//! sind reine Funktionen und ohne Locks parallel ausführbar.

pub mod core;
pub mod shared;

pub use core::{
    DirectedPoint, ElevationProfile, GeoLocation, GeoReference, GeometrySegment, Junction, Lane,
    LaneKey, LaneMarking, LaneMarkingRecord, LaneSection, LaneType, LaneTypeMask, Map,
    MarkingColor, NetworkBuilder, RecordIndex, Road, RoadNetwork, SignalKind, SignalRecord,
    SpatialIndex, SpeedRecord, Transform, Waypoint,
};
pub use shared::Poly3;
