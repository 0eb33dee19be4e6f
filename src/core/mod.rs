//! Core-Domänentypen: Geometrie, Straßen, Spuren, Junctions, Map-Fassade.

pub mod elevation;
pub mod geo;
pub mod geometry;
pub mod junction;
pub mod lane;
pub mod lane_section;
pub mod map;
pub mod network;
pub mod records;
pub mod road;
pub mod spatial;
pub mod waypoint;

pub use elevation::ElevationProfile;
pub use geo::{GeoLocation, GeoReference};
pub use geometry::{DirectedPoint, GeometrySegment};
pub use junction::Junction;
pub use lane::{Lane, LaneKey, LaneType, LaneTypeMask};
pub use lane_section::LaneSection;
pub use map::{Map, Transform};
pub use network::{NetworkBuilder, RoadNetwork};
pub use records::{
    LaneMarking, LaneMarkingRecord, MarkingColor, RecordIndex, SRecord, SignalKind, SignalRecord,
    SpeedRecord,
};
pub use road::Road;
pub use spatial::{SpatialIndex, SPATIAL_SAMPLE_STEP};
pub use waypoint::Waypoint;
