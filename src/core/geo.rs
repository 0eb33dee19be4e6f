//! Geo-Referenz: Umrechnung netzlokaler Koordinaten in geodätische.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Äquatorradius (WGS84) in Metern.
const EARTH_RADIUS_EQUA: f64 = 6_378_137.0;

/// Geodätische Position (Grad, Grad, Meter).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Unveränderlicher geodätischer Ursprung des Netzwerks.
///
/// Wird beim Aufbau einmal gesetzt und nie neu berechnet. Die Umrechnung
/// läuft über eine Mercator-Projektion, skaliert mit `cos(lat0)`; lokales
/// +y verringert den Mercator-Nordwert (linkshändiges Kartensystem der
/// Quellkarten), die Höhe ist additiv.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoReference {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl GeoReference {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Rechnet eine netzlokale Position in eine geodätische um.
    pub fn to_geodetic(&self, position: DVec3) -> GeoLocation {
        let scale = self.latitude.to_radians().cos();
        let base_x = scale * self.longitude.to_radians() * EARTH_RADIUS_EQUA;
        let base_y =
            scale * EARTH_RADIUS_EQUA * ((90.0 + self.latitude).to_radians() * 0.5).tan().ln();

        let mx = base_x + position.x;
        let my = base_y - position.y;

        let longitude = mx / (scale * EARTH_RADIUS_EQUA) * 180.0 / std::f64::consts::PI;
        let latitude =
            (my / (scale * EARTH_RADIUS_EQUA)).exp().atan() * 360.0 / std::f64::consts::PI - 90.0;

        GeoLocation {
            latitude,
            longitude,
            altitude: self.altitude + position.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn origin_maps_to_reference() {
        let geo = GeoReference::new(48.137, 11.575, 520.0);
        let loc = geo.to_geodetic(DVec3::ZERO);
        assert_relative_eq!(loc.latitude, 48.137, epsilon = 1e-9);
        assert_relative_eq!(loc.longitude, 11.575, epsilon = 1e-9);
        assert_relative_eq!(loc.altitude, 520.0);
    }

    #[test]
    fn eastward_offset_increases_longitude() {
        let geo = GeoReference::new(48.0, 11.0, 0.0);
        let loc = geo.to_geodetic(DVec3::new(1000.0, 0.0, 0.0));
        assert!(loc.longitude > 11.0);
        assert_relative_eq!(loc.latitude, 48.0, epsilon = 1e-9);
    }

    #[test]
    fn local_y_decreases_latitude() {
        let geo = GeoReference::new(48.0, 11.0, 0.0);
        let loc = geo.to_geodetic(DVec3::new(0.0, 1000.0, 0.0));
        assert!(loc.latitude < 48.0);
    }

    #[test]
    fn altitude_is_additive() {
        let geo = GeoReference::new(0.0, 0.0, 100.0);
        let loc = geo.to_geodetic(DVec3::new(0.0, 0.0, 25.0));
        assert_relative_eq!(loc.altitude, 125.0);
    }

    #[test]
    fn hundred_meters_near_equator() {
        // Am Äquator entsprechen ~111.3 km einem Längengrad
        let geo = GeoReference::new(0.0, 0.0, 0.0);
        let loc = geo.to_geodetic(DVec3::new(111_320.0, 0.0, 0.0));
        assert_relative_eq!(loc.longitude, 1.0, epsilon = 1e-2);
    }
}
