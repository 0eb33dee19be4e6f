//! Referenzlinien-Segmente: Gerade, Kreisbogen, Klothoide, kubisches Polynom.
//!
//! Jedes Segment beantwortet zwei Fragen: "Pose bei lokaler Bogenlänge s"
//! und "nächstgelegener lokaler Offset zu einem Punkt". Die Varianten sind
//! ein Tagged-Enum statt Trait-Objekten, damit der heiße Abfragepfad ohne
//! Allokationen auskommt.

use glam::DVec2;

use crate::shared::{minimize_scalar, wrap_angle_positive};

/// Integrationsschritt für Klothoiden-Positionen (Simpson-Regel).
const SPIRAL_STEP: f64 = 0.25;

/// Marschschritt für die Bogenlängen-Abbildung kubischer Segmente.
const POLY3_STEP: f64 = 0.25;

/// Pose auf der Referenzlinie: Position und Fahrtrichtung (Heading, Radiant).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectedPoint {
    pub position: DVec2,
    pub heading: f64,
}

/// Ein Segment der Referenzlinie einer Straße.
///
/// `s0` ist der straßenglobale Startoffset, `length` die Bogenlänge des
/// Segments. `start`/`heading` beschreiben die Pose am Segmentanfang.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometrySegment {
    /// Gerade mit konstantem Heading
    Line {
        s0: f64,
        start: DVec2,
        heading: f64,
        length: f64,
    },
    /// Kreisbogen mit konstanter Krümmung (positiv = Linkskurve)
    Arc {
        s0: f64,
        start: DVec2,
        heading: f64,
        length: f64,
        curvature: f64,
    },
    /// Klothoide mit linear veränderlicher Krümmung
    Spiral {
        s0: f64,
        start: DVec2,
        heading: f64,
        length: f64,
        curv_start: f64,
        curv_end: f64,
    },
    /// Kubisches Polynom `v(u) = a + b·u + c·u² + d·u³` im Segment-Frame
    Poly3 {
        s0: f64,
        start: DVec2,
        heading: f64,
        length: f64,
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    },
}

impl GeometrySegment {
    /// Straßenglobaler Startoffset des Segments.
    pub fn s_start(&self) -> f64 {
        match self {
            Self::Line { s0, .. }
            | Self::Arc { s0, .. }
            | Self::Spiral { s0, .. }
            | Self::Poly3 { s0, .. } => *s0,
        }
    }

    /// Bogenlänge des Segments.
    pub fn length(&self) -> f64 {
        match self {
            Self::Line { length, .. }
            | Self::Arc { length, .. }
            | Self::Spiral { length, .. }
            | Self::Poly3 { length, .. } => *length,
        }
    }

    /// Straßenglobaler Endoffset des Segments.
    pub fn s_end(&self) -> f64 {
        self.s_start() + self.length()
    }

    /// Pose bei lokaler Bogenlänge `s_local ∈ [0, length]`.
    pub fn location_at(&self, s_local: f64) -> DirectedPoint {
        let s = s_local.clamp(0.0, self.length());
        match *self {
            Self::Line { start, heading, .. } => DirectedPoint {
                position: start + DVec2::from_angle(heading) * s,
                heading,
            },
            Self::Arc {
                start,
                heading,
                curvature,
                ..
            } => arc_location(start, heading, curvature, s),
            Self::Spiral {
                start,
                heading,
                length,
                curv_start,
                curv_end,
                ..
            } => spiral_location(start, heading, length, curv_start, curv_end, s),
            Self::Poly3 {
                start,
                heading,
                length,
                a,
                b,
                c,
                d,
                ..
            } => poly3_location(start, heading, length, a, b, c, d, s),
        }
    }

    /// Nächstgelegener lokaler Offset zu `point`: `(s_local, Distanz)`.
    ///
    /// Gerade und Bogen in geschlossener Form, gekrümmte Segmente über die
    /// deterministische Minimierung aus `shared::numeric`.
    pub fn closest_offset(&self, point: DVec2) -> (f64, f64) {
        match *self {
            Self::Line {
                start,
                heading,
                length,
                ..
            } => {
                let dir = DVec2::from_angle(heading);
                let s = (point - start).dot(dir).clamp(0.0, length);
                (s, point.distance(start + dir * s))
            }
            Self::Arc {
                start,
                heading,
                length,
                curvature,
                ..
            } => arc_closest_offset(start, heading, length, curvature, point),
            _ => {
                let (s, d) = minimize_scalar(0.0, self.length(), |s| {
                    self.location_at(s).position.distance(point)
                });
                (s, d)
            }
        }
    }
}

fn arc_location(start: DVec2, heading: f64, curvature: f64, s: f64) -> DirectedPoint {
    // Rotation des Startpunkts um das Bogenzentrum; funktioniert für beide
    // Krümmungsvorzeichen, solange curvature ≠ 0 (Builder-Invariante).
    let left = DVec2::new(-heading.sin(), heading.cos());
    let center = start + left / curvature;
    let angle = curvature * s;
    let rel = start - center;
    let rotated = DVec2::new(
        rel.x * angle.cos() - rel.y * angle.sin(),
        rel.x * angle.sin() + rel.y * angle.cos(),
    );
    DirectedPoint {
        position: center + rotated,
        heading: heading + angle,
    }
}

fn arc_closest_offset(
    start: DVec2,
    heading: f64,
    length: f64,
    curvature: f64,
    point: DVec2,
) -> (f64, f64) {
    let left = DVec2::new(-heading.sin(), heading.cos());
    let center = start + left / curvature;
    let radius = curvature.recip().abs();

    // Winkel des Punkts relativ zum Startwinkel, in Fahrtrichtung gezählt
    let angle_start = (start - center).to_angle();
    let angle_point = (point - center).to_angle();
    let sweep = wrap_angle_positive((angle_point - angle_start) * curvature.signum());
    let s_interior = sweep * radius;

    // Kandidaten aufsteigend, damit Ties zum kleineren s fallen; liegt der
    // Punkt hinter dem Winkelbereich, kommen nur die Enden infrage
    let mut candidates = [0.0, s_interior.min(length), length];
    candidates.sort_by(f64::total_cmp);

    let mut best = (0.0, f64::INFINITY);
    for s in candidates {
        let d = point.distance(arc_location(start, heading, curvature, s).position);
        if d < best.1 {
            best = (s, d);
        }
    }
    best
}

fn spiral_location(
    start: DVec2,
    heading: f64,
    length: f64,
    curv_start: f64,
    curv_end: f64,
    s: f64,
) -> DirectedPoint {
    let curv_dot = if length > 0.0 {
        (curv_end - curv_start) / length
    } else {
        0.0
    };
    let theta = |t: f64| heading + curv_start * t + 0.5 * curv_dot * t * t;

    // Zusammengesetzte Simpson-Regel mit fester Schrittweite
    let n = ((s / SPIRAL_STEP).ceil() as usize).max(2).next_multiple_of(2);
    let h = s / n as f64;
    let mut sum = DVec2::new(theta(0.0).cos(), theta(0.0).sin());
    for i in 1..n {
        let t = h * i as f64;
        let w = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += DVec2::new(theta(t).cos(), theta(t).sin()) * w;
    }
    sum += DVec2::new(theta(s).cos(), theta(s).sin());

    DirectedPoint {
        position: start + sum * (h / 3.0),
        heading: theta(s),
    }
}

#[allow(clippy::too_many_arguments)]
fn poly3_location(
    start: DVec2,
    heading: f64,
    length: f64,
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    s: f64,
) -> DirectedPoint {
    let deriv = |u: f64| b + u * (2.0 * c + u * 3.0 * d);
    let value = |u: f64| a + u * (b + u * (c + u * d));

    // Bogenlängen-Marsch im u-Parameter mit linearer Interpolation im
    // letzten Schritt; feste Schrittweite hält das Ergebnis deterministisch.
    let mut u = 0.0;
    let mut acc = 0.0;
    if s > 0.0 {
        loop {
            let slope = deriv(u);
            let seg = (1.0 + slope * slope).sqrt() * POLY3_STEP;
            if acc + seg >= s {
                u += POLY3_STEP * (s - acc) / seg;
                break;
            }
            acc += seg;
            u += POLY3_STEP;
            if u >= length * 4.0 {
                // Sicherheitsgrenze gegen degenerierte Koeffizienten
                break;
            }
        }
    }

    let local = DVec2::new(u, value(u));
    let rot = DVec2::from_angle(heading);
    let position = start + DVec2::new(local.x * rot.x - local.y * rot.y, local.x * rot.y + local.y * rot.x);
    DirectedPoint {
        position,
        heading: heading + deriv(u).atan(),
    }
}
