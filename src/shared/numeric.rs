//! Deterministische numerische Hilfsfunktionen für die Closest-Offset-Suche.
//!
//! Gekrümmte Segmente (Spirale, Polynom) haben keine geschlossene Form für
//! den nächstgelegenen Bogenlängen-Offset. Die Suche läuft zweistufig:
//! Grobraster mit fester Schrittzahl, dann Golden-Section-Verfeinerung im
//! besten Intervall. Feste Schrittzahlen halten wiederholte Abfragen mit
//! identischer Eingabe bit-identisch.

/// Toleranz der Closest-Offset-Suche in Längeneinheiten.
pub const CLOSEST_OFFSET_EPS: f64 = 1e-3;

/// Anzahl der Unterteilungen des Grobrasters.
pub const COARSE_SCAN_STEPS: usize = 32;

/// Obergrenze der Golden-Section-Iterationen.
pub const GOLDEN_SECTION_MAX_ITERS: usize = 64;

const INV_PHI: f64 = 0.618_033_988_749_895;

/// Minimiert `f` über `[lo, hi]` und gibt `(argmin, minimum)` zurück.
///
/// Bei exakt gleichen Rasterwerten gewinnt der kleinere Offset.
pub fn minimize_scalar(lo: f64, hi: f64, f: impl Fn(f64) -> f64) -> (f64, f64) {
    if hi <= lo {
        return (lo, f(lo));
    }

    // Grobraster: strikte Verbesserung, damit Ties zum kleineren s fallen
    let step = (hi - lo) / COARSE_SCAN_STEPS as f64;
    let mut best_s = lo;
    let mut best_v = f(lo);
    for i in 1..=COARSE_SCAN_STEPS {
        let s = lo + step * i as f64;
        let v = f(s);
        if v < best_v {
            best_v = v;
            best_s = s;
        }
    }

    // Golden-Section im Intervall um das beste Rastersample
    let mut a = (best_s - step).max(lo);
    let mut b = (best_s + step).min(hi);
    let mut iters = 0;
    while (b - a) > CLOSEST_OFFSET_EPS && iters < GOLDEN_SECTION_MAX_ITERS {
        let c = b - INV_PHI * (b - a);
        let d = a + INV_PHI * (b - a);
        if f(c) <= f(d) {
            b = d;
        } else {
            a = c;
        }
        iters += 1;
    }

    let mid = 0.5 * (a + b);
    let mid_v = f(mid);
    if mid_v < best_v {
        (mid, mid_v)
    } else {
        (best_s, best_v)
    }
}

/// Normalisiert einen Winkel auf `(-π, π]`.
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Normalisiert einen Winkel auf `[0, 2π)`.
pub fn wrap_angle_positive(angle: f64) -> f64 {
    use std::f64::consts::TAU;
    let a = angle % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn minimize_parabola() {
        let (s, v) = minimize_scalar(0.0, 10.0, |x| (x - 3.7) * (x - 3.7) + 1.0);
        assert_relative_eq!(s, 3.7, epsilon = 1e-3);
        assert_relative_eq!(v, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn minimize_is_deterministic() {
        let f = |x: f64| (x * 1.3).sin() + 0.01 * x;
        let first = minimize_scalar(0.0, 20.0, f);
        let second = minimize_scalar(0.0, 20.0, f);
        assert_eq!(first, second);
    }

    #[test]
    fn minimize_flat_function_prefers_smaller_offset() {
        let (s, _) = minimize_scalar(0.0, 10.0, |_| 1.0);
        assert_relative_eq!(s, 0.0);
    }

    #[test]
    fn minimize_degenerate_interval() {
        let (s, v) = minimize_scalar(5.0, 5.0, |x| x);
        assert_relative_eq!(s, 5.0);
        assert_relative_eq!(v, 5.0);
    }

    #[test]
    fn wrap_angle_ranges() {
        assert_relative_eq!(wrap_angle(3.0 * PI), PI);
        assert_relative_eq!(wrap_angle(-3.0 * PI), PI);
        assert_relative_eq!(wrap_angle(0.5), 0.5);
        assert_relative_eq!(wrap_angle_positive(-0.5), 2.0 * PI - 0.5);
        assert_relative_eq!(wrap_angle_positive(0.5), 0.5);
    }
}
