//! Small numeric helpers shared by the physics and the sketches.

use std::f64::consts::{PI, TAU};

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Linearly remap `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
/// A degenerate input range maps everything to `out_min`.
pub fn map(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    lerp(out_min, out_max, (value - in_min) / span)
}

pub fn clamp01(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Difference `a - b` folded into `(-period / 2, period / 2]`.
pub fn wrapped_diff(a: f64, b: f64, period: f64) -> f64 {
    let half = period / 2.0;
    let diff = (a - b).rem_euclid(period);
    if diff > half { diff - period } else { diff }
}

/// Shortest signed angle from `b` to `a`, in `(-π, π]`.
pub fn shortest_angle_diff(a: f64, b: f64) -> f64 {
    wrapped_diff(a, b, TAU)
}

/// Shortest signed difference between two angles in degrees.
pub fn delta_angle_deg(a: f64, b: f64) -> f64 {
    wrapped_diff(a, b, 360.0)
}

/// Frame-rate independent version of `x += (target - x) * rate` tuned for
/// `reference_fps`.
pub fn approach(current: f64, target: f64, rate: f64, dt: f64, reference_fps: f64) -> f64 {
    let keep = (1.0 - rate.clamp(0.0, 1.0)).powf(dt * reference_fps);
    target + (current - target) * keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_diff_is_within_half_open_range() {
        let samples = [-10.0, -PI, -3.0, -1.0, 0.0, 0.5, PI, 4.0, 7.5, 100.0];
        for &a in &samples {
            for &b in &samples {
                let d = shortest_angle_diff(a, b);
                assert!(d > -PI - 1e-12 && d <= PI + 1e-12, "diff({a}, {b}) = {d}");
            }
        }
    }

    #[test]
    fn shortest_diff_is_antisymmetric_away_from_the_boundary() {
        let samples = [-5.0, -2.0, -0.3, 0.0, 0.7, 2.9, 6.0];
        for &a in &samples {
            for &b in &samples {
                let ab = shortest_angle_diff(a, b);
                let ba = shortest_angle_diff(b, a);
                if (ab.abs() - PI).abs() < 1e-9 {
                    continue;
                }
                assert!((ab + ba).abs() < 1e-9, "a={a} b={b} ab={ab} ba={ba}");
            }
        }
    }

    #[test]
    fn shortest_diff_crosses_the_seam() {
        let d = shortest_angle_diff(deg_to_rad(5.0), deg_to_rad(355.0));
        assert!((d - deg_to_rad(10.0)).abs() < 1e-9);
        assert!((delta_angle_deg(350.0, 10.0) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn map_handles_degenerate_range() {
        assert_eq!(map(5.0, 1.0, 1.0, 3.0, 4.0), 3.0);
        assert!((map(50.0, 0.0, 100.0, 0.0, 360.0) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn approach_matches_per_frame_lerp_at_reference_rate() {
        let stepped = 10.0 + (0.0 - 10.0) * 0.18;
        let approached = approach(10.0, 0.0, 0.18, 1.0 / 60.0, 60.0);
        assert!((stepped - approached).abs() < 1e-9);
    }
}
