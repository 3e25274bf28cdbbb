//! Easing curves mapping linear progress in `[0, 1]` to eased progress in
//! `[0, 1]`. All curves are monotonic and fix both endpoints.

use serde::{Deserialize, Serialize};

use super::math::clamp01;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    InQuad,
    OutCubic,
    InOutCubic,
    /// `t² (3 - 2t)`
    SmoothStep,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = clamp01(t);
        match self {
            Easing::Linear => t,
            Easing::InQuad => t * t,
            Easing::OutCubic => ease_out_cubic(t),
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - clamp01(t)).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::InQuad,
        Easing::OutCubic,
        Easing::InOutCubic,
        Easing::SmoothStep,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-12, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing:?}");
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for easing in ALL {
            let mut prev = easing.apply(0.0);
            for i in 1..=200 {
                let v = easing.apply(i as f64 / 200.0);
                assert!(v + 1e-12 >= prev, "{easing:?} dipped at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(Easing::OutCubic.apply(-3.0), 0.0);
        assert_eq!(Easing::OutCubic.apply(7.0), 1.0);
        assert_eq!(Easing::SmoothStep.apply(f64::NAN), 0.0);
    }
}
