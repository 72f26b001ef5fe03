//! Distance and sphere-overlap tests
//!
//! Everything here is pure: no state, no failure modes.

use glam::Vec3;

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    (a - b).length()
}

/// Whether two spheres overlap
///
/// Strict inequality: tangent spheres do not collide.
#[inline]
pub fn spheres_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    distance(a, b) - radius_a - radius_b < 0.0
}

/// Project a point onto the ground plane (z = 0)
#[inline]
pub fn flatten(p: Vec3) -> Vec3 {
    Vec3::new(p.x, p.y, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_axis_aligned() {
        assert!((distance(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)) - 5.0).abs() < 1e-6);
        assert!((distance(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, -1.0)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_tangent_spheres_do_not_collide() {
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 0.0, 0.0);
        assert!(!spheres_overlap(a, 0.5, b, 0.5));
        assert!(spheres_overlap(a, 0.5, b, 0.51));
    }

    #[test]
    fn test_hand_reaches_nearby_minion() {
        // d = 0.2, 0.2 - 0.3 - 0.15 = -0.25
        let hand = flatten(Vec3::new(0.0, 0.0, 0.7));
        let minion = Vec3::new(0.2, 0.0, 0.0);
        assert!(spheres_overlap(minion, 0.15, hand, 0.3));
    }

    #[test]
    fn test_flatten_drops_depth_only() {
        assert_eq!(flatten(Vec3::new(1.0, -2.0, 3.0)), Vec3::new(1.0, -2.0, 0.0));
    }

    proptest! {
        #[test]
        fn overlap_matches_twice_radius(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0, az in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0, bz in -100.0f32..100.0,
            r in 0.0f32..50.0,
        ) {
            let a = Vec3::new(ax, ay, az);
            let b = Vec3::new(bx, by, bz);
            let d = distance(a, b);
            if d < 2.0 * r - 1e-3 {
                prop_assert!(spheres_overlap(a, r, b, r));
            } else if d > 2.0 * r + 1e-3 {
                prop_assert!(!spheres_overlap(a, r, b, r));
            }
        }

        #[test]
        fn distance_is_symmetric_and_non_negative(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
        ) {
            let a = Vec3::new(ax, ay, 0.0);
            let b = Vec3::new(bx, by, 0.0);
            prop_assert!(distance(a, b) >= 0.0);
            prop_assert_eq!(distance(a, b), distance(b, a));
        }
    }
}
