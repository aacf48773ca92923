use crate::history::TransformSample;
use crate::transform::Isometry;
use cu29_clock::CuTime;
use glam::DQuat;

/// Above this quaternion dot product the arc is short enough to blend linearly.
const SLERP_LINEAR_THRESHOLD: f64 = 0.9995;

/// `(time - t0) / (t1 - t0)`, defined as 0 when both stamps are equal.
///
/// Values above 1 are only produced for future extrapolation.
pub fn blend_factor(t0: CuTime, t1: CuTime, time: CuTime) -> f64 {
    if t1 == t0 {
        return 0.0;
    }
    (time.0 as f64 - t0.0 as f64) / (t1.0 as f64 - t0.0 as f64)
}

/// Spherical interpolation along the shortest arc between two unit quaternions.
/// The result is renormalized.
pub fn slerp_shortest(from: DQuat, to: DQuat, alpha: f64) -> DQuat {
    let mut to = to;
    let mut dot = from.dot(to);
    if dot < 0.0 {
        to = -to;
        dot = -dot;
    }

    if dot > SLERP_LINEAR_THRESHOLD {
        return (from + (to - from) * alpha).normalize();
    }

    let theta = dot.clamp(-1.0, 1.0).acos();
    let sin_theta = theta.sin();
    let w_from = ((1.0 - alpha) * theta).sin() / sin_theta;
    let w_to = (alpha * theta).sin() / sin_theta;
    (from * w_from + to * w_to).normalize()
}

/// Blends two rigid transforms: linear for translation, slerp for rotation.
pub fn interpolate(from: &Isometry, to: &Isometry, alpha: f64) -> Isometry {
    Isometry {
        translation: from.translation.lerp(to.translation, alpha),
        rotation: slerp_shortest(from.rotation, to.rotation, alpha),
    }
}

/// Transform at `time` between two samples of the same frame, `before.stamp <= after.stamp`.
pub fn interpolate_samples(
    before: &TransformSample,
    after: &TransformSample,
    time: CuTime,
) -> Isometry {
    let alpha = blend_factor(before.stamp, after.stamp, time);
    interpolate(&before.transform, &after.transform, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cu29_clock::CuDuration;
    use glam::DVec3;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn sample(stamp: u64, translation: DVec3, rotation: DQuat) -> TransformSample {
        TransformSample::new(
            CuDuration(stamp),
            Isometry::new(translation, rotation),
            "test",
        )
    }

    #[test]
    fn test_blend_factor() {
        assert_abs_diff_eq!(
            blend_factor(CuDuration(1000), CuDuration(3000), CuDuration(1500)),
            0.25
        );
        assert_eq!(
            blend_factor(CuDuration(1000), CuDuration(1000), CuDuration(1000)),
            0.0
        );
        assert_abs_diff_eq!(
            blend_factor(CuDuration(1000), CuDuration(2000), CuDuration(2500)),
            1.5
        );
    }

    #[test]
    fn test_translation_midpoint() {
        let before = sample(1000, DVec3::ZERO, DQuat::IDENTITY);
        let after = sample(3000, DVec3::new(2.0, 0.0, 0.0), DQuat::IDENTITY);

        let mid = interpolate_samples(&before, &after, CuDuration(2000));
        assert_abs_diff_eq!(mid.translation.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.translation.y, 0.0, epsilon = 1e-12);

        let quarter = interpolate_samples(&before, &after, CuDuration(1500));
        assert_abs_diff_eq!(quarter.translation.x, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_slerp_halfway() {
        let from = DQuat::IDENTITY;
        let to = DQuat::from_rotation_z(FRAC_PI_2);
        let half = slerp_shortest(from, to, 0.5);
        let expected = DQuat::from_rotation_z(FRAC_PI_2 / 2.0);
        assert_abs_diff_eq!(half.dot(expected).abs(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(half.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_slerp_takes_short_path() {
        // +170 and -170 degrees about z are 20 degrees apart through 180
        let from = DQuat::from_rotation_z(170f64.to_radians());
        let to = DQuat::from_rotation_z(-170f64.to_radians());
        let half = slerp_shortest(from, to, 0.5);
        let expected = DQuat::from_rotation_z(PI);
        assert_abs_diff_eq!(half.dot(expected).abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_slerp_endpoints() {
        let from = DQuat::from_rotation_x(0.3);
        let to = DQuat::from_rotation_y(1.2);
        assert_abs_diff_eq!(slerp_shortest(from, to, 0.0).dot(from), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(slerp_shortest(from, to, 1.0).dot(to), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_slerp_is_deterministic() {
        let from = DQuat::from_rotation_x(0.3);
        let to = DQuat::from_rotation_y(-2.2);
        assert_eq!(
            slerp_shortest(from, to, 0.37),
            slerp_shortest(from, to, 0.37)
        );
    }
}
