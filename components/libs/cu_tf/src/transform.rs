use crate::error::{TransformError, TransformResult};
use compact_str::CompactString;
use cu29_clock::CuTime;
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Allowed deviation of |q|² from 1 before a rotation is rejected instead of renormalized.
pub const QUATERNION_NORMALIZATION_TOLERANCE: f64 = 10e-3;

/// A rigid transform between two named frames at a point in time.
///
/// It maps coordinates expressed in `child_frame` into `parent_frame`:
/// `p_parent = rotation * p_child + translation`. This is the only type
/// returned across the lookup boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformStamped {
    pub stamp: CuTime,
    pub parent_frame: CompactString,
    pub child_frame: CompactString,
    pub translation: [f64; 3],
    pub rotation: [f64; 4], // x,y,z,w
}

impl TransformStamped {
    pub fn new(
        stamp: CuTime,
        parent_frame: impl AsRef<str>,
        child_frame: impl AsRef<str>,
        translation: [f64; 3],
        rotation: [f64; 4],
    ) -> Self {
        Self {
            stamp,
            parent_frame: CompactString::new(parent_frame.as_ref()),
            child_frame: CompactString::new(child_frame.as_ref()),
            translation,
            rotation,
        }
    }

    /// Identity transform of a frame onto itself.
    pub fn identity(stamp: CuTime, frame: impl AsRef<str>) -> Self {
        Self::new(stamp, &frame, &frame, [0.0; 3], [0.0, 0.0, 0.0, 1.0])
    }

    pub fn isometry(&self) -> Isometry {
        Isometry {
            translation: DVec3::from_array(self.translation),
            rotation: DQuat::from_array(self.rotation),
        }
    }

    pub(crate) fn from_isometry(
        stamp: CuTime,
        parent_frame: CompactString,
        child_frame: CompactString,
        iso: &Isometry,
    ) -> Self {
        Self {
            stamp,
            parent_frame,
            child_frame,
            translation: iso.translation.to_array(),
            rotation: iso.rotation.to_array(),
        }
    }

    /// The same relation seen from the other side: child and parent swapped.
    pub fn inverse(&self) -> Self {
        Self::from_isometry(
            self.stamp,
            self.child_frame.clone(),
            self.parent_frame.clone(),
            &self.isometry().inverse(),
        )
    }

    /// Checks the sample is well formed and returns its rigid part with a unit rotation.
    pub fn validate(&self) -> TransformResult<Isometry> {
        if self.child_frame.is_empty() {
            return Err(TransformError::InvalidArgument(
                "transform has an empty child frame name".to_string(),
            ));
        }
        if self.parent_frame.is_empty() {
            return Err(TransformError::InvalidArgument(format!(
                "transform for child frame '{}' has an empty parent frame name",
                self.child_frame
            )));
        }
        if self.child_frame == self.parent_frame {
            return Err(TransformError::InvalidArgument(format!(
                "child frame '{}' cannot be its own parent",
                self.child_frame
            )));
        }
        let iso = self.isometry();
        if !iso.translation.is_finite() {
            return Err(TransformError::InvalidArgument(format!(
                "non-finite translation {:?} for frame '{}'",
                self.translation, self.child_frame
            )));
        }
        let rotation = normalized_rotation(self.rotation).map_err(|msg| {
            TransformError::InvalidArgument(format!("{msg} for frame '{}'", self.child_frame))
        })?;
        Ok(Isometry {
            translation: iso.translation,
            rotation,
        })
    }
}

/// Accepts a quaternion within tolerance of unit length and renormalizes it.
pub(crate) fn normalized_rotation(rotation: [f64; 4]) -> Result<DQuat, String> {
    let q = DQuat::from_array(rotation);
    if !q.is_finite() {
        return Err(format!("non-finite rotation {rotation:?}"));
    }
    let norm2 = q.length_squared();
    if (norm2 - 1.0).abs() > QUATERNION_NORMALIZATION_TOLERANCE {
        return Err(format!(
            "rotation {rotation:?} is not unit length (|q|^2 = {norm2})"
        ));
    }
    Ok(q.normalize())
}

/// Translation plus unit rotation. Composition follows rigid-body rules:
/// `(a * b)(p) = a(b(p))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Isometry {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl Default for Isometry {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Isometry {
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    pub fn new(translation: DVec3, rotation: DQuat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.conjugate();
        Self {
            translation: -(rotation * self.translation),
            rotation,
        }
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    pub fn transform_vector(&self, vector: DVec3) -> DVec3 {
        self.rotation * vector
    }
}

impl std::ops::Mul for Isometry {
    type Output = Isometry;

    fn mul(self, rhs: Isometry) -> Isometry {
        Isometry {
            translation: self.rotation * rhs.translation + self.translation,
            rotation: (self.rotation * rhs.rotation).normalize(),
        }
    }
}
