//! Stamped geometric primitives and how a resolved transform moves them.

use crate::error::TransformResult;
use crate::transform::TransformStamped;
use compact_str::CompactString;
use cu29_clock::CuTime;
use glam::{DQuat, DVec3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub stamp: CuTime,
    pub frame_id: CompactString,
}

impl Header {
    pub fn new(stamp: CuTime, frame_id: impl AsRef<str>) -> Self {
        Self {
            stamp,
            frame_id: CompactString::new(frame_id.as_ref()),
        }
    }

    /// Header of a message after it was moved by `tf`.
    fn moved_by(tf: &TransformStamped) -> Self {
        Self {
            stamp: tf.stamp,
            frame_id: tf.parent_frame.clone(),
        }
    }
}

/// Anything that says which frame and instant it is expressed in.
pub trait HasHeader {
    fn frame_id(&self) -> &str;
    fn stamp(&self) -> CuTime;
}

/// A message that can be re-expressed in another frame.
///
/// The transform maps the message's own frame (its child frame) into its parent
/// frame; the output header carries that parent frame and the transform's stamp.
pub trait Transformable: HasHeader + Sized {
    fn apply_transform(&self, tf: &TransformStamped) -> TransformResult<Self>;
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointStamped {
    pub header: Header,
    pub point: [f64; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    pub header: Header,
    pub position: [f64; 3],
    pub orientation: [f64; 4], // x,y,z,w
}

/// Many points sharing one header.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointBatchStamped {
    pub header: Header,
    pub points: Vec<[f64; 3]>,
}

macro_rules! impl_has_header {
    ($($ty:ty),*) => {
        $(
            impl HasHeader for $ty {
                fn frame_id(&self) -> &str {
                    &self.header.frame_id
                }

                fn stamp(&self) -> CuTime {
                    self.header.stamp
                }
            }
        )*
    };
}

impl_has_header!(PointStamped, PoseStamped, PointBatchStamped);

/// Rotates then translates one point.
pub fn apply_point(tf: &TransformStamped, point: [f64; 3]) -> [f64; 3] {
    tf.isometry()
        .transform_point(DVec3::from_array(point))
        .to_array()
}

/// Moves a position and composes the orientation: `tf.rotation * orientation`.
pub fn apply_pose(
    tf: &TransformStamped,
    position: [f64; 3],
    orientation: [f64; 4],
) -> ([f64; 3], [f64; 4]) {
    let iso = tf.isometry();
    let position = iso.transform_point(DVec3::from_array(position));
    let orientation = (iso.rotation * DQuat::from_array(orientation)).normalize();
    (position.to_array(), orientation.to_array())
}

/// Transforms every point independently. Order is preserved.
pub fn apply_points(tf: &TransformStamped, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
    let iso = tf.isometry();
    points
        .par_iter()
        .map(|p| iso.transform_point(DVec3::from_array(*p)).to_array())
        .collect()
}

/// In-place variant of [`apply_points`].
pub fn apply_points_in_place(tf: &TransformStamped, points: &mut [[f64; 3]]) {
    let iso = tf.isometry();
    points
        .par_iter_mut()
        .for_each(|p| *p = iso.transform_point(DVec3::from_array(*p)).to_array());
}

impl Transformable for PointStamped {
    fn apply_transform(&self, tf: &TransformStamped) -> TransformResult<Self> {
        Ok(Self {
            header: Header::moved_by(tf),
            point: apply_point(tf, self.point),
        })
    }
}

impl Transformable for PoseStamped {
    fn apply_transform(&self, tf: &TransformStamped) -> TransformResult<Self> {
        let (position, orientation) = apply_pose(tf, self.position, self.orientation);
        Ok(Self {
            header: Header::moved_by(tf),
            position,
            orientation,
        })
    }
}

impl Transformable for PointBatchStamped {
    fn apply_transform(&self, tf: &TransformStamped) -> TransformResult<Self> {
        Ok(Self {
            header: Header::moved_by(tf),
            points: apply_points(tf, &self.points),
        })
    }
}
