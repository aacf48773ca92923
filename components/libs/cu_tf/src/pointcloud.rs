//! PointCloud2-style structured point batch, transformed in place.

use crate::error::{TransformError, TransformResult};
use crate::primitives::{HasHeader, Header, Transformable};
use crate::transform::{Isometry, TransformStamped};
use compact_str::CompactString;
use cu29_clock::CuTime;
use glam::DVec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const DATATYPE_INT8: u8 = 1;
pub const DATATYPE_UINT8: u8 = 2;
pub const DATATYPE_INT16: u8 = 3;
pub const DATATYPE_UINT16: u8 = 4;
pub const DATATYPE_INT32: u8 = 5;
pub const DATATYPE_UINT32: u8 = 6;
pub const DATATYPE_FLOAT32: u8 = 7;
pub const DATATYPE_FLOAT64: u8 = 8;

/// Size in bytes of one element of a field datatype.
pub fn datatype_size(datatype: u8) -> Option<usize> {
    match datatype {
        DATATYPE_INT8 | DATATYPE_UINT8 => Some(1),
        DATATYPE_INT16 | DATATYPE_UINT16 => Some(2),
        DATATYPE_INT32 | DATATYPE_UINT32 | DATATYPE_FLOAT32 => Some(4),
        DATATYPE_FLOAT64 => Some(8),
        _ => None,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PointField {
    pub name: CompactString,
    pub offset: u32,
    pub datatype: u8,
    pub count: u32,
}

impl PointField {
    pub fn new(name: &str, offset: u32, datatype: u8, count: u32) -> Self {
        Self {
            name: CompactString::new(name),
            offset,
            datatype,
            count,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PointCloud2 {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub fields: Vec<PointField>,
    pub is_bigendian: bool,
    pub point_step: u32,
    pub row_step: u32,
    pub data: Vec<u8>,
    /// Every point is finite.
    pub is_dense: bool,
}

impl HasHeader for PointCloud2 {
    fn frame_id(&self) -> &str {
        &self.header.frame_id
    }

    fn stamp(&self) -> CuTime {
        self.header.stamp
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Scalar {
    F32,
    F64,
}

/// Where x, y and z live inside one point.
#[derive(Clone, Copy, Debug)]
struct XyzLayout {
    scalar: Scalar,
    offsets: [usize; 3],
    bigendian: bool,
}

impl XyzLayout {
    fn read(&self, point: &[u8], axis: usize) -> f64 {
        let start = self.offsets[axis];
        match self.scalar {
            Scalar::F32 => {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(&point[start..start + 4]);
                if self.bigendian {
                    f32::from_be_bytes(bytes) as f64
                } else {
                    f32::from_le_bytes(bytes) as f64
                }
            }
            Scalar::F64 => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&point[start..start + 8]);
                if self.bigendian {
                    f64::from_be_bytes(bytes)
                } else {
                    f64::from_le_bytes(bytes)
                }
            }
        }
    }

    fn write(&self, point: &mut [u8], axis: usize, value: f64) {
        let start = self.offsets[axis];
        match self.scalar {
            Scalar::F32 => {
                let value = value as f32;
                let bytes = if self.bigendian {
                    value.to_be_bytes()
                } else {
                    value.to_le_bytes()
                };
                point[start..start + 4].copy_from_slice(&bytes);
            }
            Scalar::F64 => {
                let bytes = if self.bigendian {
                    value.to_be_bytes()
                } else {
                    value.to_le_bytes()
                };
                point[start..start + 8].copy_from_slice(&bytes);
            }
        }
    }

    fn get(&self, point: &[u8]) -> DVec3 {
        DVec3::new(self.read(point, 0), self.read(point, 1), self.read(point, 2))
    }

    fn set(&self, point: &mut [u8], value: DVec3) {
        self.write(point, 0, value.x);
        self.write(point, 1, value.y);
        self.write(point, 2, value.z);
    }
}

fn invalid(msg: String) -> TransformError {
    TransformError::InvalidArgument(format!("PointCloud2: {msg}"))
}

impl PointCloud2 {
    /// Dense, little-endian, single-row cloud of `x`, `y`, `z` FLOAT32 points.
    pub fn from_xyz(header: Header, points: &[[f32; 3]]) -> Self {
        let point_step = 12u32;
        let width = points.len() as u32;
        let mut data = Vec::with_capacity(points.len() * 12);
        for p in points {
            for v in p {
                data.extend_from_slice(&v.to_le_bytes());
            }
        }
        Self {
            header,
            height: 1,
            width,
            fields: vec![
                PointField::new("x", 0, DATATYPE_FLOAT32, 1),
                PointField::new("y", 4, DATATYPE_FLOAT32, 1),
                PointField::new("z", 8, DATATYPE_FLOAT32, 1),
            ],
            is_bigendian: false,
            point_step,
            row_step: point_step * width,
            data,
            is_dense: true,
        }
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn field(&self, name: &str) -> Option<&PointField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks every field and the strides against the data buffer, and locates x/y/z.
    fn xyz_layout(&self) -> TransformResult<XyzLayout> {
        let mut offsets = [0usize; 3];
        let mut scalar = None;
        for (axis, name) in ["x", "y", "z"].iter().enumerate() {
            let field = self
                .field(name)
                .ok_or_else(|| invalid(format!("missing field '{name}'")))?;
            let field_scalar = match field.datatype {
                DATATYPE_FLOAT32 => Scalar::F32,
                DATATYPE_FLOAT64 => Scalar::F64,
                other => {
                    return Err(invalid(format!(
                        "field '{name}' has datatype {other}, expected FLOAT32 or FLOAT64"
                    )))
                }
            };
            if field.count != 1 {
                return Err(invalid(format!(
                    "field '{name}' has count {}, expected 1",
                    field.count
                )));
            }
            if scalar.is_some_and(|s| s != field_scalar) {
                return Err(invalid("x, y and z must share one datatype".to_string()));
            }
            scalar = Some(field_scalar);
            offsets[axis] = field.offset as usize;
        }
        let scalar = scalar.unwrap_or(Scalar::F32);

        let point_step = self.point_step as usize;
        for field in &self.fields {
            let size = datatype_size(field.datatype).ok_or_else(|| {
                invalid(format!(
                    "field '{}' has unknown datatype {}",
                    field.name, field.datatype
                ))
            })?;
            let end = field.offset as usize + size * field.count as usize;
            if end > point_step {
                return Err(invalid(format!(
                    "field '{}' ends at byte {end}, past point_step {point_step}",
                    field.name
                )));
            }
        }
        let row_bytes = (self.width as usize)
            .checked_mul(point_step)
            .ok_or_else(|| invalid("width*point_step overflow".to_string()))?;
        if (self.row_step as usize) < row_bytes {
            return Err(invalid(format!(
                "row_step {} smaller than width*point_step {row_bytes}",
                self.row_step
            )));
        }
        let required = (self.row_step as usize)
            .checked_mul(self.height as usize)
            .ok_or_else(|| invalid("row_step*height overflow".to_string()))?;
        if self.data.len() < required {
            return Err(invalid(format!(
                "data length {} < expected {required}",
                self.data.len()
            )));
        }

        Ok(XyzLayout {
            scalar,
            offsets,
            bigendian: self.is_bigendian,
        })
    }

    /// Reads back the positions, row by row.
    pub fn xyz(&self) -> TransformResult<Vec<[f64; 3]>> {
        let layout = self.xyz_layout()?;
        let mut out = Vec::with_capacity(self.len());
        if self.point_step == 0 || self.row_step == 0 {
            return Ok(out);
        }
        for row in self
            .data
            .chunks(self.row_step as usize)
            .take(self.height as usize)
        {
            for point in row
                .chunks_exact(self.point_step as usize)
                .take(self.width as usize)
            {
                out.push(layout.get(point).to_array());
            }
        }
        Ok(out)
    }

    /// Rewrites x/y/z of every point through `iso`. Other fields are untouched.
    /// In a non-dense cloud, non-finite points are left as they are.
    pub fn transform_in_place(&mut self, iso: &Isometry) -> TransformResult<()> {
        let layout = self.xyz_layout()?;
        let point_step = self.point_step as usize;
        let row_step = self.row_step as usize;
        if self.is_empty() || point_step == 0 || row_step == 0 {
            return Ok(());
        }
        let width = self.width as usize;
        let skip_invalid = !self.is_dense;
        let used = row_step * self.height as usize;

        self.data[..used].par_chunks_mut(row_step).for_each(|row| {
            for point in row.chunks_exact_mut(point_step).take(width) {
                let p = layout.get(point);
                if skip_invalid && !p.is_finite() {
                    continue;
                }
                layout.set(point, iso.transform_point(p));
            }
        });
        Ok(())
    }
}

impl Transformable for PointCloud2 {
    fn apply_transform(&self, tf: &TransformStamped) -> TransformResult<Self> {
        let mut out = self.clone();
        out.transform_in_place(&tf.isometry())?;
        out.header = Header {
            stamp: tf.stamp,
            frame_id: tf.parent_frame.clone(),
        };
        Ok(out)
    }
}
