//! Time-aware transform buffer: a forest of named coordinate frames, a rolling
//! history of rigid transforms per frame, and point-in-time lookups between any
//! two frames with interpolation.

pub mod buffer;
pub mod config;
pub mod error;
pub mod frames;
pub mod history;
pub mod interpolation;
pub mod pointcloud;
pub mod primitives;
pub mod time;
pub mod transform;

pub use buffer::TransformBuffer;
pub use config::{read_configuration, BufferConfig, DEFAULT_CACHE_TIME_NS};
pub use error::{Status, StatusCode, TransformError, TransformResult};
pub use frames::{FrameId, FrameRegistry};
pub use history::{SampleQuery, TransformHistory, TransformSample};
pub use interpolation::{interpolate, slerp_shortest};
pub use pointcloud::{PointCloud2, PointField};
pub use primitives::{
    apply_point, apply_points, apply_points_in_place, apply_pose, HasHeader, Header,
    PointBatchStamped, PointStamped, PoseStamped, Transformable,
};
pub use time::{split_stamp, stamp_to_time, LookupTime, TimeSpec};
pub use transform::{Isometry, TransformStamped};

pub use cu29_clock::{CuDuration, CuTime};
