use crate::error::{TransformError, TransformResult};
use crate::primitives::HasHeader;
use cu29_clock::{CuDuration, CuTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// When a lookup should be evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupTime {
    /// Most recent time at which the whole chain can be resolved.
    Latest,
    Time(CuTime),
}

impl LookupTime {
    /// Decodes a `(sec, nanosec)` stamp. `(0, 0)` is the "latest" sentinel, not the epoch.
    pub fn from_stamp(sec: i32, nanosec: u32) -> TransformResult<Self> {
        if sec == 0 && nanosec == 0 {
            return Ok(LookupTime::Latest);
        }
        Ok(LookupTime::Time(stamp_to_time(sec, nanosec)?))
    }

    /// Encodes back into a `(sec, nanosec)` stamp.
    pub fn to_stamp(self) -> (i32, u32) {
        match self {
            LookupTime::Latest => (0, 0),
            LookupTime::Time(t) => split_stamp(t),
        }
    }

    /// Folds a zero time into `Latest`.
    pub fn normalized(self) -> Self {
        match self {
            LookupTime::Time(t) if t.0 == 0 => LookupTime::Latest,
            other => other,
        }
    }

    /// Uses the stamp carried by a message.
    pub fn from_msg<M: HasHeader + ?Sized>(msg: &M) -> Self {
        let stamp = msg.stamp();
        if stamp.0 == 0 {
            LookupTime::Latest
        } else {
            LookupTime::Time(stamp)
        }
    }
}

impl From<CuTime> for LookupTime {
    /// A zero time is the "latest" sentinel.
    fn from(t: CuTime) -> Self {
        if t.0 == 0 {
            LookupTime::Latest
        } else {
            LookupTime::Time(t)
        }
    }
}

impl Display for LookupTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupTime::Latest => write!(f, "latest"),
            LookupTime::Time(t) => {
                let (sec, nanosec) = split_stamp(*t);
                write!(f, "{sec}.{nanosec:09}")
            }
        }
    }
}

/// Which time to use when transforming a stamped message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeSpec {
    Latest,
    Stamp { sec: i32, nanosec: u32 },
    /// The message's own header stamp.
    FromMsg,
}

impl TimeSpec {
    pub fn resolve<T: HasHeader + ?Sized>(self, msg: &T) -> TransformResult<LookupTime> {
        match self {
            TimeSpec::Latest => Ok(LookupTime::Latest),
            TimeSpec::Stamp { sec, nanosec } => LookupTime::from_stamp(sec, nanosec),
            TimeSpec::FromMsg => Ok(LookupTime::from_msg(msg)),
        }
    }
}

/// Converts a `(sec, nanosec)` pair into the monotonic nanosecond domain.
pub fn stamp_to_time(sec: i32, nanosec: u32) -> TransformResult<CuTime> {
    if sec < 0 {
        return Err(TransformError::InvalidArgument(format!(
            "negative stamp seconds {sec}"
        )));
    }
    if u64::from(nanosec) >= NANOS_PER_SEC {
        return Err(TransformError::InvalidArgument(format!(
            "stamp nanoseconds {nanosec} out of range"
        )));
    }
    Ok(CuDuration(sec as u64 * NANOS_PER_SEC + u64::from(nanosec)))
}

/// Splits a time into `(sec, nanosec)`. Seconds saturate at `i32::MAX`.
pub fn split_stamp(t: CuTime) -> (i32, u32) {
    let sec = (t.0 / NANOS_PER_SEC).min(i32::MAX as u64) as i32;
    let nanosec = (t.0 % NANOS_PER_SEC) as u32;
    (sec, nanosec)
}

/// Seconds as a float, for diagnostics.
pub(crate) fn as_secs_f64(t: CuTime) -> f64 {
    t.0 as f64 / NANOS_PER_SEC as f64
}
