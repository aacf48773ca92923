use crate::interpolation::{blend_factor, interpolate, interpolate_samples};
use crate::time::LookupTime;
use crate::transform::Isometry;
use compact_str::CompactString;
use cu29_clock::{CuDuration, CuTime};
use std::collections::VecDeque;

/// A timestamped transform from a frame to its parent.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformSample {
    pub stamp: CuTime,
    pub transform: Isometry,
    /// Provenance label, kept for diagnostics only.
    pub authority: CompactString,
}

impl TransformSample {
    pub fn new(stamp: CuTime, transform: Isometry, authority: impl AsRef<str>) -> Self {
        Self {
            stamp,
            transform,
            authority: CompactString::new(authority.as_ref()),
        }
    }

    /// A sample with no time dimension.
    pub fn new_static(transform: Isometry, authority: impl AsRef<str>) -> Self {
        Self {
            stamp: CuDuration(0),
            transform,
            authority: CompactString::new(authority.as_ref()),
        }
    }
}

/// Answer of a point-in-time query against one frame's history.
#[derive(Clone, Debug, PartialEq)]
pub enum SampleQuery {
    Resolved(Isometry),
    /// The requested time is outside the retained window (or beyond the allowed future tolerance).
    OutOfRange {
        requested: CuTime,
        earliest: CuTime,
        latest: CuTime,
    },
    Empty,
}

/// Time-ordered, time-bounded samples of one frame relative to its parent,
/// plus an optional static sample that overrides them.
#[derive(Clone, Debug)]
pub struct TransformHistory {
    samples: VecDeque<TransformSample>,
    static_sample: Option<TransformSample>,
    max_storage: CuDuration,
}

impl TransformHistory {
    pub fn new(max_storage: CuDuration) -> Self {
        Self {
            samples: VecDeque::new(),
            static_sample: None,
            max_storage,
        }
    }

    /// Stores a sample.
    ///
    /// A static sample replaces the previous static one and leaves the dynamic samples alone.
    /// A dynamic sample lands in timestamp order (same stamp: last write wins), then
    /// everything older than `latest - max_storage` is evicted. Returns false when a
    /// dynamic sample is already older than the retained window and was dropped.
    pub fn insert(&mut self, sample: TransformSample, is_static: bool) -> bool {
        if is_static {
            self.static_sample = Some(sample);
            return true;
        }

        if let Some(latest) = self.latest_stamp() {
            if sample.stamp < self.cutoff(latest) {
                return false;
            }
        }

        match self.samples.binary_search_by_key(&sample.stamp, |s| s.stamp) {
            Ok(pos) => self.samples[pos] = sample,
            Err(pos) => self.samples.insert(pos, sample),
        }
        self.prune();
        true
    }

    fn cutoff(&self, latest: CuTime) -> CuTime {
        CuDuration(latest.0.saturating_sub(self.max_storage.0))
    }

    fn prune(&mut self) {
        let Some(latest) = self.latest_stamp() else {
            return;
        };
        let cutoff = self.cutoff(latest);
        while self.samples.front().is_some_and(|s| s.stamp < cutoff) {
            self.samples.pop_front();
        }
    }

    /// Resolves the transform at `time`.
    ///
    /// `max_extrapolation` allows queries up to that far past the newest sample; they are
    /// projected linearly from the two newest samples.
    pub fn sample_at(&self, time: LookupTime, max_extrapolation: CuDuration) -> SampleQuery {
        if let Some(static_sample) = &self.static_sample {
            return SampleQuery::Resolved(static_sample.transform);
        }
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return SampleQuery::Empty;
        };
        let time = match time {
            LookupTime::Latest => return SampleQuery::Resolved(last.transform),
            LookupTime::Time(t) => t,
        };

        let out_of_range = SampleQuery::OutOfRange {
            requested: time,
            earliest: first.stamp,
            latest: last.stamp,
        };
        if time < first.stamp {
            return out_of_range;
        }
        if time > last.stamp {
            if time.0 - last.stamp.0 > max_extrapolation.0 {
                return out_of_range;
            }
            return SampleQuery::Resolved(self.extrapolate(time));
        }

        match self.samples.binary_search_by_key(&time, |s| s.stamp) {
            Ok(pos) => SampleQuery::Resolved(self.samples[pos].transform),
            Err(pos) => SampleQuery::Resolved(interpolate_samples(
                &self.samples[pos - 1],
                &self.samples[pos],
                time,
            )),
        }
    }

    fn extrapolate(&self, time: CuTime) -> Isometry {
        let len = self.samples.len();
        if len < 2 {
            return self.samples[len - 1].transform;
        }
        let before = &self.samples[len - 2];
        let after = &self.samples[len - 1];
        let alpha = blend_factor(before.stamp, after.stamp, time);
        interpolate(&before.transform, &after.transform, alpha)
    }

    pub fn is_static(&self) -> bool {
        self.static_sample.is_some()
    }

    /// Newest dynamic stamp; static samples carry no time.
    pub fn latest_stamp(&self) -> Option<CuTime> {
        self.samples.back().map(|s| s.stamp)
    }

    pub fn earliest_stamp(&self) -> Option<CuTime> {
        self.samples.front().map(|s| s.stamp)
    }

    /// Authority of the sample that answers "latest" queries.
    pub fn latest_authority(&self) -> Option<&str> {
        self.static_sample
            .as_ref()
            .or(self.samples.back())
            .map(|s| s.authority.as_str())
    }

    /// Number of retained dynamic samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.static_sample.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformSample> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.static_sample = None;
    }
}
