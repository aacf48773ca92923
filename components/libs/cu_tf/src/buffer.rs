//! The shared transform buffer: frame forest, per-frame histories and the lookup engine.

use crate::config::BufferConfig;
use crate::error::{TransformError, TransformResult};
use crate::frames::{FrameId, FrameRegistry};
use crate::history::{SampleQuery, TransformHistory, TransformSample};
use crate::primitives::Transformable;
use crate::time::{as_secs_f64, LookupTime, TimeSpec};
use crate::transform::{Isometry, TransformStamped};
use compact_str::CompactString;
use cu29_clock::{CuDuration, CuTime};
use log::{debug, trace, warn};
use std::fmt::Write;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Frames plus their histories, guarded together so that eviction, insertion and
/// re-parenting are atomic with respect to lookups.
#[derive(Debug)]
struct BufferState {
    registry: FrameRegistry,
    /// Indexed like the registry arena.
    histories: Vec<TransformHistory>,
    cache_time: CuDuration,
}

/// Links walked from each side of a lookup up to their nearest common ancestor.
/// The ancestor itself is not part of either chain.
#[derive(Debug)]
struct FramePath {
    source_links: Vec<FrameId>,
    target_links: Vec<FrameId>,
}

impl FramePath {
    fn links(&self) -> impl Iterator<Item = &FrameId> {
        self.source_links.iter().chain(self.target_links.iter())
    }
}

/// Thread-safe store of timestamped transforms between named frames.
///
/// Cloning is cheap and every clone shares the same buffer, so one writer can feed
/// transforms while any number of readers query them.
///
/// ```
/// use cu_tf::{LookupTime, TransformBuffer, TransformStamped};
/// use cu29_clock::CuDuration;
///
/// let buffer = TransformBuffer::new(10_000_000_000);
/// let tf = TransformStamped::new(
///     CuDuration(1_000),
///     "world",
///     "robot",
///     [1.0, 0.0, 0.0],
///     [0.0, 0.0, 0.0, 1.0],
/// );
/// buffer.set_transform(&tf, "example", false).unwrap();
///
/// let result = buffer
///     .lookup_transform("world", "robot", LookupTime::Time(CuDuration(1_000)))
///     .unwrap();
/// assert_eq!(result.translation, [1.0, 0.0, 0.0]);
/// ```
#[derive(Clone, Debug)]
pub struct TransformBuffer {
    state: Arc<RwLock<BufferState>>,
    config: BufferConfig,
}

impl TransformBuffer {
    /// Buffer keeping `cache_time_ns` nanoseconds of history per frame.
    pub fn new(cache_time_ns: u64) -> Self {
        Self::with_config(BufferConfig::new(cache_time_ns))
    }

    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(BufferState {
                registry: FrameRegistry::new(),
                histories: Vec::new(),
                cache_time: config.cache_time(),
            })),
            config,
        }
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    fn read(&self) -> TransformResult<RwLockReadGuard<'_, BufferState>> {
        self.state
            .read()
            .map_err(|_| TransformError::Other("transform buffer lock poisoned".to_string()))
    }

    fn write(&self) -> TransformResult<RwLockWriteGuard<'_, BufferState>> {
        self.state
            .write()
            .map_err(|_| TransformError::Other("transform buffer lock poisoned".to_string()))
    }

    /// Drops every frame and sample. Lookups afterwards behave as on a fresh buffer.
    pub fn clear(&self) -> TransformResult<()> {
        let mut state = self.write()?;
        state.registry.clear();
        state.histories.clear();
        debug!("tf: buffer cleared");
        Ok(())
    }

    /// Records a transform from `tf.child_frame` to `tf.parent_frame`.
    ///
    /// A static transform answers every query time. Rejected samples leave the buffer
    /// untouched and come back as `InvalidArgument`: malformed input, a parent that would
    /// close a loop, or a dynamic sample older than the retained window.
    pub fn set_transform(
        &self,
        tf: &TransformStamped,
        authority: &str,
        is_static: bool,
    ) -> TransformResult<()> {
        let result = tf
            .validate()
            .and_then(|iso| self.write()?.insert(tf, iso, authority, is_static));
        if let Err(e) = &result {
            warn!(
                "tf: rejected transform '{}' -> '{}' from authority '{authority}': {e}",
                tf.child_frame, tf.parent_frame
            );
        }
        result
    }

    /// Inserts a batch of transforms, reporting each rejection to `on_err` and
    /// carrying on with the rest. Returns how many were accepted.
    pub fn ingest_transforms<'a, I, F>(
        &self,
        transforms: I,
        authority: &str,
        is_static: bool,
        mut on_err: F,
    ) -> usize
    where
        I: IntoIterator<Item = &'a TransformStamped>,
        F: FnMut(&TransformStamped, TransformError),
    {
        let mut accepted = 0;
        for tf in transforms {
            match self.set_transform(tf, authority, is_static) {
                Ok(()) => accepted += 1,
                Err(e) => on_err(tf, e),
            }
        }
        accepted
    }

    /// Transform expressing `source_frame` geometry in `target_frame` coordinates.
    pub fn lookup_transform(
        &self,
        target_frame: &str,
        source_frame: &str,
        time: LookupTime,
    ) -> TransformResult<TransformStamped> {
        check_frame_argument(target_frame, "target_frame")?;
        check_frame_argument(source_frame, "source_frame")?;
        let time = time.normalized();
        trace!("tf: lookup '{source_frame}' -> '{target_frame}' at {time}");
        let state = self.read()?;
        state.lookup(
            target_frame,
            source_frame,
            time,
            self.config.max_extrapolation(),
        )
    }

    /// Whether `lookup_transform` would succeed. Unknown frames, disconnected trees and
    /// times out of range answer `false`; malformed arguments are still errors.
    pub fn can_transform(
        &self,
        target_frame: &str,
        source_frame: &str,
        time: LookupTime,
    ) -> TransformResult<bool> {
        self.can_transform_with_diagnostic(target_frame, source_frame, time)
            .map(|(possible, _)| possible)
    }

    /// Like [`Self::can_transform`], with the reason when the answer is `false`.
    pub fn can_transform_with_diagnostic(
        &self,
        target_frame: &str,
        source_frame: &str,
        time: LookupTime,
    ) -> TransformResult<(bool, Option<String>)> {
        match self.lookup_transform(target_frame, source_frame, time) {
            Ok(_) => Ok((true, None)),
            Err(e) if e.is_soft() => Ok((false, Some(e.to_string()))),
            Err(e) => Err(e),
        }
    }

    /// Moves a stamped message into `target_frame`.
    pub fn transform<T: Transformable>(
        &self,
        msg: &T,
        target_frame: &str,
        time: TimeSpec,
    ) -> TransformResult<T> {
        let when = time.resolve(msg)?;
        let tf = self.lookup_transform(target_frame, msg.frame_id(), when)?;
        msg.apply_transform(&tf)
    }

    pub fn frame_exists(&self, frame: &str) -> TransformResult<bool> {
        Ok(self.read()?.registry.lookup(frame).is_some())
    }

    /// Human-readable dump: one line per frame that has a parent.
    pub fn frames_as_string(&self) -> TransformResult<String> {
        let state = self.read()?;
        let mut out = String::new();
        for frame in state.registry.iter() {
            let Some(parent) = frame.parent else {
                continue;
            };
            let authority = state
                .history(frame.id)
                .and_then(|h| h.latest_authority())
                .unwrap_or("unknown");
            // writing into a String cannot fail
            let _ = writeln!(
                out,
                "Frame {} exists with parent {} (authority: {authority}).",
                frame.name,
                state.registry.name(parent)
            );
        }
        Ok(out)
    }
}

fn check_frame_argument(frame: &str, argument: &str) -> TransformResult<()> {
    if frame.is_empty() {
        return Err(TransformError::InvalidArgument(format!(
            "invalid argument {argument} passed to lookup_transform: frame name is empty"
        )));
    }
    Ok(())
}

impl BufferState {
    fn history(&self, id: FrameId) -> Option<&TransformHistory> {
        self.registry.index(id).map(|i| &self.histories[i])
    }

    fn history_mut(&mut self, id: FrameId) -> TransformResult<&mut TransformHistory> {
        let index = self
            .registry
            .index(id)
            .ok_or_else(|| TransformError::Other(format!("no history slot for frame {id}")))?;
        Ok(&mut self.histories[index])
    }

    fn intern(&mut self, name: &str) -> TransformResult<FrameId> {
        let id = self.registry.intern(name)?;
        let cache_time = self.cache_time;
        self.histories
            .resize_with(self.registry.len(), || TransformHistory::new(cache_time));
        Ok(id)
    }

    fn insert(
        &mut self,
        tf: &TransformStamped,
        iso: Isometry,
        authority: &str,
        is_static: bool,
    ) -> TransformResult<()> {
        let child = self.intern(&tf.child_frame)?;
        let parent = self.intern(&tf.parent_frame)?;

        let previous_parent = self.registry.parent(child);
        if previous_parent != Some(parent) {
            self.registry.set_parent(child, parent)?;
            if let Some(previous) = previous_parent {
                // samples were relative to the old parent
                debug!(
                    "tf: frame '{}' moved from parent '{}' to '{}' by authority '{authority}'",
                    tf.child_frame,
                    self.registry.name(previous),
                    tf.parent_frame
                );
                self.history_mut(child)?.clear();
            }
        }

        let sample = if is_static {
            TransformSample::new_static(iso, authority)
        } else {
            TransformSample::new(tf.stamp, iso, authority)
        };
        let history = self.history_mut(child)?;
        if !history.insert(sample, is_static) {
            let latest = history.latest_stamp().unwrap_or_default();
            return Err(TransformError::InvalidArgument(format!(
                "old data for frame '{}': stamp {:.9}s is older than the {:.9}s retained before the latest sample at {:.9}s",
                tf.child_frame,
                as_secs_f64(tf.stamp),
                as_secs_f64(self.cache_time),
                as_secs_f64(latest)
            )));
        }
        Ok(())
    }

    fn frame_id(&self, frame: &str, argument: &str) -> TransformResult<FrameId> {
        self.registry.lookup(frame).ok_or_else(|| {
            TransformError::Lookup(format!(
                "\"{frame}\" passed to lookup_transform argument {argument} does not exist"
            ))
        })
    }

    fn lookup(
        &self,
        target_frame: &str,
        source_frame: &str,
        time: LookupTime,
        max_extrapolation: CuDuration,
    ) -> TransformResult<TransformStamped> {
        let target = self.frame_id(target_frame, "target_frame")?;
        let source = self.frame_id(source_frame, "source_frame")?;

        if target == source {
            let stamp = match time {
                LookupTime::Latest => CuDuration(0),
                LookupTime::Time(t) => t,
            };
            return Ok(TransformStamped::identity(stamp, target_frame));
        }

        let path = self.resolve_path(target, source)?;

        // "latest" is pinned to one instant so every link is evaluated consistently
        let (query, stamp) = match time {
            LookupTime::Time(t) => (time, t),
            LookupTime::Latest => match self.latest_common_time(&path) {
                Some(t) => (LookupTime::Time(t), t),
                None => (LookupTime::Latest, CuDuration(0)),
            },
        };

        let source_to_ancestor =
            self.accumulate(&path.source_links, query, max_extrapolation, target, source)?;
        let target_to_ancestor =
            self.accumulate(&path.target_links, query, max_extrapolation, target, source)?;
        let result = target_to_ancestor.inverse() * source_to_ancestor;

        Ok(TransformStamped::from_isometry(
            stamp,
            CompactString::new(target_frame),
            CompactString::new(source_frame),
            &result,
        ))
    }

    /// Finds the nearest common ancestor of both frames.
    fn resolve_path(&self, target: FrameId, source: FrameId) -> TransformResult<FramePath> {
        let source_chain = self.registry.ancestors(source);
        let target_chain = self.registry.ancestors(target);

        let meeting = source_chain.iter().enumerate().find_map(|(s, frame)| {
            target_chain
                .iter()
                .position(|candidate| candidate == frame)
                .map(|t| (s, t))
        });
        let Some((source_depth, target_depth)) = meeting else {
            return Err(TransformError::Connectivity(format!(
                "could not find a connection between '{}' and '{}' because they are not part of the same tree",
                self.registry.name(target),
                self.registry.name(source)
            )));
        };

        Ok(FramePath {
            source_links: source_chain[..source_depth].to_vec(),
            target_links: target_chain[..target_depth].to_vec(),
        })
    }

    /// Newest instant every dynamic link on the path can answer. `None` if all links are static
    /// or a dynamic link has no data yet.
    fn latest_common_time(&self, path: &FramePath) -> Option<CuTime> {
        path.links()
            .filter_map(|&frame| {
                let history = self.history(frame)?;
                if history.is_static() {
                    None
                } else {
                    history.latest_stamp()
                }
            })
            .min()
    }

    /// Composes the links of a chain, walking up towards the root.
    fn accumulate(
        &self,
        links: &[FrameId],
        time: LookupTime,
        max_extrapolation: CuDuration,
        target: FrameId,
        source: FrameId,
    ) -> TransformResult<Isometry> {
        let mut acc = Isometry::IDENTITY;
        for &frame in links {
            let history = self
                .history(frame)
                .ok_or_else(|| TransformError::Other(format!("no history slot for frame {frame}")))?;
            let link = match history.sample_at(time, max_extrapolation) {
                SampleQuery::Resolved(iso) => iso,
                SampleQuery::OutOfRange {
                    requested,
                    earliest,
                    latest,
                } => {
                    let detail = if requested < earliest {
                        format!(
                            "into the past: requested time {:.9} but the earliest data is at time {:.9}",
                            as_secs_f64(requested),
                            as_secs_f64(earliest)
                        )
                    } else {
                        format!(
                            "into the future: requested time {:.9} but the latest data is at time {:.9}",
                            as_secs_f64(requested),
                            as_secs_f64(latest)
                        )
                    };
                    return Err(TransformError::Extrapolation(format!(
                        "lookup would require extrapolation {detail}, when looking up transform from frame [{}] to frame [{}] (link [{}])",
                        self.registry.name(source),
                        self.registry.name(target),
                        self.registry.name(frame)
                    )));
                }
                SampleQuery::Empty => {
                    return Err(TransformError::Extrapolation(format!(
                        "no transform data for frame [{}] at time {time}, when looking up transform from frame [{}] to frame [{}]",
                        self.registry.name(frame),
                        self.registry.name(source),
                        self.registry.name(target)
                    )));
                }
            };
            acc = link * acc;
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::{DQuat, DVec3};
    use std::f64::consts::FRAC_PI_2;

    const IDENTITY_ROTATION: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

    fn tf(stamp: u64, parent: &str, child: &str, translation: [f64; 3]) -> TransformStamped {
        TransformStamped::new(
            CuDuration(stamp),
            parent,
            child,
            translation,
            IDENTITY_ROTATION,
        )
    }

    fn at(t: u64) -> LookupTime {
        LookupTime::Time(CuDuration(t))
    }

    #[test]
    fn test_single_link_lookup_both_ways() {
        let buffer = TransformBuffer::new(10_000);
        buffer
            .set_transform(&tf(1000, "world", "robot", [1.0, 2.0, 3.0]), "test", false)
            .unwrap();

        let forward = buffer.lookup_transform("world", "robot", at(1000)).unwrap();
        assert_eq!(forward.parent_frame, "world");
        assert_eq!(forward.child_frame, "robot");
        assert_eq!(forward.translation, [1.0, 2.0, 3.0]);
        assert_eq!(forward.stamp, CuDuration(1000));

        let backward = buffer.lookup_transform("robot", "world", at(1000)).unwrap();
        assert_eq!(backward.translation, [-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_sibling_lookup_through_common_ancestor() {
        let buffer = TransformBuffer::new(10_000);
        let rot = DQuat::from_rotation_z(FRAC_PI_2).to_array();
        buffer
            .set_transform(&tf(100, "world", "base", [1.0, 0.0, 0.0]), "test", false)
            .unwrap();
        buffer
            .set_transform(
                &TransformStamped::new(CuDuration(100), "base", "camera", [0.0, 1.0, 0.0], rot),
                "test",
                false,
            )
            .unwrap();
        buffer
            .set_transform(&tf(100, "base", "lidar", [0.0, 0.0, 2.0]), "test", false)
            .unwrap();

        let result = buffer.lookup_transform("lidar", "camera", at(100)).unwrap();
        // camera origin sits at (0, 1, 0) in base, lidar origin at (0, 0, 2)
        let origin = result.isometry().transform_point(DVec3::ZERO);
        assert_abs_diff_eq!(origin.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(origin.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(origin.z, -2.0, epsilon = 1e-12);

        // camera x axis is base y axis
        let x_axis = result.isometry().transform_vector(DVec3::X);
        assert_abs_diff_eq!(x_axis.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_latest_uses_common_time() {
        let buffer = TransformBuffer::new(10_000);
        buffer
            .set_transform(&tf(1000, "world", "base", [0.0, 0.0, 0.0]), "test", false)
            .unwrap();
        buffer
            .set_transform(&tf(3000, "world", "base", [2.0, 0.0, 0.0]), "test", false)
            .unwrap();
        buffer
            .set_transform(&tf(2000, "base", "arm", [0.0, 1.0, 0.0]), "test", false)
            .unwrap();
        buffer
            .set_transform(&tf(0, "arm", "tool", [0.0, 0.0, 1.0]), "test", true)
            .unwrap();

        let result = buffer
            .lookup_transform("world", "tool", LookupTime::Latest)
            .unwrap();
        assert_eq!(result.stamp, CuDuration(2000));
        assert_abs_diff_eq!(result.translation[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.translation[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.translation[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_time_means_latest() {
        let buffer = TransformBuffer::new(10_000);
        buffer
            .set_transform(&tf(1000, "world", "robot", [1.0, 0.0, 0.0]), "test", false)
            .unwrap();
        buffer
            .set_transform(&tf(2000, "world", "robot", [2.0, 0.0, 0.0]), "test", false)
            .unwrap();

        let result = buffer
            .lookup_transform("world", "robot", LookupTime::Time(CuDuration(0)))
            .unwrap();
        assert_eq!(result.stamp, CuDuration(2000));
        assert_eq!(result.translation, [2.0, 0.0, 0.0]);
        assert!(buffer
            .can_transform("world", "robot", LookupTime::Time(CuDuration(0)))
            .unwrap());
    }

    #[test]
    fn test_latest_on_static_only_chain_is_stamped_zero() {
        let buffer = TransformBuffer::new(10_000);
        buffer
            .set_transform(&tf(0, "base", "imu", [0.1, 0.0, 0.0]), "urdf", true)
            .unwrap();
        let result = buffer
            .lookup_transform("base", "imu", LookupTime::Latest)
            .unwrap();
        assert_eq!(result.stamp, CuDuration(0));
        assert_eq!(result.translation, [0.1, 0.0, 0.0]);
    }

    #[test]
    fn test_error_kinds() {
        let buffer = TransformBuffer::new(10_000);
        buffer
            .set_transform(&tf(1000, "world", "robot", [1.0, 0.0, 0.0]), "test", false)
            .unwrap();
        buffer
            .set_transform(&tf(1000, "map", "beacon", [1.0, 0.0, 0.0]), "test", false)
            .unwrap();

        assert!(matches!(
            buffer.lookup_transform("world", "nowhere", at(1000)),
            Err(TransformError::Lookup(_))
        ));
        assert!(matches!(
            buffer.lookup_transform("world", "beacon", at(1000)),
            Err(TransformError::Connectivity(_))
        ));
        assert!(matches!(
            buffer.lookup_transform("world", "robot", at(999)),
            Err(TransformError::Extrapolation(_))
        ));
        assert!(matches!(
            buffer.lookup_transform("", "robot", at(1000)),
            Err(TransformError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_can_transform_degrades_soft_errors() {
        let buffer = TransformBuffer::new(10_000);
        buffer
            .set_transform(&tf(1000, "world", "robot", [1.0, 0.0, 0.0]), "test", false)
            .unwrap();

        assert!(buffer.can_transform("world", "robot", at(1000)).unwrap());
        assert!(!buffer.can_transform("world", "ghost", at(1000)).unwrap());
        assert!(!buffer.can_transform("world", "robot", at(5000)).unwrap());
        assert!(buffer.can_transform("world", "", at(1000)).is_err());

        let (possible, reason) = buffer
            .can_transform_with_diagnostic("world", "robot", at(5000))
            .unwrap();
        assert!(!possible);
        assert!(reason.unwrap().contains("future"));
    }

    #[test]
    fn test_rejected_samples_leave_buffer_untouched() {
        let buffer = TransformBuffer::new(1000);
        buffer
            .set_transform(&tf(5000, "world", "robot", [1.0, 0.0, 0.0]), "test", false)
            .unwrap();

        // too old
        assert!(matches!(
            buffer.set_transform(&tf(3000, "world", "robot", [9.0, 0.0, 0.0]), "late", false),
            Err(TransformError::InvalidArgument(_))
        ));
        // not a unit quaternion
        let bad = TransformStamped::new(
            CuDuration(5000),
            "world",
            "lost",
            [0.0; 3],
            [1.0, 1.0, 0.0, 0.0],
        );
        assert!(buffer.set_transform(&bad, "test", false).is_err());
        assert!(!buffer.frame_exists("lost").unwrap());

        // would close a loop
        assert!(matches!(
            buffer.set_transform(&tf(5000, "robot", "world", [0.0; 3]), "test", false),
            Err(TransformError::InvalidArgument(_))
        ));
        let result = buffer.lookup_transform("world", "robot", at(5000)).unwrap();
        assert_eq!(result.translation, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_reparent_discards_old_history() {
        let buffer = TransformBuffer::new(10_000);
        buffer
            .set_transform(&tf(1000, "odom", "robot", [1.0, 0.0, 0.0]), "odometry", false)
            .unwrap();
        buffer
            .set_transform(&tf(2000, "map", "robot", [5.0, 0.0, 0.0]), "localization", false)
            .unwrap();

        assert!(matches!(
            buffer.lookup_transform("odom", "robot", at(2000)),
            Err(TransformError::Connectivity(_))
        ));
        assert!(matches!(
            buffer.lookup_transform("map", "robot", at(1000)),
            Err(TransformError::Extrapolation(_))
        ));
        let result = buffer.lookup_transform("map", "robot", at(2000)).unwrap();
        assert_eq!(result.translation, [5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_clear_resets_everything() {
        let buffer = TransformBuffer::new(10_000);
        let reader = buffer.clone();
        buffer
            .set_transform(&tf(1000, "world", "robot", [1.0, 0.0, 0.0]), "test", false)
            .unwrap();
        assert!(reader.frame_exists("robot").unwrap());

        buffer.clear().unwrap();
        assert!(!reader.frame_exists("robot").unwrap());
        assert!(matches!(
            reader.lookup_transform("world", "robot", at(1000)),
            Err(TransformError::Lookup(_))
        ));
        assert!(reader.frames_as_string().unwrap().is_empty());
    }

    #[test]
    fn test_future_tolerance_from_config() {
        let config = BufferConfig::new(10_000).with_max_extrapolation(500);
        let buffer = TransformBuffer::with_config(config);
        buffer
            .set_transform(&tf(1000, "world", "robot", [1.0, 0.0, 0.0]), "test", false)
            .unwrap();
        buffer
            .set_transform(&tf(2000, "world", "robot", [2.0, 0.0, 0.0]), "test", false)
            .unwrap();

        let projected = buffer.lookup_transform("world", "robot", at(2500)).unwrap();
        assert_abs_diff_eq!(projected.translation[0], 2.5, epsilon = 1e-12);
        assert!(buffer.lookup_transform("world", "robot", at(2600)).is_err());
    }

    #[test]
    fn test_ingest_reports_each_rejection() {
        let buffer = TransformBuffer::new(10_000);
        let batch = vec![
            tf(1000, "world", "a", [1.0, 0.0, 0.0]),
            tf(1000, "world", "world", [0.0; 3]),
            tf(1000, "a", "b", [1.0, 0.0, 0.0]),
            tf(1000, "", "c", [0.0; 3]),
        ];
        let mut rejected = Vec::new();
        let accepted = buffer.ingest_transforms(&batch, "bulk", false, |tf, e| {
            rejected.push((tf.child_frame.clone(), e))
        });
        assert_eq!(accepted, 2);
        assert_eq!(rejected.len(), 2);
        assert!(rejected
            .iter()
            .all(|(_, e)| matches!(e, TransformError::InvalidArgument(_))));
    }

    #[test]
    fn test_frames_as_string() {
        let buffer = TransformBuffer::new(10_000);
        buffer
            .set_transform(&tf(1000, "world", "robot", [1.0, 0.0, 0.0]), "driver", false)
            .unwrap();
        let dump = buffer.frames_as_string().unwrap();
        assert_eq!(
            dump,
            "Frame robot exists with parent world (authority: driver).\n"
        );
    }
}
