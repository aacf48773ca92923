//! Frame registry: an arena of named frames forming a forest.
//! Frames are referenced by a stable [`FrameId`] and never by value.

use crate::error::{TransformError, TransformResult};
use compact_str::CompactString;
use log::{debug, error};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Stable identifier of a frame. Never reused for another name within a buffer's lifetime,
/// clears included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u32);

impl FrameId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Display for FrameId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub id: FrameId,
    pub name: CompactString,
    pub parent: Option<FrameId>,
}

#[derive(Debug, Default)]
pub struct FrameRegistry {
    frames: Vec<Frame>,
    by_name: HashMap<CompactString, FrameId>,
    /// Id of `frames[0]`; moves forward on clear so ids are not handed out twice.
    first_id: u64,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Arena slot of an id handed out by this registry since the last clear.
    pub fn index(&self, id: FrameId) -> Option<usize> {
        let index = u64::from(id.0).checked_sub(self.first_id)? as usize;
        (index < self.frames.len()).then_some(index)
    }

    /// Returns the id of `name`, creating the frame on first use.
    /// Fails once the id space is exhausted.
    pub fn intern(&mut self, name: &str) -> TransformResult<FrameId> {
        if let Some(id) = self.by_name.get(name) {
            return Ok(*id);
        }
        let id = u32::try_from(self.first_id + self.frames.len() as u64)
            .map(FrameId)
            .map_err(|_| {
                TransformError::Other(format!("no frame id left to register '{name}'"))
            })?;
        let name = CompactString::new(name);
        debug!("tf: new frame '{name}' registered as {id}");
        self.frames.push(Frame {
            id,
            name: name.clone(),
            parent: None,
        });
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Looks a frame up without creating it.
    pub fn lookup(&self, name: &str) -> Option<FrameId> {
        self.by_name.get(name).copied()
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.index(id).map(|i| &self.frames[i])
    }

    pub fn name(&self, id: FrameId) -> &str {
        self.frame(id).map(|f| f.name.as_str()).unwrap_or("<unknown>")
    }

    pub fn parent(&self, id: FrameId) -> Option<FrameId> {
        self.frame(id).and_then(|f| f.parent)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Links `child` under `parent` unless that would close a loop.
    /// On rejection the forest is left unchanged.
    pub fn set_parent(&mut self, child: FrameId, parent: FrameId) -> TransformResult<()> {
        let child_index = self.index(child).ok_or_else(|| self.unknown(child))?;
        self.index(parent).ok_or_else(|| self.unknown(parent))?;

        if self.frames[child_index].parent == Some(parent) {
            return Ok(());
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TransformError::InvalidArgument(format!(
                "setting '{}' as parent of '{}' would create a loop",
                self.name(parent),
                self.name(child)
            )));
        }
        self.frames[child_index].parent = Some(parent);
        Ok(())
    }

    /// True if `ancestor` is reachable from `id` through parent links.
    pub fn is_ancestor(&self, ancestor: FrameId, id: FrameId) -> bool {
        self.ancestors(id).into_iter().skip(1).any(|a| a == ancestor)
    }

    /// The chain from `id` (first) up to its root (last).
    ///
    /// The walk stops early if it revisits more frames than exist, which can only
    /// happen if a loop slipped past `set_parent`.
    pub fn ancestors(&self, id: FrameId) -> Vec<FrameId> {
        let mut chain = Vec::new();
        let mut current = self.frame(id).map(|f| f.id);
        while let Some(frame_id) = current {
            if chain.len() >= self.frames.len() {
                error!("tf: loop detected above frame '{}'", self.name(id));
                break;
            }
            chain.push(frame_id);
            current = self.parent(frame_id);
        }
        chain
    }

    pub fn clear(&mut self) {
        self.first_id += self.frames.len() as u64;
        self.frames.clear();
        self.by_name.clear();
    }

    fn unknown(&self, id: FrameId) -> TransformError {
        TransformError::Other(format!("frame {id} is not part of this registry"))
    }
}
