// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Section bookkeeping across passes.
//!
//! Each pass over a test body opens a stack of frames, one per section it is
//! currently inside. A frame remembers whether one of its children was
//! entered during this pass, and whether any child is still pending (skipped
//! or left incomplete). Completed paths are kept across passes, so the next
//! pass enters the next unfinished section instead.

use std::collections::HashSet;

use super::errors::ScenarioError;

/// Path of nested section names from the test body down.
pub type SectionPath = Vec<String>;

/// One open section during a pass.
#[derive(Debug)]
struct Frame {
    /// Section name; empty for the test body itself.
    name: String,

    /// A child section was encountered during this pass, whether entered
    /// or skipped.
    saw_child: bool,

    /// A child section was entered during this pass.
    entered_child: bool,

    /// A child section still needs another pass.
    pending: bool,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            saw_child: false,
            entered_child: false,
            pending: false,
        }
    }
}

/// Tracks which sections have been completed and which one to enter next.
#[derive(Debug)]
pub struct SectionTracker {
    /// Sections whose whole subtree has run.
    completed: HashSet<SectionPath>,

    /// Open frames; the first is the test body.
    frames: Vec<Frame>,

    /// Leaf sections in execution order.
    leaves: Vec<SectionPath>,

    /// First error hit during the current pass.
    fault: Option<ScenarioError>,

    max_depth: usize,
}

impl SectionTracker {
    pub fn new(max_depth: usize) -> Self {
        Self {
            completed: HashSet::new(),
            frames: Vec::with_capacity(max_depth + 1),
            leaves: Vec::new(),
            fault: None,
            max_depth,
        }
    }

    /// Start a pass over the test body.
    pub fn begin_pass(&mut self) {
        self.frames.clear();
        self.frames.push(Frame::new(String::new()));
    }

    /// Finish a pass. Returns true if another pass is needed.
    pub fn end_pass(&mut self) -> bool {
        let root = self.frames.pop();
        self.frames.clear();
        root.map_or(false, |frame| frame.pending)
    }

    /// Decide whether to enter the section `name` inside the current one.
    ///
    /// A completed section is skipped. Otherwise the section is entered only
    /// if no sibling has been entered yet during this pass; a skipped
    /// unfinished section marks its parent pending.
    pub fn try_enter(&mut self, name: &str) -> bool {
        if self.fault.is_some() {
            return false;
        }

        let depth = self.depth();
        let mut path = self.current_path();
        path.push(name.to_string());

        let Some(parent) = self.frames.last_mut() else {
            return false;
        };
        parent.saw_child = true;
        if self.completed.contains(&path) {
            return false;
        }
        if parent.entered_child {
            parent.pending = true;
            return false;
        }
        if depth >= self.max_depth {
            parent.pending = true;
            self.fault = Some(ScenarioError::DepthExceeded {
                path: path.join(" / "),
                max: self.max_depth,
            });
            return false;
        }

        parent.entered_child = true;
        self.frames.push(Frame::new(name.to_string()));
        true
    }

    /// Leave the innermost section entered by [`try_enter`](Self::try_enter).
    pub fn leave(&mut self) {
        let path = self.current_path();
        let Some(frame) = self.frames.pop() else {
            return;
        };

        if !frame.saw_child {
            self.leaves.push(path.clone());
        }
        if frame.pending {
            if let Some(parent) = self.frames.last_mut() {
                parent.pending = true;
            }
        } else {
            self.completed.insert(path);
        }
    }

    /// Names of the open sections, outermost first.
    pub fn current_path(&self) -> SectionPath {
        self.frames.iter().skip(1).map(|frame| frame.name.clone()).collect()
    }

    /// Number of open sections (the test body is not counted).
    pub fn depth(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    /// True if the section at `path` and all its children have run.
    pub fn is_completed(&self, path: &[String]) -> bool {
        self.completed.contains(path)
    }

    pub fn take_fault(&mut self) -> Option<ScenarioError> {
        self.fault.take()
    }

    pub fn take_leaves(&mut self) -> Vec<SectionPath> {
        std::mem::take(&mut self.leaves)
    }
}
