use tracing::warn;

use crate::zest::Statement;

/// Tracks which browsing context replay is currently switched into.
///
/// `level` is the nesting depth (`-1` for the top document) and
/// `frame_index` the slot of the frame entered at that depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTracker {
    level: i64,
    frame_index: i64,
}

impl Default for FrameTracker {
    fn default() -> Self {
        Self {
            level: -1,
            frame_index: 0,
        }
    }
}

impl FrameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> i64 {
        self.level
    }

    pub fn frame_index(&self) -> i64 {
        self.frame_index
    }

    /// Switch statements needed before acting in the context at depth
    /// `level`, slot `frame_index`.
    ///
    /// Moving up emits one parent switch per level. Anything else descends
    /// a single level, including a hop to a sibling slot at the same depth,
    /// which leaves the tracked level out of step.
    pub fn sync(&mut self, level: i64, frame_index: i64) -> Vec<Statement> {
        let mut switches = Vec::new();
        if self.level == level && self.frame_index == frame_index {
            return switches;
        }

        if self.level > level {
            while self.level > level {
                switches.push(Statement::switch_to_frame(-1));
                self.level -= 1;
            }
            self.frame_index = frame_index;
        } else {
            self.level += 1;
            self.frame_index = frame_index;
            switches.push(Statement::switch_to_frame(frame_index));
        }

        if self.level != level {
            warn!(
                tracked = self.level,
                observed = level,
                "frame level out of step after switching"
            );
        }
        switches
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_indexes(stmts: &[Statement]) -> Vec<i64> {
        stmts
            .iter()
            .map(|s| match s {
                Statement::SwitchToFrame(f) => f.frame_index,
                other => panic!("unexpected {:?}", other),
            })
            .collect()
    }

    #[test]
    fn same_context_is_a_no_op() {
        let mut tracker = FrameTracker::new();
        assert!(tracker.sync(-1, 0).is_empty());
    }

    #[test]
    fn enter_and_leave_one_frame() {
        let mut tracker = FrameTracker::new();
        assert_eq!(frame_indexes(&tracker.sync(0, 0)), vec![0]);
        assert!(tracker.sync(0, 0).is_empty());
        assert_eq!(frame_indexes(&tracker.sync(-1, 0)), vec![-1]);
        assert_eq!((tracker.level(), tracker.frame_index()), (-1, 0));
    }

    #[test]
    fn leaving_nested_frames_switches_once_per_level() {
        let mut tracker = FrameTracker::new();
        tracker.sync(0, 1);
        tracker.sync(1, 0);
        assert_eq!(frame_indexes(&tracker.sync(-1, 0)), vec![-1, -1]);
    }

    #[test]
    fn descending_two_levels_takes_one_step() {
        let mut tracker = FrameTracker::new();
        assert_eq!(frame_indexes(&tracker.sync(1, 2)), vec![2]);
        assert_eq!(tracker.level(), 0);
    }

    #[test]
    fn sibling_frame_descends_one_level() {
        let mut tracker = FrameTracker::new();
        tracker.sync(0, 0);
        assert_eq!(frame_indexes(&tracker.sync(0, 1)), vec![1]);
        assert_eq!((tracker.level(), tracker.frame_index()), (1, 1));
    }
}
