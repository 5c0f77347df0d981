use chrono::NaiveDateTime;

/// Cursor over the distinct recorded timestamps, used by the scrubber and
/// by playback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    stamps: Vec<NaiveDateTime>,
    position: Option<usize>,
}

impl Timeline {
    /// Starts on the first timestamp.
    pub fn new(mut stamps: Vec<NaiveDateTime>) -> Self {
        stamps.sort();
        stamps.dedup();
        let position = (!stamps.is_empty()).then_some(0);
        Self { stamps, position }
    }

    pub fn stamps(&self) -> &[NaiveDateTime] {
        &self.stamps
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn current(&self) -> Option<NaiveDateTime> {
        self.position.map(|i| self.stamps[i])
    }

    pub fn first(&self) -> Option<NaiveDateTime> {
        self.stamps.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDateTime> {
        self.stamps.last().copied()
    }

    /// Jump to `index`, clamped to the last timestamp.
    pub fn seek(&mut self, index: usize) -> Option<NaiveDateTime> {
        if self.stamps.is_empty() {
            return None;
        }
        self.position = Some(index.min(self.stamps.len() - 1));
        self.current()
    }

    /// Jump to the latest timestamp not after `timestamp`, or the first one
    /// if `timestamp` precedes them all.
    pub fn seek_to(&mut self, timestamp: NaiveDateTime) -> Option<NaiveDateTime> {
        let after = self.stamps.partition_point(|t| *t <= timestamp);
        self.seek(after.saturating_sub(1))
    }

    /// Advance one step, wrapping to the start so playback loops.
    pub fn step_forward(&mut self) -> Option<NaiveDateTime> {
        let next = match self.position {
            Some(i) if i + 1 < self.stamps.len() => i + 1,
            _ => 0,
        };
        self.seek(next)
    }

    /// Go back one step, stopping at the first timestamp.
    pub fn step_back(&mut self) -> Option<NaiveDateTime> {
        let prev = self.position.unwrap_or(0).saturating_sub(1);
        self.seek(prev)
    }

    pub fn is_at_end(&self) -> bool {
        self.position.is_some_and(|i| i + 1 == self.stamps.len())
    }
}
