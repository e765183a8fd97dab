//! One-shot reveal tracking for scrolling pages

use std::ops::Range;

/// Remembers which sections of a scrolling page have been seen.
///
/// A section is revealed the first time any of its rows intersects the
/// viewport and stays revealed afterwards, even when scrolled away.
#[derive(Debug, Clone, Default)]
pub struct RevealTracker {
    revealed: Vec<bool>,
}

impl RevealTracker {
    /// Tracker for `count` sections, none revealed yet
    pub fn new(count: usize) -> Self {
        Self {
            revealed: vec![false; count],
        }
    }

    /// Record the current viewport against the section row ranges.
    ///
    /// Returns the indices that became visible for the first time.
    pub fn observe(&mut self, viewport: Range<usize>, sections: &[Range<usize>]) -> Vec<usize> {
        if sections.len() > self.revealed.len() {
            self.revealed.resize(sections.len(), false);
        }

        let mut newly = Vec::new();
        for (i, section) in sections.iter().enumerate() {
            if self.revealed[i] {
                continue;
            }
            let overlaps = section.start < viewport.end && viewport.start < section.end;
            if overlaps && !section.is_empty() {
                self.revealed[i] = true;
                newly.push(i);
            }
        }
        newly
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Range<usize>> {
        vec![0..10, 10..30, 30..45, 45..60]
    }

    #[test]
    fn test_initial_viewport_reveals_top_sections() {
        let mut tracker = RevealTracker::new(4);
        let newly = tracker.observe(0..20, &sections());
        assert_eq!(newly, vec![0, 1]);
        assert!(!tracker.is_revealed(2));
    }

    #[test]
    fn test_reveal_is_one_shot() {
        let mut tracker = RevealTracker::new(4);
        tracker.observe(0..20, &sections());
        tracker.observe(35..55, &sections());
        // Scrolling back up does not replay anything
        let newly = tracker.observe(0..20, &sections());
        assert!(newly.is_empty());
        assert!(tracker.is_revealed(0));
        assert!(tracker.is_revealed(3));
        assert!((0..4).all(|i| tracker.is_revealed(i)));
    }

    #[test]
    fn test_touching_edge_does_not_reveal() {
        let mut tracker = RevealTracker::new(4);
        tracker.observe(0..30, &sections());
        assert!(!tracker.is_revealed(2));
    }

    #[test]
    fn test_out_of_range_index() {
        let tracker = RevealTracker::new(1);
        assert!(!tracker.is_revealed(5));
    }
}
