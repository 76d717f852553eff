//! Furthest-failure tracking.
//!
//! Every failed terminal reports what it expected at the cursor it failed on, but only the
//! descriptors at the deepest position ever reached are kept: that position explains the
//! overall failure best. Frames nest so that negative lookahead can rephrase what failed
//! inside it and `named` nodes can hide the detail of their children.
//!
//! Inside a negative lookahead successful matches are recorded too. When the lookahead
//! fails it is because something matched, and that is what gets reported.

use crate::expectation::Expectation;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Frame {
    pub pos: usize,
    /// Insertion ordered, without duplicates.
    pub variants: Vec<Expectation>,
    start: usize,
    /// What matched at `start` while a negative lookahead was active.
    matched: Vec<Expectation>,
}

impl Frame {
    fn new(pos: usize) -> Frame {
        Self {
            pos,
            variants: Vec::new(),
            start: pos,
            matched: Vec::new(),
        }
    }
    fn add(&mut self, expected: Expectation) {
        if !self.variants.contains(&expected) {
            self.variants.push(expected);
        }
    }
}

#[derive(Default)]
pub struct Tracker {
    frames: Vec<Frame>,
    silent: u32,
    negations: u32,
}

impl Tracker {
    pub fn new() -> Tracker {
        Self::default()
    }

    pub fn begin(&mut self, pos: usize) {
        self.frames.push(Frame::new(pos));
    }

    pub fn expect(&mut self, pos: usize, expected: Expectation) {
        let silent = self.is_silent();
        let Some(top) = self.frames.last_mut() else {
            debug_assert!(false, "expect() outside of any frame");
            return;
        };

        if pos < top.pos {
            return;
        }

        if silent {
            // silenced descriptors may inform the current position but never move it
            if pos == top.pos {
                top.add(expected);
            }
            return;
        }

        if pos > top.pos {
            top.pos = pos;
            top.variants.clear();
        }

        top.add(expected);
    }

    pub fn end(&mut self, invert: bool) {
        debug_assert!(self.frames.len() > 1, "Mismatched begin() - end() pair");

        let Some(frame) = self.frames.pop() else {
            return;
        };
        let Some(top) = self.frames.last_mut() else {
            return;
        };

        if top.pos != frame.pos {
            return;
        }

        for expected in frame.variants {
            let expected = match invert {
                true => expected.negate(),
                false => expected,
            };
            top.add(expected);
        }
    }

    /// Opens the frame of a negative lookahead at `pos`.
    pub fn begin_not(&mut self, pos: usize) {
        self.begin(pos);
        self.negations += 1;
    }

    /// Records that `expected` matched at `pos`. Ignored outside negative lookahead.
    pub fn matched(&mut self, pos: usize, expected: Expectation) {
        if self.negations == 0 {
            return;
        }
        let Some(top) = self.frames.last_mut() else {
            return;
        };
        if pos == top.start && !top.matched.contains(&expected) {
            top.matched.push(expected);
        }
    }

    /// Closes a negative lookahead. If the inner expression failed the lookahead holds and
    /// the frame merges inverted, as with `end(true)`. If it matched, whatever matched at
    /// the lookahead's position is expected not to be there.
    pub fn end_not(&mut self, inner_matched: bool) {
        debug_assert!(self.negations > 0, "Mismatched begin_not() - end_not() pair");
        self.negations = self.negations.saturating_sub(1);

        if !inner_matched {
            self.end(true);
            return;
        }

        debug_assert!(self.frames.len() > 1, "Mismatched begin_not() - end_not() pair");
        let Some(frame) = self.frames.pop() else {
            return;
        };
        for expected in frame.matched {
            self.expect(frame.start, expected.negate());
        }
    }

    pub fn enter_silent(&mut self) {
        self.silent += 1;
    }

    pub fn leave_silent(&mut self) {
        debug_assert!(self.silent > 0, "Mismatched enter_silent() - leave_silent() pair");
        self.silent = self.silent.saturating_sub(1);
    }

    pub fn is_silent(&self) -> bool {
        self.silent > 0
    }

    /// The outermost frame, holding the overall furthest failure.
    pub fn into_furthest(mut self) -> Option<Frame> {
        match self.frames.is_empty() {
            true => None,
            false => Some(self.frames.swap_remove(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lit(text: &str) -> Expectation {
        Expectation::literal(text, false)
    }

    #[test]
    fn keeps_only_furthest() {
        let mut t = Tracker::new();
        t.begin(0);
        t.expect(0, lit("a"));
        t.expect(2, lit("b"));
        t.expect(1, lit("c"));
        t.expect(2, lit("d"));
        t.expect(2, lit("b"));

        let frame = t.into_furthest().unwrap();
        assert_eq!(frame.pos, 2);
        assert_eq!(frame.variants, vec![lit("b"), lit("d")]);
    }

    #[test]
    fn inverted_frame_merges_negated() {
        let mut t = Tracker::new();
        t.begin(0);
        t.begin(0);
        t.expect(0, lit("x"));
        t.expect(0, lit("y").negate());
        t.end(true);

        let frame = t.into_furthest().unwrap();
        assert_eq!(frame.variants, vec![lit("x").negate(), lit("y")]);
    }

    #[test]
    fn frame_behind_parent_is_discarded() {
        let mut t = Tracker::new();
        t.begin(0);
        t.expect(3, lit("a"));
        t.begin(1);
        t.expect(1, lit("b"));
        t.end(true);

        let frame = t.into_furthest().unwrap();
        assert_eq!(frame.pos, 3);
        assert_eq!(frame.variants, vec![lit("a")]);
    }

    #[test]
    fn frame_ahead_of_parent_is_discarded() {
        let mut t = Tracker::new();
        t.begin(0);
        t.begin(2);
        t.expect(4, lit("b"));
        t.end(false);

        let frame = t.into_furthest().unwrap();
        assert_eq!(frame.pos, 0);
        assert!(frame.variants.is_empty());
    }

    #[test]
    fn silent_region_only_informs_current_position() {
        let mut t = Tracker::new();
        t.begin(0);
        t.begin(0);
        t.enter_silent();
        t.expect(0, lit("a"));
        t.expect(1, lit("b"));
        t.leave_silent();
        t.end(false);
        t.expect(0, Expectation::other("thing"));
        assert!(!t.is_silent());

        let frame = t.into_furthest().unwrap();
        assert_eq!(frame.pos, 0);
        assert_eq!(frame.variants, vec![lit("a"), Expectation::other("thing")]);
    }

    #[test]
    fn failed_negation_reports_what_matched() {
        let mut t = Tracker::new();
        t.begin(0);
        t.matched(0, lit("ignored"));
        t.expect(0, lit("a"));
        t.begin_not(1);
        t.matched(1, lit("c"));
        t.expect(2, lit("d"));
        t.matched(2, lit("e"));
        t.end_not(true);

        let frame = t.into_furthest().unwrap();
        assert_eq!(frame.pos, 1);
        assert_eq!(frame.variants, vec![lit("c").negate()]);
    }

    #[test]
    fn successful_negation_drops_matches() {
        let mut t = Tracker::new();
        t.begin(0);
        t.begin_not(0);
        t.matched(0, lit("a"));
        t.expect(0, lit("b"));
        t.end_not(false);

        let frame = t.into_furthest().unwrap();
        assert_eq!(frame.variants, vec![lit("b").negate()]);
    }
}
