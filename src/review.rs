//! Live match set with review cursor.
//!
//! # Overview
//!
//! [`MatchSet`] owns the ordered match sequence produced by a scan plus a
//! cursor for stepping through it. A presentation layer navigates with
//! [`MatchSet::advance`] and reads [`MatchSet::current`]; the deletion
//! executor is the only mutator beyond navigation.
//!
//! Invariant: the cursor is a valid index whenever the sequence is
//! non-empty, and absent when it is empty. Every removal restores this
//! immediately.

use crate::matching::Match;

/// Ordered match sequence plus a review cursor.
#[derive(Debug, Default)]
pub struct MatchSet {
    matches: Vec<Match>,
    cursor: Option<usize>,
}

impl MatchSet {
    /// Create a match set from a scan's match sequence.
    ///
    /// The cursor starts at the first match, or absent when the sequence
    /// is empty.
    #[must_use]
    pub fn new(matches: Vec<Match>) -> Self {
        let cursor = if matches.is_empty() { None } else { Some(0) };
        Self { matches, cursor }
    }

    /// Number of live matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Check if no matches remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Current cursor position, absent when the set is empty.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The match under the cursor, absent when the set is empty.
    #[must_use]
    pub fn current(&self) -> Option<&Match> {
        self.cursor.and_then(|i| self.matches.get(i))
    }

    /// The match at an arbitrary index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Match> {
        self.matches.get(index)
    }

    /// The live sequence, for rendering.
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Move the cursor by `delta` steps, clamped to the valid range.
    ///
    /// A no-op at either boundary (does not wrap) and when the set is
    /// empty.
    pub fn advance(&mut self, delta: isize) {
        let Some(cursor) = self.cursor else {
            return;
        };
        let last = self.matches.len() - 1;
        let target = cursor.saturating_add_signed(delta).min(last);
        self.cursor = Some(target);
    }

    /// Remove and return the match at `index`.
    ///
    /// Cursor repair: removal before the cursor shifts it down by one;
    /// removal at the cursor clamps it to the new last index; emptying the
    /// set clears it.
    pub fn remove_at(&mut self, index: usize) -> Option<Match> {
        if index >= self.matches.len() {
            return None;
        }

        let removed = self.matches.remove(index);

        self.cursor = match self.cursor {
            _ if self.matches.is_empty() => None,
            Some(cursor) if index < cursor => Some(cursor - 1),
            Some(cursor) => Some(cursor.min(self.matches.len() - 1)),
            None => None,
        };

        Some(removed)
    }

    /// Remove every match satisfying `predicate` in one pass.
    ///
    /// Returns the removed matches in their original order. The cursor is
    /// re-derived by the same rule as repeated single removal: shifted down
    /// by the number of removals before it, then clamped.
    pub fn remove_all_where<F>(&mut self, mut predicate: F) -> Vec<Match>
    where
        F: FnMut(&Match) -> bool,
    {
        let old_cursor = self.cursor;
        let mut removed = Vec::new();
        let mut removed_before_cursor = 0usize;

        let mut kept = Vec::with_capacity(self.matches.len());
        for (i, m) in self.matches.drain(..).enumerate() {
            if predicate(&m) {
                if old_cursor.is_some_and(|c| i < c) {
                    removed_before_cursor += 1;
                }
                removed.push(m);
            } else {
                kept.push(m);
            }
        }
        self.matches = kept;

        self.cursor = if self.matches.is_empty() {
            None
        } else {
            old_cursor.map(|c| (c - removed_before_cursor).min(self.matches.len() - 1))
        };

        removed
    }
}
