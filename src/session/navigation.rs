// src/session/navigation.rs

use std::collections::BTreeSet;

use super::SessionError;

/// Current position in the question sequence plus the flagged-for-review set.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: usize,
    len: usize,
    flagged: BTreeSet<usize>,
}

impl Navigator {
    pub fn new(len: usize) -> Self {
        Self {
            current: 0,
            len,
            flagged: BTreeSet::new(),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_last(&self) -> bool {
        self.len == 0 || self.current + 1 == self.len
    }

    /// Moves forward, staying put on the last question.
    pub fn next(&mut self) -> usize {
        if !self.is_last() {
            self.current += 1;
        }
        self.current
    }

    /// Moves back, staying put on the first question.
    pub fn previous(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    pub fn jump_to(&mut self, index: usize) -> Result<usize, SessionError> {
        self.check(index)?;
        self.current = index;
        Ok(self.current)
    }

    /// Returns whether the question is flagged after the toggle.
    pub fn toggle_flag(&mut self, index: usize) -> Result<bool, SessionError> {
        self.check(index)?;
        if self.flagged.remove(&index) {
            Ok(false)
        } else {
            self.flagged.insert(index);
            Ok(true)
        }
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.flagged.contains(&index)
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    fn check(&self, index: usize) -> Result<(), SessionError> {
        if index < self.len {
            Ok(())
        } else {
            Err(SessionError::IndexOutOfRange {
                index,
                len: self.len,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_at_both_ends() {
        let mut nav = Navigator::new(3);
        assert_eq!(nav.previous(), 0);
        assert_eq!(nav.next(), 1);
        assert_eq!(nav.next(), 2);
        assert_eq!(nav.next(), 2);
        assert!(nav.is_last());
    }

    #[test]
    fn test_jump_rejects_out_of_range() {
        let mut nav = Navigator::new(2);
        assert_eq!(nav.jump_to(1).unwrap(), 1);
        assert_eq!(
            nav.jump_to(2),
            Err(SessionError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(nav.current(), 1);
    }

    #[test]
    fn test_toggle_flag_twice_clears() {
        let mut nav = Navigator::new(4);
        assert!(nav.toggle_flag(3).unwrap());
        assert!(nav.is_flagged(3));
        assert!(!nav.toggle_flag(3).unwrap());
        assert_eq!(nav.flagged_count(), 0);
    }

    #[test]
    fn test_empty_sequence_never_moves() {
        let mut nav = Navigator::new(0);
        assert_eq!(nav.next(), 0);
        assert_eq!(nav.previous(), 0);
        assert!(nav.toggle_flag(0).is_err());
    }
}
