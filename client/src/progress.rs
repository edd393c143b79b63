//! Two-phase progress indicator for backend processing
//!
//! The backend reports no progress, so the bar is simulated: while the
//! request is outstanding it creeps up in fixed steps but never passes the
//! cap, and only real completion takes it to 100.

/// Which phase the indicator is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Waiting on the backend; value is decorative
    Indeterminate,
    /// The result arrived
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedProgress {
    value: u8,
    step: u8,
    cap: u8,
    phase: ProgressPhase,
}

impl Default for SimulatedProgress {
    fn default() -> Self {
        Self::new(5, 90)
    }
}

impl SimulatedProgress {
    pub const COMPLETE: u8 = 100;

    /// `cap` is clamped below 100 so that only completion reaches it
    pub fn new(step: u8, cap: u8) -> Self {
        Self {
            value: 0,
            step: step.max(1),
            cap: cap.min(Self::COMPLETE - 1),
            phase: ProgressPhase::Indeterminate,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn phase(&self) -> ProgressPhase {
        self.phase
    }

    /// True once the simulated phase has nothing left to fill
    pub fn is_capped(&self) -> bool {
        self.phase == ProgressPhase::Complete || self.value >= self.cap
    }

    /// Advance one step. Returns whether the value changed.
    pub fn advance(&mut self) -> bool {
        if self.is_capped() {
            return false;
        }
        self.value = self.value.saturating_add(self.step).min(self.cap);
        true
    }

    pub fn complete(&mut self) {
        self.value = Self::COMPLETE;
        self.phase = ProgressPhase::Complete;
    }

    pub fn reset(&mut self) {
        self.value = 0;
        self.phase = ProgressPhase::Indeterminate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_reaches_cap_in_eighteen_steps() {
        let mut progress = SimulatedProgress::default();
        let mut steps = 0;
        while progress.advance() {
            steps += 1;
        }
        assert_eq!(steps, 18);
        assert_eq!(progress.value(), 90);
        assert!(progress.is_capped());
    }

    #[test]
    fn test_complete_jumps_to_hundred() {
        let mut progress = SimulatedProgress::default();
        progress.advance();
        progress.complete();
        assert_eq!(progress.value(), 100);
        assert_eq!(progress.phase(), ProgressPhase::Complete);
        assert!(!progress.advance());
    }

    #[test]
    fn test_reset() {
        let mut progress = SimulatedProgress::default();
        progress.complete();
        progress.reset();
        assert_eq!(progress.value(), 0);
        assert_eq!(progress.phase(), ProgressPhase::Indeterminate);
    }

    #[test]
    fn test_cap_never_reaches_complete() {
        let mut progress = SimulatedProgress::new(30, 100);
        while progress.advance() {}
        assert_eq!(progress.value(), 99);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_value_bounded_by_cap(step in 0u8..=255, cap in 0u8..=255, ticks in 0usize..200) {
            let mut progress = SimulatedProgress::new(step, cap);
            let mut previous = progress.value();
            for _ in 0..ticks {
                progress.advance();
                prop_assert!(progress.value() >= previous);
                prop_assert!(progress.value() < SimulatedProgress::COMPLETE);
                previous = progress.value();
            }
        }
    }
}
