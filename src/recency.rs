/// How many of the most recently drawn countries carry a weight penalty.
/// Must stay below the history cap and the number of playable countries.
pub const RECENT_COUNTRY_WINDOW: usize = 5;

const DEFAULT_MAX_PENALTY: f64 = 10.0;

/// Discounts the selection weight of recently drawn identifiers.
///
/// The most recent identifier has its weight divided by the maximum penalty;
/// the divisor decays linearly toward 1 across the window, so a country
/// becomes steadily more likely again over the following rounds instead of
/// being hard-excluded. Identifiers outside the window keep their base
/// weight untouched.
#[derive(Debug, Clone, Copy)]
pub struct RecencyPenalty {
    window: usize,
    max_penalty: f64,
}

impl Default for RecencyPenalty {
    fn default() -> Self {
        Self::new(RECENT_COUNTRY_WINDOW, DEFAULT_MAX_PENALTY)
    }
}

impl RecencyPenalty {
    pub fn new(window: usize, max_penalty: f64) -> Self {
        Self {
            window: window.max(1),
            max_penalty: max_penalty.max(1.0),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Divisor for a candidate found at `position` in the recency list
    /// (0 = most recent). Equal to the maximum penalty at position 0,
    /// approaching (but never reaching) 1 at the end of the window.
    fn factor(&self, position: usize) -> f64 {
        self.max_penalty - (self.max_penalty - 1.0) * position as f64 / self.window as f64
    }

    /// Adjusted weight for `candidate`, given the most-recent-first list of
    /// recently drawn identifiers. Division rounds up so positive weights
    /// stay positive.
    pub fn adjusted_weight<S: AsRef<str>>(&self, recent: &[S], candidate: &str, base: u64) -> u64 {
        let position = recent
            .iter()
            .take(self.window)
            .position(|id| id.as_ref() == candidate);
        match position {
            Some(position) if base > 0 => (base as f64 / self.factor(position)).ceil() as u64,
            _ => base,
        }
    }
}
