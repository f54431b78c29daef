use crate::arxiv::MAX_RESULT_LIMIT;

/// Candidates fetched from arXiv before the top papers are selected.
pub const DEFAULT_CANDIDATE_CEILING: usize = 30;
/// Largest paper count handed to the summarizer; bounds the prompt size.
pub const MAX_PAPERS: usize = 30;
pub const DEFAULT_PAPER_COUNT: usize = 5;
/// Team turns: candidate handoff, then review.
pub const DEFAULT_MAX_TURNS: usize = 2;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("candidate ceiling must be between 1 and {max}, got {value}")]
    CandidateCeiling { value: usize, max: usize },

    #[error("max turns must be at least 1")]
    MaxTurns,
}

/// Validated limits for one review pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewConfig {
    candidate_ceiling: usize,
    max_turns: usize,
}

impl ReviewConfig {
    pub fn new(candidate_ceiling: usize, max_turns: usize) -> Result<Self, ConfigError> {
        if candidate_ceiling == 0 || candidate_ceiling > MAX_RESULT_LIMIT {
            return Err(ConfigError::CandidateCeiling {
                value: candidate_ceiling,
                max: MAX_RESULT_LIMIT,
            });
        }
        if max_turns == 0 {
            return Err(ConfigError::MaxTurns);
        }
        Ok(Self {
            candidate_ceiling,
            max_turns,
        })
    }

    pub fn candidate_ceiling(&self) -> usize {
        self.candidate_ceiling
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Paper counts are capped by both `MAX_PAPERS` and the candidate ceiling.
    pub fn max_papers(&self) -> usize {
        MAX_PAPERS.min(self.candidate_ceiling)
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            candidate_ceiling: DEFAULT_CANDIDATE_CEILING,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}
