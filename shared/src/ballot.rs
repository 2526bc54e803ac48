use thiserror::Error;

use crate::models::Candidate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Please select a candidate first")]
    NoSelection,
    #[error("Unknown candidate: {0}")]
    UnknownCandidate(String),
    #[error("cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: &'static str },
}

/// Ballot casting on the voter portal.
///
/// `Idle -> CandidatesShown -> CandidateSelected -> ConfirmPending -> Submitted`,
/// with `Submitting` covering the in-flight cast. At most one candidate is
/// selected at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum VotingFlow {
    #[default]
    Idle,
    CandidatesShown { candidates: Vec<Candidate> },
    CandidateSelected { candidates: Vec<Candidate>, selected: String },
    ConfirmPending { candidates: Vec<Candidate>, selected: String },
    Submitting { candidates: Vec<Candidate>, selected: String },
    Submitted,
}

impl VotingFlow {
    pub fn state_name(&self) -> &'static str {
        match self {
            VotingFlow::Idle => "idle",
            VotingFlow::CandidatesShown { .. } => "showing candidates",
            VotingFlow::CandidateSelected { .. } => "a candidate is selected",
            VotingFlow::ConfirmPending { .. } => "awaiting confirmation",
            VotingFlow::Submitting { .. } => "submitting",
            VotingFlow::Submitted => "submitted",
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition { action, state: self.state_name() }
    }

    pub fn candidates(&self) -> &[Candidate] {
        match self {
            VotingFlow::CandidatesShown { candidates }
            | VotingFlow::CandidateSelected { candidates, .. }
            | VotingFlow::ConfirmPending { candidates, .. }
            | VotingFlow::Submitting { candidates, .. } => candidates,
            VotingFlow::Idle | VotingFlow::Submitted => &[],
        }
    }

    pub fn selected(&self) -> Option<&str> {
        match self {
            VotingFlow::CandidateSelected { selected, .. }
            | VotingFlow::ConfirmPending { selected, .. }
            | VotingFlow::Submitting { selected, .. } => Some(selected),
            _ => None,
        }
    }

    pub fn selected_candidate(&self) -> Option<&Candidate> {
        let selected = self.selected()?;
        self.candidates().iter().find(|c| c.id == selected)
    }

    /// Whether the ballot section is on screen.
    pub fn is_open(&self) -> bool {
        !matches!(self, VotingFlow::Idle | VotingFlow::Submitted)
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self, VotingFlow::ConfirmPending { .. } | VotingFlow::Submitting { .. })
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, VotingFlow::Submitting { .. })
    }

    /// Opens the ballot. Callers must have re-checked the has-voted status
    /// with the server first.
    pub fn show_candidates(&mut self, candidates: Vec<Candidate>) -> Result<(), FlowError> {
        match self {
            VotingFlow::Idle | VotingFlow::Submitted => {
                *self = VotingFlow::CandidatesShown { candidates };
                Ok(())
            }
            _ => Err(self.invalid("show candidates")),
        }
    }

    /// Selecting replaces any previous choice.
    pub fn select(&mut self, candidate_id: &str) -> Result<(), FlowError> {
        let candidates = match std::mem::take(self) {
            VotingFlow::CandidatesShown { candidates }
            | VotingFlow::CandidateSelected { candidates, .. } => candidates,
            other => {
                *self = other;
                return Err(self.invalid("select a candidate"));
            }
        };

        if !candidates.iter().any(|c| c.id == candidate_id) {
            let err = FlowError::UnknownCandidate(candidate_id.to_string());
            *self = VotingFlow::CandidatesShown { candidates };
            return Err(err);
        }

        *self = VotingFlow::CandidateSelected { candidates, selected: candidate_id.to_string() };
        Ok(())
    }

    pub fn proceed(&mut self) -> Result<(), FlowError> {
        match std::mem::take(self) {
            VotingFlow::CandidateSelected { candidates, selected } => {
                *self = VotingFlow::ConfirmPending { candidates, selected };
                Ok(())
            }
            other @ VotingFlow::CandidatesShown { .. } => {
                *self = other;
                Err(FlowError::NoSelection)
            }
            other => {
                *self = other;
                Err(self.invalid("proceed to confirmation"))
            }
        }
    }

    /// Closes the confirmation dialog without voting.
    pub fn dismiss_confirmation(&mut self) -> Result<(), FlowError> {
        match std::mem::take(self) {
            VotingFlow::ConfirmPending { candidates, selected } => {
                *self = VotingFlow::CandidateSelected { candidates, selected };
                Ok(())
            }
            other => {
                *self = other;
                Err(self.invalid("dismiss confirmation"))
            }
        }
    }

    /// Marks the cast as in flight and returns the candidate to send.
    pub fn begin_submit(&mut self) -> Result<String, FlowError> {
        match std::mem::take(self) {
            VotingFlow::ConfirmPending { candidates, selected } => {
                let id = selected.clone();
                *self = VotingFlow::Submitting { candidates, selected };
                Ok(id)
            }
            other => {
                *self = other;
                Err(self.invalid("submit"))
            }
        }
    }

    pub fn submission_succeeded(&mut self) -> Result<(), FlowError> {
        match self {
            VotingFlow::Submitting { .. } => {
                *self = VotingFlow::Submitted;
                Ok(())
            }
            _ => Err(self.invalid("complete submission")),
        }
    }

    /// A rejected cast keeps the selection so the voter can retry.
    pub fn submission_failed(&mut self) -> Result<(), FlowError> {
        match std::mem::take(self) {
            VotingFlow::Submitting { candidates, selected } => {
                *self = VotingFlow::CandidateSelected { candidates, selected };
                Ok(())
            }
            other => {
                *self = other;
                Err(self.invalid("fail submission"))
            }
        }
    }

    pub fn cancel(&mut self) -> Result<(), FlowError> {
        match self {
            VotingFlow::Submitted => Err(self.invalid("cancel")),
            _ => {
                *self = VotingFlow::Idle;
                Ok(())
            }
        }
    }

    /// Drops everything, including a finished ballot. Used when the view
    /// itself goes away.
    pub fn reset(&mut self) {
        *self = VotingFlow::Idle;
    }
}
