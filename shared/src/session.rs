//! Session bootstrap.
//!
//! On load each console sends one probe to a session-scoped endpoint. The
//! outcome picks the first view. Availability wins over strictness here: a
//! probe that fails for any reason, including a transport error, lands on the
//! login view and never on an error screen.

use crate::gateway::ApiResponse;
use crate::models::Voter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Loading,
    Login,
    Dashboard,
}

/// Result of a session probe, reduced to what bootstrap needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome<P> {
    Authenticated(P),
    Anonymous,
}

impl<P> ProbeOutcome<P> {
    /// Any unsuccessful or payload-less response counts as anonymous.
    pub fn from_response(response: ApiResponse<P>) -> Self {
        match response.ok() {
            Some(payload) => ProbeOutcome::Authenticated(payload),
            None => ProbeOutcome::Anonymous,
        }
    }

    pub fn view(&self) -> View {
        match self {
            ProbeOutcome::Authenticated(_) => View::Dashboard,
            ProbeOutcome::Anonymous => View::Login,
        }
    }
}

/// The authenticated voter for the lifetime of the page. The identity is
/// only ever replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    voter: Option<Voter>,
    view: View,
}

impl Session {
    pub fn voter(&self) -> Option<&Voter> {
        self.voter.as_ref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_authenticated(&self) -> bool {
        self.voter.is_some()
    }

    pub fn sign_in(&mut self, voter: Voter) {
        tracing::info!(voter = %voter.name, "voter session established");
        self.voter = Some(voter);
        self.view = View::Dashboard;
    }

    pub fn sign_out(&mut self) {
        self.voter = None;
        self.view = View::Login;
    }

    pub fn show_login(&mut self) {
        if self.voter.is_none() {
            self.view = View::Login;
        }
    }
}
