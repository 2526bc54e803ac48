//! Voter portal: identity, ballot casting, results and photo upload.

use crate::action::{settle, ActionOutcome, Confirm};
use crate::alert::{Alert, Alerts};
use crate::ballot::{FlowError, VotingFlow};
use crate::gateway::{ApiResponse, FormPart, Gateway, Transport, UploadFile};
use crate::models::*;
use crate::render::{portal_banner, portal_results_view, uploaded_photo_url, PortalBanner, ResultsView};
use crate::session::{ProbeOutcome, Session, View};
use crate::validation::{validate_photo, ValidationError};

pub const VOTER_INFO_PATH: &str = "/voter-info";
pub const VERIFY_TOKEN_PATH: &str = "/verify-google-token";
pub const ELECTION_STATUS_PATH: &str = "/election-status";
pub const VOTER_STATUS_PATH: &str = "/check-voter-status";
pub const LAST_ELECTION_PATH: &str = "/get-last-election";
pub const CANDIDATES_PATH: &str = "/get-candidates";
pub const CAST_VOTE_PATH: &str = "/cast-vote";
pub const RESULTS_PATH: &str = "/get-election-results";
pub const UPLOAD_PHOTO_PATH: &str = "/upload-voter-photo";
pub const LOGOUT_PATH: &str = "/logout";

pub const ALREADY_VOTED_MESSAGE: &str = "You have already voted in this election.";
pub const VOTE_CAST_MESSAGE: &str = "🎉 Vote cast successfully! Thank you for participating.";
pub const VOTE_RECORDED_MESSAGE: &str = "Your vote has been recorded. You can now view results when the election ends.";
pub const LOGOUT_PROMPT: &str = "Are you sure you want to logout?";

#[derive(Debug, Clone)]
pub struct PortalApi<T> {
    gateway: Gateway<T>,
}

impl<T: Transport> PortalApi<T> {
    pub fn new(transport: T) -> Self {
        Self { gateway: Gateway::new(transport) }
    }

    pub async fn voter_info(&self) -> ApiResponse<VoterInfoPayload> {
        self.gateway.get(VOTER_INFO_PATH).await
    }

    pub async fn verify_token(&self, id_token: &str) -> ApiResponse<VerifiedVoterPayload> {
        self.gateway.post_json(VERIFY_TOKEN_PATH, &VerifyTokenRequest { id_token: id_token.to_string() }).await
    }

    pub async fn election_status(&self) -> ApiResponse<ActiveElectionPayload> {
        self.gateway.get(ELECTION_STATUS_PATH).await
    }

    pub async fn voter_status(&self, phone: &str) -> ApiResponse<VoterStatusPayload> {
        self.gateway.post_json(VOTER_STATUS_PATH, &PhoneRequest { phone: phone.to_string() }).await
    }

    pub async fn last_election(&self) -> ApiResponse<ActiveElectionPayload> {
        self.gateway.get(LAST_ELECTION_PATH).await
    }

    pub async fn candidates(&self) -> ApiResponse<CandidatesPayload> {
        self.gateway.get(CANDIDATES_PATH).await
    }

    pub async fn cast_vote(&self, candidate_id: &str, phone: &str) -> ApiResponse<Empty> {
        let request = CastVoteRequest { candidate_id: candidate_id.to_string(), phone: phone.to_string() };
        self.gateway.post_json(CAST_VOTE_PATH, &request).await
    }

    pub async fn results(&self) -> ApiResponse<ResultsPayload> {
        self.gateway.get(RESULTS_PATH).await
    }

    pub async fn upload_photo(&self, phone: &str, photo: UploadFile) -> ApiResponse<UploadPayload> {
        let parts = vec![FormPart::file("photo", photo), FormPart::text("phone", phone)];
        self.gateway.post_multipart(UPLOAD_PHOTO_PATH, parts).await
    }

    pub async fn logout(&self) -> ApiResponse<Empty> {
        self.gateway.post_empty(LOGOUT_PATH).await
    }
}

/// Probes `/voter-info`. Anything short of a successful response carrying a
/// voter lands on the login view.
pub async fn bootstrap<T: Transport>(api: &PortalApi<T>) -> ProbeOutcome<VoterInfoPayload> {
    let outcome = ProbeOutcome::from_response(api.voter_info().await);
    match &outcome {
        ProbeOutcome::Authenticated(info) => tracing::info!(voter = %info.voter.name, "existing voter session found"),
        ProbeOutcome::Anonymous => tracing::info!("no voter session, showing login"),
    }
    outcome
}

/// Exchanges an identity-provider token for a portal session.
pub async fn verify_identity<T: Transport>(api: &PortalApi<T>, id_token: &str) -> ActionOutcome<Voter> {
    let response = api.verify_token(id_token).await;
    if !response.success {
        tracing::warn!(reason = ?response.message, "identity token rejected");
    }
    match settle(response, |payload, _| payload.map(|p| p.voter)) {
        ActionOutcome::Succeeded(Some(voter)) => ActionOutcome::Succeeded(voter),
        ActionOutcome::Succeeded(None) => ActionOutcome::Failed(Alert::danger(crate::action::REQUEST_FAILED_MESSAGE)),
        ActionOutcome::Aborted => ActionOutcome::Aborted,
        ActionOutcome::Invalid(alert) => ActionOutcome::Invalid(alert),
        ActionOutcome::Failed(alert) => ActionOutcome::Failed(alert),
    }
}

/// User-facing text for a failed popup sign-in, keyed by the provider's
/// error code.
pub fn sign_in_error_message(code: &str, message: Option<&str>) -> String {
    let detail = match code {
        "auth/popup-closed-by-user" => "Sign-in was cancelled. Please try again.",
        "auth/popup-blocked" => "Popup was blocked. Please allow popups and try again.",
        "auth/network-request-failed" => "Network error. Please check your internet connection.",
        "auth/too-many-requests" => "Too many attempts. Please try again later.",
        _ => message.filter(|m| !m.is_empty()).unwrap_or("Unknown error occurred."),
    };
    format!("Google Sign-In failed: {}", detail)
}

/// Builds the status banner: the active election (with a fresh has-voted
/// check), otherwise the most recently ended one.
pub async fn load_election_status<T: Transport>(api: &PortalApi<T>, phone: &str) -> PortalBanner {
    if let Some(election) = api.election_status().await.ok().and_then(|p| p.election) {
        let has_voted = api.voter_status(phone).await.payload.map(|p| p.has_voted).unwrap_or(false);
        return portal_banner(Some(&election), has_voted, None);
    }
    let last = api.last_election().await.ok().and_then(|p| p.election);
    portal_banner(None, false, last.as_ref())
}

/// Opens the ballot after the server confirms the voter has not voted yet.
pub async fn start_voting<T: Transport>(api: &PortalApi<T>, phone: &str) -> ActionOutcome<Vec<Candidate>> {
    let has_voted = api.voter_status(phone).await.payload.map(|p| p.has_voted).unwrap_or(false);
    if has_voted {
        return ActionOutcome::Failed(Alert::warning(ALREADY_VOTED_MESSAGE));
    }
    settle(api.candidates().await, |payload, _| payload.map(|p| p.candidates).unwrap_or_default())
}

pub async fn cast_vote<T: Transport>(api: &PortalApi<T>, candidate_id: &str, phone: &str) -> ActionOutcome<()> {
    tracing::info!(candidate = candidate_id, "casting vote");
    settle(api.cast_vote(candidate_id, phone).await, |_, _| ())
}

pub async fn view_results<T: Transport>(api: &PortalApi<T>) -> ActionOutcome<ResultsView> {
    settle(api.results().await, |payload, _| {
        let results = payload.and_then(|p| p.results);
        portal_results_view(results.as_ref())
    })
}

/// Validates and uploads a voter photo. Success yields the photo's URL.
pub async fn upload_photo<T: Transport>(
    api: &PortalApi<T>,
    phone: &str,
    photo: Option<UploadFile>,
) -> ActionOutcome<Option<String>> {
    let Some(photo) = photo else {
        return ValidationError::MissingPhoto.into();
    };
    if let Err(err) = validate_photo(&photo.content_type, photo.size()) {
        return err.into();
    }
    settle(api.upload_photo(phone, photo).await, |payload, _| {
        payload.and_then(|p| p.filename).map(|name| uploaded_photo_url(&name))
    })
}

/// Ends the session. Once confirmed the portal always returns to login,
/// whatever the server answers.
pub async fn logout<T: Transport>(api: &PortalApi<T>, confirm: &impl Confirm) -> ActionOutcome<()> {
    if !confirm.confirm(LOGOUT_PROMPT) {
        return ActionOutcome::Aborted;
    }
    let response = api.logout().await;
    if !response.success {
        tracing::warn!(reason = ?response.message, "voter logout was not acknowledged");
    }
    ActionOutcome::Succeeded(())
}

/// Side effects a portal update asks for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortalFollowup {
    pub alerts: Vec<u32>,
    pub reload_status: bool,
}

impl PortalFollowup {
    fn alert(id: u32) -> Self {
        Self { alerts: vec![id], reload_status: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortalState {
    pub session: Session,
    pub flow: VotingFlow,
    pub banner: PortalBanner,
    pub results: Option<ResultsView>,
    pub uploaded_photo: Option<String>,
    pub alerts: Alerts,
}

impl Default for PortalState {
    fn default() -> Self {
        Self {
            session: Session::default(),
            flow: VotingFlow::Idle,
            banner: PortalBanner::Loading,
            results: None,
            uploaded_photo: None,
            alerts: Alerts::default(),
        }
    }
}

impl PortalState {
    pub fn view(&self) -> View {
        self.session.view()
    }

    pub fn phone(&self) -> Option<String> {
        self.session.voter().map(|v| v.phone.clone())
    }

    fn push(&mut self, alert: Alert) -> PortalFollowup {
        PortalFollowup::alert(self.alerts.push(alert))
    }

    /// Returns whether the dashboard is now showing.
    pub fn apply_probe(&mut self, outcome: ProbeOutcome<VoterInfoPayload>) -> bool {
        match outcome {
            ProbeOutcome::Authenticated(info) => {
                self.session.sign_in(info.voter);
                true
            }
            ProbeOutcome::Anonymous => {
                self.session.show_login();
                false
            }
        }
    }

    pub fn absorb_identity(&mut self, outcome: ActionOutcome<Voter>) -> PortalFollowup {
        match outcome {
            ActionOutcome::Succeeded(voter) => {
                self.session.sign_in(voter);
                let mut followup = self.push(Alert::success("Welcome! Google authentication successful."));
                followup.reload_status = true;
                followup
            }
            ActionOutcome::Aborted => PortalFollowup::default(),
            ActionOutcome::Invalid(alert) | ActionOutcome::Failed(alert) => self.push(alert),
        }
    }

    /// A voter who has already voted never keeps an open ballot.
    pub fn set_banner(&mut self, banner: PortalBanner) {
        if matches!(banner, PortalBanner::Voted { .. }) && self.flow.is_open() {
            self.flow.reset();
        }
        self.banner = banner;
    }

    /// The ballot opens from the banner only while no ballot is on screen.
    pub fn can_start_voting(&self) -> bool {
        self.banner.can_vote() && !self.flow.is_open()
    }

    pub fn refresh_requested(&mut self) -> PortalFollowup {
        let mut followup = self.push(Alert::info("Status refreshed"));
        followup.reload_status = true;
        followup
    }

    pub fn absorb_candidates(&mut self, outcome: ActionOutcome<Vec<Candidate>>) -> PortalFollowup {
        match outcome {
            ActionOutcome::Succeeded(candidates) => match self.flow.show_candidates(candidates) {
                Ok(()) => PortalFollowup::default(),
                Err(err) => self.flow_error(err),
            },
            ActionOutcome::Aborted => PortalFollowup::default(),
            ActionOutcome::Invalid(alert) | ActionOutcome::Failed(alert) => self.push(alert),
        }
    }

    pub fn select(&mut self, candidate_id: &str) -> PortalFollowup {
        match self.flow.select(candidate_id) {
            Ok(()) => PortalFollowup::default(),
            Err(err) => self.flow_error(err),
        }
    }

    pub fn proceed(&mut self) -> PortalFollowup {
        match self.flow.proceed() {
            Ok(()) => PortalFollowup::default(),
            Err(err) => self.flow_error(err),
        }
    }

    pub fn dismiss_confirmation(&mut self) {
        if let Err(err) = self.flow.dismiss_confirmation() {
            tracing::debug!(error = %err, "nothing to dismiss");
        }
    }

    pub fn cancel_voting(&mut self) {
        if let Err(err) = self.flow.cancel() {
            tracing::debug!(error = %err, "ballot already closed");
        }
    }

    /// Moves the ballot to in-flight and returns what to send. `None` means
    /// there is nothing to submit.
    pub fn begin_vote(&mut self) -> Option<(String, String)> {
        let phone = self.phone()?;
        match self.flow.begin_submit() {
            Ok(candidate_id) => Some((candidate_id, phone)),
            Err(err) => {
                tracing::debug!(error = %err, "vote not submitted");
                None
            }
        }
    }

    pub fn absorb_vote(&mut self, outcome: ActionOutcome<()>) -> PortalFollowup {
        match outcome {
            ActionOutcome::Succeeded(()) => {
                if let Err(err) = self.flow.submission_succeeded() {
                    tracing::warn!(error = %err, "vote settled outside submission");
                }
                let first = self.alerts.push(Alert::success(VOTE_CAST_MESSAGE));
                let second = self.alerts.push(Alert::info(VOTE_RECORDED_MESSAGE));
                PortalFollowup { alerts: vec![first, second], reload_status: true }
            }
            ActionOutcome::Aborted => {
                if let Err(err) = self.flow.submission_failed() {
                    tracing::warn!(error = %err, "vote settled outside submission");
                }
                PortalFollowup::default()
            }
            ActionOutcome::Invalid(alert) | ActionOutcome::Failed(alert) => {
                if let Err(err) = self.flow.submission_failed() {
                    tracing::warn!(error = %err, "vote settled outside submission");
                }
                self.push(alert)
            }
        }
    }

    pub fn absorb_results(&mut self, outcome: ActionOutcome<ResultsView>) -> PortalFollowup {
        match outcome {
            ActionOutcome::Succeeded(view) => {
                self.results = Some(view);
                PortalFollowup::default()
            }
            ActionOutcome::Aborted => PortalFollowup::default(),
            ActionOutcome::Invalid(alert) | ActionOutcome::Failed(alert) => self.push(alert),
        }
    }

    pub fn absorb_photo(&mut self, outcome: ActionOutcome<Option<String>>) -> PortalFollowup {
        match outcome {
            ActionOutcome::Succeeded(url) => {
                if url.is_some() {
                    self.uploaded_photo = url;
                }
                self.push(Alert::success("Photo uploaded successfully!"))
            }
            ActionOutcome::Aborted => PortalFollowup::default(),
            ActionOutcome::Invalid(alert) | ActionOutcome::Failed(alert) => self.push(alert),
        }
    }

    /// Photo to show on the voter card: a fresh upload wins over the stored
    /// one.
    pub fn photo_url(&self) -> Option<String> {
        self.uploaded_photo.clone().or_else(|| {
            self.session.voter().and_then(|v| v.photo.as_deref()).map(uploaded_photo_url)
        })
    }

    pub fn logged_out(&mut self) {
        tracing::info!("voter signed out");
        let alerts = std::mem::take(&mut self.alerts);
        *self = PortalState { alerts, ..Default::default() };
        self.session.sign_out();
    }

    fn flow_error(&mut self, err: FlowError) -> PortalFollowup {
        match err {
            FlowError::NoSelection => self.push(Alert::warning(err.to_string())),
            FlowError::UnknownCandidate(_) | FlowError::InvalidTransition { .. } => {
                tracing::debug!(error = %err, "ballot action ignored");
                PortalFollowup::default()
            }
        }
    }
}
