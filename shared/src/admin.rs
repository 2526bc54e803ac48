//! Admin console: election lifecycle, candidates, voters and the live tally.

use crate::action::{settle, ActionOutcome, Confirm};
use crate::alert::{Alert, Alerts};
use crate::gateway::{ApiResponse, FormPart, Gateway, Transport, UploadFile};
use crate::models::*;
use crate::render::{
    admin_results_view, admin_status_panel, candidate_rows, election_cards, election_details_view,
    past_elections_summary, voter_rows, CandidateRow, ElectionCard, Listing, PastElections,
    ResultsView, StatusPanel, VoterRow,
};
use crate::session::{ProbeOutcome, View};
use crate::validation::{confirm_phrase, required, validate_voter, ValidationError};

pub const LOGIN_PATH: &str = "/admin/login";
pub const LOGOUT_PATH: &str = "/admin/logout";
pub const ELECTIONS_PATH: &str = "/admin/elections";
pub const RESULTS_PATH: &str = "/admin/results";
pub const CANDIDATES_PATH: &str = "/admin/candidates";
pub const VOTERS_PATH: &str = "/admin/voters";
pub const CREATE_ELECTION_PATH: &str = "/admin/create-election";
pub const START_ELECTION_PATH: &str = "/admin/start-election";
pub const STOP_ELECTION_PATH: &str = "/admin/stop-election";
pub const DELETE_ELECTION_PATH: &str = "/admin/delete-election";
pub const ELECTION_DETAILS_PATH: &str = "/admin/election-details";
pub const ADD_CANDIDATE_PATH: &str = "/admin/add-candidate";
pub const DELETE_CANDIDATE_PATH: &str = "/admin/delete-candidate";
pub const ADD_VOTER_PATH: &str = "/admin/add-voter";
pub const UPDATE_VOTER_PATH: &str = "/admin/update-voter";
pub const DELETE_VOTER_PATH: &str = "/admin/delete-voter";
pub const LOAD_VOTERS_PATH: &str = "/admin/load-voters";

#[derive(Debug, Clone)]
pub struct AdminApi<T> {
    gateway: Gateway<T>,
}

impl<T: Transport> AdminApi<T> {
    pub fn new(transport: T) -> Self {
        Self { gateway: Gateway::new(transport) }
    }

    pub async fn login(&self, secret_key: &str) -> ApiResponse<Empty> {
        self.gateway.post_json(LOGIN_PATH, &AdminLoginRequest { secret_key: secret_key.to_string() }).await
    }

    pub async fn logout(&self) -> ApiResponse<Empty> {
        self.gateway.post_empty(LOGOUT_PATH).await
    }

    pub async fn elections(&self) -> ApiResponse<ElectionsPayload> {
        self.gateway.get(ELECTIONS_PATH).await
    }

    pub async fn results(&self) -> ApiResponse<ResultsPayload> {
        self.gateway.get(RESULTS_PATH).await
    }

    pub async fn candidates(&self) -> ApiResponse<CandidatesPayload> {
        self.gateway.get(CANDIDATES_PATH).await
    }

    pub async fn voters(&self) -> ApiResponse<VotersPayload> {
        self.gateway.get(VOTERS_PATH).await
    }

    pub async fn create_election(&self, request: &CreateElectionRequest) -> ApiResponse<Empty> {
        self.gateway.post_json(CREATE_ELECTION_PATH, request).await
    }

    pub async fn start_election(&self, election_id: &str) -> ApiResponse<Empty> {
        self.gateway.post_json(START_ELECTION_PATH, &ElectionIdRequest { election_id: election_id.to_string() }).await
    }

    pub async fn stop_election(&self) -> ApiResponse<Empty> {
        self.gateway.post_empty(STOP_ELECTION_PATH).await
    }

    pub async fn delete_election(&self, election_id: &str) -> ApiResponse<Empty> {
        self.gateway.post_json(DELETE_ELECTION_PATH, &ElectionIdRequest { election_id: election_id.to_string() }).await
    }

    pub async fn election_details(&self, election_id: &str) -> ApiResponse<ResultsPayload> {
        self.gateway.get(&format!("{}/{}", ELECTION_DETAILS_PATH, election_id)).await
    }

    pub async fn add_candidate(&self, request: &AddCandidateRequest) -> ApiResponse<Empty> {
        self.gateway.post_json(ADD_CANDIDATE_PATH, request).await
    }

    pub async fn delete_candidate(&self, candidate_id: &str) -> ApiResponse<Empty> {
        self.gateway.post_json(DELETE_CANDIDATE_PATH, &CandidateIdRequest { candidate_id: candidate_id.to_string() }).await
    }

    pub async fn add_voter(&self, request: &VoterRequest) -> ApiResponse<Empty> {
        self.gateway.post_json(ADD_VOTER_PATH, request).await
    }

    pub async fn update_voter(&self, request: &UpdateVoterRequest) -> ApiResponse<Empty> {
        self.gateway.post_json(UPDATE_VOTER_PATH, request).await
    }

    pub async fn delete_voter(&self, phone: &str) -> ApiResponse<Empty> {
        self.gateway.post_json(DELETE_VOTER_PATH, &PhoneRequest { phone: phone.to_string() }).await
    }

    pub async fn load_voters(&self, file: UploadFile) -> ApiResponse<Empty> {
        self.gateway.post_multipart(LOAD_VOTERS_PATH, vec![FormPart::file("file", file)]).await
    }
}

/// Read handlers that resync a part of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Refresh {
    ElectionStatus,
    Results,
    Candidates,
    Elections,
    Voters,
    PastElections,
}

pub const ALL_REFRESHES: [Refresh; 6] = [
    Refresh::ElectionStatus,
    Refresh::Results,
    Refresh::Candidates,
    Refresh::Elections,
    Refresh::Voters,
    Refresh::PastElections,
];

#[derive(Debug, Clone, PartialEq)]
pub enum AdminEvent {
    Probed(ProbeOutcome<ElectionsPayload>),
    StatusLoaded(ApiResponse<ElectionsPayload>),
    ResultsLoaded(ApiResponse<ResultsPayload>),
    CandidatesLoaded(ApiResponse<CandidatesPayload>),
    ElectionsLoaded(ApiResponse<ElectionsPayload>),
    VotersLoaded(ApiResponse<VotersPayload>),
    PastElectionsLoaded(ApiResponse<ElectionsPayload>),
}

/// Session probe: an admin session exists when the elections listing is
/// readable.
pub async fn bootstrap<T: Transport>(api: &AdminApi<T>) -> AdminEvent {
    let outcome = ProbeOutcome::from_response(api.elections().await);
    match &outcome {
        ProbeOutcome::Authenticated(_) => tracing::info!("existing admin session found"),
        ProbeOutcome::Anonymous => tracing::info!("no admin session, showing login"),
    }
    AdminEvent::Probed(outcome)
}

pub async fn refresh<T: Transport>(api: &AdminApi<T>, which: Refresh) -> AdminEvent {
    match which {
        Refresh::ElectionStatus => AdminEvent::StatusLoaded(api.elections().await),
        Refresh::Results => AdminEvent::ResultsLoaded(api.results().await),
        Refresh::Candidates => AdminEvent::CandidatesLoaded(api.candidates().await),
        Refresh::Elections => AdminEvent::ElectionsLoaded(api.elections().await),
        Refresh::Voters => AdminEvent::VotersLoaded(api.voters().await),
        Refresh::PastElections => AdminEvent::PastElectionsLoaded(api.elections().await),
    }
}

/// What the console does after a successful action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminSync {
    pub alert: Option<Alert>,
    pub resync: Vec<Refresh>,
    pub view: Option<View>,
}

impl AdminSync {
    fn new(alert: Alert, resync: &[Refresh]) -> Self {
        Self { alert: Some(alert), resync: resync.to_vec(), view: None }
    }

    fn with_view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }
}

pub type AdminOutcome = ActionOutcome<AdminSync>;

pub async fn login<T: Transport>(api: &AdminApi<T>, secret_key: &str) -> AdminOutcome {
    let secret_key = match required(secret_key, ValidationError::MissingPassword) {
        Ok(key) => key,
        Err(err) => return err.into(),
    };
    settle(api.login(&secret_key).await, |_, _| {
        AdminSync::new(Alert::success("Admin authenticated successfully!"), &ALL_REFRESHES)
            .with_view(View::Dashboard)
    })
}

/// The console drops back to login even when the server call fails.
pub async fn logout<T: Transport>(api: &AdminApi<T>) -> AdminOutcome {
    let response = api.logout().await;
    if !response.success {
        tracing::warn!(reason = ?response.message, "admin logout was not acknowledged");
    }
    ActionOutcome::Succeeded(AdminSync {
        alert: Some(Alert::info(response.message_or("Logged out"))),
        resync: Vec::new(),
        view: Some(View::Login),
    })
}

pub async fn create_election<T: Transport>(api: &AdminApi<T>, title: &str, description: &str) -> AdminOutcome {
    let title = match required(title, ValidationError::MissingElectionTitle) {
        Ok(title) => title,
        Err(err) => return err.into(),
    };
    let request = CreateElectionRequest { title, description: description.trim().to_string() };
    settle(api.create_election(&request).await, |_, _| {
        AdminSync::new(Alert::success("Election created successfully!"), &[Refresh::Elections])
    })
}

pub async fn start_election<T: Transport>(api: &AdminApi<T>, election_id: &str) -> AdminOutcome {
    let election_id = match required(election_id, ValidationError::NoElectionSelected) {
        Ok(id) => id,
        Err(err) => return err.into(),
    };
    settle(api.start_election(&election_id).await, |_, _| {
        AdminSync::new(
            Alert::success("Election started successfully!"),
            &[Refresh::ElectionStatus, Refresh::Results],
        )
    })
}

pub async fn stop_election<T: Transport>(api: &AdminApi<T>, confirm: &impl Confirm) -> AdminOutcome {
    if !confirm.confirm("Are you sure you want to stop the current election? This action cannot be undone.") {
        return ActionOutcome::Aborted;
    }
    settle(api.stop_election().await, |_, _| {
        AdminSync::new(
            Alert::success("Election stopped successfully!"),
            &[Refresh::ElectionStatus, Refresh::Results],
        )
    })
}

/// Deletion needs the literal phrase typed into the dialog.
pub async fn delete_election<T: Transport>(api: &AdminApi<T>, election_id: &str, typed: &str) -> AdminOutcome {
    if let Err(err) = confirm_phrase(typed) {
        return err.into();
    }
    settle(api.delete_election(election_id).await, |_, _| {
        AdminSync::new(
            Alert::success("Election deleted successfully!"),
            &[Refresh::Elections, Refresh::ElectionStatus],
        )
    })
}

pub async fn view_election_results<T: Transport>(api: &AdminApi<T>, election_id: &str) -> ActionOutcome<ResultsView> {
    settle(api.election_details(election_id).await, |payload, _| {
        let results = payload.and_then(|p| p.results).unwrap_or_default();
        election_details_view(&results)
    })
}

pub async fn add_candidate<T: Transport>(api: &AdminApi<T>, name: &str, photo_url: &str) -> AdminOutcome {
    let name = match required(name, ValidationError::MissingCandidateName) {
        Ok(name) => name,
        Err(err) => return err.into(),
    };
    let request = AddCandidateRequest { name, photo_url: photo_url.trim().to_string() };
    settle(api.add_candidate(&request).await, |_, _| {
        AdminSync::new(
            Alert::success("Candidate added successfully!"),
            &[Refresh::Candidates, Refresh::Results],
        )
    })
}

pub async fn delete_candidate<T: Transport>(
    api: &AdminApi<T>,
    candidate_id: &str,
    candidate_name: &str,
    confirm: &impl Confirm,
) -> AdminOutcome {
    if !confirm.confirm(&format!("Are you sure you want to delete candidate \"{}\"?", candidate_name)) {
        return ActionOutcome::Aborted;
    }
    settle(api.delete_candidate(candidate_id).await, |_, _| {
        AdminSync::new(
            Alert::success("Candidate deleted successfully!"),
            &[Refresh::Candidates, Refresh::Results],
        )
    })
}

pub async fn add_voter<T: Transport>(api: &AdminApi<T>, voter: &VoterRequest) -> AdminOutcome {
    let voter = match validate_voter(voter, ValidationError::IncompleteVoter) {
        Ok(voter) => voter,
        Err(err) => return err.into(),
    };
    settle(api.add_voter(&voter).await, |_, _| {
        AdminSync::new(Alert::success("Voter added successfully!"), &[Refresh::Voters])
    })
}

/// Looks a voter up by phone for the edit dialog. A voter that vanished in
/// the meantime silently aborts.
pub async fn edit_voter<T: Transport>(api: &AdminApi<T>, phone: &str) -> ActionOutcome<Voter> {
    let found = settle(api.voters().await, |payload, _| {
        payload.and_then(|p| p.voters.into_iter().find(|v| v.phone == phone))
    });
    match found {
        ActionOutcome::Succeeded(Some(voter)) => ActionOutcome::Succeeded(voter),
        ActionOutcome::Succeeded(None) | ActionOutcome::Aborted => ActionOutcome::Aborted,
        ActionOutcome::Invalid(alert) => ActionOutcome::Invalid(alert),
        ActionOutcome::Failed(alert) => ActionOutcome::Failed(alert),
    }
}

pub async fn update_voter<T: Transport>(api: &AdminApi<T>, original_phone: &str, voter: &VoterRequest) -> AdminOutcome {
    let voter = match validate_voter(voter, ValidationError::IncompleteVoterEdit) {
        Ok(voter) => voter,
        Err(err) => return err.into(),
    };
    let request = UpdateVoterRequest { original_phone: original_phone.to_string(), voter };
    settle(api.update_voter(&request).await, |_, message| {
        AdminSync::new(
            Alert::success(message.unwrap_or_else(|| "Voter updated successfully".into())),
            &[Refresh::Voters],
        )
    })
}

pub async fn delete_voter<T: Transport>(
    api: &AdminApi<T>,
    phone: &str,
    name: &str,
    confirm: &impl Confirm,
) -> AdminOutcome {
    let prompt = format!("Are you sure you want to delete voter \"{}\"?\n\nThis action cannot be undone.", name);
    if !confirm.confirm(&prompt) {
        return ActionOutcome::Aborted;
    }
    settle(api.delete_voter(phone).await, |_, message| {
        AdminSync::new(
            Alert::success(message.unwrap_or_else(|| "Voter deleted successfully".into())),
            &[Refresh::Voters],
        )
    })
}

/// Bulk import from a spreadsheet upload.
pub async fn upload_voters<T: Transport>(api: &AdminApi<T>, file: Option<UploadFile>) -> AdminOutcome {
    let Some(file) = file else {
        return ValidationError::MissingSpreadsheet.into();
    };
    tracing::info!(file = %file.file_name, bytes = file.size(), "uploading voter spreadsheet");
    settle(api.load_voters(file).await, |_, message| {
        AdminSync::new(
            Alert::success(message.unwrap_or_else(|| "Voters loaded successfully".into())),
            &[Refresh::Voters],
        )
    })
}

/// A dashboard section that can be waiting, populated, or showing the
/// server's refusal.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Panel<T> {
    #[default]
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Panel<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Side effects an update asks the console to carry out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Followup {
    pub refreshes: Vec<Refresh>,
    pub alert: Option<u32>,
}

/// Everything the admin console displays. Each load replaces its section
/// wholesale, so applying the same event twice is the same as applying it
/// once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminState {
    pub view: View,
    pub status: Panel<StatusPanel>,
    pub results: Panel<ResultsView>,
    pub candidates: Panel<Listing<CandidateRow>>,
    pub elections: Vec<Election>,
    pub election_cards: Panel<Listing<ElectionCard>>,
    pub voters: Panel<Listing<VoterRow>>,
    pub past_elections: Panel<PastElections>,
    pub alerts: Alerts,
}

impl AdminState {
    pub fn apply(&mut self, event: AdminEvent) -> Vec<Refresh> {
        match event {
            AdminEvent::Probed(outcome) => {
                self.view = outcome.view();
                if self.view == View::Dashboard {
                    return ALL_REFRESHES.to_vec();
                }
            }
            AdminEvent::StatusLoaded(response) => {
                if let Some(payload) = response.ok() {
                    self.status = Panel::Ready(admin_status_panel(payload.current_election.as_ref()));
                }
            }
            AdminEvent::ResultsLoaded(response) => {
                self.results = if response.success {
                    let results = response.payload.and_then(|p| p.results);
                    Panel::Ready(admin_results_view(results.as_ref()))
                } else {
                    Panel::Failed(response.message_or("Unable to load results"))
                };
            }
            AdminEvent::CandidatesLoaded(response) => {
                if let Some(payload) = response.ok() {
                    self.candidates = Panel::Ready(candidate_rows(&payload.candidates));
                }
            }
            AdminEvent::ElectionsLoaded(response) => {
                if let Some(payload) = response.ok() {
                    self.election_cards = Panel::Ready(election_cards(&payload.elections));
                    self.elections = payload.elections;
                }
            }
            AdminEvent::VotersLoaded(response) => {
                self.voters = if response.success {
                    let voters = response.payload.map(|p| p.voters).unwrap_or_default();
                    Panel::Ready(voter_rows(&voters))
                } else {
                    Panel::Failed(response.message_or("Unable to load voters"))
                };
            }
            AdminEvent::PastElectionsLoaded(response) => {
                if let Some(payload) = response.ok() {
                    self.past_elections = Panel::Ready(past_elections_summary(&payload.elections));
                }
            }
        }
        Vec::new()
    }

    /// Marks sections as loading before their refresh is issued.
    pub fn begin(&mut self, refreshes: &[Refresh]) {
        if refreshes.contains(&Refresh::Voters) {
            self.voters = Panel::Loading;
        }
    }

    pub fn absorb(&mut self, outcome: AdminOutcome) -> Followup {
        match outcome {
            ActionOutcome::Aborted => Followup::default(),
            ActionOutcome::Invalid(alert) | ActionOutcome::Failed(alert) => Followup {
                refreshes: Vec::new(),
                alert: Some(self.alerts.push(alert)),
            },
            ActionOutcome::Succeeded(sync) => {
                if sync.view == Some(View::Login) {
                    *self = AdminState { alerts: std::mem::take(&mut self.alerts), ..Default::default() };
                }
                if let Some(view) = sync.view {
                    self.view = view;
                }
                Followup {
                    refreshes: sync.resync,
                    alert: sync.alert.map(|alert| self.alerts.push(alert)),
                }
            }
        }
    }

    /// Elections that can be started from the start dialog.
    pub fn startable_elections(&self) -> Vec<&Election> {
        self.elections.iter().filter(|e| !e.is_active()).collect()
    }
}
