//! View-models for everything the two consoles display.
//!
//! These are pure functions of server payloads. The frontend turns them into
//! markup; nothing here touches the network or mutable state.

use crate::config::CONFIG;
use crate::models::{format_date, format_timestamp, Candidate, Election, ElectionResults, ElectionStatus, Voter};

pub const PAST_ELECTIONS_SHOWN: usize = 5;

/// A list that is either populated or carries the message to show instead of
/// an empty container.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Empty(&'static str),
    Items(Vec<T>),
}

impl<T> Listing<T> {
    pub fn from_items(items: Vec<T>, empty: &'static str) -> Self {
        if items.is_empty() {
            Listing::Empty(empty)
        } else {
            Listing::Items(items)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Listing::Empty(_) => &[],
            Listing::Items(items) => items,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Listing::Empty(_))
    }
}

/// `votes / total * 100` rounded to one decimal, `0` when nobody has voted.
pub fn vote_percentage(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (votes as f64 / total as f64 * 1000.0).round() / 10.0
}

pub fn format_percentage(votes: u64, total: u64) -> String {
    if total == 0 {
        "0".to_string()
    } else {
        format!("{:.1}", vote_percentage(votes, total))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyLabel {
    Leading,
    Winner,
}

impl TallyLabel {
    pub fn text(self) -> &'static str {
        match self {
            TallyLabel::Leading => "Leading",
            TallyLabel::Winner => "Winner",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TallyRow {
    pub id: String,
    pub name: String,
    pub photo: Option<String>,
    pub votes: u64,
    pub percentage: f64,
    pub percentage_label: String,
    pub is_leader: bool,
}

/// Orders candidates by descending votes and flags the leader.
///
/// The backend already sends candidates in that order; the stable sort makes
/// the contract hold even when it does not, and keeps the server's order
/// among ties. Only the first row can lead, and only with at least one vote.
pub fn tally_rows(candidates: &[Candidate], total_votes: u64) -> Vec<TallyRow> {
    let mut ordered: Vec<&Candidate> = candidates.iter().collect();
    ordered.sort_by(|a, b| b.votes.cmp(&a.votes));

    ordered.into_iter()
        .enumerate()
        .map(|(index, candidate)| TallyRow {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            photo: candidate.photo.clone(),
            votes: candidate.votes,
            percentage: vote_percentage(candidate.votes, total_votes),
            percentage_label: format_percentage(candidate.votes, total_votes),
            is_leader: index == 0 && candidate.votes > 0,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectionSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ElectionStatus,
    pub created: Option<String>,
    pub started: Option<String>,
    pub ended: Option<String>,
}

impl ElectionSummary {
    pub fn from_election(election: &Election) -> Self {
        Self {
            id: election.id.clone(),
            title: election.title.clone(),
            description: election.description.clone(),
            status: election.status,
            created: election.created_at.as_deref().map(format_timestamp),
            started: election.started_at.as_deref().map(format_timestamp),
            ended: election.ended_at.as_deref().map(format_timestamp),
        }
    }

    pub fn status_text(&self) -> &'static str {
        if self.status == ElectionStatus::Ended { "Completed" } else { "Active" }
    }

    pub fn period(&self) -> String {
        format!(
            "{} - {}",
            self.started.as_deref().unwrap_or("-"),
            self.ended.as_deref().unwrap_or("Ongoing"),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TallyView {
    pub election: Option<ElectionSummary>,
    pub total_votes: u64,
    pub candidate_count: usize,
    pub label: TallyLabel,
    pub rows: Listing<TallyRow>,
}

impl TallyView {
    pub fn leader(&self) -> Option<&TallyRow> {
        self.rows.items().first().filter(|row| row.is_leader)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Unavailable(&'static str),
    Tally(TallyView),
}

fn tally_view(results: &ElectionResults, label: TallyLabel, empty: &'static str) -> TallyView {
    TallyView {
        election: results.election.as_ref().map(ElectionSummary::from_election),
        total_votes: results.total_votes,
        candidate_count: results.candidates.len(),
        label,
        rows: Listing::from_items(tally_rows(&results.candidates, results.total_votes), empty),
    }
}

/// Live tally on the admin dashboard.
pub fn admin_results_view(results: Option<&ElectionResults>) -> ResultsView {
    match results {
        Some(results) if results.election.is_some() => ResultsView::Tally(tally_view(
            results,
            TallyLabel::Leading,
            "No candidates registered yet. Add candidates to see voting results.",
        )),
        _ => ResultsView::Unavailable("No active election. Start an election to see results."),
    }
}

/// Per-election breakdown opened from the elections list.
pub fn election_details_view(results: &ElectionResults) -> ResultsView {
    ResultsView::Tally(tally_view(
        results,
        TallyLabel::Winner,
        "No candidates or votes in this election.",
    ))
}

/// Results as a voter sees them.
pub fn portal_results_view(results: Option<&ElectionResults>) -> ResultsView {
    match results {
        Some(results) if !results.candidates.is_empty() => ResultsView::Tally(tally_view(
            results,
            TallyLabel::Winner,
            "No results available",
        )),
        _ => ResultsView::Unavailable("No results available"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectionCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ElectionStatus,
    pub created: Option<String>,
    pub ended: Option<String>,
    pub total_votes: Option<u64>,
    pub can_view_results: bool,
    pub can_delete: bool,
}

pub fn election_cards(elections: &[Election]) -> Listing<ElectionCard> {
    let cards = elections.iter()
        .map(|election| ElectionCard {
            id: election.id.clone(),
            title: election.title.clone(),
            description: election.description.clone(),
            status: election.status,
            created: election.created_at.as_deref().map(format_date),
            ended: election.ended_at.as_deref().map(format_date),
            total_votes: election.total_votes,
            can_view_results: election.is_ended(),
            can_delete: !election.is_active(),
        })
        .collect();
    Listing::from_items(cards, "No elections created yet.")
}

#[derive(Debug, Clone, PartialEq)]
pub struct PastElectionRow {
    pub id: String,
    pub title: String,
    pub ended: String,
    pub total_votes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PastElections {
    pub rows: Listing<PastElectionRow>,
    pub truncated: bool,
}

/// Ended elections in server order, capped at [`PAST_ELECTIONS_SHOWN`].
pub fn past_elections_summary(elections: &[Election]) -> PastElections {
    let ended: Vec<&Election> = elections.iter().filter(|e| e.is_ended()).collect();
    let rows = ended.iter()
        .take(PAST_ELECTIONS_SHOWN)
        .map(|election| PastElectionRow {
            id: election.id.clone(),
            title: election.title.clone(),
            ended: election.ended_at.as_deref().map(format_date).unwrap_or_default(),
            total_votes: election.total_votes.unwrap_or(0),
        })
        .collect();

    PastElections {
        rows: Listing::from_items(rows, "No completed elections yet."),
        truncated: ended.len() > PAST_ELECTIONS_SHOWN,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub id: String,
    pub name: String,
    pub photo: Option<String>,
}

pub fn candidate_rows(candidates: &[Candidate]) -> Listing<CandidateRow> {
    let rows = candidates.iter()
        .map(|c| CandidateRow { id: c.id.clone(), name: c.name.clone(), photo: c.photo.clone() })
        .collect();
    Listing::from_items(rows, "No candidates added yet.")
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoterRow {
    pub name: String,
    pub roll_number: String,
    pub phone: String,
    pub email: String,
    pub has_voted: bool,
    pub has_photo: bool,
}

impl VoterRow {
    pub fn voted_label(&self) -> &'static str {
        if self.has_voted { "Voted" } else { "Not Voted" }
    }
}

pub fn voter_rows(voters: &[Voter]) -> Listing<VoterRow> {
    let rows = voters.iter()
        .map(|v| VoterRow {
            name: v.name.clone(),
            roll_number: v.roll_number.clone(),
            phone: v.phone.clone(),
            email: v.email.clone(),
            has_voted: v.has_voted,
            has_photo: v.photo.is_some(),
        })
        .collect();
    Listing::from_items(rows, "No voters registered yet.")
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusPanel {
    Active { title: String, description: String },
    Inactive,
}

impl StatusPanel {
    pub fn title(&self) -> String {
        match self {
            StatusPanel::Active { title, .. } => format!("Active: {}", title),
            StatusPanel::Inactive => "No Active Election".to_string(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            StatusPanel::Active { description, .. } => description,
            StatusPanel::Inactive => "Create or start an election to begin voting",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, StatusPanel::Active { .. })
    }
}

pub fn admin_status_panel(current: Option<&Election>) -> StatusPanel {
    match current {
        Some(election) if election.is_active() => StatusPanel::Active {
            title: election.title.clone(),
            description: election.description.clone(),
        },
        _ => StatusPanel::Inactive,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortalBanner {
    Loading,
    Voted { title: String },
    ReadyToVote { title: String, description: String, started: Option<String> },
    Ended { title: String, ended: Option<String> },
    NoElection,
    Error,
}

impl PortalBanner {
    pub fn can_vote(&self) -> bool {
        matches!(self, PortalBanner::ReadyToVote { .. })
    }

    pub fn shows_results(&self) -> bool {
        matches!(self, PortalBanner::Voted { .. } | PortalBanner::Ended { .. })
    }
}

/// Picks the voter's banner: an active election wins, then the most recent
/// ended one, then nothing.
pub fn portal_banner(active: Option<&Election>, has_voted: bool, last_ended: Option<&Election>) -> PortalBanner {
    match (active, last_ended) {
        (Some(election), _) if has_voted => PortalBanner::Voted { title: election.title.clone() },
        (Some(election), _) => PortalBanner::ReadyToVote {
            title: election.title.clone(),
            description: election.description.clone(),
            started: election.started_at.as_deref().map(format_timestamp),
        },
        (None, Some(election)) => PortalBanner::Ended {
            title: election.title.clone(),
            ended: election.ended_at.as_deref().map(format_timestamp),
        },
        (None, None) => PortalBanner::NoElection,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BallotChoice {
    pub id: String,
    pub name: String,
    pub photo: Option<String>,
    pub selected: bool,
}

pub fn ballot_choices(candidates: &[Candidate], selected: Option<&str>) -> Listing<BallotChoice> {
    let choices = candidates.iter()
        .map(|c| BallotChoice {
            id: c.id.clone(),
            name: c.name.clone(),
            photo: c.photo.clone(),
            selected: selected == Some(c.id.as_str()),
        })
        .collect();
    Listing::from_items(choices, "No candidates available for this election")
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoterCard {
    pub name: String,
    pub roll_number: String,
    pub phone: String,
    pub email: String,
    pub photo_url: Option<String>,
}

pub fn voter_card(voter: &Voter) -> VoterCard {
    VoterCard {
        name: voter.name.clone(),
        roll_number: voter.roll_number.clone(),
        phone: voter.phone.clone(),
        email: voter.email.clone(),
        photo_url: voter.photo.as_deref().map(uploaded_photo_url),
    }
}

/// Voter photos are stored server-side by filename.
pub fn uploaded_photo_url(filename: &str) -> String {
    format!("{}/{}", CONFIG.uploads_path.trim_end_matches('/'), filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, votes: u64) -> Candidate {
        Candidate { id: id.into(), name: id.into(), photo: None, votes }
    }

    #[test]
    fn percentage_is_zero_without_votes() {
        assert_eq!(vote_percentage(0, 0), 0.0);
        assert_eq!(vote_percentage(7, 0), 0.0);
        assert_eq!(format_percentage(0, 0), "0");
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(vote_percentage(1, 3), 33.3);
        assert_eq!(vote_percentage(2, 3), 66.7);
        assert_eq!(vote_percentage(10, 20), 50.0);
        assert_eq!(format_percentage(10, 20), "50.0");
        assert_eq!(format_percentage(1, 8), "12.5");
    }

    #[test]
    fn first_place_with_zero_votes_is_not_leader() {
        let rows = tally_rows(&[candidate("A", 0), candidate("B", 0)], 0);
        assert!(rows.iter().all(|r| !r.is_leader));
        assert!(rows.iter().all(|r| r.percentage == 0.0));
    }

    #[test]
    fn tie_keeps_server_order_and_marks_first() {
        let rows = tally_rows(&[candidate("A", 10), candidate("B", 10)], 20);
        assert_eq!(rows[0].name, "A");
        assert!(rows[0].is_leader);
        assert!(!rows[1].is_leader);
        assert_eq!(rows[0].percentage_label, "50.0");
        assert_eq!(rows[1].percentage_label, "50.0");
    }

    #[test]
    fn unsorted_input_is_reordered_before_marking_leader() {
        let rows = tally_rows(&[candidate("A", 1), candidate("B", 4), candidate("C", 0)], 5);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["B", "A", "C"]);
        assert!(rows[0].is_leader);
        assert_eq!(rows.iter().filter(|r| r.is_leader).count(), 1);
    }

    #[test]
    fn empty_candidate_list_renders_empty_state() {
        let results = ElectionResults {
            election: Some(Election {
                id: "e1".into(),
                title: "Council".into(),
                description: String::new(),
                status: ElectionStatus::Active,
                created_at: None,
                started_at: None,
                ended_at: None,
                total_votes: None,
            }),
            candidates: vec![],
            total_votes: 0,
        };
        let ResultsView::Tally(view) = admin_results_view(Some(&results)) else {
            panic!("expected a tally");
        };
        assert_eq!(
            view.rows,
            Listing::Empty("No candidates registered yet. Add candidates to see voting results.")
        );
        assert!(view.leader().is_none());
        assert_eq!(portal_results_view(Some(&results)), ResultsView::Unavailable("No results available"));
    }

    #[test]
    fn admin_results_without_election_is_unavailable() {
        assert!(matches!(admin_results_view(None), ResultsView::Unavailable(_)));
        let results = ElectionResults::default();
        assert!(matches!(admin_results_view(Some(&results)), ResultsView::Unavailable(_)));
    }

    #[test]
    fn banner_prefers_active_election() {
        let active = Election {
            id: "e2".into(),
            title: "Prefect".into(),
            description: "Pick one".into(),
            status: ElectionStatus::Active,
            created_at: None,
            started_at: Some("2024-03-05T14:30:00.123456".into()),
            ended_at: None,
            total_votes: None,
        };
        match portal_banner(Some(&active), false, None) {
            PortalBanner::ReadyToVote { started, .. } => assert_eq!(started.as_deref(), Some("2024-03-05 14:30")),
            other => panic!("unexpected banner {:?}", other),
        }
        assert_eq!(portal_banner(Some(&active), true, None), PortalBanner::Voted { title: "Prefect".into() });
        assert_eq!(portal_banner(None, false, None), PortalBanner::NoElection);
    }
}
