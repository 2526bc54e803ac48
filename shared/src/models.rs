use serde::{Deserialize, Deserializer, Serialize};
use time::PrimitiveDateTime;
use time::macros::format_description;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    Active,
    Ended,
    #[default]
    #[serde(other)]
    Created,
}

impl ElectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ElectionStatus::Created => "Created",
            ElectionStatus::Active => "Active",
            ElectionStatus::Ended => "Ended",
        }
    }
}

/// The backend stores "no photo" as an empty string.
fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voter {
    pub name: String,
    pub roll_number: String,
    pub phone: String,
    pub email: String,
    #[serde(default, deserialize_with = "non_blank")]
    pub photo: Option<String>,
    #[serde(default)]
    pub has_voted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Election {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ElectionStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub total_votes: Option<u64>,
}

impl Election {
    pub fn is_active(&self) -> bool {
        self.status == ElectionStatus::Active
    }

    pub fn is_ended(&self) -> bool {
        self.status == ElectionStatus::Ended
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "non_blank")]
    pub photo: Option<String>,
    #[serde(default)]
    pub votes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ElectionResults {
    #[serde(default)]
    pub election: Option<Election>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub total_votes: u64,
}

// Response payloads. Each is decoded from the same JSON object that carries
// `success` and `message`.

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Empty {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ElectionsPayload {
    #[serde(default)]
    pub elections: Vec<Election>,
    #[serde(default)]
    pub current_election: Option<Election>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CandidatesPayload {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VotersPayload {
    #[serde(default)]
    pub voters: Vec<Voter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultsPayload {
    #[serde(default)]
    pub results: Option<ElectionResults>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoterInfoPayload {
    pub voter: Voter,
    #[serde(default)]
    pub has_voted: bool,
    #[serde(default)]
    pub current_election: Option<Election>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifiedVoterPayload {
    pub voter: Voter,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActiveElectionPayload {
    #[serde(default)]
    pub election: Option<Election>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VoterStatusPayload {
    #[serde(default)]
    pub has_voted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UploadPayload {
    #[serde(default, deserialize_with = "non_blank")]
    pub filename: Option<String>,
}

// Request bodies.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminLoginRequest {
    pub secret_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateElectionRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElectionIdRequest {
    pub election_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddCandidateRequest {
    pub name: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateIdRequest {
    pub candidate_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoterRequest {
    pub name: String,
    pub phone: String,
    pub roll_number: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateVoterRequest {
    pub original_phone: String,
    #[serde(flatten)]
    pub voter: VoterRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhoneRequest {
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastVoteRequest {
    pub candidate_id: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenRequest {
    pub id_token: String,
}

/// Renders a backend timestamp (naive ISO-8601, optionally with fractional
/// seconds or an offset) as `YYYY-MM-DD HH:MM`. Unparseable input is
/// returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    let input = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let output = format_description!("[year]-[month]-[day] [hour]:[minute]");

    raw.get(..19)
        .and_then(|head| PrimitiveDateTime::parse(head, input).ok())
        .and_then(|dt| dt.format(output).ok())
        .unwrap_or_else(|| raw.to_string())
}

/// Date-only variant used by the election listings.
pub fn format_date(raw: &str) -> String {
    let formatted = format_timestamp(raw);
    if formatted.len() == 16 && formatted != raw {
        formatted[..10].to_string()
    } else {
        formatted
    }
}
