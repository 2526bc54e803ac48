pub mod action;
pub mod admin;
pub mod alert;
pub mod ballot;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod poller;
pub mod portal;
pub mod render;
pub mod session;
pub mod validation;

pub use action::{ActionOutcome, Confirm};
pub use alert::{Alert, AlertLevel, Alerts};
pub use ballot::{FlowError, VotingFlow};
pub use config::CONFIG;
pub use error::{ClientError, ErrorResponse, Result, TransportError};
pub use gateway::{ApiRequest, ApiResponse, Gateway, Transport, UploadFile};
pub use models::*;
pub use session::{ProbeOutcome, Session, View};
pub use validation::*;

#[cfg(test)]
mod tests;
