use crate::alert::Alert;
use crate::gateway::ApiResponse;
use crate::validation::ValidationError;

/// Shown when the server rejects a request without saying why.
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

/// Shown when a picked file exists but the browser could not read it.
pub const FILE_UNREADABLE_MESSAGE: &str = "The selected file could not be read. Please choose it again.";

/// Guard for destructive actions. Returning `false` aborts before any request
/// is sent.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// How a user-triggered action ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome<T> {
    /// The user declined a confirmation; nothing was sent and nothing is shown.
    Aborted,
    /// Local validation failed before any request.
    Invalid(Alert),
    /// The server (or the network) said no.
    Failed(Alert),
    Succeeded(T),
}

impl<T> ActionOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Succeeded(_))
    }

    pub fn alert(&self) -> Option<&Alert> {
        match self {
            ActionOutcome::Invalid(alert) | ActionOutcome::Failed(alert) => Some(alert),
            _ => None,
        }
    }

    pub fn unreadable_file() -> Self {
        ActionOutcome::Failed(Alert::danger(FILE_UNREADABLE_MESSAGE))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionOutcome<U> {
        match self {
            ActionOutcome::Aborted => ActionOutcome::Aborted,
            ActionOutcome::Invalid(alert) => ActionOutcome::Invalid(alert),
            ActionOutcome::Failed(alert) => ActionOutcome::Failed(alert),
            ActionOutcome::Succeeded(value) => ActionOutcome::Succeeded(f(value)),
        }
    }
}

impl<T> From<ValidationError> for ActionOutcome<T> {
    fn from(err: ValidationError) -> Self {
        ActionOutcome::Invalid(err.into())
    }
}

/// Success runs `on_success` with the payload and the server's message;
/// failure surfaces the server's message verbatim as a danger alert.
pub fn settle<P, T>(
    response: ApiResponse<P>,
    on_success: impl FnOnce(Option<P>, Option<String>) -> T,
) -> ActionOutcome<T> {
    if response.success {
        ActionOutcome::Succeeded(on_success(response.payload, response.message))
    } else {
        ActionOutcome::Failed(Alert::danger(response.message_or(REQUEST_FAILED_MESSAGE)))
    }
}
