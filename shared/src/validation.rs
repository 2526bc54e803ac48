use crate::models::VoterRequest;

pub const DELETE_CONFIRMATION_PHRASE: &str = "DELETE";
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter the admin password")]
    MissingPassword,
    #[error("Please enter election title")]
    MissingElectionTitle,
    #[error("Please select an election")]
    NoElectionSelected,
    #[error("Please enter candidate name")]
    MissingCandidateName,
    #[error("Please fill all fields")]
    IncompleteVoter,
    #[error("All fields are required")]
    IncompleteVoterEdit,
    #[error("Please type \"DELETE\" to confirm")]
    ConfirmationMismatch,
    #[error("Please select a photo")]
    MissingPhoto,
    #[error("Please select a valid image file")]
    NotAnImage,
    #[error("Photo size must be less than 5MB")]
    PhotoTooLarge,
    #[error("Please select an Excel file")]
    MissingSpreadsheet,
}

/// Trims `value` and rejects it when nothing is left.
pub fn required(value: &str, err: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn validate_voter(voter: &VoterRequest, err: ValidationError) -> Result<VoterRequest, ValidationError> {
    Ok(VoterRequest {
        name: required(&voter.name, err.clone())?,
        phone: required(&voter.phone, err.clone())?,
        roll_number: required(&voter.roll_number, err.clone())?,
        email: required(&voter.email, err)?,
    })
}

/// The phrase is compared exactly: no trimming, no case folding.
pub fn confirm_phrase(typed: &str) -> Result<(), ValidationError> {
    if typed == DELETE_CONFIRMATION_PHRASE {
        Ok(())
    } else {
        Err(ValidationError::ConfirmationMismatch)
    }
}

pub fn validate_photo(content_type: &str, size: usize) -> Result<(), ValidationError> {
    if !content_type.starts_with("image/") {
        return Err(ValidationError::NotAnImage);
    }
    if size > MAX_PHOTO_BYTES {
        return Err(ValidationError::PhotoTooLarge);
    }
    Ok(())
}
