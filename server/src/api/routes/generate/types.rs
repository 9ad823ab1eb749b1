//! Generation API types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("Value cannot be blank".into()))
    } else {
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CharacterResponse {
    pub character: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BiographyRequest {
    #[validate(
        length(max = 100, message = "Character name must be at most 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub character: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BiographyResponse {
    pub character: String,
    pub biography: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct StoryRequest {
    /// Optional theme; blank means no theme
    #[validate(length(max = 200, message = "Theme must be at most 200 characters"))]
    pub theme: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoryResponse {
    pub story: String,
}
