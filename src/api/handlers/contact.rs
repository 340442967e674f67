use crate::RelayState;
use crate::api::error::AppError;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A contact-form submission. All fields are required; `#[serde(default)]`
/// folds absent fields into empty strings so both cases fail the same
/// length validation with a 400.
#[derive(Deserialize, Validate, ToSchema)]
pub struct ContactRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ContactResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/send-email",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Notification and confirmation sent", body = ContactResponse),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "SMTP relay failure")
    ),
    tag = "contact"
)]
pub async fn send_contact(
    State(state): State<RelayState>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    req.validate()
        .map_err(|_| AppError::BadRequest("Missing required fields".to_string()))?;

    state
        .mailer
        .send_contact(&req.name, &req.email, &req.message)
        .await?;

    Ok(Json(ContactResponse {
        message: "Emails sent successfully".to_string(),
    }))
}
