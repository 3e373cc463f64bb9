use std::sync::Arc;

use shared::{
    domain::PropertyId,
    error::{require_text, ValidationError},
    protocol::{ContactAcknowledgement, ContactMessage},
};
use tracing::info;

use crate::{
    api::ListingApi,
    form::{FormConfig, FormController, FormFields, FormState, SubmitOutcome},
};

pub const FULL_NAME: &str = "full_name";
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";
pub const MESSAGE: &str = "message";

const FAILURE_MESSAGE: &str = "Failed to submit your message. Please try again.";

/// "Contact the agent" form on a listing page.
pub struct ContactForm {
    property_id: PropertyId,
    api: Arc<dyn ListingApi>,
    controller: FormController,
}

impl ContactForm {
    pub fn new(api: Arc<dyn ListingApi>, property_id: PropertyId) -> Self {
        let initial = FormFields::blank(&[FULL_NAME, EMAIL, PHONE, MESSAGE]);
        Self {
            property_id,
            api,
            controller: FormController::new(
                initial,
                FormConfig {
                    failure_message: FAILURE_MESSAGE.to_string(),
                    reset_on_success: true,
                },
            ),
        }
    }

    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    pub async fn set_field(&self, name: &str, value: impl Into<String>) -> bool {
        self.controller.set_field(name, value).await
    }

    pub async fn state(&self) -> FormState {
        self.controller.snapshot().await
    }

    pub async fn reset(&self) -> bool {
        self.controller.reset().await
    }

    pub async fn submit(&self) -> SubmitOutcome<ContactAcknowledgement> {
        let property_id = self.property_id;
        let api = Arc::clone(&self.api);
        let outcome = self
            .controller
            .submit_with(
                |fields| build_message(property_id, fields),
                |message| async move { api.create_contact_message(&message).await },
            )
            .await;
        if outcome.is_succeeded() {
            info!(property_id = property_id.0, "contact message sent");
        }
        outcome
    }
}

fn build_message(
    property_id: PropertyId,
    fields: &FormFields,
) -> Result<ContactMessage, ValidationError> {
    let message = ContactMessage {
        property_id,
        full_name: require_text(FULL_NAME, fields.get(FULL_NAME))?.to_string(),
        email: require_text(EMAIL, fields.get(EMAIL))?.to_string(),
        phone: require_text(PHONE, fields.get(PHONE))?.to_string(),
        message: require_text(MESSAGE, fields.get(MESSAGE))?.to_string(),
    };
    message.validate()?;
    Ok(message)
}

#[cfg(test)]
#[path = "tests/contact_form_tests.rs"]
mod tests;
