use std::sync::Arc;

use futures::future::BoxFuture;
use shared::{
    domain::{PropertyId, Rating},
    error::{require_text, ValidationError},
    protocol::{CreateReviewRequest, Review},
};
use tracing::info;

use crate::{
    api::ListingApi,
    auth::CurrentUser,
    form::{FormConfig, FormController, FormFields, FormState, SubmitOutcome},
};

pub const RATING: &str = "rating";
pub const TITLE: &str = "title";
pub const COMMENT: &str = "comment";

const FAILURE_MESSAGE: &str = "Failed to submit your review. Please try again.";

/// Called with the created review once a submission succeeds.
pub type ReviewSubmittedHook = Box<dyn Fn(Review) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewFormOptions {
    pub title_required: bool,
    pub comment_required: bool,
}

/// Review modal for one listing.
pub struct ReviewForm {
    property_id: PropertyId,
    api: Arc<dyn ListingApi>,
    user: Option<CurrentUser>,
    options: ReviewFormOptions,
    controller: FormController,
    hooks: Vec<ReviewSubmittedHook>,
}

impl ReviewForm {
    pub fn new(
        api: Arc<dyn ListingApi>,
        user: Option<CurrentUser>,
        property_id: PropertyId,
        options: ReviewFormOptions,
    ) -> Self {
        Self {
            property_id,
            api,
            user,
            options,
            controller: FormController::new(
                FormFields::blank(&[RATING, TITLE, COMMENT]),
                FormConfig {
                    failure_message: FAILURE_MESSAGE.to_string(),
                    reset_on_success: false,
                },
            ),
            hooks: Vec::new(),
        }
    }

    pub fn on_submitted(mut self, hook: ReviewSubmittedHook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn requires_login(&self) -> bool {
        self.user.is_none()
    }

    /// Star buttons only produce 1..=5; anything else leaves the rating as is.
    /// `Ok(false)` means the pick was dropped because a submission is in flight.
    pub async fn select_rating(&self, stars: u8) -> Result<bool, ValidationError> {
        let rating = Rating::new(stars)?;
        Ok(self
            .controller
            .set_field(RATING, rating.stars().to_string())
            .await)
    }

    pub async fn set_title(&self, title: impl Into<String>) -> bool {
        self.controller.set_field(TITLE, title).await
    }

    pub async fn set_comment(&self, comment: impl Into<String>) -> bool {
        self.controller.set_field(COMMENT, comment).await
    }

    pub async fn state(&self) -> FormState {
        self.controller.snapshot().await
    }

    /// Modal dismissal: drops the draft and any error.
    /// Refused (false) while the review is being submitted.
    pub async fn close(&self) -> bool {
        self.controller.reset().await
    }

    pub async fn submit(&self) -> SubmitOutcome<Review> {
        let Some(user) = self.user.clone() else {
            info!(
                property_id = self.property_id.0,
                "review submission needs a signed-in user"
            );
            return SubmitOutcome::LoginRequired;
        };

        let property_id = self.property_id;
        let options = self.options;
        let api = Arc::clone(&self.api);
        let outcome = self
            .controller
            .submit_with(
                |fields| build_request(property_id, options, fields),
                |request| async move { api.create_review(&user, &request).await },
            )
            .await;

        if let SubmitOutcome::Succeeded(review) = &outcome {
            info!(
                property_id = property_id.0,
                review_id = review.id.0,
                "review submitted"
            );
            for hook in &self.hooks {
                hook(review.clone()).await;
            }
        }
        outcome
    }
}

fn optional_text(
    field: &'static str,
    value: &str,
    required: bool,
) -> Result<Option<String>, ValidationError> {
    if required {
        return require_text(field, value).map(|v| Some(v.to_string()));
    }
    let trimmed = value.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn build_request(
    property_id: PropertyId,
    options: ReviewFormOptions,
    fields: &FormFields,
) -> Result<CreateReviewRequest, ValidationError> {
    let stars = require_text(RATING, fields.get(RATING))?;
    let rating = stars
        .parse::<u8>()
        .map_err(|_| ValidationError::missing(RATING))
        .and_then(Rating::new)?;
    let request = CreateReviewRequest {
        property_id,
        rating,
        title: optional_text(TITLE, fields.get(TITLE), options.title_required)?,
        comment: optional_text(COMMENT, fields.get(COMMENT), options.comment_required)?,
    };
    request.validate()?;
    Ok(request)
}

#[cfg(test)]
#[path = "tests/review_form_tests.rs"]
mod tests;
