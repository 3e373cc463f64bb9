//! In-process `ListingApi` used by the controller tests.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use shared::{
    domain::{ListingType, PropertyId, Rating, ReviewId},
    protocol::{
        ContactAcknowledgement, ContactMessage, CreateReviewRequest, PropertySummary, Review,
    },
};
use tokio::sync::{Mutex, Semaphore};

use crate::{api::ListingApi, auth::CurrentUser, error::ApiClientError};

#[derive(Default)]
struct FakeState {
    reviews: HashMap<PropertyId, Vec<Review>>,
    properties: Vec<PropertySummary>,
    contact_messages: Vec<ContactMessage>,
    review_requests: Vec<(CurrentUser, CreateReviewRequest)>,
    fail_contact: bool,
    fail_review: bool,
    fail_list: bool,
    contact_calls: u32,
    review_calls: u32,
    list_calls: u32,
    next_review_id: i64,
}

pub(crate) struct FakeListingApi {
    state: Mutex<FakeState>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeListingApi {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_review_id: 100,
                ..FakeState::default()
            }),
            gate: None,
        }
    }

    /// Every call waits for a permit on the returned semaphore before resolving.
    pub(crate) fn gated(self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (
            Self {
                state: self.state,
                gate: Some(Arc::clone(&gate)),
            },
            gate,
        )
    }

    pub(crate) async fn with_reviews(self, property_id: PropertyId, reviews: Vec<Review>) -> Self {
        self.state.lock().await.reviews.insert(property_id, reviews);
        self
    }

    pub(crate) async fn with_properties(self, properties: Vec<PropertySummary>) -> Self {
        self.state.lock().await.properties = properties;
        self
    }

    pub(crate) async fn set_fail_contact(&self, fail: bool) {
        self.state.lock().await.fail_contact = fail;
    }

    pub(crate) async fn set_fail_review(&self, fail: bool) {
        self.state.lock().await.fail_review = fail;
    }

    pub(crate) async fn set_fail_list(&self, fail: bool) {
        self.state.lock().await.fail_list = fail;
    }

    pub(crate) async fn contact_calls(&self) -> u32 {
        self.state.lock().await.contact_calls
    }

    pub(crate) async fn review_calls(&self) -> u32 {
        self.state.lock().await.review_calls
    }

    pub(crate) async fn list_calls(&self) -> u32 {
        self.state.lock().await.list_calls
    }

    pub(crate) async fn contact_messages(&self) -> Vec<ContactMessage> {
        self.state.lock().await.contact_messages.clone()
    }

    pub(crate) async fn review_requests(&self) -> Vec<(CurrentUser, CreateReviewRequest)> {
        self.state.lock().await.review_requests.clone()
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate open").forget();
        }
    }
}

fn unavailable() -> ApiClientError {
    ApiClientError::Status {
        status: StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[async_trait]
impl ListingApi for FakeListingApi {
    async fn create_review(
        &self,
        user: &CurrentUser,
        request: &CreateReviewRequest,
    ) -> Result<Review, ApiClientError> {
        self.state.lock().await.review_calls += 1;
        self.pass_gate().await;

        let mut state = self.state.lock().await;
        state
            .review_requests
            .push((user.clone(), request.clone()));
        if state.fail_review {
            return Err(unavailable());
        }
        state.next_review_id += 1;
        let review = Review {
            id: ReviewId(state.next_review_id),
            property_id: request.property_id,
            rating: request.rating,
            title: request.title.clone(),
            comment: request.comment.clone(),
            author_name: user.display_name.clone(),
            created_at: Utc::now(),
        };
        state
            .reviews
            .entry(request.property_id)
            .or_default()
            .push(review.clone());
        Ok(review)
    }

    async fn create_contact_message(
        &self,
        message: &ContactMessage,
    ) -> Result<ContactAcknowledgement, ApiClientError> {
        self.state.lock().await.contact_calls += 1;
        self.pass_gate().await;

        let mut state = self.state.lock().await;
        if state.fail_contact {
            return Err(unavailable());
        }
        state.contact_messages.push(message.clone());
        Ok(ContactAcknowledgement {
            id: Some(state.contact_messages.len() as i64),
            message: Some("received".into()),
        })
    }

    async fn list_reviews_for_property(
        &self,
        property_id: PropertyId,
    ) -> Result<Vec<Review>, ApiClientError> {
        self.state.lock().await.list_calls += 1;
        self.pass_gate().await;

        let state = self.state.lock().await;
        if state.fail_list {
            return Err(unavailable());
        }
        Ok(state.reviews.get(&property_id).cloned().unwrap_or_default())
    }

    async fn list_properties(&self) -> Result<Vec<PropertySummary>, ApiClientError> {
        self.state.lock().await.list_calls += 1;
        self.pass_gate().await;

        let state = self.state.lock().await;
        if state.fail_list {
            return Err(unavailable());
        }
        Ok(state.properties.clone())
    }

    async fn get_property(
        &self,
        property_id: PropertyId,
    ) -> Result<PropertySummary, ApiClientError> {
        self.state
            .lock()
            .await
            .properties
            .iter()
            .find(|property| property.id == property_id)
            .cloned()
            .ok_or(ApiClientError::Status {
                status: StatusCode::NOT_FOUND,
            })
    }
}

pub(crate) fn sample_review(id: i64, property_id: PropertyId, stars: u8) -> Review {
    Review {
        id: ReviewId(id),
        property_id,
        rating: Rating::new(stars).expect("rating"),
        title: Some(format!("review {id}")),
        comment: None,
        author_name: "Akosua".into(),
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp"),
    }
}

pub(crate) fn sample_property(
    id: i64,
    title: &str,
    city: &str,
    property_type: &str,
    listing_type: ListingType,
    price: f64,
    bedrooms: u32,
) -> PropertySummary {
    PropertySummary {
        id: PropertyId(id),
        title: title.into(),
        city: city.into(),
        property_type: property_type.into(),
        listing_type,
        price,
        bedrooms,
        bathrooms: 1,
    }
}

pub(crate) fn signed_in_user() -> CurrentUser {
    CurrentUser::new(shared::domain::UserId(7), "Kwame", "token-7")
}
