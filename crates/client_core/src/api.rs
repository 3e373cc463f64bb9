use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::PropertyId,
    protocol::{
        ApiEnvelope, ContactAcknowledgement, ContactMessage, CreateReviewRequest,
        PropertyDetailResponse, PropertyListResponse, PropertySummary, Review,
        ReviewListResponse,
    },
};
use tracing::debug;
use url::Url;

use crate::{auth::CurrentUser, error::ApiClientError};

/// Domain calls against the external listings service.
#[async_trait]
pub trait ListingApi: Send + Sync {
    async fn create_review(
        &self,
        user: &CurrentUser,
        request: &CreateReviewRequest,
    ) -> Result<Review, ApiClientError>;

    async fn create_contact_message(
        &self,
        message: &ContactMessage,
    ) -> Result<ContactAcknowledgement, ApiClientError>;

    async fn list_reviews_for_property(
        &self,
        property_id: PropertyId,
    ) -> Result<Vec<Review>, ApiClientError>;

    async fn list_properties(&self) -> Result<Vec<PropertySummary>, ApiClientError>;

    async fn get_property(&self, property_id: PropertyId)
        -> Result<PropertySummary, ApiClientError>;
}

pub struct HttpListingApi {
    http: Client,
    base_url: String,
}

impl HttpListingApi {
    pub fn new(base_url: &str) -> Result<Self, ApiClientError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ApiClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|source| ApiClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Unwraps the `{success, data}` envelope of a finished response.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ApiClientError> {
    let response = response.error_for_status()?;
    let body = response.bytes().await?;
    let envelope: ApiEnvelope<T> = serde_json::from_slice(&body)
        .map_err(|e| ApiClientError::Malformed(e.to_string()))?;
    if !envelope.success {
        return Err(ApiClientError::Rejected {
            message: envelope.message,
        });
    }
    Ok(envelope.data)
}

fn require_data<T>(data: Option<T>, what: &str) -> Result<T, ApiClientError> {
    data.ok_or_else(|| ApiClientError::Malformed(format!("response is missing {what}")))
}

#[async_trait]
impl ListingApi for HttpListingApi {
    async fn create_review(
        &self,
        user: &CurrentUser,
        request: &CreateReviewRequest,
    ) -> Result<Review, ApiClientError> {
        request.validate()?;
        debug!(
            property_id = request.property_id.0,
            user_id = user.user_id.0,
            "posting review"
        );
        let response = self
            .http
            .post(self.endpoint("reviews"))
            .bearer_auth(&user.access_token)
            .json(request)
            .send()
            .await?;
        require_data(read_envelope(response).await?, "review")
    }

    async fn create_contact_message(
        &self,
        message: &ContactMessage,
    ) -> Result<ContactAcknowledgement, ApiClientError> {
        message.validate()?;
        debug!(property_id = message.property_id.0, "posting contact message");
        let response = self
            .http
            .post(self.endpoint("contact"))
            .json(message)
            .send()
            .await?;
        Ok(read_envelope(response).await?.unwrap_or_default())
    }

    async fn list_reviews_for_property(
        &self,
        property_id: PropertyId,
    ) -> Result<Vec<Review>, ApiClientError> {
        property_id.validate()?;
        let response = self
            .http
            .get(self.endpoint(&format!("properties/{property_id}/reviews")))
            .send()
            .await?;
        let body: ReviewListResponse = require_data(read_envelope(response).await?, "reviews")?;
        Ok(body.reviews)
    }

    async fn list_properties(&self) -> Result<Vec<PropertySummary>, ApiClientError> {
        let response = self.http.get(self.endpoint("properties")).send().await?;
        let body: PropertyListResponse =
            require_data(read_envelope(response).await?, "properties")?;
        Ok(body.properties)
    }

    async fn get_property(
        &self,
        property_id: PropertyId,
    ) -> Result<PropertySummary, ApiClientError> {
        property_id.validate()?;
        let response = self
            .http
            .get(self.endpoint(&format!("properties/{property_id}")))
            .send()
            .await?;
        let body: PropertyDetailResponse =
            require_data(read_envelope(response).await?, "property")?;
        Ok(body.property)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
