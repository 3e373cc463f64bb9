pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod contact_form;
pub mod error;
pub mod form;
pub mod list;
pub mod review_form;
pub mod reviews;

pub use api::{HttpListingApi, ListingApi};
pub use auth::CurrentUser;
pub use catalog::{PropertyCatalog, PropertyFilter};
pub use contact_form::ContactForm;
pub use error::ApiClientError;
pub use form::{FormPhase, FormState, SubmitOutcome};
pub use list::{ListState, LoadOutcome};
pub use review_form::{ReviewForm, ReviewFormOptions};
pub use reviews::{ReviewList, ReviewSummary, ReviewsSection};

#[cfg(test)]
#[path = "tests/fake_api.rs"]
pub(crate) mod fake_api;
