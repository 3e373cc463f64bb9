use std::sync::Arc;

use futures::FutureExt;
use shared::{domain::PropertyId, protocol::Review};
use tracing::info;

use crate::{
    api::ListingApi,
    auth::CurrentUser,
    list::{ListController, ListState, LoadOutcome},
    review_form::{ReviewForm, ReviewFormOptions},
};

pub struct ReviewList {
    property_id: PropertyId,
    api: Arc<dyn ListingApi>,
    list: ListController<Review>,
}

impl ReviewList {
    pub fn new(api: Arc<dyn ListingApi>, property_id: PropertyId) -> Self {
        Self {
            property_id,
            api,
            list: ListController::new("reviews"),
        }
    }

    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    pub async fn load(&self) -> LoadOutcome {
        let property_id = self.property_id;
        let api = &self.api;
        self.list
            .load(|| async move { api.list_reviews_for_property(property_id).await })
            .await
    }

    pub async fn state(&self) -> ListState<Review> {
        self.list.snapshot().await
    }

    pub async fn unmount(&self) {
        self.list.unmount().await;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
    pub count: usize,
    /// `None` when there are no reviews yet.
    pub average: Option<f64>,
    /// Index 0 holds one-star reviews, index 4 five-star reviews.
    pub distribution: [usize; 5],
}

impl ReviewSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut distribution = [0usize; 5];
        let mut total = 0u32;
        for review in reviews {
            let stars = review.rating.stars();
            distribution[usize::from(stars - 1)] += 1;
            total += u32::from(stars);
        }
        let count = reviews.len();
        let average = (count > 0).then(|| f64::from(total) / count as f64);
        Self {
            count,
            average,
            distribution,
        }
    }
}

/// Reviews block of a listing page: the list plus the form that feeds it.
pub struct ReviewsSection {
    api: Arc<dyn ListingApi>,
    user: Option<CurrentUser>,
    reviews: Arc<ReviewList>,
}

impl ReviewsSection {
    /// Builds the section and performs the initial load.
    pub async fn mount(
        api: Arc<dyn ListingApi>,
        user: Option<CurrentUser>,
        property_id: PropertyId,
    ) -> Self {
        let reviews = Arc::new(ReviewList::new(Arc::clone(&api), property_id));
        reviews.load().await;
        Self { api, user, reviews }
    }

    pub fn property_id(&self) -> PropertyId {
        self.reviews.property_id()
    }

    /// A form for this listing that reloads the list after each accepted review.
    pub fn review_form(&self, options: ReviewFormOptions) -> ReviewForm {
        let reviews = Arc::clone(&self.reviews);
        ReviewForm::new(
            Arc::clone(&self.api),
            self.user.clone(),
            self.property_id(),
            options,
        )
        .on_submitted(Box::new(move |review: Review| {
            let reviews = Arc::clone(&reviews);
            async move {
                info!(review_id = review.id.0, "refreshing reviews after submission");
                reviews.load().await;
            }
            .boxed()
        }))
    }

    pub async fn refresh(&self) -> LoadOutcome {
        self.reviews.load().await
    }

    pub async fn state(&self) -> ListState<Review> {
        self.reviews.state().await
    }

    pub async fn summary(&self) -> ReviewSummary {
        ReviewSummary::from_reviews(&self.reviews.state().await.items)
    }

    pub async fn unmount(&self) {
        self.reviews.unmount().await;
    }
}

#[cfg(test)]
#[path = "tests/reviews_tests.rs"]
mod tests;
