use std::sync::Arc;

use shared::{
    domain::{ListingType, PropertyId},
    protocol::PropertySummary,
};

use crate::{
    api::ListingApi,
    error::ApiClientError,
    list::{ListController, ListState, LoadOutcome},
};

/// Client-side narrowing of the loaded listings. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub listing_type: Option<ListingType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<u32>,
    pub search: Option<String>,
}

impl PropertyFilter {
    pub fn matches(&self, property: &PropertySummary) -> bool {
        if let Some(city) = non_blank(&self.city) {
            if !property.city.eq_ignore_ascii_case(city) {
                return false;
            }
        }
        if let Some(kind) = non_blank(&self.property_type) {
            if !property.property_type.eq_ignore_ascii_case(kind) {
                return false;
            }
        }
        if self
            .listing_type
            .is_some_and(|listing_type| listing_type != property.listing_type)
        {
            return false;
        }
        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }
        if self
            .min_bedrooms
            .is_some_and(|min| property.bedrooms < min)
        {
            return false;
        }
        if let Some(search) = non_blank(&self.search) {
            let needle = search.to_lowercase();
            let haystack = format!("{} {}", property.title, property.city).to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Listings index backing the properties page.
pub struct PropertyCatalog {
    api: Arc<dyn ListingApi>,
    list: ListController<PropertySummary>,
}

impl PropertyCatalog {
    pub fn new(api: Arc<dyn ListingApi>) -> Self {
        Self {
            api,
            list: ListController::new("properties"),
        }
    }

    pub async fn load(&self) -> LoadOutcome {
        let api = &self.api;
        self.list
            .load(|| async move { api.list_properties().await })
            .await
    }

    pub async fn state(&self) -> ListState<PropertySummary> {
        self.list.snapshot().await
    }

    pub async fn filtered(&self, filter: &PropertyFilter) -> Vec<PropertySummary> {
        self.list
            .snapshot()
            .await
            .items
            .into_iter()
            .filter(|property| filter.matches(property))
            .collect()
    }

    pub async fn featured(&self, limit: usize) -> Vec<PropertySummary> {
        let mut items = self.list.snapshot().await.items;
        items.truncate(limit);
        items
    }

    /// Detail lookup; not cached.
    pub async fn property(&self, property_id: PropertyId) -> Result<PropertySummary, ApiClientError> {
        self.api.get_property(property_id).await
    }

    pub async fn unmount(&self) {
        self.list.unmount().await;
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
