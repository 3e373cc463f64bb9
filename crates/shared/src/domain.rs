use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(PropertyId);
id_newtype!(ReviewId);
id_newtype!(UserId);

impl PropertyId {
    /// Listings are addressed by positive integer ids only.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.0 > 0 {
            Ok(self)
        } else {
            Err(ValidationError::InvalidPropertyId(self.0))
        }
    }
}

/// Star rating attached to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(ValidationError::RatingOutOfRange(stars))
        }
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    Sale,
    Rent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_accepts_only_one_through_five() {
        for stars in 1..=5 {
            assert_eq!(Rating::new(stars).expect("in range").stars(), stars);
        }
        assert!(matches!(
            Rating::new(0),
            Err(ValidationError::RatingOutOfRange(0))
        ));
        assert!(Rating::new(6).is_err());
    }

    #[test]
    fn rating_rejects_out_of_range_on_decode() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn property_id_must_be_positive() {
        assert_eq!(PropertyId(3).validate().expect("valid"), PropertyId(3));
        assert!(PropertyId(0).validate().is_err());
        assert!(PropertyId(-7).validate().is_err());
    }
}
