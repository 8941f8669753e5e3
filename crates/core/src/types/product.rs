//! Catalog product types.

use serde::{Deserialize, Deserializer, Serialize, de};

use super::id::ProductId;
use super::money::Money;

/// Errors that can occur when building a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The rating is above the maximum.
    #[error("rating must be at most {max} (got {got})")]
    OutOfRange {
        /// Maximum allowed rating.
        max: u8,
        /// The rejected value.
        got: u8,
    },
}

/// Aggregate product rating, an integer out of five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Highest possible rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values above [`Rating::MAX`].
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] for values above five.
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value > Self::MAX {
            return Err(RatingError::OutOfRange {
                max: Self::MAX,
                got: value,
            });
        }
        Ok(Self(value))
    }

    /// The rating value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A purchasable product as listed by the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Name or title of the product.
    pub name: String,
    /// Category the product belongs to.
    pub category: String,
    /// Unit price, never negative.
    #[serde(deserialize_with = "non_negative_cost")]
    pub cost: Money,
    /// Aggregate rating out of five.
    pub rating: Rating,
    /// URL of the product image.
    pub image: String,
}

fn non_negative_cost<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    let cost = Money::deserialize(deserializer)?;
    if cost.is_negative() {
        return Err(de::Error::custom(format!(
            "cost must not be negative (got {cost})"
        )));
    }
    Ok(cost)
}
