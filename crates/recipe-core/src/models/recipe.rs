// ABOUTME: Recipe model, its nested detail form, and the validated Price type
// ABOUTME: Price enforces at most 5 digits with 2 decimal places and renders as "5.00"
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Ingredient, Tag};
use crate::constants::limits::{PRICE_DECIMAL_PLACES, PRICE_MAX_DIGITS};
use crate::errors::{AppError, AppResult};

/// Non-negative decimal price with at most two decimal places
///
/// Accepts JSON numbers or strings on input; always serializes as a string
/// with exactly two decimals so clients never see float rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Validate a decimal as a price
    ///
    /// # Errors
    ///
    /// Returns a `ValueOutOfRange` error if the value is negative, has more
    /// than two decimal places, or does not fit in five digits.
    pub fn new(value: Decimal) -> AppResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AppError::out_of_range(
                "price",
                "Ensure this value is greater than or equal to 0.",
            ));
        }

        if value.normalize().scale() > PRICE_DECIMAL_PLACES {
            return Err(AppError::out_of_range(
                "price",
                format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."),
            ));
        }

        let max_whole_digits = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;
        if value.trunc() >= Decimal::from(10_i64.pow(max_whole_digits)) {
            return Err(AppError::out_of_range(
                "price",
                format!("Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."),
            ));
        }

        let mut value = value;
        value.rescale(PRICE_DECIMAL_PLACES);
        Ok(Self(value))
    }

    /// The underlying decimal, scaled to two places
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| AppError::invalid_input("A valid number is required.").with_field("price"))?;
        Self::new(value)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(value).map_err(|e| D::Error::custom(e.message))
    }
}

/// A recipe owned by one user, with its linked tag and ingredient ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Primary key
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Recipe title
    pub title: String,
    /// Preparation time in minutes
    pub time_minutes: i32,
    /// Price
    pub price: Price,
    /// External link, empty when unset
    pub link: String,
    /// Stored image reference; there is no upload endpoint
    pub image: Option<String>,
    /// Ids of linked tags
    pub tag_ids: Vec<i64>,
    /// Ids of linked ingredients
    pub ingredient_ids: Vec<i64>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Display for Recipe {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.title)
    }
}

/// Recipe with its tags and ingredients expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetail {
    /// The recipe row
    pub recipe: Recipe,
    /// Linked tags, ordered by name descending
    pub tags: Vec<Tag>,
    /// Linked ingredients, ordered by name descending
    pub ingredients: Vec<Ingredient>,
}
