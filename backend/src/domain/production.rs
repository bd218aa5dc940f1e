//! Production batches and the ingredients they consume.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BatchId, ItemId, ProductId, Quantity, RestaurantId, UserId};

/// One ingredient drawn from stock for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Inventory item consumed.
    pub item_id: ItemId,
    /// Quantity consumed, in the item's unit.
    pub quantity: Quantity,
}

/// Raised when a batch request is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchValidationError {
    /// Produced quantity must be positive.
    #[error("quantity produced must be greater than zero")]
    NothingProduced,
    /// A batch consumes at least one ingredient.
    #[error("at least one ingredient is required")]
    NoIngredients,
    /// Ingredient quantities must be positive.
    #[error("ingredient {item_id} quantity must be greater than zero")]
    IngredientNotPositive {
        /// Offending item.
        item_id: ItemId,
    },
    /// Each item may appear once.
    #[error("ingredient {item_id} is listed more than once")]
    DuplicateIngredient {
        /// Offending item.
        item_id: ItemId,
    },
}

/// Check a batch's produced quantity and ingredient list.
///
/// # Examples
/// ```
/// use fournil::domain::{Ingredient, ItemId, Quantity, validate_batch};
///
/// let flour = Ingredient { item_id: ItemId::random(), quantity: Quantity::from_units(5) };
/// assert!(validate_batch(Quantity::from_units(200), &[flour]).is_ok());
/// assert!(validate_batch(Quantity::from_units(200), &[flour, flour]).is_err());
/// ```
pub fn validate_batch(
    quantity_produced: Quantity,
    ingredients: &[Ingredient],
) -> Result<(), BatchValidationError> {
    if !quantity_produced.is_positive() {
        return Err(BatchValidationError::NothingProduced);
    }
    if ingredients.is_empty() {
        return Err(BatchValidationError::NoIngredients);
    }
    let mut seen = HashSet::with_capacity(ingredients.len());
    for ingredient in ingredients {
        if !ingredient.quantity.is_positive() {
            return Err(BatchValidationError::IngredientNotPositive {
                item_id: ingredient.item_id,
            });
        }
        if !seen.insert(ingredient.item_id) {
            return Err(BatchValidationError::DuplicateIngredient {
                item_id: ingredient.item_id,
            });
        }
    }
    Ok(())
}

/// A recorded production run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionBatch {
    /// Identifier.
    pub id: BatchId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Product baked.
    pub product_id: ProductId,
    /// Units produced.
    pub quantity_produced: Quantity,
    /// Stock consumed.
    pub ingredients: Vec<Ingredient>,
    /// Notes.
    pub notes: Option<String>,
    /// When the batch came out of the oven.
    pub produced_at: DateTime<Utc>,
    /// Author.
    pub created_by: UserId,
}
