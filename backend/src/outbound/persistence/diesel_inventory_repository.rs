//! PostgreSQL-backed `InventoryRepository`: items, the movement ledger, and
//! production batches.
//!
//! Every movement runs the same guarded update: the item's quantity changes
//! only `WHERE quantity_milli + delta >= 0`. An empty result is then
//! classified as a missing item or a shortfall, and the whole transaction
//! rolls back.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{InventoryRepository, InventoryRepositoryError};
use crate::domain::{
    Ingredient, InventoryItem, ItemDraft, ItemId, ListRequest, MovementFilter, MovementKind,
    MovementOutcome, ProductionBatch, Quantity, RestaurantId, StockMovement,
};

use super::diesel_helpers::{
    RowError, TxError, day_end_exclusive, day_start, map_diesel_error, map_pool_error,
};
use super::models::{BatchRow, IngredientRow, InventoryItemRow, StockMovementRow};
use super::pool::DbPool;
use super::schema::{batch_ingredients, inventory_items, production_batches, stock_movements};

type Tx<T> = Result<T, TxError<InventoryRepositoryError>>;

/// Side effects of a movement on the item besides its quantity.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = inventory_items)]
struct StockChange {
    unit_cost: Option<i64>,
    last_purchased_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl StockChange {
    fn for_movement(movement: &StockMovement) -> Self {
        let purchase = movement.kind == MovementKind::Purchase;
        Self {
            unit_cost: movement.unit_cost.filter(|_| purchase),
            last_purchased_at: purchase.then_some(movement.occurred_at),
            updated_at: movement.occurred_at,
        }
    }
}

/// Diesel-backed implementation of the inventory repository port.
#[derive(Clone)]
pub struct DieselInventoryRepository {
    pool: DbPool,
}

impl DieselInventoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt(err: RowError) -> InventoryRepositoryError {
    err.into_port()
}

/// Apply one movement inside the caller's transaction.
pub(super) async fn apply(
    conn: &mut AsyncPgConnection,
    movement: &StockMovement,
) -> Tx<MovementOutcome> {
    let delta = movement.quantity_delta.to_milli();
    let updated: Option<InventoryItemRow> = diesel::update(
        inventory_items::table
            .filter(inventory_items::restaurant_id.eq(movement.restaurant_id.as_uuid()))
            .filter(inventory_items::id.eq(movement.item_id.as_uuid()))
            .filter((inventory_items::quantity_milli + delta).ge(0_i64)),
    )
    .set((
        inventory_items::quantity_milli.eq(inventory_items::quantity_milli + delta),
        StockChange::for_movement(movement),
    ))
    .returning(InventoryItemRow::as_returning())
    .get_result(conn)
    .await
    .optional()?;

    let Some(row) = updated else {
        return Err(TxError::Port(classify_refusal(conn, movement).await?));
    };

    diesel::insert_into(stock_movements::table)
        .values(StockMovementRow::from(movement))
        .execute(conn)
        .await?;

    let item = InventoryItem::try_from(row)?;
    let previous_quantity = Quantity::from_milli(item.quantity.to_milli() - delta);
    Ok(MovementOutcome {
        movement: movement.clone(),
        previous_quantity,
        item,
    })
}

/// Explain why the guarded update touched no row.
async fn classify_refusal(
    conn: &mut AsyncPgConnection,
    movement: &StockMovement,
) -> Tx<InventoryRepositoryError> {
    let name: Option<String> = inventory_items::table
        .filter(inventory_items::restaurant_id.eq(movement.restaurant_id.as_uuid()))
        .filter(inventory_items::id.eq(movement.item_id.as_uuid()))
        .select(inventory_items::name)
        .first(conn)
        .await
        .optional()?;
    let item_id = movement.item_id.to_string();
    Ok(match name {
        Some(item_name) => InventoryRepositoryError::insufficient_stock(item_id, item_name),
        None => InventoryRepositoryError::item_not_found(item_id),
    })
}

async fn load_item(conn: &mut AsyncPgConnection, id: Uuid) -> Tx<InventoryItem> {
    let row: InventoryItemRow = inventory_items::table
        .find(id)
        .select(InventoryItemRow::as_select())
        .first(conn)
        .await?;
    Ok(InventoryItem::try_from(row)?)
}

#[async_trait]
impl InventoryRepository for DieselInventoryRepository {
    async fn list_items(
        &self,
        restaurant_id: &RestaurantId,
        include_inactive: bool,
    ) -> Result<Vec<InventoryItem>, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = inventory_items::table
            .filter(inventory_items::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if !include_inactive {
            query = query.filter(inventory_items::active.eq(true));
        }
        query
            .order((inventory_items::name.asc(), inventory_items::id.asc()))
            .select(InventoryItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| InventoryItem::try_from(row).map_err(corrupt))
            .collect()
    }

    async fn find_item(
        &self,
        restaurant_id: &RestaurantId,
        id: &ItemId,
    ) -> Result<Option<InventoryItem>, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        inventory_items::table
            .filter(inventory_items::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(inventory_items::id.eq(id.as_uuid()))
            .select(InventoryItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| InventoryItem::try_from(row).map_err(corrupt))
            .transpose()
    }

    async fn create_item(
        &self,
        item: &InventoryItem,
        opening: Option<StockMovement>,
    ) -> Result<InventoryItem, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut row = InventoryItemRow::from(item);
        row.quantity_milli = 0;
        let item_id = row.id;
        let outcome: Tx<InventoryItem> = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(inventory_items::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                    match opening {
                        Some(movement) => Ok(apply(conn, &movement).await?.item),
                        None => load_item(conn, item_id).await,
                    }
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(TxError::into_port)
    }

    async fn update_item(
        &self,
        restaurant_id: &RestaurantId,
        id: &ItemId,
        draft: &ItemDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<InventoryItem>, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            inventory_items::table
                .filter(inventory_items::restaurant_id.eq(restaurant_id.as_uuid()))
                .filter(inventory_items::id.eq(id.as_uuid())),
        )
        .set((
            inventory_items::name.eq(&draft.name),
            inventory_items::category_id.eq(draft.category_id.map(|id| *id.as_uuid())),
            inventory_items::supplier_id.eq(draft.supplier_id.map(|id| *id.as_uuid())),
            inventory_items::unit.eq(draft.unit.as_str()),
            inventory_items::min_stock_milli.eq(draft.min_stock.to_milli()),
            inventory_items::unit_cost.eq(draft.unit_cost),
            inventory_items::shelf_life_days.eq(draft.shelf_life_days.map(i32::from)),
            inventory_items::updated_at.eq(updated_at),
        ))
        .returning(InventoryItemRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .map(|row| InventoryItem::try_from(row).map_err(corrupt))
        .transpose()
    }

    async fn set_item_active(
        &self,
        restaurant_id: &RestaurantId,
        id: &ItemId,
        active: bool,
    ) -> Result<bool, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(
            inventory_items::table
                .filter(inventory_items::restaurant_id.eq(restaurant_id.as_uuid()))
                .filter(inventory_items::id.eq(id.as_uuid())),
        )
        .set(inventory_items::active.eq(active))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn apply_movement(
        &self,
        movement: &StockMovement,
    ) -> Result<MovementOutcome, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome: Tx<MovementOutcome> = conn
            .transaction(|conn| async move { apply(conn, movement).await }.scope_boxed())
            .await;
        outcome.map_err(TxError::into_port)
    }

    async fn list_movements(
        &self,
        restaurant_id: &RestaurantId,
        filter: &MovementFilter,
        page: &ListRequest,
    ) -> Result<Vec<StockMovement>, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = stock_movements::table
            .filter(stock_movements::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if let Some(item_id) = filter.item_id {
            query = query.filter(stock_movements::item_id.eq(*item_id.as_uuid()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(stock_movements::kind.eq(kind.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(stock_movements::occurred_at.ge(day_start(from)));
        }
        if let Some(to) = filter.to {
            query = query.filter(stock_movements::occurred_at.lt(day_end_exclusive(to)));
        }
        if let Some(key) = page.after_key() {
            query = query.filter(
                stock_movements::occurred_at.lt(key.at).or(stock_movements::occurred_at
                    .eq(key.at)
                    .and(stock_movements::id.lt(key.id))),
            );
        }
        query
            .order((stock_movements::occurred_at.desc(), stock_movements::id.desc()))
            .limit(page.limit().overfetch())
            .select(StockMovementRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| StockMovement::try_from(row).map_err(corrupt))
            .collect()
    }

    async fn record_batch(
        &self,
        batch: &ProductionBatch,
        usages: &[StockMovement],
    ) -> Result<Vec<MovementOutcome>, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ingredient_rows: Vec<IngredientRow> = batch
            .ingredients
            .iter()
            .map(|ingredient| IngredientRow::new(batch, ingredient))
            .collect();
        let outcome: Tx<Vec<MovementOutcome>> = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(production_batches::table)
                        .values(BatchRow::from(batch))
                        .execute(conn)
                        .await?;
                    diesel::insert_into(batch_ingredients::table)
                        .values(&ingredient_rows)
                        .execute(conn)
                        .await?;
                    let mut outcomes = Vec::with_capacity(usages.len());
                    for usage in usages {
                        outcomes.push(apply(conn, usage).await?);
                    }
                    Ok(outcomes)
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(TxError::into_port)
    }

    async fn list_batches(
        &self,
        restaurant_id: &RestaurantId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: &ListRequest,
    ) -> Result<Vec<ProductionBatch>, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = production_batches::table
            .filter(production_batches::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if let Some(from) = from {
            query = query.filter(production_batches::produced_at.ge(day_start(from)));
        }
        if let Some(to) = to {
            query = query.filter(production_batches::produced_at.lt(day_end_exclusive(to)));
        }
        if let Some(key) = page.after_key() {
            query = query.filter(
                production_batches::produced_at.lt(key.at).or(production_batches::produced_at
                    .eq(key.at)
                    .and(production_batches::id.lt(key.id))),
            );
        }
        let batches: Vec<BatchRow> = query
            .order((
                production_batches::produced_at.desc(),
                production_batches::id.desc(),
            ))
            .limit(page.limit().overfetch())
            .select(BatchRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let batch_ids: Vec<Uuid> = batches.iter().map(|batch| batch.id).collect();
        let ingredient_rows: Vec<IngredientRow> = batch_ingredients::table
            .filter(batch_ingredients::batch_id.eq_any(&batch_ids))
            .order((batch_ingredients::batch_id, batch_ingredients::item_id))
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut by_batch: HashMap<Uuid, Vec<Ingredient>> = HashMap::new();
        for row in &ingredient_rows {
            by_batch
                .entry(row.batch_id)
                .or_default()
                .push(Ingredient::from(row));
        }

        Ok(batches
            .into_iter()
            .map(|batch| {
                let ingredients = by_batch.remove(&batch.id).unwrap_or_default();
                batch.into_batch(ingredients)
            })
            .collect())
    }
}
