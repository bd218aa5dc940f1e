//! Integration tests for `DieselInventoryRepository`.
//!
//! The stock guard lives in SQL: a movement that would take an item below
//! zero must leave both the item and the movement ledger untouched.

use fournil::domain::ports::{InventoryRepository, InventoryRepositoryError};
use fournil::domain::{
    InventoryItem, InventoryUnit, ItemId, MovementId, MovementKind, Quantity, StockMovement,
};
use fournil::outbound::persistence::DieselInventoryRepository;
use rstest::{fixture, rstest};

mod support;

use support::seed::{self, Bakery};
use support::{TestDatabase, handle_cluster_setup_failure};

const MOVEMENTS_FOR_ITEM: &str = "SELECT count(*) FROM stock_movements WHERE item_id = $1";

struct TestContext {
    db: TestDatabase,
    bakery: Bakery,
    repository: DieselInventoryRepository,
}

fn setup_context() -> Result<TestContext, String> {
    let db = TestDatabase::open()?;
    let bakery = seed::bakery(&db)?;
    let repository = DieselInventoryRepository::new(db.pool.clone());
    Ok(TestContext {
        db,
        bakery,
        repository,
    })
}

#[fixture]
fn inventory_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn flour(bakery: &Bakery) -> InventoryItem {
    InventoryItem {
        id: ItemId::random(),
        restaurant_id: bakery.restaurant_id,
        name: "Farine T55".to_owned(),
        category_id: None,
        supplier_id: None,
        unit: InventoryUnit::Kg,
        quantity: Quantity::from_units(0),
        min_stock: Quantity::from_units(5),
        unit_cost: 9_000,
        shelf_life_days: None,
        last_purchased_at: None,
        active: true,
        created_at: seed::now(),
        updated_at: seed::now(),
    }
}

fn movement(bakery: &Bakery, item_id: ItemId, kind: MovementKind, units: i64) -> StockMovement {
    StockMovement {
        id: MovementId::random(),
        restaurant_id: bakery.restaurant_id,
        item_id,
        kind,
        quantity_delta: Quantity::from_units(units),
        unit_cost: None,
        supplier_id: None,
        reason: None,
        batch_id: None,
        expense_id: None,
        created_by: bakery.owner,
        occurred_at: seed::now(),
    }
}

/// Create flour with ten kilograms already received.
fn stocked_flour(ctx: &TestContext) -> InventoryItem {
    let item = flour(&ctx.bakery);
    let opening = movement(&ctx.bakery, item.id, MovementKind::Purchase, 10);
    let created = ctx
        .db
        .block_on(ctx.repository.create_item(&item, Some(opening)))
        .expect("create flour with opening stock");
    assert_eq!(created.quantity, Quantity::from_units(10));
    created
}

#[rstest]
#[case::partial(4, 6)]
#[case::to_zero(10, 0)]
fn usage_within_stock_reports_the_previous_quantity(
    inventory_context: Option<TestContext>,
    #[case] used: i64,
    #[case] left: i64,
) {
    let Some(ctx) = inventory_context else {
        eprintln!("SKIP-TEST-CLUSTER: usage_within_stock_reports_the_previous_quantity skipped");
        return;
    };
    let item = stocked_flour(&ctx);

    let usage = movement(&ctx.bakery, item.id, MovementKind::Usage, -used);
    let outcome = ctx
        .db
        .block_on(ctx.repository.apply_movement(&usage))
        .expect("usage within stock applies");

    assert_eq!(outcome.previous_quantity, Quantity::from_units(10));
    assert_eq!(outcome.item.quantity, Quantity::from_units(left));
    assert_eq!(ctx.db.count(MOVEMENTS_FOR_ITEM, &[item.id.as_uuid()]), 2);
}

#[rstest]
fn usage_beyond_stock_changes_nothing(inventory_context: Option<TestContext>) {
    let Some(ctx) = inventory_context else {
        eprintln!("SKIP-TEST-CLUSTER: usage_beyond_stock_changes_nothing skipped");
        return;
    };
    let item = stocked_flour(&ctx);

    let usage = movement(&ctx.bakery, item.id, MovementKind::Usage, -12);
    let err = ctx
        .db
        .block_on(ctx.repository.apply_movement(&usage))
        .expect_err("shortfall is refused");

    assert!(
        matches!(&err, InventoryRepositoryError::InsufficientStock { item_name, .. } if item_name == "Farine T55"),
        "unexpected error: {err:?}"
    );
    let stored = ctx
        .db
        .block_on(ctx.repository.find_item(&ctx.bakery.restaurant_id, &item.id))
        .expect("find flour")
        .expect("flour exists");
    assert_eq!(stored.quantity, Quantity::from_units(10));
    assert_eq!(ctx.db.count(MOVEMENTS_FOR_ITEM, &[item.id.as_uuid()]), 1);
}

#[rstest]
fn movements_on_another_restaurants_item_are_not_found(inventory_context: Option<TestContext>) {
    let Some(ctx) = inventory_context else {
        eprintln!("SKIP-TEST-CLUSTER: movements_on_another_restaurants_item_are_not_found skipped");
        return;
    };
    let item = stocked_flour(&ctx);
    let other = seed::bakery(&ctx.db).expect("seed second bakery");

    let usage = movement(&other, item.id, MovementKind::Usage, -1);
    let err = ctx
        .db
        .block_on(ctx.repository.apply_movement(&usage))
        .expect_err("foreign item is refused");

    assert!(
        matches!(err, InventoryRepositoryError::ItemNotFound { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(ctx.db.count(MOVEMENTS_FOR_ITEM, &[item.id.as_uuid()]), 1);
}
