//! Integration tests for `DieselRestaurantRepository` membership writes.

use fournil::domain::Role;
use fournil::domain::ports::{RestaurantRepository, RestaurantRepositoryError};
use fournil::outbound::persistence::DieselRestaurantRepository;
use rstest::{fixture, rstest};

mod support;

use support::seed::{self, Bakery};
use support::{TestDatabase, handle_cluster_setup_failure};

struct TestContext {
    db: TestDatabase,
    bakery: Bakery,
    repository: DieselRestaurantRepository,
}

fn setup_context() -> Result<TestContext, String> {
    let db = TestDatabase::open()?;
    let bakery = seed::bakery(&db)?;
    let repository = DieselRestaurantRepository::new(db.pool.clone());
    Ok(TestContext {
        db,
        bakery,
        repository,
    })
}

#[fixture]
fn restaurant_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

impl TestContext {
    fn owner_role(&self) -> Option<Role> {
        self.db
            .block_on(
                self.repository
                    .find_role(&self.bakery.restaurant_id, &self.bakery.owner),
            )
            .expect("read owner role")
    }
}

#[rstest]
#[case::demotion(true)]
#[case::removal(false)]
fn the_sole_owner_cannot_step_down(restaurant_context: Option<TestContext>, #[case] demote: bool) {
    let Some(ctx) = restaurant_context else {
        eprintln!("SKIP-TEST-CLUSTER: the_sole_owner_cannot_step_down skipped");
        return;
    };
    let restaurant_id = ctx.bakery.restaurant_id;
    let owner = ctx.bakery.owner;

    let outcome = if demote {
        ctx.db
            .block_on(ctx.repository.change_role(&restaurant_id, &owner, Role::Manager))
    } else {
        ctx.db
            .block_on(ctx.repository.remove_member(&restaurant_id, &owner))
    };

    assert!(
        matches!(outcome, Err(RestaurantRepositoryError::LastOwner)),
        "unexpected outcome: {outcome:?}"
    );
    assert_eq!(ctx.owner_role(), Some(Role::Owner));
}

#[rstest]
fn an_owner_may_step_down_once_another_exists(restaurant_context: Option<TestContext>) {
    let Some(ctx) = restaurant_context else {
        eprintln!("SKIP-TEST-CLUSTER: an_owner_may_step_down_once_another_exists skipped");
        return;
    };
    let restaurant_id = ctx.bakery.restaurant_id;
    seed::staff(&ctx.db, &ctx.bakery, Role::Owner).expect("add second owner");

    ctx.db
        .block_on(
            ctx.repository
                .change_role(&restaurant_id, &ctx.bakery.owner, Role::Manager),
        )
        .expect("demotion with a second owner");

    assert_eq!(ctx.owner_role(), Some(Role::Manager));
}

#[rstest]
fn members_cannot_be_added_twice(restaurant_context: Option<TestContext>) {
    let Some(ctx) = restaurant_context else {
        eprintln!("SKIP-TEST-CLUSTER: members_cannot_be_added_twice skipped");
        return;
    };
    let cashier = seed::staff(&ctx.db, &ctx.bakery, Role::Cashier).expect("add cashier");

    let err = ctx
        .db
        .block_on(ctx.repository.add_member(
            &ctx.bakery.restaurant_id,
            &cashier,
            Role::Viewer,
            seed::now(),
        ))
        .expect_err("second membership is refused");

    assert!(
        matches!(err, RestaurantRepositoryError::DuplicateMember),
        "unexpected error: {err:?}"
    );
    let members = ctx
        .db
        .block_on(ctx.repository.list_members(&ctx.bakery.restaurant_id))
        .expect("list members");
    assert_eq!(members.len(), 2);
}
