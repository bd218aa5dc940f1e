//! Integration tests for `DieselDebtRepository` payment bookkeeping.
//!
//! Each payment write recomputes the paid amount and status under a row lock
//! and keeps the generated deposit in step with the payment row.

use fournil::domain::ports::{DebtRepository, DebtRepositoryError};
use fournil::domain::{
    BankTransaction, ContactId, Debt, DebtId, DebtPayment, DebtStatus, Gnf, PaymentId,
    PaymentMethod,
};
use fournil::outbound::persistence::DieselDebtRepository;
use rstest::{fixture, rstest};

mod support;

use support::seed::{self, Bakery, gnf};
use support::{TestDatabase, handle_cluster_setup_failure};

const PAYMENTS_FOR_DEBT: &str = "SELECT count(*) FROM debt_payments WHERE debt_id = $1";
const DEPOSITS_FOR_PAYMENTS: &str = concat!(
    "SELECT count(*) FROM bank_transactions t JOIN debt_payments p ",
    "ON t.source_kind = 'debt_payment' AND t.source_id = p.id WHERE p.debt_id = $1"
);
const DEPOSITS_FOR_PAYMENT: &str =
    "SELECT count(*) FROM bank_transactions WHERE source_kind = 'debt_payment' AND source_id = $1";

struct TestContext {
    db: TestDatabase,
    bakery: Bakery,
    customer: ContactId,
    repository: DieselDebtRepository,
}

fn setup_context() -> Result<TestContext, String> {
    let db = TestDatabase::open()?;
    let bakery = seed::bakery(&db)?;
    let customer = seed::customer(&db, &bakery, "Hôtel du Niger")?;
    let repository = DieselDebtRepository::new(db.pool.clone());
    Ok(TestContext {
        db,
        bakery,
        customer,
        repository,
    })
}

#[fixture]
fn debt_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

impl TestContext {
    /// Insert an outstanding 100 000 GNF debt.
    fn open_debt(&self) -> Debt {
        let debt = Debt {
            id: DebtId::random(),
            restaurant_id: self.bakery.restaurant_id,
            customer_id: self.customer,
            sale_id: None,
            amount: gnf(100_000),
            paid_amount: Gnf::ZERO,
            status: DebtStatus::Outstanding,
            due_date: None,
            description: Some("Commande de croissants".to_owned()),
            written_off_reason: None,
            written_off_at: None,
            created_by: self.bakery.owner,
            created_at: seed::now(),
        };
        self.db
            .block_on(self.repository.insert(&debt))
            .expect("insert debt");
        debt
    }

    fn payment(&self, debt: &Debt, amount: i64) -> (DebtPayment, BankTransaction) {
        let payment = DebtPayment {
            id: PaymentId::random(),
            debt_id: debt.id,
            restaurant_id: debt.restaurant_id,
            amount: gnf(amount),
            method: PaymentMethod::OrangeMoney,
            paid_on: seed::today(),
            notes: None,
            created_by: self.bakery.owner,
            created_at: seed::now(),
        };
        let draft = payment.deposit();
        let status = draft.settlement_status();
        let deposit = draft.stamp(debt.restaurant_id, status, self.bakery.owner, seed::now());
        (payment, deposit)
    }

    fn pay(&self, debt: &Debt, amount: i64) -> Result<(PaymentId, Debt), DebtRepositoryError> {
        let (payment, deposit) = self.payment(debt, amount);
        self.db
            .block_on(self.repository.record_payment(&payment, &deposit))
            .map(|updated| (payment.id, updated))
    }
}

#[rstest]
fn payments_move_the_debt_through_its_states(debt_context: Option<TestContext>) {
    let Some(ctx) = debt_context else {
        eprintln!("SKIP-TEST-CLUSTER: payments_move_the_debt_through_its_states skipped");
        return;
    };
    let debt = ctx.open_debt();

    let (_, partial) = ctx.pay(&debt, 40_000).expect("first instalment");
    assert_eq!(partial.paid_amount, gnf(40_000));
    assert_eq!(partial.status, DebtStatus::PartiallyPaid);

    let (_, settled) = ctx.pay(&debt, 60_000).expect("final instalment");
    assert_eq!(settled.paid_amount, gnf(100_000));
    assert_eq!(settled.status, DebtStatus::FullyPaid);

    assert_eq!(ctx.db.count(PAYMENTS_FOR_DEBT, &[debt.id.as_uuid()]), 2);
    assert_eq!(ctx.db.count(DEPOSITS_FOR_PAYMENTS, &[debt.id.as_uuid()]), 2);
}

#[rstest]
fn overpayment_writes_nothing(debt_context: Option<TestContext>) {
    let Some(ctx) = debt_context else {
        eprintln!("SKIP-TEST-CLUSTER: overpayment_writes_nothing skipped");
        return;
    };
    let debt = ctx.open_debt();
    ctx.pay(&debt, 70_000).expect("first instalment");

    let err = ctx.pay(&debt, 40_000).expect_err("overpayment is refused");

    assert!(
        matches!(err, DebtRepositoryError::StateChanged { .. }),
        "unexpected error: {err:?}"
    );
    let stored = ctx
        .db
        .block_on(ctx.repository.find(&debt.restaurant_id, &debt.id))
        .expect("find debt")
        .expect("debt exists");
    assert_eq!(stored.paid_amount, gnf(70_000));
    assert_eq!(ctx.db.count(PAYMENTS_FOR_DEBT, &[debt.id.as_uuid()]), 1);
    assert_eq!(ctx.db.count(DEPOSITS_FOR_PAYMENTS, &[debt.id.as_uuid()]), 1);
}

#[rstest]
fn deleting_a_payment_reopens_the_debt_and_drops_its_deposit(debt_context: Option<TestContext>) {
    let Some(ctx) = debt_context else {
        eprintln!(
            "SKIP-TEST-CLUSTER: deleting_a_payment_reopens_the_debt_and_drops_its_deposit skipped"
        );
        return;
    };
    let debt = ctx.open_debt();
    ctx.pay(&debt, 30_000).expect("first instalment");
    let (last, settled) = ctx.pay(&debt, 70_000).expect("final instalment");
    assert_eq!(settled.status, DebtStatus::FullyPaid);

    let reopened = ctx
        .db
        .block_on(
            ctx.repository
                .delete_payment(&debt.restaurant_id, &debt.id, &last),
        )
        .expect("delete final instalment");

    assert_eq!(reopened.paid_amount, gnf(30_000));
    assert_eq!(reopened.status, DebtStatus::PartiallyPaid);
    assert_eq!(ctx.db.count(DEPOSITS_FOR_PAYMENT, &[last.as_uuid()]), 0);
    assert_eq!(ctx.db.count(PAYMENTS_FOR_DEBT, &[debt.id.as_uuid()]), 1);
}

#[rstest]
fn written_off_debts_refuse_payments(debt_context: Option<TestContext>) {
    let Some(ctx) = debt_context else {
        eprintln!("SKIP-TEST-CLUSTER: written_off_debts_refuse_payments skipped");
        return;
    };
    let debt = ctx.open_debt();
    let written_off = ctx
        .db
        .block_on(ctx.repository.write_off(
            &debt.restaurant_id,
            &debt.id,
            "client parti",
            seed::now(),
        ))
        .expect("write off");
    assert_eq!(written_off.status, DebtStatus::WrittenOff);

    let err = ctx.pay(&debt, 10_000).expect_err("payment is refused");

    assert!(
        matches!(err, DebtRepositoryError::StateChanged { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(ctx.db.count(PAYMENTS_FOR_DEBT, &[debt.id.as_uuid()]), 0);
}
