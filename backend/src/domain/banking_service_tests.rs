//! Tests for the banking service.

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::rstest;

use super::*;
use crate::domain::ports::{BankRepositoryError, MockBankRepository, MockRestaurantRepository};
use crate::domain::service_test_support::{fixture_clock, gnf, member, restaurant_for};
use crate::domain::{
    ErrorCode, Gnf, PaymentMethod, Role, TransactionAggregate, TransactionDirection,
    TransactionReason,
};

fn aggregate(
    method: PaymentMethod,
    direction: TransactionDirection,
    status: TransactionStatus,
    total: i64,
) -> TransactionAggregate {
    TransactionAggregate {
        method,
        direction,
        status,
        total,
    }
}

fn service_with(
    ctx: &MemberContext,
    initial: PaymentSplit,
    bank: MockBankRepository,
) -> BankingService {
    let mut restaurant = restaurant_for(ctx);
    restaurant.initial_balances = initial;
    let mut restaurants = MockRestaurantRepository::new();
    restaurants
        .expect_find()
        .returning(move |_| Ok(Some(restaurant.clone())));
    BankingService::new(Arc::new(bank), Arc::new(restaurants), fixture_clock())
}

fn manual(reason: TransactionReason, confirmed: bool) -> ManualTransactionRequest {
    ManualTransactionRequest {
        date: NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"),
        amount: gnf(500_000),
        direction: TransactionDirection::Deposit,
        method: PaymentMethod::Cash,
        reason,
        description: Some(" apport ".to_owned()),
        confirmed,
    }
}

#[rstest]
#[tokio::test]
async fn balance_is_initial_plus_confirmed_deposits_minus_withdrawals() {
    let ctx = member(Role::Viewer);
    let mut bank = MockBankRepository::new();
    bank.expect_aggregates().return_once(|_| {
        Ok(vec![
            aggregate(
                PaymentMethod::Cash,
                TransactionDirection::Deposit,
                TransactionStatus::Confirmed,
                300_000,
            ),
            aggregate(
                PaymentMethod::Cash,
                TransactionDirection::Withdrawal,
                TransactionStatus::Confirmed,
                120_000,
            ),
            aggregate(
                PaymentMethod::Cash,
                TransactionDirection::Deposit,
                TransactionStatus::Pending,
                80_000,
            ),
            aggregate(
                PaymentMethod::Card,
                TransactionDirection::Deposit,
                TransactionStatus::Rejected,
                999_999,
            ),
        ])
    });
    let initial = PaymentSplit {
        cash: gnf(50_000),
        orange_money: gnf(10_000),
        card: Gnf::ZERO,
    };

    let balances = service_with(&ctx, initial, bank)
        .balances(&ctx)
        .await
        .expect("balances");

    let cash = balances
        .methods
        .iter()
        .find(|entry| entry.method == PaymentMethod::Cash)
        .expect("cash");
    assert_eq!(cash.balance, 230_000);
    assert_eq!(cash.pending_deposits, 80_000);
    assert_eq!(balances.total, 240_000);
}

#[rstest]
#[tokio::test]
async fn workflow_reasons_cannot_be_entered_by_hand() {
    let ctx = member(Role::Manager);
    let mut bank = MockBankRepository::new();
    bank.expect_insert().times(0);

    let err = service_with(&ctx, PaymentSplit::default(), bank)
        .create_manual(&ctx, manual(TransactionReason::SaleDeposit, false))
        .await
        .expect_err("workflow reason");

    assert_eq!(err.details().expect("details")["code"], "not_manual");
}

#[rstest]
#[case(false, TransactionStatus::Pending)]
#[case(true, TransactionStatus::Confirmed)]
#[tokio::test]
async fn manual_transactions_start_pending_unless_confirmed(
    #[case] confirmed: bool,
    #[case] expected: TransactionStatus,
) {
    let ctx = member(Role::Manager);
    let mut bank = MockBankRepository::new();
    bank.expect_insert().return_once(|_| Ok(()));

    let tx = service_with(&ctx, PaymentSplit::default(), bank)
        .create_manual(&ctx, manual(TransactionReason::OwnerContribution, confirmed))
        .await
        .expect("created");

    assert_eq!(tx.status, expected);
    assert!(tx.source.is_none());
    assert_eq!(tx.description.as_deref(), Some("apport"));
}

#[rstest]
#[tokio::test]
async fn settled_transactions_cannot_be_confirmed_again() {
    let ctx = member(Role::Manager);
    let mut bank = MockBankRepository::new();
    bank.expect_settle()
        .return_once(|_, _, _, _, _| Err(BankRepositoryError::not_pending()));

    let err = service_with(&ctx, PaymentSplit::default(), bank)
        .confirm(&ctx, &TransactionId::random())
        .await
        .expect_err("not pending");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn reconciliation_posts_adjustments_for_discrepancies() {
    let ctx = member(Role::Manager);
    let mut bank = MockBankRepository::new();
    bank.expect_aggregates().return_once(|_| {
        Ok(vec![aggregate(
            PaymentMethod::Cash,
            TransactionDirection::Deposit,
            TransactionStatus::Confirmed,
            200_000,
        )])
    });
    bank.expect_insert_reconciliation()
        .withf(|rec, adjustments| {
            rec.discrepancy.cash == -15_000
                && adjustments.len() == 1
                && adjustments[0].direction == TransactionDirection::Withdrawal
                && adjustments[0].amount == Gnf::new(15_000).expect("amount")
                && adjustments[0].status == TransactionStatus::Confirmed
        })
        .return_once(|_, _| Ok(()));

    let rec = service_with(&ctx, PaymentSplit::default(), bank)
        .reconcile(
            &ctx,
            RecordReconciliation {
                date: None,
                counted: PaymentSplit {
                    cash: gnf(185_000),
                    ..PaymentSplit::default()
                },
                notes: None,
                post_adjustments: true,
            },
        )
        .await
        .expect("reconciled");

    assert_eq!(rec.expected.cash, 200_000);
    assert!(rec.adjustments_posted);
}

#[rstest]
#[tokio::test]
async fn editors_cannot_touch_the_bank() {
    let ctx = member(Role::Editor);
    let err = service_with(&ctx, PaymentSplit::default(), MockBankRepository::new())
        .delete(&ctx, &TransactionId::random())
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}
