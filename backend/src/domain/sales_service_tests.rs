//! Tests for the sales service.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockReferenceRepository, MockRestaurantRepository, MockSaleRepository, MockSmsGateway,
    SaleRepositoryError, SmsGatewayError,
};
use crate::domain::service_test_support::{
    fixture_clock, fixture_now, gnf, member, restaurant_for,
};
use crate::domain::{
    BankTransaction, ErrorCode, PaymentMethod, PaymentSplit, Role, TransactionStatus, UserId,
};

fn business_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 9).expect("date")
}

fn draft(amounts: PaymentSplit) -> SaleDraft {
    SaleDraft {
        business_date: business_date(),
        amounts,
        customer_id: None,
        notes: None,
    }
}

fn pending_sale(ctx: &MemberContext, amounts: PaymentSplit, author: UserId) -> Sale {
    Sale {
        id: SaleId::random(),
        restaurant_id: ctx.restaurant_id,
        business_date: business_date(),
        total: amounts.total().expect("total"),
        amounts,
        customer_id: None,
        notes: None,
        status: ReviewStatus::Pending,
        rejection_reason: None,
        created_by: author,
        reviewed_by: None,
        reviewed_at: None,
        created_at: fixture_now(),
    }
}

struct Harness {
    sales: MockSaleRepository,
    restaurants: MockRestaurantRepository,
    gateway: MockSmsGateway,
}

impl Harness {
    fn build(self) -> SalesService {
        SalesService::new(
            Arc::new(self.sales),
            Arc::new(MockReferenceRepository::new()),
            Arc::new(self.restaurants),
            Notifier::new(Arc::new(self.gateway)),
            fixture_clock(),
        )
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        sales: MockSaleRepository::new(),
        restaurants: MockRestaurantRepository::new(),
        gateway: MockSmsGateway::new(),
    }
}

#[rstest]
#[tokio::test]
async fn approval_confirms_card_and_leaves_cash_pending(mut harness: Harness) {
    let ctx = member(Role::Manager);
    let sale = pending_sale(
        &ctx,
        PaymentSplit {
            cash: gnf(150_000),
            orange_money: Gnf::ZERO,
            card: gnf(40_000),
        },
        UserId::random(),
    );
    let sale_id = sale.id;
    let approved = Sale {
        status: ReviewStatus::Approved,
        ..sale.clone()
    };
    harness
        .sales
        .expect_find()
        .return_once(move |_, _| Ok(Some(sale)));
    let captured: Arc<Mutex<Vec<BankTransaction>>> = Arc::default();
    let sink = Arc::clone(&captured);
    harness
        .sales
        .expect_approve()
        .return_once(move |_, _, _, _, deposits| {
            sink.lock().expect("lock").extend_from_slice(deposits);
            Ok(approved)
        });
    let service = harness.build();

    let result = service.approve(&ctx, &sale_id).await.expect("approved");

    assert_eq!(result.status, ReviewStatus::Approved);
    let deposits = captured.lock().expect("lock");
    assert_eq!(deposits.len(), 2);
    let card: Vec<_> = deposits
        .iter()
        .filter(|tx| tx.method == PaymentMethod::Card)
        .collect();
    assert_eq!(card.len(), 1);
    assert_eq!(card[0].status, TransactionStatus::Confirmed);
    assert_eq!(card[0].amount, gnf(40_000));
    let cash = deposits
        .iter()
        .find(|tx| tx.method == PaymentMethod::Cash)
        .expect("cash deposit");
    assert_eq!(cash.status, TransactionStatus::Pending);
    assert!(cash.confirmed_by.is_none());
}

#[rstest]
#[tokio::test]
async fn approved_sales_cannot_be_approved_again(mut harness: Harness) {
    let ctx = member(Role::Owner);
    let mut sale = pending_sale(&ctx, PaymentSplit::default(), ctx.user_id);
    sale.status = ReviewStatus::Approved;
    let sale_id = sale.id;
    harness
        .sales
        .expect_find()
        .return_once(move |_, _| Ok(Some(sale)));
    harness.sales.expect_approve().times(0);

    let err = harness
        .build()
        .approve(&ctx, &sale_id)
        .await
        .expect_err("not pending");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn duplicate_business_date_is_a_conflict(mut harness: Harness) {
    harness
        .sales
        .expect_insert()
        .return_once(|_| Err(SaleRepositoryError::duplicate_date()));
    let amounts = PaymentSplit {
        cash: gnf(10_000),
        ..PaymentSplit::default()
    };

    let err = harness
        .build()
        .create(&member(Role::Cashier), draft(amounts))
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.details().expect("details")["field"], "businessDate");
}

#[rstest]
#[tokio::test]
async fn sms_failure_does_not_fail_the_sale(mut harness: Harness) {
    let ctx = member(Role::Cashier);
    let restaurant = restaurant_for(&ctx);
    harness.sales.expect_insert().return_once(|_| Ok(()));
    harness
        .restaurants
        .expect_find()
        .return_once(move |_| Ok(Some(restaurant)));
    harness
        .gateway
        .expect_send()
        .withf(|_, body| body.contains("en attente de validation"))
        .return_once(|_, _| Err(SmsGatewayError::transport("dns")));
    let amounts = PaymentSplit {
        orange_money: gnf(75_000),
        ..PaymentSplit::default()
    };

    let sale = harness
        .build()
        .create(&ctx, draft(amounts))
        .await
        .expect("created");

    assert_eq!(sale.total, gnf(75_000));
    assert_eq!(sale.status, ReviewStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn zero_total_is_rejected(harness: Harness) {
    let err = harness
        .build()
        .create(&member(Role::Cashier), draft(PaymentSplit::default()))
        .await
        .expect_err("zero");
    assert_eq!(err.details().expect("details")["field"], "amounts");
}

#[rstest]
#[tokio::test]
async fn cashiers_only_edit_their_own_sales(mut harness: Harness) {
    let ctx = member(Role::Cashier);
    let amounts = PaymentSplit {
        cash: gnf(5_000),
        ..PaymentSplit::default()
    };
    let sale = pending_sale(&ctx, amounts, UserId::random());
    let sale_id = sale.id;
    harness
        .sales
        .expect_find()
        .return_once(move |_, _| Ok(Some(sale)));
    harness.sales.expect_update_pending().times(0);

    let err = harness
        .build()
        .update(&ctx, &sale_id, draft(amounts))
        .await
        .expect_err("not the author");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn rejection_requires_a_reason(harness: Harness) {
    let err = harness
        .build()
        .reject(&member(Role::Manager), &SaleId::random(), "   ")
        .await
        .expect_err("no reason");
    assert_eq!(err.details().expect("details")["field"], "reason");
}
