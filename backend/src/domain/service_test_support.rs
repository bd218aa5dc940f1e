//! Fixtures shared by the service unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use super::{
    Gnf, MemberContext, PaymentSplit, PhoneNumber, Restaurant, RestaurantId, Role, UserId,
};

/// Fixed instant used by service tests: 2026-03-10 09:30 UTC.
pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_today() -> NaiveDate {
    fixture_now().date_naive()
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_now(),
    })
}

pub(crate) fn member(role: Role) -> MemberContext {
    MemberContext {
        user_id: UserId::random(),
        restaurant_id: RestaurantId::random(),
        role,
    }
}

pub(crate) fn gnf(value: i64) -> Gnf {
    Gnf::new(value).expect("non-negative amount")
}

pub(crate) fn restaurant_for(ctx: &MemberContext) -> Restaurant {
    Restaurant {
        id: ctx.restaurant_id,
        name: "Fournil Kaloum".to_owned(),
        notification_phone: Some(PhoneNumber::parse("+224620000000").expect("phone")),
        notifications_enabled: true,
        initial_balances: PaymentSplit::default(),
        expiry_warning_days: 2,
        created_at: fixture_now(),
    }
}
