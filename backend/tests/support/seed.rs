//! Rows every suite needs: an owner, their restaurant, and customers.
//!
//! Seeding goes through the adapters themselves so the rows match what the
//! service layer would write.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fournil::domain::ports::{ReferenceRepository, RestaurantRepository, UserRepository};
use fournil::domain::{
    Contact, ContactId, ContactKind, EmailAddress, Gnf, PaymentSplit, Restaurant, RestaurantId,
    Role, User, UserId,
};
use fournil::outbound::persistence::{
    DieselReferenceRepository, DieselRestaurantRepository, DieselUserRepository,
};

use super::TestDatabase;

/// Stored for seeded accounts; nobody logs in during these suites.
const PLACEHOLDER_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2VlZHNhbHQ$c2VlZGhhc2g";

/// Fixed instant: 2026-03-10 09:30 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub fn today() -> NaiveDate {
    now().date_naive()
}

pub fn gnf(value: i64) -> Gnf {
    Gnf::new(value).expect("non-negative amount")
}

/// A restaurant with a single owner.
#[derive(Debug, Clone, Copy)]
pub struct Bakery {
    pub owner: UserId,
    pub restaurant_id: RestaurantId,
}

/// Register a user with a unique address derived from `label`.
pub fn user(db: &TestDatabase, label: &str) -> Result<UserId, String> {
    let id = UserId::random();
    let email = EmailAddress::parse(&format!("{label}.{}@fournil.test", id.as_uuid().simple()))
        .map_err(|err| err.to_string())?;
    let account = User {
        id,
        display_name: label.to_owned(),
        email,
        phone: None,
        created_at: now(),
    };
    let users = DieselUserRepository::new(db.pool.clone());
    db.block_on(users.create(&account, PLACEHOLDER_HASH))
        .map_err(|err| err.to_string())?;
    Ok(id)
}

/// Create a restaurant owned by a fresh user.
pub fn bakery(db: &TestDatabase) -> Result<Bakery, String> {
    let owner = user(db, "owner")?;
    let restaurant = Restaurant {
        id: RestaurantId::random(),
        name: "Fournil Kaloum".to_owned(),
        notification_phone: None,
        notifications_enabled: false,
        initial_balances: PaymentSplit::default(),
        expiry_warning_days: 2,
        created_at: now(),
    };
    let restaurants = DieselRestaurantRepository::new(db.pool.clone());
    db.block_on(restaurants.create(&restaurant, &owner))
        .map_err(|err| err.to_string())?;
    Ok(Bakery {
        owner,
        restaurant_id: restaurant.id,
    })
}

/// Add a fresh user to the bakery with `role`.
pub fn staff(db: &TestDatabase, bakery: &Bakery, role: Role) -> Result<UserId, String> {
    let member = user(db, role.as_str())?;
    let restaurants = DieselRestaurantRepository::new(db.pool.clone());
    db.block_on(restaurants.add_member(&bakery.restaurant_id, &member, role, now()))
        .map_err(|err| err.to_string())?;
    Ok(member)
}

pub fn customer(db: &TestDatabase, bakery: &Bakery, name: &str) -> Result<ContactId, String> {
    let contact = Contact {
        id: ContactId::random(),
        restaurant_id: bakery.restaurant_id,
        kind: ContactKind::Customer,
        name: name.to_owned(),
        phone: None,
        email: None,
        address: None,
        notes: None,
        active: true,
        created_at: now(),
    };
    let reference = DieselReferenceRepository::new(db.pool.clone());
    db.block_on(reference.insert_contact(&contact))
        .map_err(|err| err.to_string())?;
    Ok(contact.id)
}
