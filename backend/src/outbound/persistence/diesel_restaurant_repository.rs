//! PostgreSQL-backed `RestaurantRepository`: restaurants and memberships.
//!
//! Role changes and removals lock the restaurant's owner rows
//! (`SELECT ... FOR UPDATE`) before counting them, so two concurrent
//! demotions cannot both pass the last-owner check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RestaurantRepository, RestaurantRepositoryError};
use crate::domain::{
    EmailAddress, Member, Restaurant, RestaurantId, RestaurantMembership, RestaurantSettings,
    Role, UserId,
};

use super::diesel_helpers::{
    RowError, TxError, decode_code, is_unique_violation, map_diesel_error, map_pool_error,
};
use super::models::RestaurantRow;
use super::pool::DbPool;
use super::schema::{memberships, restaurants, users};

const MEMBERSHIP_KEY: &str = "memberships_pkey";

type Tx<T> = Result<T, TxError<RestaurantRepositoryError>>;

/// Diesel-backed implementation of the restaurant repository port.
#[derive(Clone)]
pub struct DieselRestaurantRepository {
    pool: DbPool,
}

impl DieselRestaurantRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_restaurant(row: RestaurantRow) -> Result<Restaurant, RestaurantRepositoryError> {
    Restaurant::try_from(row).map_err(corrupt)
}

fn corrupt(err: RowError) -> RestaurantRepositoryError {
    err.into_port()
}

fn decode_role(raw: &str) -> Result<Role, RowError> {
    decode_code("memberships.role", raw)
}

/// Owners of the restaurant, locked for the rest of the transaction.
async fn lock_owners(conn: &mut AsyncPgConnection, restaurant_id: Uuid) -> Tx<Vec<Uuid>> {
    let owners = memberships::table
        .filter(memberships::restaurant_id.eq(restaurant_id))
        .filter(memberships::role.eq(Role::Owner.as_str()))
        .select(memberships::user_id)
        .for_update()
        .load::<Uuid>(conn)
        .await?;
    Ok(owners)
}

/// Current role of a member, or `MemberNotFound`.
async fn current_role(
    conn: &mut AsyncPgConnection,
    restaurant_id: Uuid,
    user_id: Uuid,
) -> Tx<Role> {
    let raw = memberships::table
        .find((restaurant_id, user_id))
        .select(memberships::role)
        .first::<String>(conn)
        .await
        .optional()?
        .ok_or_else(|| TxError::Port(RestaurantRepositoryError::member_not_found()))?;
    Ok(decode_role(&raw)?)
}

/// Fail with `LastOwner` when `user_id` is the only owner left.
fn guard_last_owner(owners: &[Uuid], user_id: Uuid) -> Tx<()> {
    if owners.len() <= 1 && owners.contains(&user_id) {
        return Err(TxError::Port(RestaurantRepositoryError::last_owner()));
    }
    Ok(())
}

#[async_trait]
impl RestaurantRepository for DieselRestaurantRepository {
    async fn create(
        &self,
        restaurant: &Restaurant,
        owner: &UserId,
    ) -> Result<(), RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = RestaurantRow::from(restaurant);
        let owner_id = *owner.as_uuid();
        let outcome: Tx<()> = conn
            .transaction(|conn| {
                async move {
                    let joined_at = row.created_at;
                    let restaurant_id = row.id;
                    diesel::insert_into(restaurants::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(memberships::table)
                        .values((
                            memberships::restaurant_id.eq(restaurant_id),
                            memberships::user_id.eq(owner_id),
                            memberships::role.eq(Role::Owner.as_str()),
                            memberships::joined_at.eq(joined_at),
                        ))
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(TxError::into_port)
    }

    async fn find(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        restaurants::table
            .find(id.as_uuid())
            .select(RestaurantRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_restaurant)
            .transpose()
    }

    async fn update_settings(
        &self,
        id: &RestaurantId,
        settings: &RestaurantSettings,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(restaurants::table.find(id.as_uuid()))
            .set((
                restaurants::name.eq(&settings.name),
                restaurants::notification_phone
                    .eq(settings.notification_phone.as_ref().map(|p| p.as_str())),
                restaurants::notifications_enabled.eq(settings.notifications_enabled),
                restaurants::initial_cash.eq(settings.initial_balances.cash.get()),
                restaurants::initial_orange_money
                    .eq(settings.initial_balances.orange_money.get()),
                restaurants::initial_card.eq(settings.initial_balances.card.get()),
                restaurants::expiry_warning_days.eq(i32::from(settings.expiry_warning_days)),
            ))
            .returning(RestaurantRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_restaurant)
            .transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RestaurantMembership>, RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(Uuid, String, String)> = memberships::table
            .inner_join(restaurants::table)
            .filter(memberships::user_id.eq(user_id.as_uuid()))
            .order(restaurants::name.asc())
            .select((restaurants::id, restaurants::name, memberships::role))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(id, name, role)| {
                Ok(RestaurantMembership {
                    restaurant_id: id.into(),
                    name,
                    role: decode_role(&role).map_err(corrupt)?,
                })
            })
            .collect()
    }

    async fn list_notifiable(&self) -> Result<Vec<Restaurant>, RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        restaurants::table
            .filter(restaurants::notifications_enabled.eq(true))
            .filter(restaurants::notification_phone.is_not_null())
            .order(restaurants::created_at.asc())
            .select(RestaurantRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_restaurant)
            .collect()
    }

    async fn find_role(
        &self,
        restaurant_id: &RestaurantId,
        user_id: &UserId,
    ) -> Result<Option<Role>, RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        memberships::table
            .find((restaurant_id.as_uuid(), user_id.as_uuid()))
            .select(memberships::role)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|raw| decode_role(&raw).map_err(corrupt))
            .transpose()
    }

    async fn list_members(
        &self,
        restaurant_id: &RestaurantId,
    ) -> Result<Vec<Member>, RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(Uuid, String, String, String, DateTime<Utc>)> = memberships::table
            .inner_join(users::table)
            .filter(memberships::restaurant_id.eq(restaurant_id.as_uuid()))
            .order((memberships::joined_at.asc(), users::id.asc()))
            .select((
                users::id,
                users::display_name,
                users::email,
                memberships::role,
                memberships::joined_at,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(user_id, display_name, email, role, joined_at)| {
                Ok(Member {
                    user_id: user_id.into(),
                    display_name,
                    email: EmailAddress::parse(&email)
                        .map_err(|err| corrupt(RowError::new("users.email", err)))?,
                    role: decode_role(&role).map_err(corrupt)?,
                    joined_at,
                })
            })
            .collect()
    }

    async fn add_member(
        &self,
        restaurant_id: &RestaurantId,
        user_id: &UserId,
        role: Role,
        joined_at: DateTime<Utc>,
    ) -> Result<(), RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(memberships::table)
            .values((
                memberships::restaurant_id.eq(restaurant_id.as_uuid()),
                memberships::user_id.eq(user_id.as_uuid()),
                memberships::role.eq(role.as_str()),
                memberships::joined_at.eq(joined_at),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, MEMBERSHIP_KEY) {
                    RestaurantRepositoryError::duplicate_member()
                } else {
                    map_diesel_error(err)
                }
            })?;
        Ok(())
    }

    async fn change_role(
        &self,
        restaurant_id: &RestaurantId,
        user_id: &UserId,
        role: Role,
    ) -> Result<(), RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let restaurant_id = *restaurant_id.as_uuid();
        let user_id = *user_id.as_uuid();
        let outcome: Tx<()> = conn
            .transaction(|conn| {
                async move {
                    let owners = lock_owners(conn, restaurant_id).await?;
                    let current = current_role(conn, restaurant_id, user_id).await?;
                    if current == Role::Owner && role != Role::Owner {
                        guard_last_owner(&owners, user_id)?;
                    }
                    diesel::update(memberships::table.find((restaurant_id, user_id)))
                        .set(memberships::role.eq(role.as_str()))
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(TxError::into_port)
    }

    async fn remove_member(
        &self,
        restaurant_id: &RestaurantId,
        user_id: &UserId,
    ) -> Result<(), RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let restaurant_id = *restaurant_id.as_uuid();
        let user_id = *user_id.as_uuid();
        let outcome: Tx<()> = conn
            .transaction(|conn| {
                async move {
                    let owners = lock_owners(conn, restaurant_id).await?;
                    let current = current_role(conn, restaurant_id, user_id).await?;
                    if current == Role::Owner {
                        guard_last_owner(&owners, user_id)?;
                    }
                    diesel::delete(memberships::table.find((restaurant_id, user_id)))
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(TxError::into_port)
    }
}
