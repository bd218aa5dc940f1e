//! Extractor resolving the caller's membership of the addressed restaurant.
//!
//! Tenant routes carry `{restaurant_id}` in their path. [`Membership`] reads
//! it, requires a signed-in user, and asks the restaurant service for the
//! caller's role. Non-members get `404` so restaurant ids cannot be probed.

use std::ops::Deref;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, MemberContext, RestaurantId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Path segment holding the restaurant id on tenant routes.
pub const RESTAURANT_ID_PARAM: &str = "restaurant_id";

/// The signed-in user's membership of the restaurant in the path.
#[derive(Debug, Clone, Copy)]
pub struct Membership(pub MemberContext);

impl Membership {
    /// Unwrap the domain context.
    pub const fn into_inner(self) -> MemberContext {
        self.0
    }
}

impl Deref for Membership {
    type Target = MemberContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn restaurant_id(req: &HttpRequest) -> Result<RestaurantId, Error> {
    let raw = req
        .match_info()
        .get(RESTAURANT_ID_PARAM)
        .ok_or_else(|| Error::internal("route has no restaurant id segment"))?;
    raw.parse()
        .map_err(|_| Error::not_found(format!("restaurant {raw} not found")))
}

impl FromRequest for Membership {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let restaurant_id = restaurant_id(req);
        Box::pin(async move {
            let user_id = session.await?.require_user()?;
            let restaurant_id = restaurant_id?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let ctx = state.restaurants.member(user_id, restaurant_id).await?;
            Ok(Self(ctx))
        })
    }
}
