//! Signed-in user carried in the encrypted session cookie.
//!
//! Only the user id is stored. Memberships and roles are looked up per
//! request so that a demoted or removed staff member loses access at once.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "uid";

/// Extractor wrapping the Actix session with sign-in operations.
#[derive(Clone)]
pub struct SessionContext {
    inner: Session,
}

impl SessionContext {
    /// Start a fresh session for `user_id`, discarding any previous one.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.inner.renew();
        self.inner
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|err| Error::internal(format!("session write failed: {err}")))
    }

    /// The signed-in user. A cookie holding garbage reads as signed out.
    pub fn signed_in_user(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .inner
            .get::<String>(USER_ID_KEY)
            .map_err(|err| Error::internal(format!("session read failed: {err}")))?;
        Ok(raw.and_then(|raw| {
            raw.parse::<UserId>()
                .inspect_err(|err| warn!(error = %err, "discarding malformed session user id"))
                .ok()
        }))
    }

    /// The signed-in user, or `401`.
    pub fn require_user(&self) -> Result<UserId, Error> {
        self.signed_in_user()?
            .ok_or_else(|| Error::unauthorized("sign in required"))
    }

    /// Forget the user and expire the cookie.
    pub fn sign_out(&self) {
        self.inner.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await.map(|inner| Self { inner }) })
    }
}
