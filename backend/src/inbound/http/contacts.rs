//! Customer and supplier handlers.
//!
//! Both kinds share one set of routes; the `{kind}` segment is `customers`
//! or `suppliers`. Cashiers may maintain customers, suppliers need an
//! editor.
//!
//! ```text
//! GET    /api/v1/restaurants/{restaurant_id}/customers?includeInactive=true
//! POST   /api/v1/restaurants/{restaurant_id}/suppliers {"name":"Moulins de Conakry"}
//! GET    /api/v1/restaurants/{restaurant_id}/customers/{contact_id}
//! PUT    /api/v1/restaurants/{restaurant_id}/customers/{contact_id}
//! DELETE /api/v1/restaurants/{restaurant_id}/customers/{contact_id}
//! POST   /api/v1/restaurants/{restaurant_id}/customers/{contact_id}/restore
//! ```

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Contact, ContactDraft, ContactId, ContactKind, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::catalogue::IncludeInactiveQuery;
use crate::inbound::http::membership::Membership;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_phone};

const COLLECTION: &str = "/restaurants/{restaurant_id}/{kind:customers|suppliers}";

/// Path of a contact collection.
#[derive(Debug, Deserialize)]
pub struct ContactsPath {
    kind: String,
}

/// Path of a single contact.
#[derive(Debug, Deserialize)]
pub struct ContactPath {
    kind: String,
    contact_id: String,
}

fn contact_kind(segment: &str) -> Result<ContactKind, Error> {
    match segment {
        "customers" => Ok(ContactKind::Customer),
        "suppliers" => Ok(ContactKind::Supplier),
        other => Err(Error::not_found(format!("no contact collection named {other}"))),
    }
}

impl ContactPath {
    fn parse(&self) -> Result<(ContactKind, ContactId), Error> {
        let kind = contact_kind(&self.kind)?;
        let id = parse_id(&self.contact_id, FieldName::new("contactId"))?;
        Ok((kind, id))
    }
}

/// Body for creating or editing a contact.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<ContactRequest> for ContactDraft {
    type Error = Error;

    fn try_from(value: ContactRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            phone: parse_optional_phone(value.phone.as_deref(), FieldName::new("phone"))?,
            email: value.email,
            address: value.address,
            notes: value.notes,
        })
    }
}

/// Customers or suppliers by name.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/{kind}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("kind" = String, Path, description = "`customers` or `suppliers`"),
        IncludeInactiveQuery
    ),
    responses(
        (status = 200, description = "Contacts", body = [Contact]),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["contacts"],
    operation_id = "listContacts"
)]
pub async fn list_contacts(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<ContactsPath>,
    query: web::Query<IncludeInactiveQuery>,
) -> ApiResult<web::Json<Vec<Contact>>> {
    let kind = contact_kind(&path.kind)?;
    let contacts = state
        .reference
        .list_contacts(&member, kind, query.include_inactive())
        .await?;
    Ok(web::Json(contacts))
}

/// Create a customer or supplier.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/{kind}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("kind" = String, Path, description = "`customers` or `suppliers`")
    ),
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Contact created", body = Contact),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Role too junior", body = ErrorSchema)
    ),
    tags = ["contacts"],
    operation_id = "createContact"
)]
pub async fn create_contact(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<ContactsPath>,
    payload: web::Json<ContactRequest>,
) -> ApiResult<HttpResponse> {
    let kind = contact_kind(&path.kind)?;
    let draft = ContactDraft::try_from(payload.into_inner())?;
    let contact = state.reference.create_contact(&member, kind, draft).await?;
    Ok(HttpResponse::Created().json(contact))
}

/// One contact.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/{kind}/{contact_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("kind" = String, Path, description = "`customers` or `suppliers`"),
        ("contact_id" = String, Path, description = "Contact id")
    ),
    responses(
        (status = 200, description = "Contact", body = Contact),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["contacts"],
    operation_id = "getContact"
)]
pub async fn get_contact(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<ContactPath>,
) -> ApiResult<web::Json<Contact>> {
    let (kind, id) = path.parse()?;
    let contact = state.reference.get_contact(&member, kind, &id).await?;
    Ok(web::Json(contact))
}

/// Edit a contact.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant_id}/{kind}/{contact_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("kind" = String, Path, description = "`customers` or `suppliers`"),
        ("contact_id" = String, Path, description = "Contact id")
    ),
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Updated contact", body = Contact),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Role too junior", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["contacts"],
    operation_id = "updateContact"
)]
pub async fn update_contact(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<ContactPath>,
    payload: web::Json<ContactRequest>,
) -> ApiResult<web::Json<Contact>> {
    let (kind, id) = path.parse()?;
    let draft = ContactDraft::try_from(payload.into_inner())?;
    let contact = state
        .reference
        .update_contact(&member, kind, &id, draft)
        .await?;
    Ok(web::Json(contact))
}

/// Archive a contact. History keeps pointing at it.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant_id}/{kind}/{contact_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("kind" = String, Path, description = "`customers` or `suppliers`"),
        ("contact_id" = String, Path, description = "Contact id")
    ),
    responses(
        (status = 204, description = "Archived"),
        (status = 403, description = "Role too junior", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["contacts"],
    operation_id = "archiveContact"
)]
pub async fn archive_contact(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<ContactPath>,
) -> ApiResult<HttpResponse> {
    let (kind, id) = path.parse()?;
    state
        .reference
        .set_contact_active(&member, kind, &id, false)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Restore an archived contact.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/{kind}/{contact_id}/restore",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("kind" = String, Path, description = "`customers` or `suppliers`"),
        ("contact_id" = String, Path, description = "Contact id")
    ),
    responses(
        (status = 204, description = "Restored"),
        (status = 403, description = "Role too junior", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["contacts"],
    operation_id = "restoreContact"
)]
pub async fn restore_contact(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<ContactPath>,
) -> ApiResult<HttpResponse> {
    let (kind, id) = path.parse()?;
    state
        .reference
        .set_contact_active(&member, kind, &id, true)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the contact routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(COLLECTION)
            .route(web::get().to(list_contacts))
            .route(web::post().to(create_contact)),
    )
    .service(
        web::resource(format!("{COLLECTION}/{{contact_id}}"))
            .route(web::get().to(get_contact))
            .route(web::put().to(update_contact))
            .route(web::delete().to(archive_contact)),
    )
    .service(
        web::resource(format!("{COLLECTION}/{{contact_id}}/restore"))
            .route(web::post().to(restore_contact)),
    );
}
