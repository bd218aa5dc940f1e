//! Sale declaration and approval use-cases.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::listing::paginate;
use crate::domain::notification_service::Notifier;
use crate::domain::ports::{ReferenceRepository, RestaurantRepository, SaleRepository};
use crate::domain::reference_service::require_contact;
use crate::domain::repository_errors::map_sale_error;
use crate::domain::restaurant_service::load_restaurant;
use crate::domain::{
    Action, ContactKind, Error, Gnf, ListPage, ListRequest, MemberContext, NotPendingError,
    ReviewStatus, Sale, SaleDraft, SaleFilter, SaleId, day_key, normalize_optional_text,
    require_reason, sale_pending_message,
};

pub(crate) fn not_pending(err: NotPendingError) -> Error {
    Error::conflict(err.to_string())
}

/// Sales service.
#[derive(Clone)]
pub struct SalesService {
    sales: Arc<dyn SaleRepository>,
    reference: Arc<dyn ReferenceRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl SalesService {
    /// Create the service from its ports.
    pub fn new(
        sales: Arc<dyn SaleRepository>,
        reference: Arc<dyn ReferenceRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sales,
            reference,
            restaurants,
            notifier,
            clock,
        }
    }

    async fn clean_draft(
        &self,
        ctx: &MemberContext,
        draft: SaleDraft,
    ) -> Result<(SaleDraft, Gnf), Error> {
        let total = draft
            .total()
            .map_err(|err| Error::invalid_field("amounts", "invalid_total", err.to_string()))?;
        if let Some(customer_id) = &draft.customer_id {
            require_contact(
                self.reference.as_ref(),
                &ctx.restaurant_id,
                customer_id,
                ContactKind::Customer,
                "customerId",
            )
            .await?;
        }
        let draft = SaleDraft {
            notes: normalize_optional_text(draft.notes.as_deref()),
            ..draft
        };
        Ok((draft, total))
    }

    /// One sale.
    pub async fn get(&self, ctx: &MemberContext, id: &SaleId) -> Result<Sale, Error> {
        ctx.require(Action::View)?;
        self.sales
            .find(&ctx.restaurant_id, id)
            .await
            .map_err(map_sale_error)?
            .ok_or_else(|| Error::not_found(format!("sale {id} not found")))
    }

    /// Sales newest business date first.
    pub async fn list(
        &self,
        ctx: &MemberContext,
        filter: &SaleFilter,
        page: &ListRequest,
    ) -> Result<ListPage<Sale>, Error> {
        ctx.require(Action::View)?;
        let rows = self
            .sales
            .list(&ctx.restaurant_id, filter, page)
            .await
            .map_err(map_sale_error)?;
        paginate(rows, page, |sale| day_key(sale.business_date, *sale.id.as_uuid()))
    }

    /// Declare a day's takings. Managers are told by SMS that a sale awaits
    /// them.
    pub async fn create(&self, ctx: &MemberContext, draft: SaleDraft) -> Result<Sale, Error> {
        ctx.require(Action::RecordSale)?;
        let (draft, total) = self.clean_draft(ctx, draft).await?;
        let sale = Sale {
            id: SaleId::random(),
            restaurant_id: ctx.restaurant_id,
            business_date: draft.business_date,
            amounts: draft.amounts,
            total,
            customer_id: draft.customer_id,
            notes: draft.notes,
            status: ReviewStatus::Pending,
            rejection_reason: None,
            created_by: ctx.user_id,
            reviewed_by: None,
            reviewed_at: None,
            created_at: self.clock.utc(),
        };
        self.sales.insert(&sale).await.map_err(map_sale_error)?;
        info!(
            restaurant_id = %ctx.restaurant_id,
            sale_id = %sale.id,
            business_date = %sale.business_date,
            total = sale.total.get(),
            "sale recorded"
        );
        if let Ok(restaurant) = load_restaurant(self.restaurants.as_ref(), &ctx.restaurant_id).await
        {
            self.notifier
                .notify(&restaurant, &sale_pending_message(&restaurant.name, &sale))
                .await;
        }
        Ok(sale)
    }

    async fn pending(&self, ctx: &MemberContext, id: &SaleId) -> Result<Sale, Error> {
        let sale = self.get(ctx, id).await?;
        sale.status.ensure_pending().map_err(not_pending)?;
        Ok(sale)
    }

    /// Edit a pending sale. Its author may edit it; anyone else needs to be
    /// a manager.
    pub async fn update(
        &self,
        ctx: &MemberContext,
        id: &SaleId,
        draft: SaleDraft,
    ) -> Result<Sale, Error> {
        ctx.require(Action::RecordSale)?;
        let sale = self.pending(ctx, id).await?;
        if sale.created_by != ctx.user_id {
            ctx.require(Action::ApproveSale)?;
        }
        let (draft, total) = self.clean_draft(ctx, draft).await?;
        self.sales
            .update_pending(&ctx.restaurant_id, id, &draft, total)
            .await
            .map_err(map_sale_error)
    }

    /// Approve a pending sale, booking one deposit per payment method.
    /// Card and Orange Money are settled at once; cash waits for banking.
    pub async fn approve(&self, ctx: &MemberContext, id: &SaleId) -> Result<Sale, Error> {
        ctx.require(Action::ApproveSale)?;
        let sale = self.pending(ctx, id).await?;
        let now = self.clock.utc();
        let deposits: Vec<_> = sale
            .approval_deposits()
            .into_iter()
            .map(|draft| {
                let status = draft.settlement_status();
                draft.stamp(ctx.restaurant_id, status, ctx.user_id, now)
            })
            .collect();
        let approved = self
            .sales
            .approve(&ctx.restaurant_id, id, &ctx.user_id, now, &deposits)
            .await
            .map_err(map_sale_error)?;
        info!(
            restaurant_id = %ctx.restaurant_id,
            sale_id = %id,
            deposits = deposits.len(),
            "sale approved"
        );
        Ok(approved)
    }

    /// Reject a pending sale with a reason.
    pub async fn reject(
        &self,
        ctx: &MemberContext,
        id: &SaleId,
        reason: &str,
    ) -> Result<Sale, Error> {
        ctx.require(Action::ApproveSale)?;
        let reason = require_reason(reason)
            .map_err(|err| Error::invalid_field("reason", "required", err.to_string()))?;
        self.pending(ctx, id).await?;
        let rejected = self
            .sales
            .reject(&ctx.restaurant_id, id, &ctx.user_id, self.clock.utc(), &reason)
            .await
            .map_err(map_sale_error)?;
        info!(restaurant_id = %ctx.restaurant_id, sale_id = %id, "sale rejected");
        Ok(rejected)
    }

    /// Delete a pending sale.
    pub async fn delete(&self, ctx: &MemberContext, id: &SaleId) -> Result<(), Error> {
        ctx.require(Action::ApproveSale)?;
        self.pending(ctx, id).await?;
        self.sales
            .delete_pending(&ctx.restaurant_id, id)
            .await
            .map_err(map_sale_error)?;
        info!(restaurant_id = %ctx.restaurant_id, sale_id = %id, "sale deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "sales_service_tests.rs"]
mod tests;
