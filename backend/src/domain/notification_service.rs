//! Best-effort SMS delivery and the daily digest run.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    InventoryRepository, ReportRepository, RestaurantRepository, SmsGateway,
};
use crate::domain::repository_errors::{
    map_inventory_error, map_report_error, map_restaurant_error,
};
use crate::domain::{
    DailyDigest, DigestRunReport, Error, InventoryItemView, ReportPeriod, Restaurant,
};

/// Sends SMS to a restaurant's notification number without ever failing
/// the caller.
#[derive(Clone)]
pub struct Notifier {
    gateway: Arc<dyn SmsGateway>,
}

impl Notifier {
    /// Wrap a gateway.
    pub fn new(gateway: Arc<dyn SmsGateway>) -> Self {
        Self { gateway }
    }

    /// Send `body` if the restaurant has notifications enabled. Returns
    /// whether the gateway accepted the message.
    pub async fn notify(&self, restaurant: &Restaurant, body: &str) -> bool {
        let Some(phone) = restaurant.notification_target() else {
            return false;
        };
        match self.gateway.send(phone, body).await {
            Ok(()) => true,
            Err(err) => {
                warn!(restaurant_id = %restaurant.id, error = %err, "sms delivery failed");
                false
            }
        }
    }
}

/// Outcome of one restaurant's digest.
enum DigestOutcome {
    Sent,
    Skipped,
}

/// Daily digest service.
#[derive(Clone)]
pub struct NotificationService {
    restaurants: Arc<dyn RestaurantRepository>,
    inventory: Arc<dyn InventoryRepository>,
    reports: Arc<dyn ReportRepository>,
    gateway: Arc<dyn SmsGateway>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    /// Create the service from its ports.
    pub fn new(
        restaurants: Arc<dyn RestaurantRepository>,
        inventory: Arc<dyn InventoryRepository>,
        reports: Arc<dyn ReportRepository>,
        gateway: Arc<dyn SmsGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            restaurants,
            inventory,
            reports,
            gateway,
            clock,
        }
    }

    /// Compose and send the digest for every restaurant that opted in.
    ///
    /// Restaurants are handled one after another; a failure is logged and
    /// counted and the run moves on.
    pub async fn run_daily_digest(&self) -> Result<DigestRunReport, Error> {
        let restaurants = self
            .restaurants
            .list_notifiable()
            .await
            .map_err(map_restaurant_error)?;
        let mut report = DigestRunReport::default();
        for restaurant in &restaurants {
            report.restaurants_scanned += 1;
            match self.digest_one(restaurant).await {
                Ok(DigestOutcome::Sent) => report.messages_sent += 1,
                Ok(DigestOutcome::Skipped) => report.skipped += 1,
                Err(err) => {
                    warn!(restaurant_id = %restaurant.id, error = %err, "daily digest failed");
                    report.failures += 1;
                }
            }
        }
        info!(
            scanned = report.restaurants_scanned,
            sent = report.messages_sent,
            skipped = report.skipped,
            failures = report.failures,
            "daily digest run finished"
        );
        Ok(report)
    }

    async fn digest_one(&self, restaurant: &Restaurant) -> Result<DigestOutcome, Error> {
        let Some(phone) = restaurant.notification_target() else {
            return Ok(DigestOutcome::Skipped);
        };
        let today = self.clock.utc().date_naive();
        let items = self
            .inventory
            .list_items(&restaurant.id, false)
            .await
            .map_err(map_inventory_error)?;
        let views: Vec<_> = items
            .into_iter()
            .map(|item| InventoryItemView::derive(item, today, restaurant.expiry_warning_days))
            .collect();
        let period = ReportPeriod { from: today, to: today };
        let figures = self
            .reports
            .period_figures(&restaurant.id, &period)
            .await
            .map_err(map_report_error)?;
        let overdue = self
            .reports
            .overdue_debts(&restaurant.id, today)
            .await
            .map_err(map_report_error)?;

        let digest = DailyDigest {
            pending_sales: figures.pending_sales,
            pending_expenses: figures.pending_expenses,
            overdue_debts: overdue.count,
            overdue_amount: overdue.amount,
            ..DailyDigest::default()
        }
        .with_items(&views);
        let Some(body) = digest.render(&restaurant.name) else {
            return Ok(DigestOutcome::Skipped);
        };
        self.gateway
            .send(phone, &body)
            .await
            .map_err(|err| Error::service_unavailable(err.to_string()))?;
        Ok(DigestOutcome::Sent)
    }
}
