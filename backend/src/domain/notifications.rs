//! SMS message composition.
//!
//! Messages are short French texts sized for a single SMS where possible.
//! Sending is best-effort and lives behind the `SmsGateway` port.

use serde::Serialize;
use utoipa::ToSchema;

use super::{
    ExpiryStatus, InventoryItem, InventoryItemView, Sale, StockStatus,
};

/// Names listed per section of the daily digest.
pub const DIGEST_NAME_LIMIT: usize = 5;

/// Alert for an item that just dropped to a low or critical level.
#[must_use]
pub fn low_stock_message(restaurant_name: &str, item: &InventoryItem) -> String {
    let level = match item.stock_status() {
        StockStatus::Critical => "CRITIQUE",
        StockStatus::Low | StockStatus::Ok => "bas",
    };
    format!(
        "{restaurant_name}: stock {level} pour {} ({} {} restant, minimum {}).",
        item.name, item.quantity, item.unit, item.min_stock
    )
}

/// Notice that a sale awaits approval.
#[must_use]
pub fn sale_pending_message(restaurant_name: &str, sale: &Sale) -> String {
    format!(
        "{restaurant_name}: vente du {} ({} GNF) en attente de validation.",
        sale.business_date,
        sale.total.get()
    )
}

/// Figures collected for one restaurant's daily digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyDigest {
    /// Items at critical level.
    pub critical_items: Vec<String>,
    /// Items at low level.
    pub low_items: Vec<String>,
    /// Items past expiry.
    pub expired_items: Vec<String>,
    /// Items inside the warning window.
    pub expiring_items: Vec<String>,
    /// Sales awaiting review.
    pub pending_sales: u32,
    /// Expenses awaiting review.
    pub pending_expenses: u32,
    /// Overdue debts.
    pub overdue_debts: u32,
    /// Amount still owed on overdue debts.
    pub overdue_amount: i64,
}

impl DailyDigest {
    /// Sort item views into the digest's stock sections.
    pub fn with_items<'a>(mut self, items: impl IntoIterator<Item = &'a InventoryItemView>) -> Self {
        for view in items {
            let name = view.item.name.clone();
            match view.stock_status {
                StockStatus::Critical => self.critical_items.push(name.clone()),
                StockStatus::Low => self.low_items.push(name.clone()),
                StockStatus::Ok => {}
            }
            match view.expiry.map(|info| info.status) {
                Some(ExpiryStatus::Expired) => self.expired_items.push(name),
                Some(ExpiryStatus::Warning) => self.expiring_items.push(name),
                Some(ExpiryStatus::Fresh) | None => {}
            }
        }
        self
    }

    /// True when there is nothing worth sending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.critical_items.is_empty()
            && self.low_items.is_empty()
            && self.expired_items.is_empty()
            && self.expiring_items.is_empty()
            && self.pending_sales == 0
            && self.pending_expenses == 0
            && self.overdue_debts == 0
    }

    /// Render the digest, or `None` when empty.
    ///
    /// # Examples
    /// ```
    /// use fournil::domain::DailyDigest;
    ///
    /// let digest = DailyDigest { pending_sales: 2, ..DailyDigest::default() };
    /// let text = digest.render("Fournil Kaloum").expect("non-empty");
    /// assert!(text.contains("2 vente(s)"));
    /// assert!(DailyDigest::default().render("Fournil Kaloum").is_none());
    /// ```
    #[must_use]
    pub fn render(&self, restaurant_name: &str) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut lines = vec![format!("{restaurant_name} - point du jour")];
        push_items(&mut lines, "Stock critique", &self.critical_items);
        push_items(&mut lines, "Stock bas", &self.low_items);
        push_items(&mut lines, "Perimes", &self.expired_items);
        push_items(&mut lines, "Bientot perimes", &self.expiring_items);
        if self.pending_sales > 0 || self.pending_expenses > 0 {
            lines.push(format!(
                "A valider: {} vente(s), {} depense(s)",
                self.pending_sales, self.pending_expenses
            ));
        }
        if self.overdue_debts > 0 {
            lines.push(format!(
                "Dettes en retard: {} ({} GNF)",
                self.overdue_debts, self.overdue_amount
            ));
        }
        Some(lines.join("\n"))
    }
}

fn push_items(lines: &mut Vec<String>, label: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    let shown = names
        .iter()
        .take(DIGEST_NAME_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let extra = names.len().saturating_sub(DIGEST_NAME_LIMIT);
    if extra > 0 {
        lines.push(format!("{label} ({}): {shown} +{extra}", names.len()));
    } else {
        lines.push(format!("{label} ({}): {shown}", names.len()));
    }
}

/// Outcome of one digest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DigestRunReport {
    /// Restaurants examined.
    pub restaurants_scanned: u32,
    /// Messages delivered to the gateway.
    pub messages_sent: u32,
    /// Restaurants with nothing to report.
    pub skipped: u32,
    /// Restaurants whose digest failed.
    pub failures: u32,
}
