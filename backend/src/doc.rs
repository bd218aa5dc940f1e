//! OpenAPI document for the REST API.
//!
//! [`ApiDoc`] collects every handler under `inbound::http` together with the
//! error envelope and the two security schemes: the session cookie used by
//! staff, and the bearer secret used by the external scheduler on the cron
//! endpoint. Swagger UI serves it in debug builds and the `openapi-dump`
//! binary prints it.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Balances, BankTransaction, Category, Contact, CustomerDebtSummary, Debt, DebtDetail,
    Expense, ExpenseGroup, InventoryItemView, InventorySummary, Member, MovementOutcome,
    PeriodReport, Product, ProductionBatch, Profile, Reconciliation, Restaurant, Sale,
    StockMovement,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, PageSchema};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
        components.add_security_scheme(
            "CronBearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Shared secret configured as FOURNIL_CRON_SECRET."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document; served by Swagger UI in debug builds.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Fournil API",
        description = "Back office for bakeries and restaurants: stock, production, sales, \
                       expenses, customer debts, and bank reconciliation. Amounts are whole GNF."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::restaurants::create_restaurant,
        crate::inbound::http::restaurants::get_restaurant,
        crate::inbound::http::restaurants::update_settings,
        crate::inbound::http::restaurants::list_members,
        crate::inbound::http::restaurants::add_member,
        crate::inbound::http::restaurants::change_role,
        crate::inbound::http::restaurants::remove_member,
        crate::inbound::http::contacts::list_contacts,
        crate::inbound::http::contacts::create_contact,
        crate::inbound::http::contacts::get_contact,
        crate::inbound::http::contacts::update_contact,
        crate::inbound::http::contacts::archive_contact,
        crate::inbound::http::contacts::restore_contact,
        crate::inbound::http::catalogue::list_categories,
        crate::inbound::http::catalogue::create_category,
        crate::inbound::http::catalogue::rename_category,
        crate::inbound::http::catalogue::archive_category,
        crate::inbound::http::catalogue::restore_category,
        crate::inbound::http::catalogue::list_expense_groups,
        crate::inbound::http::catalogue::create_expense_group,
        crate::inbound::http::catalogue::update_expense_group,
        crate::inbound::http::catalogue::archive_expense_group,
        crate::inbound::http::catalogue::restore_expense_group,
        crate::inbound::http::catalogue::list_products,
        crate::inbound::http::catalogue::create_product,
        crate::inbound::http::catalogue::update_product,
        crate::inbound::http::catalogue::archive_product,
        crate::inbound::http::catalogue::restore_product,
        crate::inbound::http::inventory::list_items,
        crate::inbound::http::inventory::create_item,
        crate::inbound::http::inventory::get_item,
        crate::inbound::http::inventory::update_item,
        crate::inbound::http::inventory::archive_item,
        crate::inbound::http::inventory::restore_item,
        crate::inbound::http::inventory::record_movement,
        crate::inbound::http::inventory::list_movements,
        crate::inbound::http::inventory::summary,
        crate::inbound::http::production::record_batch,
        crate::inbound::http::production::list_batches,
        crate::inbound::http::sales::list_sales,
        crate::inbound::http::sales::create_sale,
        crate::inbound::http::sales::get_sale,
        crate::inbound::http::sales::update_sale,
        crate::inbound::http::sales::approve_sale,
        crate::inbound::http::sales::reject_sale,
        crate::inbound::http::sales::delete_sale,
        crate::inbound::http::expenses::list_expenses,
        crate::inbound::http::expenses::create_expense,
        crate::inbound::http::expenses::get_expense,
        crate::inbound::http::expenses::update_expense,
        crate::inbound::http::expenses::approve_expense,
        crate::inbound::http::expenses::reject_expense,
        crate::inbound::http::expenses::delete_expense,
        crate::inbound::http::debts::list_debts,
        crate::inbound::http::debts::create_debt,
        crate::inbound::http::debts::customer_summaries,
        crate::inbound::http::debts::get_debt,
        crate::inbound::http::debts::record_payment,
        crate::inbound::http::debts::delete_payment,
        crate::inbound::http::debts::write_off,
        crate::inbound::http::banking::list_transactions,
        crate::inbound::http::banking::create_transaction,
        crate::inbound::http::banking::get_transaction,
        crate::inbound::http::banking::confirm_transaction,
        crate::inbound::http::banking::reject_transaction,
        crate::inbound::http::banking::delete_transaction,
        crate::inbound::http::banking::balances,
        crate::inbound::http::banking::list_reconciliations,
        crate::inbound::http::banking::create_reconciliation,
        crate::inbound::http::banking::get_reconciliation,
        crate::inbound::http::reports::period_summary,
        crate::inbound::http::cron::daily_notifications,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        Profile,
        Restaurant,
        Member,
        Contact,
        Category,
        ExpenseGroup,
        Product,
        InventoryItemView,
        InventorySummary,
        MovementOutcome,
        ProductionBatch,
        Sale,
        Expense,
        Debt,
        DebtDetail,
        CustomerDebtSummary,
        BankTransaction,
        Balances,
        Reconciliation,
        PeriodReport,
        PageSchema<Contact>,
        PageSchema<StockMovement>,
        PageSchema<ProductionBatch>,
        PageSchema<Sale>,
        PageSchema<Expense>,
        PageSchema<Debt>,
        PageSchema<BankTransaction>,
        PageSchema<Reconciliation>,
    )),
    tags(
        (name = "auth", description = "Registration, login, and the signed-in profile"),
        (name = "restaurants", description = "Restaurants, settings, and staff roles"),
        (name = "contacts", description = "Customers and suppliers"),
        (name = "catalogue", description = "Categories, expense groups, and products"),
        (name = "inventory", description = "Stock items, movements, and valuation"),
        (name = "production", description = "Production batches"),
        (name = "sales", description = "Daily sales and their approval"),
        (name = "expenses", description = "Expenses and their approval"),
        (name = "debts", description = "Customer debts and payments"),
        (name = "banking", description = "Bank transactions, balances, and reconciliation"),
        (name = "reports", description = "Period summaries"),
        (name = "cron", description = "Scheduler-driven jobs"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
