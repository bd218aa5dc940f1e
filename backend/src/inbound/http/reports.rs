//! Period report handler.

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::PeriodReport;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::membership::Membership;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_date, required};

/// Inclusive period bounds.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// First day, `YYYY-MM-DD`.
    from: Option<String>,
    /// Last day, `YYYY-MM-DD`.
    to: Option<String>,
}

/// Sales, expenses, debt, and stock value for a period.
///
/// Pending counts and outstanding debt describe the restaurant as it stands
/// now, not as it stood at the end of the period.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/reports/summary",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), PeriodQuery),
    responses(
        (status = 200, description = "Period summary", body = PeriodReport),
        (status = 400, description = "Missing or inverted period", body = ErrorSchema),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "periodSummary"
)]
#[get("/restaurants/{restaurant_id}/reports/summary")]
pub async fn period_summary(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<PeriodQuery>,
) -> ApiResult<HttpResponse> {
    let from = required(query.from.as_deref(), FieldName::new("from"))?;
    let to = required(query.to.as_deref(), FieldName::new("to"))?;
    let from = parse_date(from, FieldName::new("from"))?;
    let to = parse_date(to, FieldName::new("to"))?;
    let report = state.reports.period_summary(&member, from, to).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(report))
}

/// Register the report routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(period_summary);
}
