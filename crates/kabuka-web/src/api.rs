use actix_web::error::InternalError;
use actix_web::{get, http::StatusCode, web, HttpResponse, Responder, ResponseError};
use kabuka_warehouse::dashboard::{DEFAULT_DAYS, MAX_DAYS, MIN_DAYS};
use kabuka_warehouse::{select_period, Controls, Dashboard, Error, MarketData, PriceRange, View};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

/// Dashboard shared by every worker; the source is type-erased so tests can
/// swap in fixtures.
pub type AppDashboard = Dashboard<Arc<dyn MarketData>>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _| {
        let body = json!({ "error": err.to_string() });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    }))
    .service(index)
    .service(period_for_days)
    .service(company_list)
    .service(chart_view);
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Every failure becomes a JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError(Error);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            Error::UnknownCompany(_) | Error::InvalidPriceRange { .. } => StatusCode::BAD_REQUEST,
            Error::Fetch { .. }
            | Error::MarketData { .. }
            | Error::Status { .. }
            | Error::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        log::error!("{}", self.0);
        HttpResponse::build(self.status_code()).json(json!({ "error": self.0.to_string() }))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Day counts outside the slider's bounds are pulled back inside them.
fn clamp_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_DAYS).clamp(MIN_DAYS, MAX_DAYS)
}

#[derive(Deserialize)]
struct DaysQuery {
    days: Option<i64>,
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../static/index.html"))
}

/// Lookback bucket for a day count
///
/// ```json
/// { "days": 30, "period": "1mo" }
/// ```
#[get("/api/period")]
async fn period_for_days(query: web::Query<DaysQuery>) -> impl Responder {
    let days = clamp_days(query.days);
    HttpResponse::Ok().json(json!({ "days": days, "period": select_period(days) }))
}

#[derive(Serialize)]
struct CompanyList {
    period: kabuka_warehouse::Period,
    companies: Vec<String>,
    defaults: Vec<String>,
    skipped: Vec<kabuka_warehouse::table::SkippedSymbol>,
}

/// Companies on offer, and which of them start selected
///
/// ```json
/// {
///     "period": "1mo",
///     "companies": ["apple", "facebook", ...],
///     "defaults": ["google", "apple", "TOYOTA"],
///     "skipped": []
/// }
/// ```
#[get("/api/companies")]
async fn company_list(
    query: web::Query<DaysQuery>,
    dashboard: web::Data<AppDashboard>,
) -> Result<HttpResponse, ApiError> {
    let days = clamp_days(query.days);
    let table = dashboard.table(days).await?;
    Ok(HttpResponse::Ok().json(CompanyList {
        period: select_period(days),
        companies: table.companies().into_iter().map(String::from).collect(),
        defaults: dashboard.default_selection(days).await?,
        skipped: table.skipped().to_vec(),
    }))
}

#[derive(Deserialize)]
struct ChartQuery {
    days: Option<i64>,
    ymin: Option<f64>,
    ymax: Option<f64>,
    /// Comma separated; absent means the default selection, empty means none.
    companies: Option<String>,
}

/// Vega-Lite line chart of the selected companies
///
/// ```json
/// { "period": "1mo", "series": ["apple"], "spec": { "$schema": "...", ... } }
/// ```
///
/// An empty selection answers `400` with `{"error": "Select at least one company."}`.
#[get("/api/chart")]
async fn chart_view(
    query: web::Query<ChartQuery>,
    dashboard: web::Data<AppDashboard>,
) -> Result<HttpResponse, ApiError> {
    let days = clamp_days(query.days);
    let selection = match &query.companies {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect(),
        None => dashboard.default_selection(days).await?,
    };
    let controls = Controls {
        days,
        range: PriceRange::clamped(
            query.ymin.unwrap_or(PriceRange::FLOOR),
            query.ymax.unwrap_or(PriceRange::CEILING),
        ),
        companies: selection,
    };

    match dashboard.render(&controls).await? {
        View::EmptySelection { message } => {
            Ok(HttpResponse::BadRequest().json(json!({ "error": message })))
        }
        View::Chart {
            period: bucket,
            chart: spec,
        } => Ok(HttpResponse::Ok().json(json!({
            "period": bucket,
            "series": spec.series(),
            "spec": spec.to_vega_lite(),
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use chrono::NaiveDate;
    use kabuka_warehouse::{MemorySource, PriceFetcher, SymbolMap};
    use serde_json::Value;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn fixture() -> (Arc<MemorySource>, web::Data<AppDashboard>) {
        let source = Arc::new(
            MemorySource::new()
                .with_series("AAPL", vec![(day(2), Some(185.64)), (day(3), Some(184.25))])
                .with_series("GOOGL", vec![(day(2), Some(138.17)), (day(3), None)]),
        );
        let symbols = SymbolMap::new([("apple", "AAPL"), ("google", "GOOGL")]).unwrap();
        let erased: Arc<dyn MarketData> = source.clone();
        let dashboard = Dashboard::new(symbols, PriceFetcher::new(erased));
        (source, web::Data::new(dashboard))
    }

    async fn get(data: web::Data<AppDashboard>, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;
        let response = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = response.status();
        let body: Value = test::read_body_json(response).await;
        (status, body)
    }

    #[actix_web::test]
    async fn period_clamps_days() {
        let (_, data) = fixture();
        let (status, body) = get(data.clone(), "/api/period?days=30").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"], "1mo");

        let (_, body) = get(data, "/api/period?days=99999").await;
        assert_eq!(body["days"], 3650);
        assert_eq!(body["period"], "10y");
    }

    #[actix_web::test]
    async fn companies_lists_rows_and_defaults() {
        let (_, data) = fixture();
        let (status, body) = get(data, "/api/companies?days=30").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["companies"], serde_json::json!(["apple", "google"]));
        assert_eq!(body["defaults"], serde_json::json!(["google", "apple"]));
    }

    #[actix_web::test]
    async fn chart_for_one_company() {
        let (source, data) = fixture();
        let (status, body) = get(data.clone(), "/api/chart?days=30&companies=apple&ymax=300").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["series"], serde_json::json!(["apple"]));
        assert_eq!(body["spec"]["encoding"]["y"]["scale"]["domain"], serde_json::json!([0.0, 300.0]));

        // rerunning with other controls reuses the fetched table
        get(data, "/api/chart?days=20&companies=apple,google").await;
        assert_eq!(source.requests(), 2);
    }

    #[actix_web::test]
    async fn chart_without_companies_uses_defaults() {
        let (_, data) = fixture();
        let (status, body) = get(data, "/api/chart?days=400").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"], "2y");
        assert_eq!(body["series"], serde_json::json!(["google", "apple"]));
    }

    #[actix_web::test]
    async fn malformed_queries_answer_json() {
        let (_, data) = fixture();
        let (status, body) = get(data, "/api/chart?companies=apple&ymin=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn empty_selection_is_reported() {
        let (_, data) = fixture();
        let (status, body) = get(data, "/api/chart?companies=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], kabuka_warehouse::dashboard::EMPTY_SELECTION_MESSAGE);
    }

    #[actix_web::test]
    async fn unknown_company_is_a_bad_request() {
        let (_, data) = fixture();
        let (status, body) = get(data, "/api/chart?companies=apple,sony").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unknown company: sony");
    }

    #[actix_web::test]
    async fn fetch_failures_are_bad_gateway() {
        let source: Arc<dyn MarketData> = Arc::new(MemorySource::new());
        let symbols = SymbolMap::new([("apple", "AAPL")]).unwrap();
        let data = web::Data::new(Dashboard::new(symbols, PriceFetcher::new(source)));
        let (status, body) = get(data, "/api/chart?companies=apple").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("[AAPL] apple"));
    }
}
