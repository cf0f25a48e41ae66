use super::server::AppState;
use crate::application::composite::MacroSnapshot;
use crate::application::ml::DirectionPrediction;
use crate::config::ReadinessReport;
use crate::domain::types::NewsArticle;
use crate::infrastructure::observability::LatencyGuard;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

pub const DEFAULT_NEWS_LIMIT: usize = 20;
const MAX_NEWS_LIMIT: usize = 200;

fn error_response(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}

fn internal_error(context: &str, err: impl std::fmt::Display) -> Response {
    error!("{}: {}", context, err);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "detail": format!("{}: {}", context, err) }),
    )
}

/// Tag the timer with the error status, if any, and hand the result back.
fn observed<T>(mut timer: LatencyGuard, result: Result<T, Response>) -> Result<T, Response> {
    if let Err(response) = &result {
        timer.record_status(response.status().as_u16());
    }
    result
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    #[serde(flatten)]
    pub readiness: ReadinessReport,
}

/// Readiness: configuration checks plus a database round trip.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut timer = state.app.metrics.time_endpoint("health");
    let readiness = state.app.config.readiness();
    let database = match state.app.database.ping().await {
        Ok(()) => true,
        Err(e) => {
            error!("Health check database ping failed: {:#}", e);
            false
        }
    };

    let (status_code, status) = match (database, readiness.ready) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "error"),
        (true, false) => (StatusCode::OK, "degraded"),
        (true, true) => (StatusCode::OK, "ok"),
    };
    timer.record_status(status_code.as_u16());
    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            readiness,
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct TimeseriesQuery {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimeseriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct TimeseriesResponse {
    pub code: String,
    pub name: String,
    pub count: usize,
    pub data: Vec<TimeseriesPoint>,
}

pub async fn timeseries(
    State(state): State<AppState>,
    Query(query): Query<TimeseriesQuery>,
) -> Result<Json<TimeseriesResponse>, Response> {
    let timer = state.app.metrics.time_endpoint("timeseries");
    observed(timer, load_timeseries(&state, query).await)
}

async fn load_timeseries(
    state: &AppState,
    query: TimeseriesQuery,
) -> Result<Json<TimeseriesResponse>, Response> {
    let code = query
        .code
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing 'code' query parameter, e.g. ?code=CPI" }),
            )
        })?;

    let series = state
        .app
        .series
        .find_by_code(&code)
        .await
        .map_err(|e| internal_error("Failed to load series", e))?
        .ok_or_else(|| {
            error_response(
                StatusCode::NOT_FOUND,
                json!({ "error": format!("Unknown series code '{}'", code) }),
            )
        })?;

    let data: Vec<TimeseriesPoint> = state
        .app
        .observations
        .history(&series.code)
        .await
        .map_err(|e| internal_error("Failed to load observations", e))?
        .into_iter()
        .map(|o| TimeseriesPoint {
            date: o.date,
            value: o.value,
        })
        .collect();

    Ok(Json(TimeseriesResponse {
        code: series.code,
        name: series.name,
        count: data.len(),
        data,
    }))
}

pub async fn macro_snapshot(
    State(state): State<AppState>,
) -> Result<Json<MacroSnapshot>, Response> {
    let timer = state.app.metrics.time_endpoint("macro_snapshot");
    let result = match state.app.composite.macro_snapshot().await {
        Ok(Some(snapshot)) => Ok(Json(snapshot)),
        Ok(None) => Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "detail": "No FeatureFrame data available." }),
        )),
        Err(e) => Err(internal_error("Failed to compute macro snapshot", e)),
    };
    observed(timer, result)
}

pub async fn spx_direction(
    State(state): State<AppState>,
) -> Result<Json<DirectionPrediction>, Response> {
    let timer = state.app.metrics.time_endpoint("spx_direction");
    let result = match state.app.predictor.predict_latest_direction().await {
        Ok(prediction) => {
            state.app.metrics.probability_up.set(prediction.probability_up);
            Ok(Json(prediction))
        }
        Err(e) if e.is_unavailable() => Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "detail": e.to_string() }),
        )),
        Err(e) => Err(internal_error("Prediction failed", e)),
    };
    observed(timer, result)
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewsItem {
    pub source: String,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub tickers: Vec<String>,
    pub summary: String,
    pub sentiment_label: String,
    pub sentiment_score: Option<f64>,
    pub topics: String,
}

impl From<NewsArticle> for NewsItem {
    fn from(article: NewsArticle) -> Self {
        Self {
            source: article.source,
            title: article.title,
            url: article.url,
            published_at: article.published_at,
            tickers: article.tickers,
            summary: article.summary,
            sentiment_label: article.sentiment_label,
            sentiment_score: article.sentiment_score,
            topics: article.topics,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub count: usize,
    pub articles: Vec<NewsItem>,
}

/// A missing, unparsable or zero limit falls back to the default.
pub fn parse_news_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map_or(DEFAULT_NEWS_LIMIT, |n| n.min(MAX_NEWS_LIMIT))
}

pub async fn news(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<NewsResponse>, Response> {
    let timer = state.app.metrics.time_endpoint("news");
    let limit = parse_news_limit(query.limit.as_deref());
    let result = state
        .app
        .articles
        .latest(limit)
        .await
        .map_err(|e| internal_error("Failed to load news", e))
        .map(|stored| {
            let articles: Vec<NewsItem> = stored.into_iter().map(NewsItem::from).collect();
            Json(NewsResponse {
                count: articles.len(),
                articles,
            })
        });
    observed(timer, result)
}

/// Start the update pipeline in the background and return at once.
pub async fn trigger_update(State(state): State<AppState>) -> Response {
    let mut timer = state.app.metrics.time_endpoint("update");
    let readiness = state.app.config.readiness();
    if !readiness.ready {
        timer.record_status(StatusCode::BAD_REQUEST.as_u16());
        return error_response(
            StatusCode::BAD_REQUEST,
            json!({
                "status": "error",
                "message": format!("Missing environment variables: {}", readiness.missing.join(", ")),
                "missing": readiness.missing,
            }),
        );
    }

    let job_id = Uuid::new_v4();
    let pipeline = state.app.update_pipeline();
    tokio::spawn(async move {
        info!("Update job {} started", job_id);
        let report = pipeline.run().await;
        if report.all_ok() {
            info!("Update job {} finished", job_id);
        } else {
            error!(
                "Update job {} finished with failed steps: {}",
                job_id,
                report.failed_steps().join(", ")
            );
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "job_id": job_id,
            "status": "started",
            "message": "Data update started in background. Progress is reported in the server logs.",
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_news_limit() {
        assert_eq!(parse_news_limit(None), DEFAULT_NEWS_LIMIT);
        assert_eq!(parse_news_limit(Some("5")), 5);
        assert_eq!(parse_news_limit(Some("abc")), DEFAULT_NEWS_LIMIT);
        assert_eq!(parse_news_limit(Some("0")), DEFAULT_NEWS_LIMIT);
        assert_eq!(parse_news_limit(Some("100000")), MAX_NEWS_LIMIT);
    }
}
