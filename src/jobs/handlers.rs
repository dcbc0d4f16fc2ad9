use axum::{
    extract::Query,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use super::{
    dto::{ListingQuery, ListingResponse},
    filter::{facet_values, filter_listings, Filters},
    fixtures::{job_exams, job_news},
};
use crate::state::AppState;

pub fn jobs_routes() -> Router<AppState> {
    Router::new()
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/facets", get(facets))
        .route("/api/jobs/news", get(news))
}

#[instrument]
pub async fn list_jobs(Query(query): Query<ListingQuery>) -> Response {
    let all = job_exams();
    let filters = Filters::from(&query);
    let jobs = filter_listings(&all, query.q.as_deref().unwrap_or_default(), &filters);
    debug!(matched = jobs.len(), "jobs filtered");
    Json(ListingResponse {
        total: jobs.len(),
        jobs,
    })
    .into_response()
}

pub async fn facets() -> Response {
    Json(facet_values(&job_exams())).into_response()
}

pub async fn news() -> Response {
    Json(job_news()).into_response()
}
