//! HTTP handler functions for the lake name resolver API.

use actix_web::{HttpResponse, web};
use lake_resolver::{ResolverError, ResolverFacade};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ApiHealth {
    healthy: bool,
    version: String,
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ResolveQueryParams {
    name: String,
    county: Option<String>,
}

/// `GET /api/resolve?name=<raw>&county=<optional>`
///
/// Resolves a raw lake designation to its gazetteer entry. Responds `400`
/// for empty input and `503` if the gazetteer dataset itself is unusable;
/// a name that the resolver simply cannot match is a `200` with the null
/// [`lake_resolver_models::MatchResult`], not an error.
pub async fn resolve(state: web::Data<ResolverFacade>, params: web::Query<ResolveQueryParams>) -> HttpResponse {
    match state.resolve(&params.name, params.county.as_deref()) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(ResolverError::InvalidInput(message)) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
        }
        Err(e @ (ResolverError::DatasetMissing(_) | ResolverError::DatasetCorrupt(_))) => {
            log::error!("gazetteer unavailable: {e}");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": "lake dataset unavailable"
            }))
        }
    }
}
