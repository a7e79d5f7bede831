//! Maps store errors onto HTTP responses.

use actix_web::HttpResponse;
use serde_json::json;

use crate::store::StoreError;

/// Pick the status from the error kind: concurrency rejections are 409,
/// absence is 404, caller mistakes are 400, everything else is a 500 and
/// gets logged here since the handler has nothing more to add.
pub(crate) fn error_response(err: StoreError) -> HttpResponse {
    let body = json!({"error": err.to_string()});
    if err.is_conflict() {
        HttpResponse::Conflict().json(body)
    } else if err.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else if err.is_caller_error() {
        HttpResponse::BadRequest().json(body)
    } else {
        log::error!("request failed: {}", err);
        HttpResponse::InternalServerError().json(body)
    }
}
