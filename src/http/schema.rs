use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::error_response;
use crate::store::Store;

#[derive(Deserialize)]
pub struct ReplaceSchemaRequest {
    database_name: String,
    table_name: String,
    schema: Value,
}

#[derive(Deserialize)]
pub struct GetSchemaQuery {
    database_name: String,
    table_name: String,
}

pub async fn replace_schema(
    request: web::Json<ReplaceSchemaRequest>,
    store: web::Data<Store>,
) -> impl Responder {
    match store
        .schemas()
        .replace(&request.database_name, &request.table_name, &request.schema)
    {
        Ok(()) => {
            log::info!(
                "replaced schema of '{}/{}'",
                request.database_name,
                request.table_name
            );
            HttpResponse::Ok().json(json!({
                "message": format!(
                    "schema of table '{}' replaced",
                    request.table_name
                )
            }))
        }
        Err(e) => error_response(e),
    }
}

pub async fn get_schema(
    query: web::Query<GetSchemaQuery>,
    store: web::Data<Store>,
) -> impl Responder {
    match store.schemas().get(&query.database_name, &query.table_name) {
        Ok(schema) => HttpResponse::Ok().json(json!({ "schema": schema })),
        Err(e) => error_response(e),
    }
}
