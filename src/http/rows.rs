use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::error_response;
use crate::store::Store;

#[derive(Deserialize)]
pub struct AppendRowsRequest {
    database_name: String,
    table_name: String,
    data: Value,
}

#[derive(Deserialize)]
pub struct GetRowsQuery {
    database_name: String,
    table_name: String,
    id: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteRowsRequest {
    database_name: String,
    table_name: String,
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateRowRequest {
    database_name: String,
    table_name: String,
    id: String,
    data: Value,
}

pub async fn append_rows(
    request: web::Json<AppendRowsRequest>,
    store: web::Data<Store>,
) -> impl Responder {
    let request = request.into_inner();
    match store
        .rows()
        .append(&request.database_name, &request.table_name, request.data)
    {
        Ok(inserted) => {
            log::info!(
                "appended {} row(s) to '{}/{}'",
                inserted.len(),
                request.database_name,
                request.table_name
            );
            HttpResponse::Created().json(inserted)
        }
        Err(e) => error_response(e),
    }
}

/// Without `id` returns the whole collection; with `id` a single row.
pub async fn get_rows(query: web::Query<GetRowsQuery>, store: web::Data<Store>) -> impl Responder {
    let result = match &query.id {
        Some(id) => store
            .rows()
            .by_id(&query.database_name, &query.table_name, id),
        None => store
            .rows()
            .all(&query.database_name, &query.table_name)
            .map(Value::Array),
    };
    match result {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response(e),
    }
}

/// An absent or empty `ids` list empties the whole table.
pub async fn delete_rows(
    request: web::Json<DeleteRowsRequest>,
    store: web::Data<Store>,
) -> impl Responder {
    match store
        .rows()
        .delete_by_ids(&request.database_name, &request.table_name, &request.ids)
    {
        Ok(deleted) => {
            log::info!(
                "deleted {} row(s) from '{}/{}'",
                deleted,
                request.database_name,
                request.table_name
            );
            HttpResponse::Ok().json(json!({
                "message": format!("{} row(s) deleted", deleted)
            }))
        }
        Err(e) => error_response(e),
    }
}

pub async fn update_row(
    request: web::Json<UpdateRowRequest>,
    store: web::Data<Store>,
) -> impl Responder {
    let request = request.into_inner();
    match store.rows().update_by_id(
        &request.database_name,
        &request.table_name,
        &request.id,
        request.data,
    ) {
        Ok(updated) => {
            log::info!(
                "updated row '{}' in '{}/{}'",
                request.id,
                request.database_name,
                request.table_name
            );
            HttpResponse::Ok().json(updated)
        }
        Err(e) => error_response(e),
    }
}
