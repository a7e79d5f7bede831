use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::error_response;
use crate::store::Store;

#[derive(Deserialize)]
pub struct CreateTableRequest {
    database_name: String,
    table_name: String,
    schema: Value,
}

#[derive(Deserialize)]
pub struct RenameTableRequest {
    database_name: String,
    old_table_name: String,
    new_table_name: String,
}

#[derive(Deserialize)]
pub struct ListTablesQuery {
    database_name: String,
}

#[derive(Deserialize)]
pub struct DeleteTableRequest {
    database_name: String,
    table_name: String,
}

pub async fn create_table(
    request: web::Json<CreateTableRequest>,
    store: web::Data<Store>,
) -> impl Responder {
    match store
        .tables()
        .create(&request.database_name, &request.table_name, &request.schema)
    {
        Ok(()) => {
            log::info!(
                "created table '{}/{}'",
                request.database_name,
                request.table_name
            );
            HttpResponse::Created().json(json!({
                "message": format!(
                    "table '{}' created in database '{}'",
                    request.table_name, request.database_name
                )
            }))
        }
        Err(e) => error_response(e),
    }
}

pub async fn rename_table(
    request: web::Json<RenameTableRequest>,
    store: web::Data<Store>,
) -> impl Responder {
    match store.tables().rename(
        &request.database_name,
        &request.old_table_name,
        &request.new_table_name,
    ) {
        Ok(()) => {
            log::info!(
                "renamed table '{}/{}' to '{}'",
                request.database_name,
                request.old_table_name,
                request.new_table_name
            );
            HttpResponse::Ok().json(json!({
                "message": format!(
                    "table '{}' renamed to '{}'",
                    request.old_table_name, request.new_table_name
                )
            }))
        }
        Err(e) => error_response(e),
    }
}

pub async fn list_tables(
    query: web::Query<ListTablesQuery>,
    store: web::Data<Store>,
) -> impl Responder {
    match store.tables().list(&query.database_name) {
        Ok(tables) => HttpResponse::Ok().json(json!({ "tables": tables })),
        Err(e) => error_response(e),
    }
}

pub async fn delete_table(
    request: web::Json<DeleteTableRequest>,
    store: web::Data<Store>,
) -> impl Responder {
    match store
        .tables()
        .delete(&request.database_name, &request.table_name)
    {
        Ok(()) => {
            log::info!(
                "deleted table '{}/{}'",
                request.database_name,
                request.table_name
            );
            HttpResponse::Ok().json(json!({
                "message": format!(
                    "table '{}' deleted from database '{}'",
                    request.table_name, request.database_name
                )
            }))
        }
        Err(e) => error_response(e),
    }
}
