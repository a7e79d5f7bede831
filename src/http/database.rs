use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use super::error::error_response;
use crate::store::Store;

#[derive(Deserialize)]
pub struct DatabaseRequest {
    database_name: String,
}

pub async fn create_database(
    request: web::Json<DatabaseRequest>,
    store: web::Data<Store>,
) -> impl Responder {
    match store.databases().create(&request.database_name) {
        Ok(()) => {
            log::info!("created database '{}'", request.database_name);
            HttpResponse::Created().json(json!({
                "message": format!("database '{}' created", request.database_name)
            }))
        }
        Err(e) => error_response(e),
    }
}

pub async fn list_databases(store: web::Data<Store>) -> impl Responder {
    match store.databases().list() {
        Ok(databases) => HttpResponse::Ok().json(json!({ "databases": databases })),
        Err(e) => error_response(e),
    }
}

pub async fn delete_database(
    request: web::Json<DatabaseRequest>,
    store: web::Data<Store>,
) -> impl Responder {
    match store.databases().delete(&request.database_name) {
        Ok(()) => {
            log::info!("deleted database '{}'", request.database_name);
            HttpResponse::Ok().json(json!({
                "message": format!("database '{}' deleted", request.database_name)
            }))
        }
        Err(e) => error_response(e),
    }
}
