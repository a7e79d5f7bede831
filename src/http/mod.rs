//! REST surface over [`Store`](crate::store::Store).
//!
//! One resource per path: `/database`, `/table`, `/schema`, `/rows`, with
//! the HTTP verb selecting the operation. Request bodies and query strings
//! carry `database_name` / `table_name` fields rather than path segments,
//! and every response is JSON.

mod database;
mod error;
mod rows;
mod schema;
mod table;

use actix_web::{web, App, HttpServer};

use crate::store::Store;

/// HTTP server wrapping a store handle.
pub struct ApiServer {
    store: Store,
    bind_address: String,
}

impl ApiServer {
    /// create a server; nothing binds until [`run`](Self::run)
    pub fn new(store: Store, bind_address: impl Into<String>) -> Self {
        Self {
            store,
            bind_address: bind_address.into(),
        }
    }

    /// bind and serve until the process is stopped
    pub async fn run(self) -> std::io::Result<()> {
        log::info!("listening on {}", self.bind_address);
        let store = web::Data::new(self.store);
        HttpServer::new(move || {
            App::new()
                .app_data(store.clone())
                .configure(routes)
        })
        .bind(&self.bind_address)?
        .run()
        .await
    }
}

/// route table, separated out so tests can mount it on a test app
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/database", web::post().to(database::create_database))
        .route("/database", web::get().to(database::list_databases))
        .route("/database", web::delete().to(database::delete_database))
        .route("/table", web::post().to(table::create_table))
        .route("/table", web::put().to(table::rename_table))
        .route("/table", web::get().to(table::list_tables))
        .route("/table", web::delete().to(table::delete_table))
        .route("/schema", web::post().to(schema::replace_schema))
        .route("/schema", web::get().to(schema::get_schema))
        .route("/rows", web::post().to(rows::append_rows))
        .route("/rows", web::get().to(rows::get_rows))
        .route("/rows", web::delete().to(rows::delete_rows))
        .route("/rows", web::put().to(rows::update_row));
}
