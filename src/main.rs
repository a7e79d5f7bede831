use forgedb::http::ApiServer;
use forgedb::store::Store;
use log::info;

/// Entry point for the forgedb server.
///
/// # Environment Variables
///
/// * `FORGEDB_DATA` - Directory holding the backing repository
///   (default: `.forgedb`)
/// * `FORGEDB_BIND` - Address to listen on (default: `127.0.0.1:8080`)
/// * `RUST_LOG` - Log filter (default: `info`)
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let data_dir = std::env::var("FORGEDB_DATA").unwrap_or_else(|_| ".forgedb".to_string());
    let bind_address = std::env::var("FORGEDB_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let store = Store::open(&data_dir).map_err(std::io::Error::other)?;
    info!("store opened at {}", data_dir);

    ApiServer::new(store, bind_address).run().await
}
