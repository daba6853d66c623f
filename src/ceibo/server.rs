// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

mod batch_api;
mod entrecalles_api;
mod geocode_api;
mod labels_api;
mod reverse_proxy;
mod save_load;

use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, Responder, middleware, web};
use clap::Parser;
use croquis::geocoders::GeoClient;
use croquis::store::{AddressStore, DEFAULT_DATA_FILE};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1")]
    address: String,
    /// Overridden by the PORT environment variable when set
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
    /// Path of the persisted address list
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    data_file: String,
}

async fn index(_req: HttpRequest) -> impl Responder {
    HttpResponse::Ok()
        .insert_header(("Content-Type", "text/plain"))
        .body("Hello World from the croquis ceibo HTTP endpoint!")
}

#[actix_web::get("/api/health")]
pub async fn health(_req: HttpRequest) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"ok": true}))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(args.port);

    let mut default_headers = reqwest::header::HeaderMap::new();
    default_headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        "es-AR,es;q=0.9".parse().unwrap(),
    );
    let http = reqwest::Client::builder()
        .user_agent("croquis/0.4 (local app)")
        .default_headers(default_headers)
        .build()
        .unwrap();

    let geo_client = Arc::new(GeoClient::new(http));
    let store = Arc::new(AddressStore::new(&args.data_file));

    println!(
        "Servidor iniciado en http://{}:{} (data file {:?})",
        args.address,
        port,
        store.path()
    );

    let builder = HttpServer::new(move || {
        App::new()
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Server", "CroquisCeibo")),
            )
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .app_data(web::JsonConfig::default().limit(2 * 1024 * 1024))
            .app_data(web::Data::new(Arc::clone(&geo_client)))
            .app_data(web::Data::new(Arc::clone(&store)))
            .route("/", web::get().to(index))
            .service(health)
            .service(geocode_api::geocode)
            .service(reverse_proxy::reverse)
            .service(entrecalles_api::intersections)
            .service(save_load::save)
            .service(save_load::load)
            .service(save_load::export_geojson)
            .service(labels_api::labels)
            .service(batch_api::geocode_batch)
            .service(batch_api::manual_place)
    })
    .workers(4);

    builder.bind((args.address.as_str(), port))?.run().await
}
