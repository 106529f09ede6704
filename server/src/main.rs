use actix_web::{web, App, HttpServer};

use server::connection::ws_index;
use server::relay::spawn_relay;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let relay_tx = spawn_relay();

    HttpServer::new(move || {
        App::new()
            .data(relay_tx.clone())
            .route("/ws/", web::get().to(ws_index))
    })
    .bind("0.0.0.0:8001")?
    .run()
    .await
}
