use crate::connection::ws_index;
use crate::handlers::rooms::configure_room_handlers;
use actix_web::web;

mod rooms;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws/{room_id}").route(web::get().to(ws_index)));
    cfg.service(web::resource("/health").route(web::get().to(health)));

    configure_room_handlers(cfg);
}

async fn health() -> &'static str {
    "ok"
}
