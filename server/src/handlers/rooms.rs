use crate::admin::AdminCommand;
use crate::server::{ServerCommand, ServerTx};
use actix_web::error;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::Result;
use system::RoomId;

pub fn configure_room_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rooms")
            .service(web::resource("").route(web::get().to(list_rooms)))
            .service(web::resource("/{room_id}").route(web::get().to(show_room))),
    );
}

pub async fn list_rooms(srv_tx: web::Data<ServerTx>) -> Result<impl Responder> {
    let (tx, rx) = tokio::sync::oneshot::channel();

    srv_tx
        .send(ServerCommand::Admin(AdminCommand::ListRooms { tx }))
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    let rooms = rx
        .await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    Ok(HttpResponse::Ok().json(rooms))
}

pub async fn show_room(
    path: web::Path<RoomId>,
    srv_tx: web::Data<ServerTx>,
) -> Result<impl Responder> {
    let (tx, rx) = tokio::sync::oneshot::channel();

    srv_tx
        .send(ServerCommand::Admin(AdminCommand::DescribeRoom {
            room_id: path.into_inner(),
            tx,
        }))
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    let room = rx
        .await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?
        .ok_or_else(|| error::ErrorNotFound("no such room"))?;

    Ok(HttpResponse::Ok().json(room))
}
