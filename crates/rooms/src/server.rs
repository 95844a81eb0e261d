/// Actix-web HTTP server for the rooms service
///
/// Endpoints:
/// - GET  /health                      - Health check
/// - GET  /ws                          - Real-time room connection (bearer token)
/// - POST /api/v1/rooms                - Create a room
/// - POST /api/v1/rooms/{id}/join      - Join pre-check
/// - GET  /api/v1/rooms/{id}           - Room snapshot
use actix_web::{get, http::header, post, web, App, HttpRequest, HttpResponse, HttpServer};
use actix_web_actors::ws;
use lockstep_auth::{extract_bearer_token, Identity, TokenVerifier};
use lockstep_core::{LockstepError, Result, RoomConfig, ServiceConfig};
use serde::{Deserialize, Serialize};

use crate::registry::RoomRegistry;
use crate::websocket::RoomSocket;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Resolve the verified identity for a request
///
/// Accepts an `Authorization: Bearer` header or, for browser WebSocket
/// clients that cannot set headers, a `token` query parameter.
fn identity_from_request(req: &HttpRequest, verifier: &TokenVerifier) -> Result<Identity> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let header_str = value
            .to_str()
            .map_err(|_| LockstepError::Auth("Malformed Authorization header".to_string()))?;
        return verifier.verify(extract_bearer_token(header_str)?);
    }

    let query = web::Query::<TokenQuery>::from_query(req.query_string())
        .map_err(|_| LockstepError::Auth("Malformed query string".to_string()))?;
    match &query.token {
        Some(token) => verifier.verify(token),
        None => Err(LockstepError::Auth("Missing bearer token".to_string())),
    }
}

/// Health check endpoint
#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "lockstep-rooms",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// WebSocket connection endpoint
///
/// The identity is verified before the upgrade; a bad token refuses the
/// connection with 401.
#[get("/ws")]
pub async fn websocket(
    req: HttpRequest,
    stream: web::Payload,
    registry: web::Data<RoomRegistry>,
    verifier: web::Data<TokenVerifier>,
    config: web::Data<RoomConfig>,
) -> std::result::Result<HttpResponse, actix_web::Error> {
    let identity = identity_from_request(&req, &verifier)?;
    let socket = RoomSocket::new(
        identity,
        registry.get_ref().clone(),
        config.get_ref().clone(),
    );
    ws::start(socket, &req, stream)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub video_url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomIdResponse {
    pub room_id: String,
}

/// Create a room; the caller becomes its host
#[post("/api/v1/rooms")]
pub async fn create_room(
    req: HttpRequest,
    body: web::Json<CreateRoomRequest>,
    registry: web::Data<RoomRegistry>,
    verifier: web::Data<TokenVerifier>,
) -> Result<HttpResponse> {
    let identity = identity_from_request(&req, &verifier)?;
    let room_id = registry.create_room(&body.video_url, body.title.clone(), &identity)?;
    Ok(HttpResponse::Created().json(RoomIdResponse { room_id }))
}

/// Join pre-check: confirms the room exists without touching its state
#[post("/api/v1/rooms/{room_id}/join")]
pub async fn join_room(
    req: HttpRequest,
    path: web::Path<String>,
    registry: web::Data<RoomRegistry>,
    verifier: web::Data<TokenVerifier>,
) -> Result<HttpResponse> {
    identity_from_request(&req, &verifier)?;

    let room_id = path.into_inner();
    if registry.contains(&room_id) {
        Ok(HttpResponse::Ok().json(RoomIdResponse { room_id }))
    } else {
        Err(LockstepError::NotFound(room_id))
    }
}

/// Room snapshot: metadata, roster, and absolute playback state
#[get("/api/v1/rooms/{room_id}")]
pub async fn room_snapshot(
    req: HttpRequest,
    path: web::Path<String>,
    registry: web::Data<RoomRegistry>,
    verifier: web::Data<TokenVerifier>,
) -> Result<HttpResponse> {
    identity_from_request(&req, &verifier)?;

    let snapshot = registry.snapshot(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// Start the rooms server
pub async fn start_server(
    service: ServiceConfig,
    room_config: RoomConfig,
    registry: RoomRegistry,
    verifier: TokenVerifier,
) -> std::io::Result<()> {
    tracing::info!(
        "Starting lockstep rooms service on {}:{}",
        service.host,
        service.port
    );

    let registry = web::Data::new(registry);
    let verifier = web::Data::new(verifier);
    let room_config = web::Data::new(room_config);

    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            .app_data(verifier.clone())
            .app_data(room_config.clone())
            .service(health_check)
            .service(websocket)
            .service(create_room)
            .service(join_room)
            .service(room_snapshot)
    })
    .workers(service.workers)
    .bind((service.host.as_str(), service.port))?
    .run()
    .await
}
