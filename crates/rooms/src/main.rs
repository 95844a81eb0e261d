/// Lockstep Rooms Service - Main Entry Point
use lockstep_auth::TokenVerifier;
use lockstep_core::config::{load_dotenv, AuthConfig, ConfigLoader, RoomConfig, ServiceConfig};
use lockstep_rooms::{init_tracing, start_server, RoomRegistry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let service = ServiceConfig::from_env()?;
    service.validate()?;

    let room_config = RoomConfig::from_env()?;
    room_config.validate()?;

    let auth = AuthConfig::from_env()?;
    auth.validate()?;

    let verifier = TokenVerifier::new(&auth.jwt_secret);
    let registry = RoomRegistry::new(room_config.clone());

    tracing::info!(
        "Lockstep rooms service starting on {}:{}",
        service.host,
        service.port
    );

    start_server(service, room_config, registry, verifier).await?;
    Ok(())
}
