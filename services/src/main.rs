use stashbox_services::{
    config::Config,
    routes,
    storage::{MockFileStorage, S3FileStorage},
    telemetry,
};
use std::net::{IpAddr, SocketAddr};
use tracing::{info, warn};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const BUILD_DATE: &str = env!("BUILD_DATE");
const BUILD_COMMIT: &str = env!("BUILD_COMMIT");
const BUILD_BRANCH: &str = env!("BUILD_BRANCH");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let config: Config = Config::init()?;
    telemetry::init_tracing(&config)?;

    print_build_info();
    info!(
        environment = %config.environment(),
        server_addr = %config.server_addr(),
        port = %config.port(),
        public_base_url = %config.public_base_url(),
        "Configuration loaded"
    );

    let addr = SocketAddr::from((config.server_addr().parse::<IpAddr>()?, config.port()));

    let route = match config.s3() {
        Some(settings) => {
            let storage = S3FileStorage::new(settings)?;
            info!(bucket = %storage.bucket(), "Using S3 object storage");
            routes(storage, config.clone())
        }
        None => {
            warn!("No S3 settings found, objects are kept in memory");
            routes(MockFileStorage::new(), config.clone())
        }
    };

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, route).await?;

    Ok(())
}

fn print_build_info() {
    info!("===========================================");
    info!("  Stashbox Services");
    info!("===========================================");
    info!("Build Date:   {}", BUILD_DATE);
    info!("Build Commit: {}", BUILD_COMMIT);
    info!("Build Branch: {}", BUILD_BRANCH);
    info!("===========================================");
}
