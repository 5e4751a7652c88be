#![doc = include_str!("../README.md")]

mod server;

use clap::Parser;
use futures::Stream;
use ordermgmt_tonic_core::{
    ordermgmt::OrderStore,
    proto::{FILE_DESCRIPTOR_SET, order_management_server::OrderManagementServer},
};
use server::config::{CliArgs, ServerConfig};
use server::service::handler::OrderService;
use server::telemetry::{TelemetryProviders, init_telemetry};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = ServerConfig::try_from(CliArgs::parse())?;
    let providers = init_telemetry()?;

    #[cfg(feature = "tracing")]
    {
        if cfg!(debug_assertions) {
            tracing::info!("Listening on {} with {:#?}", config.server_addr, config);
        } else {
            tracing::info!(
                batch_size = config.batch_size,
                "Listening on {}",
                config.server_addr
            );
        }
    }

    if !config.uds {
        let listener = TcpListener::bind(&config.server_addr).await?;
        return serve(TcpListenerStream::new(listener), config, providers).await;
    }

    #[cfg(unix)]
    {
        use tokio::net::UnixListener;
        use tokio_stream::wrappers::UnixListenerStream;

        let socket_path = config.server_addr.clone();
        let listener = UnixListener::bind(&socket_path)?;
        let served = serve(UnixListenerStream::new(listener), config, providers).await;
        // Not removed if the process panics.
        let _ = std::fs::remove_file(&socket_path);
        served
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!("--uds requires a platform with Unix domain sockets");
    }
}

/// Serves every service on `incoming` until a termination signal arrives.
async fn serve<I, IO, IE>(
    incoming: I,
    config: ServerConfig,
    providers: TelemetryProviders,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let store = if config.seed_sample_data {
        OrderStore::with_sample_data()
    } else {
        OrderStore::new()
    };
    let service = OrderService::new(config, store);

    #[cfg(feature = "tracing")]
    tracing::info!(orders = service.store().len(), "Order store ready");

    let (health, health_service) = tonic_health::server::health_reporter();
    health
        .set_serving::<OrderManagementServer<OrderService>>()
        .await;

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(ServiceBuilder::new().layer(cors).layer(GrpcWebLayer::new()))
        .add_service(health_service)
        .add_service(reflection)
        .add_service(order_management(service.clone()))
        .serve_with_incoming_shutdown(incoming, async move {
            wait_for_signal().await;
            drain(service, health, providers).await;
        })
        .await?;

    #[cfg(feature = "tracing")]
    tracing::info!("Order service stopped");
    Ok(())
}

fn order_management(service: OrderService) -> OrderManagementServer<OrderService> {
    let encodings = [
        CompressionEncoding::Zstd,
        CompressionEncoding::Gzip,
        CompressionEncoding::Deflate,
    ];
    encodings
        .into_iter()
        .fold(OrderManagementServer::new(service), |server, encoding| {
            server.send_compressed(encoding).accept_compressed(encoding)
        })
}

/// Resolves on Ctrl+C, or on SIGTERM where available.
async fn wait_for_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Ctrl+C received, shutting down");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("SIGTERM received, shutting down");
        },
    }
}

/// Takes the service out of rotation, lets consolidation streams finish (or
/// cancels them) and flushes telemetry.
async fn drain(service: OrderService, health: HealthReporter, providers: TelemetryProviders) {
    health
        .set_not_serving::<OrderManagementServer<OrderService>>()
        .await;
    service.shutdown().await;
    providers.shutdown();
}
