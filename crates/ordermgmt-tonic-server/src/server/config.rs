use anyhow::bail;
use clap::{ArgAction, Parser};
use core::time::Duration;
use ordermgmt_tonic_core::ordermgmt::DEFAULT_BATCH_SIZE;

/// Runtime configuration for the `ordermgmt-server` binary.
///
/// Every value can be given on the command line or through the environment
/// (including a `.env` file in the working directory).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ordermgmt-server",
    version,
    about = "A gRPC order-management service with streaming shipment consolidation"
)]
pub struct CliArgs {
    /// Number of accepted orders that triggers a shipment flush on a
    /// `ProcessOrders` stream.
    ///
    /// The count spans all destinations: once this many orders have been
    /// consolidated since the last flush, every pending shipment is sent.
    ///
    /// Environment variable: `BATCH_SIZE`
    #[arg(long, env = "BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Capacity of the outbound buffer between a stream task and the
    /// transport.
    ///
    /// When the peer stops reading and the buffer fills up, the producing
    /// task is suspended until space frees up; nothing is dropped.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 8)]
    pub stream_buffer_size: usize,

    /// Seconds to wait for in-flight consolidation streams to finish on
    /// shutdown before they are cancelled.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,

    /// Seed the order store with the demo orders `102`..`106` at startup.
    ///
    /// Environment variable: `SEED_SAMPLE_DATA`
    #[arg(long, env = "SEED_SAMPLE_DATA", default_value_t = true, action = ArgAction::Set)]
    pub seed_sample_data: bool,

    /// Address to listen on (TCP or Unix socket path; use --uds for Unix socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/ordermgmt.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub batch_size: usize,
    pub stream_buffer_size: usize,
    pub shutdown_timeout: Duration,
    pub seed_sample_data: bool,
    pub server_addr: String,
    pub uds: bool,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.batch_size == 0 {
            bail!("BATCH_SIZE must be greater than 0");
        }

        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        Ok(Self {
            batch_size: args.batch_size,
            stream_buffer_size: args.stream_buffer_size,
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
            seed_sample_data: args.seed_sample_data,
            server_addr: args.server_addr,
            uds: args.uds,
        })
    }
}
