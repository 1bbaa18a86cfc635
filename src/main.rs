//! Mutating admission webhook that injects the `SimulateNodeFailure`
//! toleration into Deployments and DaemonSets that lack it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, Level};

mod error;
mod handler;
mod metrics;
mod patch;
mod response;
mod server;
mod toleration;
mod workload;

use metrics::{MutationRecorder, PrometheusRecorder};

#[derive(Parser, Debug)]
#[command(name = "toleration-webhook")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// The path to the x509 certificate for HTTPS.
    #[arg(long, default_value = "/etc/webhook/certs/tls.crt")]
    tls_cert: PathBuf,
    /// The path to the x509 private key matching the certificate.
    #[arg(long, default_value = "/etc/webhook/certs/tls.key")]
    tls_key: PathBuf,
    /// Https server port (webhook endpoint).
    #[arg(short, long, default_value = "443")]
    port: u16,
    /// Plain-HTTP port the Prometheus exporter listens on.
    #[arg(long, default_value = "8090")]
    metrics_port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Parse the CLI arguments
    let args = Args::try_parse()?;

    info!("Parsed CLI arguments: {:?}", args);

    // Expose Prometheus metrics; registered once, before the first request.
    metrics::init_prometheus_server(args.metrics_port)?;

    let recorder: Arc<dyn MutationRecorder> = Arc::new(PrometheusRecorder);

    server::webhook_task(recorder, &args.tls_cert, &args.tls_key, args.port).await;

    info!("Exiting admission server");

    Ok(())
}
