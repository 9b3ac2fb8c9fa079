use clap::Parser;
use http_mock::config::{BackendKind, ServerConfig};
use http_mock::server::MockServer;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "http-mock", version, about)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "HTTP_MOCK_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "HTTP_MOCK_HOST")]
    host: Option<IpAddr>,

    #[arg(short, long, env = "HTTP_MOCK_PORT")]
    port: Option<u16>,

    /// Persist state under this directory (selects the file backend)
    #[arg(long, env = "HTTP_MOCK_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Scope key for this instance's stores
    #[arg(long, env = "HTTP_MOCK_SCOPE")]
    scope: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "HTTP_MOCK_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> Result<ServerConfig, anyhow::Error> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };
        if let Some(host) = self.host {
            config.listen.host = host;
        }
        if let Some(port) = self.port {
            config.listen.port = port;
        }
        if let Some(dir) = self.state_dir {
            config.state.backend = BackendKind::File;
            config.state.dir = Some(dir);
        }
        if let Some(scope) = self.scope {
            config.scope = Some(scope);
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.into_config()?;
    let state = Arc::new(config.build_state()?);
    let scope = config.scope_key();
    info!(scope = %scope, backend = state.backend_name(), "Starting http-mock");

    let server = MockServer::bind(config.listen_addr(), state, scope).await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}
