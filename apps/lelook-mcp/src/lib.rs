pub mod server;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use color_eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use lelook_config::{Config, Security};

#[derive(Debug, Parser)]
#[command(
	version = lelook_cli::VERSION,
	rename_all = "kebab",
	styles = lelook_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum McpAuthState {
	Off,
	Bearer { token: String },
}

pub async fn run(args: Args) -> Result<()> {
	let config = lelook_config::load(&args.config)?;

	init_tracing(&config);

	let auth_state = build_auth_state(&config.security, &config.service.mcp_bind)?;

	server::serve_mcp(&config.service.mcp_bind, &config.service.http_bind, auth_state).await
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_auth_state(security: &Security, mcp_bind: &str) -> Result<McpAuthState> {
	let bind_addr: SocketAddr = mcp_bind
		.parse()
		.map_err(|err| eyre::eyre!("service.mcp_bind must be a valid socket address: {err}"))?;

	match security.auth_token.as_deref() {
		Some(token) => Ok(McpAuthState::Bearer { token: token.to_string() }),
		None if !bind_addr.ip().is_loopback() => Err(eyre::eyre!(
			"service.mcp_bind must be a loopback address when security.auth_token is not set."
		)),
		None => Ok(McpAuthState::Off),
	}
}
