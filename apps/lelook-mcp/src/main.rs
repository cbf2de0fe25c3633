use clap::Parser;

use lelook_mcp::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	lelook_mcp::run(args).await
}
