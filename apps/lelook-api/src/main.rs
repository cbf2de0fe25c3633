use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = lelook_api::Args::parse();

	lelook_api::run(args).await
}
