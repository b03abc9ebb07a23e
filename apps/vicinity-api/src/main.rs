use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = vicinity_api::Args::parse();

	vicinity_api::run(args).await
}
