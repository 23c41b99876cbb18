use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = qtrack_replay::Args::parse();

	qtrack_replay::run(args).await
}
