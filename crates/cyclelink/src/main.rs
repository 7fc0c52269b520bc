use clap::Parser;
use cyclelink::commands;
use cyclelink::settings::{Cli, Commands};
use tracing_subscriber::prelude::*;

fn main() {
    setup_logging();

    let cli = Cli::parse();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    if let Err(e) = rt.block_on(run(cli)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { file } => commands::info_command(&file),
        Commands::Assets { dir } => commands::assets_command(&dir),
        Commands::Render {
            file,
            width,
            height,
            centered,
        } => commands::render_command(&file, width, height, centered),
        Commands::Ride(args) => commands::ride_command(args).await,
    }
}

/// Initialize logging with sensible defaults.
fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    if std::env::var("RUST_LOG").is_err() {
        // Safety: single-threaded at startup
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    let fmt_layer = fmt::layer().with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(fmt_layer).init();
}
