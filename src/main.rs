use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_transcriber::server::{self, AppState};
use video_transcriber::{output, utils, Cli, Commands, Config, Orchestrator, TranscriptionRequest};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "video_transcriber=debug,tower_http=debug"
    } else {
        "video_transcriber=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Load configuration, materialize credentials and wire the pipelines
async fn prepare() -> Result<(Config, Arc<Orchestrator>)> {
    // Check for required external dependencies (non-fatal in Docker)
    for dep in utils::check_dependencies().await {
        tracing::warn!("Missing dependency: {}", dep);
    }

    let mut config = Config::load()?;
    config.bootstrap_credentials()?;

    let orchestrator = Arc::new(Orchestrator::from_config(&config).await?);
    Ok((config, orchestrator))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve {
            host,
            port,
            frontend_dir,
        } => {
            let (config, orchestrator) = prepare().await?;

            let host = host.unwrap_or_else(|| config.app.host.clone());
            let port = port.unwrap_or(config.app.port);
            let frontend_dir = frontend_dir.unwrap_or_else(|| config.app.frontend_dir.clone());

            let state = AppState::new(orchestrator, config.app.default_lang.clone(), frontend_dir);
            server::serve(state, &host, port).await?;
        }
        Commands::Transcribe {
            url,
            lang,
            output,
            format,
        } => {
            let request = TranscriptionRequest::new(url, lang);
            let Some(url) = request.url() else {
                anyhow::bail!("No URL provided");
            };

            let (config, orchestrator) = prepare().await?;
            let lang = request.lang_or(&config.app.default_lang).to_string();

            let progress = if cli.quiet {
                ProgressBar::hidden()
            } else {
                let progress = ProgressBar::new_spinner();
                progress.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
                );
                progress.enable_steady_tick(Duration::from_millis(120));
                progress
            };
            progress.set_message(format!("Transcribing {}...", url));

            let result = orchestrator.transcribe(url, &lang).await;
            progress.finish_and_clear();
            let result = result?;

            match output {
                Some(path) => {
                    output::save_to_file(&result, &path, &format)?;
                    println!("Transcription saved to: {}", path.display());
                }
                None => output::print_to_console(&result, &format)?,
            }
        }
        Commands::Config { show } => {
            let config = Config::load()?;
            if show {
                config.display();
            } else {
                let path = config.save()?;
                println!("Configuration written to: {}", path.display());
            }
        }
    }

    Ok(())
}
