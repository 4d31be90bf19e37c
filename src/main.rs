// ABOUTME: CLI entrypoint for hatena-export command
// ABOUTME: Handles logging setup, error exit codes and command dispatch

use clap::Parser;
use hatena_export::{
    api::ApiClient,
    authorize::{run_interactive, AuthorizationFlow},
    cli::{Cli, Commands},
    config::{resolve_config_path, Config},
    export::Exporter,
    feed::fetch_all_entries,
    media::MediaFetcher,
    storage::Paths,
    Result,
};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("hatena-export: [E{}] {}", e.exit_code(), e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = resolve_config_path(cli.config.clone())?;
    let mut config = Config::load(&config_path)?;
    tracing::debug!(path = %config_path.display(), ?config, "loaded config");

    match cli.command() {
        Commands::Export => {
            let feed_url = config.feed_url()?;
            let token = config.access_token()?;
            let client = ApiClient::new(config.consumer(), Some(token))?;

            let fetched = fetch_all_entries(&client, &feed_url);

            let paths = Paths::new(config.out_dir(cli.out_dir));
            let signed = config.sign_media_requests && !cli.no_media_auth;
            let collision = cli.on_collision.unwrap_or(config.on_collision);

            let mut exporter = Exporter::new(&paths, MediaFetcher::new(&client, signed), collision);
            let summary = exporter.export_all(&fetched.entries)?;

            println!(
                "Exported {} entries to {} ({} skipped, {} media saved, {} media failed)",
                summary.written,
                paths.export_root.display(),
                summary.skipped,
                summary.media_saved,
                summary.media_failed
            );

            // A failed page still exports what was fetched, then fails the run
            if let Some(e) = fetched.stopped {
                return Err(e);
            }
        }
        Commands::Authorize { no_browser, save } => {
            let client = ApiClient::new(config.consumer(), None)?;
            let flow = AuthorizationFlow::new(&client, &config.oauth);

            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut output = std::io::stdout();
            let access = run_interactive(&flow, !no_browser, &mut input, &mut output)?;

            println!("Access Token: {}", access.token.key);
            println!("Access Token Secret: {}", access.token.secret);

            if save {
                config.access_token = Some(access.token.key);
                config.access_token_secret = Some(access.token.secret);
                config.save(&config_path)?;
                println!("Saved credentials to {}", config_path.display());
            }
        }
    }

    Ok(())
}
