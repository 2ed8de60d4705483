use clap::Parser;

use scrolldepth::cli::Cli;
use scrolldepth::config::{LoggingConfig, get_config, init_config_with_path};
use scrolldepth::runtime::modes::{self, Mode};
use scrolldepth::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    init_config_with_path(cli.config.as_deref());
    let config = get_config();

    match modes::detect_mode(cli.command.as_ref()) {
        #[cfg(feature = "server")]
        Mode::Server => {
            let _guard = init_logging(&config.logging)?;
            modes::run_server().await
        }

        #[cfg(feature = "cli")]
        Mode::Cli => {
            // CLI 只输出警告以上的日志，避免干扰命令输出
            let _guard = init_logging(&LoggingConfig {
                level: "warn".to_string(),
                file: None,
                ..config.logging.clone()
            })?;

            let Some(command) = cli.command else {
                return Ok(());
            };
            if let Err(e) = modes::run_cli(command).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }

        Mode::Unknown => {
            eprintln!("No execution mode available: enable the `server` or `cli` feature");
            std::process::exit(1);
        }
    }
}
