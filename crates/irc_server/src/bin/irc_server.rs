use clap::Parser;
use flexi_logger::{Duplicate, Logger};
use log::{error, info};

use irc_server::config::Config;
use irc_server::server::Server;

/// CLI surface pinned by spec.md §6 ("external collaborator" launcher),
/// extended with `--config`/`--motd` for the ambient config loading this
/// implementation adds on top of it.
#[derive(Parser, Debug)]
#[command(name = "irc_server", version, about = "A small IRC daemon core")]
struct Cli {
    /// Bind address (default 127.0.0.1).
    #[arg(long)]
    host: Option<String>,

    /// Listening port (default 6667).
    #[arg(long)]
    port: Option<u16>,

    /// Server name used as the source of server-generated replies.
    #[arg(long)]
    name: Option<String>,

    /// Optional TOML configuration file; CLI flags override its values.
    #[arg(long)]
    config: Option<String>,

    /// Optional MOTD text file.
    #[arg(long)]
    motd: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    Logger::try_with_str("info")
        .and_then(|op| op.log_to_stderr().duplicate_to_stderr(Duplicate::All).start())
        .ok();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(host) = cli.host {
        config.network.bind_address = host;
    }
    if let Some(port) = cli.port {
        config.network.port = port;
    }
    if let Some(name) = cli.name {
        config.server.name = name;
    }
    if let Some(motd_path) = &cli.motd {
        config.load_motd_file(motd_path)?;
    }

    let server = Server::new(config);
    if let Err(err) = server.run().await {
        error!("server error: {err}");
        return Err(Box::new(err) as Box<dyn std::error::Error>);
    }
    info!("server shut down cleanly");
    Ok(())
}
