//! Senatus daemon: entry point for running the bot.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;

use senatus_bot::{BotConfig, BroadcastRegistry, CommandHandler, HandlerSettings, ShutdownController};
use senatus_game::HttpGameClient;
use senatus_interactions::{command_definitions, InteractionState, SignatureVerifier};
use senatus_platform::DiscordClient;
use senatus_roles::RoleReconciler;
use senatus_store_lmdb::environment::DEFAULT_MAP_SIZE;
use senatus_store_lmdb::integrity::{check_data_dir, check_integrity, DataDir};
use senatus_store_lmdb::LmdbEnvironment;
use senatus_types::CommunityId;
use senatus_utils::{init_logging, LogFormat};
use senatus_verification::{AdminSet, RandomCodeSource, VerificationEngine};

#[derive(Parser)]
#[command(name = "senatus-daemon", about = "Discord bot linking game accounts and syncing roles")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "SENATUS_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the account store.
    #[arg(long, env = "SENATUS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Discord bot token. Takes precedence over the token file.
    #[arg(long, env = "SENATUS_DISCORD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// File holding the bot token.
    #[arg(long, default_value = ".token", env = "SENATUS_TOKEN_FILE")]
    token_file: PathBuf,

    /// Discord application id.
    #[arg(long, env = "SENATUS_APPLICATION_ID")]
    application_id: String,

    /// Application public key (hex) used to verify interaction requests.
    #[arg(long, env = "SENATUS_PUBLIC_KEY")]
    public_key: Option<String>,

    /// Address for the interactions endpoint.
    #[arg(long, env = "SENATUS_LISTEN")]
    listen: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SENATUS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SENATUS_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Chat user id allowed to run admin commands. Repeatable; adds to the
    /// admins listed in the config file.
    #[arg(long = "admin", env = "SENATUS_ADMINS", value_delimiter = ',')]
    admins: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the interactions endpoint until SIGINT/SIGTERM.
    Run,
    /// Register the slash commands with Discord.
    RegisterCommands {
        /// Register in a single guild (instant) instead of globally.
        #[arg(long)]
        guild: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BotConfig::from_toml_file(&path.to_string_lossy())
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BotConfig::default(),
    };
    apply_overrides(&mut config, &cli);

    init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    let token = resolve_token(cli.token.as_deref(), &cli.token_file)?;
    let discord = Arc::new(DiscordClient::new(
        config.discord_api_base.clone(),
        token,
        cli.application_id.clone(),
    ));

    match cli.command {
        Command::RegisterCommands { guild } => {
            let guild = guild.map(CommunityId::new);
            let count = discord
                .overwrite_commands(guild.as_ref(), &command_definitions())
                .await
                .context("registering commands")?;
            match guild {
                Some(g) => tracing::info!(count, guild = %g, "registered guild commands"),
                None => tracing::info!(count, "registered global commands"),
            }
        }
        Command::Run => {
            let public_key = cli
                .public_key
                .as_deref()
                .context("--public-key is required to serve interactions")?;
            run(config, discord, public_key).await?;
        }
    }

    Ok(())
}

async fn run(config: BotConfig, discord: Arc<DiscordClient>, public_key: &str) -> anyhow::Result<()> {
    let verifier = SignatureVerifier::from_hex(public_key)?;
    let listen: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.listen_addr))?;

    match check_data_dir(&config.data_dir)? {
        DataDir::Fresh => tracing::info!(path = %config.data_dir.display(), "creating new store"),
        DataDir::Existing => tracing::info!(path = %config.data_dir.display(), "opening store"),
    }
    let env = LmdbEnvironment::open(&config.data_dir, DEFAULT_MAP_SIZE)?;
    let report = check_integrity(&env)?;
    if report.is_healthy() {
        tracing::info!(
            accounts = report.accounts,
            index_entries = report.index_entries,
            party_roles = report.party_roles,
            "store integrity check passed"
        );
    } else {
        for problem in &report.problems {
            tracing::error!(%problem, "store integrity problem");
        }
        bail!("store integrity check failed with {} problems", report.problems.len());
    }

    let game = Arc::new(HttpGameClient::with_timeout(
        config.game_api_base.clone(),
        Duration::from_secs(config.request_timeout_secs),
    ));
    let admins = AdminSet::new(config.admins.iter().cloned());
    if admins.is_empty() {
        tracing::warn!("no admins configured, admin commands are unavailable");
    }

    let engine = Arc::new(VerificationEngine::new(
        Arc::new(env.account_store()),
        game.clone(),
        Arc::new(RandomCodeSource),
        admins,
    ));
    let reconciler = Arc::new(RoleReconciler::new(
        Arc::new(env.party_role_store()),
        game.clone(),
        discord.clone(),
    ));
    let shutdown = Arc::new(ShutdownController::new());
    let broadcasts = Arc::new(BroadcastRegistry::new());
    let handler = Arc::new(CommandHandler::new(
        engine,
        reconciler,
        game,
        discord.clone(),
        broadcasts.clone(),
        shutdown.clone(),
        HandlerSettings::from_config(&config)?,
    ));

    let state = Arc::new(InteractionState {
        verifier,
        handler,
        platform: discord,
    });
    let mut server = tokio::spawn(senatus_interactions::serve(
        listen,
        state,
        shutdown.subscribe(),
    ));

    tracing::info!(
        %listen,
        game_api = %config.game_api_base,
        broadcast_time = %config.broadcast_time,
        "senatus started"
    );

    tokio::select! {
        _ = shutdown.wait_for_signal() => {}
        result = &mut server => {
            // the endpoint only returns early if it could not bind or crashed
            result.context("interactions endpoint panicked")??;
            bail!("interactions endpoint exited unexpectedly");
        }
    }

    broadcasts.stop_all();
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "interactions endpoint failed while stopping"),
        Err(e) => tracing::warn!(error = %e, "interactions endpoint did not stop cleanly"),
    }
    tracing::info!("senatus daemon exited cleanly");
    Ok(())
}

fn apply_overrides(config: &mut BotConfig, cli: &Cli) {
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(listen) = &cli.listen {
        config.listen_addr = listen.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    for admin in &cli.admins {
        if !config.admins.contains(admin) {
            config.admins.push(admin.clone());
        }
    }
}

/// The token from the flag/env, or else the first line of the token file.
fn resolve_token(flag: Option<&str>, token_file: &Path) -> anyhow::Result<String> {
    if let Some(token) = flag.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    let contents = std::fs::read_to_string(token_file).with_context(|| {
        format!(
            "no --token given and token file {} is unreadable",
            token_file.display()
        )
    })?;
    match contents.lines().next().map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => bail!("token file {} is empty", token_file.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_token_wins() {
        let dir = tempfile::tempdir().unwrap();
        let token = resolve_token(Some(" abc "), &dir.path().join("missing")).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn token_file_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".token");
        std::fs::write(&path, "secret\nignored\n").unwrap();
        assert_eq!(resolve_token(None, &path).unwrap(), "secret");

        std::fs::write(&path, "\n").unwrap();
        assert!(resolve_token(None, &path).is_err());
        assert!(resolve_token(None, &dir.path().join("nope")).is_err());
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "senatus-daemon",
            "--application-id",
            "1",
            "--listen",
            "0.0.0.0:9000",
            "--admin",
            "42",
            "--admin",
            "7",
            "--log-format",
            "json",
            "run",
        ]);
        let mut config = BotConfig {
            admins: vec!["7".into()],
            ..BotConfig::default()
        };
        apply_overrides(&mut config, &cli);
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.admins, ["7", "42"]);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
    }
}
