//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use scorelinks_core::config::Config;
use scorelinks_core::{LinkType, logging};

mod commands;

/// Level for stderr logging when `SCORELINKS_LOG` is unset.
const CLI_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "scorelinks")]
#[command(version)]
#[command(about = "Manage 16Score vMix API links from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// API base URL for this run (overrides SCORELINKS_API_URL and config)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        /// Account email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,
        /// Account password (prompted if omitted)
        #[arg(long, env = "SCORELINKS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log out and remove the stored session
    Logout,
    /// Show the logged-in user
    Whoami {
        /// Fetch the latest profile from the server first
        #[arg(long)]
        refresh: bool,
    },
    /// Manage API links
    Links {
        #[command(subcommand)]
        command: LinkCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum LinkCommands {
    /// List all API links
    List {
        /// Print the raw records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an API link for a match
    Create {
        #[arg(long, value_name = "MATCH_ID")]
        match_id: String,
        /// full, alive_status or points_table
        #[arg(long = "type", value_name = "TYPE", value_parser = parse_link_type)]
        link_type: LinkType,
    },
    /// Change the match or type of an API link
    Update {
        #[arg(value_name = "LINK_ID")]
        link_id: String,
        #[arg(long, value_name = "MATCH_ID")]
        match_id: String,
        /// full, alive_status or points_table
        #[arg(long = "type", value_name = "TYPE", value_parser = parse_link_type)]
        link_type: LinkType,
    },
    /// Activate or deactivate an API link
    Toggle {
        #[arg(value_name = "LINK_ID")]
        link_id: String,
    },
    /// Copy an API link's public URL to the clipboard
    Copy {
        #[arg(value_name = "LINK_ID")]
        link_id: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
    /// Save the API base URL to the config file
    SetUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

fn parse_link_type(s: &str) -> Result<LinkType, String> {
    s.parse::<LinkType>().map_err(|e| e.message)
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, api_url } = cli;

    // Config commands must work even when the config file is broken.
    if let Some(Commands::Config { command }) = &command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
            ConfigCommands::SetUrl { url } => commands::config::set_url(url),
        };
    }

    let config = Config::load().context("load config")?;
    let base_url = config.resolve_base_url(api_url.as_deref())?;

    // default to the interactive UI
    let Some(command) = command else {
        return commands::tui::run(&config, &base_url);
    };

    logging::init_stderr(CLI_LOG_LEVEL)?;
    tracing::debug!(base_url = %base_url, "resolved api url");
    let ctx = commands::ApiContext::new(&base_url, config.api.logout_on_unauthorized);

    match command {
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, email, password).await
        }
        Commands::Logout => {
            commands::auth::logout(&ctx);
            Ok(())
        }
        Commands::Whoami { refresh } => commands::auth::whoami(&ctx, refresh).await,
        Commands::Links { command } => match command {
            LinkCommands::List { json } => commands::links::list(&ctx, json).await,
            LinkCommands::Create {
                match_id,
                link_type,
            } => commands::links::create(&ctx, &match_id, link_type).await,
            LinkCommands::Update {
                link_id,
                match_id,
                link_type,
            } => commands::links::update(&ctx, &link_id, &match_id, link_type).await,
            LinkCommands::Toggle { link_id } => commands::links::toggle(&ctx, &link_id).await,
            LinkCommands::Copy { link_id } => commands::links::copy(&ctx, &link_id).await,
        },
        Commands::Config { .. } => Ok(()),
    }
}
