use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jobboard_client::app::App;
use jobboard_client::config::{ClientConfig, ConfigError, normalize_base_url};
use jobboard_client::net::types::{ApiError, SignupRequest};
use jobboard_client::services::auth::AuthError;
use jobboard_client::services::guard::Navigation;
use jobboard_client::util::chart_theme::chart_theme;
use jobboard_client::util::color_mode::{ColorPreference, ParsePreferenceError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Preference(#[from] ParsePreferenceError),
    #[error("not signed in; run `jobboard login` first")]
    NotAuthenticated,
    #[error("statistics unavailable: {0}")]
    Statistics(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "jobboard", about = "Job-board API client")]
struct Cli {
    /// Overrides `API_BASE`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `JOBBOARD_STATE_DIR`.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        identifier: String,
        #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
        password: String,
        /// Keep the token on disk across runs.
        #[arg(long, default_value_t = false)]
        remember: bool,
    },
    Signup(SignupArgs),
    Logout,
    Whoami,
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    DeleteAccount {
        #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Adopt a token from the OAuth redirect (`/auth/callback?token=...`).
    OauthCallback {
        #[arg(long)]
        token: String,
        #[arg(long, default_value_t = false)]
        remember: bool,
    },
    Stats {
        #[arg(long, default_value_t = false)]
        force: bool,
        #[arg(long, value_enum, default_value_t = StatsSection::All)]
        section: StatsSection,
    },
    Theme(ThemeCommand),
    /// Run the route guard for `path`.
    Navigate {
        path: String,
    },
}

#[derive(Args, Debug)]
struct SignupArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    full_name: String,
    #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct ThemeCommand {
    #[command(subcommand)]
    command: ThemeSubcommand,
}

#[derive(Subcommand, Debug)]
enum ThemeSubcommand {
    Show,
    Toggle,
    Set { preference: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StatsSection {
    All,
    PerDay,
    PerLocation,
    TopCompanies,
    OfferType,
    Summary,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config.api_base = normalize_base_url(base_url)?;
    }
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }

    let app = App::from_config(&config)?;
    run(&app, cli.command).await
}

async fn run(app: &App, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { identifier, password, remember } => {
            app.auth.login(&identifier, &password, remember).await?;
            print_json(&app.session.user())
        }
        Command::Signup(args) => {
            let request = SignupRequest {
                username: args.username,
                email: args.email,
                full_name: args.full_name,
                password: args.password,
            };
            let created = app.auth.signup(&request).await?;
            print_json(&created)
        }
        Command::Logout => {
            print_navigation(&app.auth.logout());
            Ok(())
        }
        Command::Whoami => {
            app.start().await;
            let user = app.session.user().ok_or(CliError::NotAuthenticated)?;
            print_json(&user)
        }
        Command::ChangePassword { current, new } => {
            app.start().await;
            let ack = app.auth.change_password(&current, &new).await?;
            print_json(&ack)
        }
        Command::DeleteAccount { password } => {
            app.start().await;
            let ack = app.auth.delete_account(&password).await?;
            print_navigation(&app.auth.logout());
            print_json(&ack)
        }
        Command::OauthCallback { token, remember } => {
            let user = app.auth.complete_oauth_callback(&token, remember).await?;
            print_json(&user)
        }
        Command::Stats { force, section } => run_stats(app, force, section).await,
        Command::Theme(theme) => run_theme(app, theme),
        Command::Navigate { path } => {
            print_navigation(&app.guard.before_navigate(&path).await);
            Ok(())
        }
    }
}

async fn run_stats(app: &App, force: bool, section: StatsSection) -> Result<(), CliError> {
    let stats = &app.statistics;
    stats.fetch_statistics(force).await;
    if !stats.loaded() {
        return Err(CliError::Statistics(stats.error().unwrap_or_default()));
    }
    match section {
        StatsSection::All => print_json(&stats.snapshot().data),
        StatsSection::PerDay => print_json(&stats.jobs_per_day()),
        StatsSection::PerLocation => print_json(&stats.jobs_per_location()),
        StatsSection::TopCompanies => print_json(&stats.top_companies()),
        StatsSection::OfferType => print_json(&stats.company_offer_type()),
        StatsSection::Summary => print_json(&stats.summary()),
    }
}

fn run_theme(app: &App, theme: ThemeCommand) -> Result<(), CliError> {
    match theme.command {
        ThemeSubcommand::Show => {}
        ThemeSubcommand::Toggle => {
            app.color_mode.toggle();
        }
        ThemeSubcommand::Set { preference } => {
            app.color_mode.set_preference(preference.parse::<ColorPreference>()?);
        }
    }
    print_json(&chart_theme(app.color_mode.mode()))
}

fn print_navigation(nav: &Navigation) {
    match nav {
        Navigation::Allow => println!("allow"),
        Navigation::Redirect(to) => println!("redirect {to}"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
