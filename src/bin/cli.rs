//! cgadmin CLI Client
//!
//! Command-line interface for administering CommuniGate accounts.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use cgadmin::{Config, Session};

/// cgadmin CLI
#[derive(Parser, Debug)]
#[command(name = "cgadmin")]
#[command(about = "Administer CommuniGate Pro accounts over the CLI protocol")]
#[command(version)]
struct Args {
    /// JSON config file (host, port, login, password, timeout_ms, verbose)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host
    #[arg(long)]
    host: Option<String>,

    /// CLI port
    #[arg(short, long)]
    port: Option<u16>,

    /// Administrator login
    #[arg(short, long)]
    login: Option<String>,

    /// Administrator password
    #[arg(long, env = "CGADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Connect/read/write timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Echo the protocol exchange
    #[arg(short, long)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug)]
struct AccountArgs {
    /// Domain name
    domain: String,

    /// Account name (without domain)
    account: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List domains
    Domains,

    /// List accounts of a domain
    Accounts { domain: String },

    /// List forwarders of a domain with their targets
    Forwarders { domain: String },

    /// Show the cluster controller
    Controller,

    /// Create an account
    Create {
        #[command(flatten)]
        target: AccountArgs,
        password: String,
    },

    /// Delete an account
    Delete {
        #[command(flatten)]
        target: AccountArgs,
    },

    /// Rename an account within its domain
    Rename {
        #[command(flatten)]
        target: AccountArgs,
        new_name: String,
    },

    /// Set an account password
    ResetPassword {
        #[command(flatten)]
        target: AccountArgs,
        password: String,
    },

    /// Show an account password
    Password {
        #[command(flatten)]
        target: AccountArgs,
    },

    /// Show quota and usage
    Storage {
        #[command(flatten)]
        target: AccountArgs,
    },

    /// Set the quota (bare numbers are megabytes)
    SetStorage {
        #[command(flatten)]
        target: AccountArgs,
        limit: String,
    },

    /// Vacation auto-reply
    Vacation {
        #[command(subcommand)]
        action: RuleAction,
    },

    /// Redirect of all mail to another address
    Redirect {
        #[command(subcommand)]
        action: RuleAction,
    },
}

#[derive(Subcommand, Debug)]
enum RuleAction {
    /// Show the current value
    Get {
        #[command(flatten)]
        target: AccountArgs,
    },

    /// Set the value
    Set {
        #[command(flatten)]
        target: AccountArgs,
        value: String,
    },

    /// Remove the rule
    Clear {
        #[command(flatten)]
        target: AccountArgs,
    },
}

fn main() {
    let args = Args::parse();

    // Initialize tracing/logging
    let default_filter = if args.verbose { "info,cgadmin=debug" } else { "warn,cgadmin=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> cgadmin::Result<()> {
    let config = build_config(&args)?;
    let json = args.json;
    let mut session = Session::connect(config)?;

    match args.command {
        Commands::Domains => print(json, &session.list_domains()?),
        Commands::Accounts { domain } => print(json, &session.list_accounts(&domain)?),
        Commands::Forwarders { domain } => print(json, &session.list_forwarders(&domain)?),
        Commands::Controller => print(json, &session.current_controller()?),
        Commands::Create { target, password } => {
            session.create_account(&target.domain, &target.account, &password)?
        }
        Commands::Delete { target } => session.delete_account(&target.domain, &target.account)?,
        Commands::Rename { target, new_name } => {
            session.rename_account(&target.domain, &target.account, &new_name)?
        }
        Commands::ResetPassword { target, password } => {
            session.reset_password(&target.domain, &target.account, &password)?
        }
        Commands::Password { target } => {
            print(json, &session.account_password(&target.domain, &target.account)?)
        }
        Commands::Storage { target } => {
            print(json, &session.account_storage(&target.domain, &target.account)?)
        }
        Commands::SetStorage { target, limit } => {
            session.set_account_storage(&target.domain, &target.account, &limit)?
        }
        Commands::Vacation { action } => match action {
            RuleAction::Get { target } => {
                print(json, &session.vacation_message(&target.domain, &target.account)?)
            }
            RuleAction::Set { target, value } => {
                session.set_vacation_message(&target.domain, &target.account, &value)?
            }
            RuleAction::Clear { target } => {
                session.clear_vacation_message(&target.domain, &target.account)?
            }
        },
        Commands::Redirect { action } => match action {
            RuleAction::Get { target } => {
                print(json, &session.email_redirect(&target.domain, &target.account)?)
            }
            RuleAction::Set { target, value } => {
                session.set_email_redirect(&target.domain, &target.account, &value)?
            }
            RuleAction::Clear { target } => {
                session.clear_email_redirect(&target.domain, &target.account)?
            }
        },
    }

    session.disconnect()
}

/// Config file first, then command-line overrides
fn build_config(args: &Args) -> cgadmin::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(login) = &args.login {
        config.login = login.clone();
    }
    if let Some(password) = &args.password {
        config.password = password.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.verbose |= args.verbose;

    Ok(config)
}

fn print<T: Serialize + PrintPlain>(json: bool, value: &T) {
    if json {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!("Failed to encode result: {}", e),
        }
    } else {
        value.print_plain();
    }
}

/// Human-readable output
trait PrintPlain {
    fn print_plain(&self);
}

impl PrintPlain for Vec<String> {
    fn print_plain(&self) {
        for item in self {
            println!("{}", item);
        }
    }
}

impl PrintPlain for Option<String> {
    fn print_plain(&self) {
        match self {
            Some(value) => println!("{}", value),
            None => println!("(none)"),
        }
    }
}

impl PrintPlain for std::collections::BTreeMap<String, String> {
    fn print_plain(&self) {
        for (name, target) in self {
            println!("{} -> {}", name, target);
        }
    }
}

impl PrintPlain for cgadmin::Storage {
    fn print_plain(&self) {
        println!("max: {}", self.max);
        println!("used: {}", self.used);
    }
}
