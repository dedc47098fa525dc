//! crossold - search many Online Linguistic Databases at once
//!
//! Logs in to every configured OLD, then reads search expressions and prints one
//! combined, highlighted report per expression.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use crossold::config::Config;
use crossold::input::read_password;
use crossold::query::parse_query_literal;
use crossold::registry::BackendRegistry;
use crossold::render::ReportTheme;
use crossold::session::{Credentials, HttpConnector};
use crossold::Application;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

const PASSWORD_ENV: &str = "CROSSOLD_PASSWORD";

fn cli() -> Command {
    Command::new("crossold")
        .version(crossold::VERSION)
        .about("Search several Online Linguistic Databases with one query")
        .long_about(
            "crossold logs in to a set of OLD instances with one shared account, runs each \
             search expression against all of them and prints the matching forms with \
             aligned, highlighted interlinear glosses.",
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (default: <config dir>/crossold/config.toml)"),
        )
        .arg(
            Arg::new("username")
                .long("username")
                .short('u')
                .env("CROSSOLD_USERNAME")
                .help("Account name shared by every OLD"),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .short('b')
                .value_name("ID")
                .action(ArgAction::Append)
                .help("Only search this OLD (repeatable)"),
        )
        .arg(
            Arg::new("query")
                .long("query")
                .short('q')
                .value_name("EXPR")
                .help("Run a single search expression and exit"),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .action(ArgAction::SetTrue)
                .help("Disable colored output"),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let matches = cli().get_matches();

    let config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))
        .context("Failed to load configuration")?;
    let mut registry = BackendRegistry::from_config(&config)?;
    let selected: Vec<String> = matches
        .get_many::<String>("backend")
        .map(|ids| ids.cloned().collect())
        .unwrap_or_default();
    if !selected.is_empty() {
        registry = registry.restrict_to(&selected)?;
    }

    let theme = if matches.get_flag("no-color") || !io::stdout().is_terminal() {
        ReportTheme::plain()
    } else {
        ReportTheme::default()
    };

    let credentials = credentials(&matches, &config)?;

    let labels: Vec<&str> = registry.iter().map(|backend| backend.label()).collect();
    println!("Searching {} OLDs: {}", labels.len(), labels.join(", "));
    print!("Logging in as {}... ", credentials.username());
    io::stdout().flush()?;

    let app = match Application::connect(&registry, &credentials, &HttpConnector, theme).await {
        Ok(app) => {
            println!("Done.");
            app
        }
        Err(e) => {
            println!("Failed.");
            return Err(e).context("Login failed");
        }
    };

    if let Some(literal) = matches.get_one::<String>("query") {
        let query = parse_query_literal(literal).context("Invalid --query expression")?;
        let report = app.search(&query).await.context("Search failed")?;
        print!("{report}");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    app.run_interactive(&mut input, &mut output).await?;

    Ok(())
}

fn credentials(matches: &ArgMatches, config: &Config) -> Result<Credentials> {
    let username = match matches
        .get_one::<String>("username")
        .cloned()
        .or_else(|| config.username.clone())
    {
        Some(username) => username,
        None => prompt_line("Username: ")?,
    };

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => read_password("Password: ").context("Failed to read password")?,
    };

    Ok(Credentials::new(username, password))
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read username")?;
    let line = line.trim();
    if line.is_empty() {
        anyhow::bail!("A username is required");
    }
    Ok(line.to_string())
}
