//! `piazza`: command-line access to a Piazza account.
//!
//! Logs in once and caches the session cookies in a JSON file, then prints
//! the result of each query as pretty JSON on stdout.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{debug, info};
use piazza_api::network::FEED_LIMIT;
use piazza_api::networking::auth::{EMAIL_VAR, PASSWORD_VAR};
use piazza_api::networking::{CredentialProvider, Credentials};
use piazza_api::{ClientConfig, FeedFilter, Piazza, PiazzaApiError};
use serde::Serialize;

/// Query Piazza from the terminal
#[derive(Parser)]
#[command(name = "piazza", version, about, long_about = None)]
struct Cli {
    /// Where the session cookies are cached between runs.
    #[arg(long, env = "PIAZZA_COOKIES", default_value = ".piazza_cookies.json")]
    cookies: PathBuf,

    /// Service base URL.
    #[arg(long, env = "PIAZZA_BASE_URL")]
    base_url: Option<String>,

    /// Request timeout in seconds; no timeout when omitted.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with email and password and cache the session.
    ///
    /// Reads PIAZZA_EMAIL / PIAZZA_PASSWORD, prompting for anything missing.
    /// The password prompt does not echo.
    Login,

    /// Log in through a "share your class" link.
    DemoLogin {
        /// The `auth` token of the link.
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        auth: Option<String>,
        /// The whole demo-login URL.
        #[arg(long)]
        url: Option<String>,
    },

    /// List your classes.
    Classes,

    /// Print one post.
    Post { nid: String, cid: String },

    /// Print your feed, optionally filtered.
    Feed {
        nid: String,
        #[arg(long, default_value_t = FEED_LIMIT)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Only posts updated since you last read them.
        #[arg(long)]
        unread: bool,
        /// Only posts you follow.
        #[arg(long)]
        following: bool,
        /// Only posts in this folder.
        #[arg(long, value_name = "NAME")]
        folder: Option<String>,
    },

    /// Search the posts of a class.
    Search { nid: String, query: String },

    /// Print class statistics.
    Stats { nid: String },

    /// List the users of a class.
    Users { nid: String },
}

/// Environment first, then the terminal. The password is read without echo.
struct PromptCredentials {
    email: Option<String>,
    password: Option<String>,
    read_line: fn(&str) -> io::Result<String>,
    read_secret: fn(&str) -> io::Result<String>,
}

fn ask(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

impl PromptCredentials {
    fn from_env() -> Self {
        Self {
            email: std::env::var(EMAIL_VAR).ok(),
            password: std::env::var(PASSWORD_VAR).ok(),
            read_line: ask,
            read_secret: |prompt| rpassword::prompt_password(prompt),
        }
    }
}

impl CredentialProvider for PromptCredentials {
    fn credentials(&self) -> Result<Credentials, PiazzaApiError> {
        let email = match &self.email {
            Some(email) => email.clone(),
            None => (self.read_line)("Email: ")?.trim().to_string(),
        };
        let password = match &self.password {
            Some(password) => password.clone(),
            None => (self.read_secret)("Password: ")?,
        };
        if email.is_empty() || password.is_empty() {
            return Err(PiazzaApiError::InvalidArgument(
                "email and password are required".to_string(),
            ));
        }
        Ok(Credentials::new(email, password))
    }
}

fn print_json(value: &impl Serialize) -> Result<(), PiazzaApiError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn client(cli: &Cli) -> Result<Piazza, PiazzaApiError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Piazza::with_config(config)
}

/// Reuse cached cookies, logging in first when there are none.
fn authenticated(cli: &Cli, piazza: &Piazza) -> Result<(), PiazzaApiError> {
    if cli.cookies.exists() {
        piazza.load_cookies(&cli.cookies)?;
        debug!("reusing session from {}", cli.cookies.display());
    }
    if !piazza.is_authenticated() {
        piazza.user_login_with(&PromptCredentials::from_env())?;
        piazza.save_cookies(&cli.cookies)?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), PiazzaApiError> {
    let piazza = client(&cli)?;

    match &cli.command {
        Command::Login => {
            piazza.user_login_with(&PromptCredentials::from_env())?;
            piazza.save_cookies(&cli.cookies)?;
            info!("session saved to {}", cli.cookies.display());
        }
        Command::DemoLogin { auth, url } => {
            piazza.demo_login(auth.as_deref(), url.as_deref())?;
            piazza.save_cookies(&cli.cookies)?;
            info!("session saved to {}", cli.cookies.display());
        }
        Command::Classes => {
            authenticated(&cli, &piazza)?;
            print_json(&piazza.get_user_classes()?)?;
        }
        Command::Post { nid, cid } => {
            authenticated(&cli, &piazza)?;
            let post = match cid.parse::<u64>() {
                Ok(number) => piazza.network(nid)?.get_post(number)?,
                Err(_) => piazza.network(nid)?.get_post(cid.as_str())?,
            };
            print_json(&post)?;
        }
        Command::Feed {
            nid,
            limit,
            offset,
            unread,
            following,
            folder,
        } => {
            authenticated(&cli, &piazza)?;
            let network = piazza.network(nid)?;
            let feed = if *unread || *following || folder.is_some() {
                let filter = FeedFilter::from_flags(
                    *unread,
                    *following,
                    folder.is_some(),
                    folder.as_deref().unwrap_or_default(),
                )?;
                network.get_filtered_feed(&filter)?
            } else {
                network.get_feed(*limit, *offset)?
            };
            print_json(&feed)?;
        }
        Command::Search { nid, query } => {
            authenticated(&cli, &piazza)?;
            print_json(&piazza.network(nid)?.search_feed(query)?)?;
        }
        Command::Stats { nid } => {
            authenticated(&cli, &piazza)?;
            print_json(&piazza.network(nid)?.get_statistics()?)?;
        }
        Command::Users { nid } => {
            authenticated(&cli, &piazza)?;
            print_json(&piazza.network(nid)?.get_all_users()?)?;
        }
    }
    Ok(())
}

fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("piazza: {e}");
        process::exit(1);
    }
}
