//! tcbot - Semantic MediaWiki test-case validation CLI
//!
//! Queries `Special:Ask` for test cases matching the filter options, then
//! runs one of the subcommands on the result.
//!
//! ## Commands
//!
//! - `validate` (default): check every test case's validation page for the
//!   capability marker and print a red (still marked) or green line
//! - `dump`: write `data.json` and `static/consumed.json`
//! - `completions <shell>`: print a shell completion script
//!
//! Every option can also be set through a `BOT_<NAME>` environment
//! variable. Switches accept `1/0`, `yes/no`, `on/off` and `true/false`
//! there; `BOT_ADDITIONAL` takes space-separated column names.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use dialoguer::{Input, Password};
use tracing::info;

use tcbot_core::query::{DEFAULT_CAPABILITY, DEFAULT_LIMIT};
use tcbot_core::telemetry::{init_tracing, level_for};
use tcbot_core::{
    dump, search, AdditionalColumn, BrowseMode, Classifier, Credentials, QueryFilter,
    QueryResult, Status, SubstringProbe, UrlOpener, WikiConfig, WikiSession, WikiTransport,
    XdgOpen,
};

#[derive(Parser, Debug)]
#[command(name = "tcbot")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate Semantic MediaWiki test cases against a capability marker", long_about = None)]
struct Cli {
    /// Wiki user (prompted when omitted)
    #[arg(long, env = "BOT_USER")]
    user: Option<String>,

    /// Wiki password (prompted when omitted)
    #[arg(long, env = "BOT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Wiki script URL, e.g. https://wiki.example.org/index.php (prompted when omitted)
    #[arg(long, env = "BOT_HOST")]
    host: Option<String>,

    /// Enable debug output
    #[arg(long, env = "BOT_DEBUG", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    debug: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "BOT_JSON", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    json: bool,

    /// Focus area objective number
    #[arg(short, long, env = "BOT_OBJECTIVE", value_parser = clap::value_parser!(u8).range(2..=12))]
    objective: Option<u8>,

    /// Match test cases consuming the capability
    #[arg(long, env = "BOT_CONSUMED", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    consumed: bool,

    /// Match test cases providing the capability
    #[arg(long, env = "BOT_PROVIDED", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    provided: bool,

    /// Maximum number of test cases to validate
    #[arg(long, env = "BOT_LIMIT", default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Test case status
    #[arg(long, env = "BOT_STATUS", value_enum, default_value_t = Status::PerformingDraft)]
    status: Status,

    /// Extra output column (repeatable)
    #[arg(long, env = "BOT_ADDITIONAL", value_enum, value_delimiter = ' ')]
    additional: Vec<AdditionalColumn>,

    /// Capability number, matched as CC-<capability>
    #[arg(long, env = "BOT_CAPABILITY", default_value = DEFAULT_CAPABILITY)]
    capability: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Commands {
    /// Validate test cases and open them in a browser
    Validate {
        /// Open undone test cases
        #[arg(long)]
        browser: bool,

        /// Open undone test cases in the form editor
        #[arg(long)]
        browseredit: bool,
    },

    /// Write data.json and static/consumed.json to the working directory
    Dump,

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    fn filter(&self) -> QueryFilter {
        QueryFilter {
            status: Some(self.status),
            objective: self.objective,
            consumed: self.consumed,
            provided: self.provided,
            capability: self.capability.clone(),
            additional: self.additional.iter().copied().collect(),
            limit: self.limit,
        }
    }

    fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Validate {
            browser: false,
            browseredit: false,
        })
    }

    /// Wiki settings, prompting for anything not given
    fn wiki_config(&self) -> Result<WikiConfig> {
        let user = match &self.user {
            Some(user) => user.clone(),
            None => Input::<String>::new()
                .with_prompt("Username")
                .interact_text()
                .context("Failed to read username")?,
        };
        let password = match &self.password {
            Some(password) => password.clone(),
            None => Password::new()
                .with_prompt("Password")
                .interact()
                .context("Failed to read password")?,
        };
        let host = match &self.host {
            Some(host) => host.clone(),
            None => Input::<String>::new()
                .with_prompt("Host")
                .interact_text()
                .context("Failed to read host")?,
        };
        Ok(WikiConfig::new(&host, Credentials::new(&user, &password)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command();

    if let Commands::Completions { shell } = command {
        return cmd_completions(shell, &mut std::io::stdout());
    }

    init_tracing(cli.json, level_for(cli.debug));

    let filter = cli.filter();
    filter.validate()?;

    let config = cli.wiki_config()?;
    let session = WikiSession::login(config)
        .await
        .context("Failed to reach the wiki")?;

    let Some(result) = search(&session, session.config(), &filter)
        .await
        .context("Ask query failed")?
    else {
        return Ok(());
    };

    match command {
        Commands::Validate {
            browser,
            browseredit,
        } => {
            let browse = BrowseMode {
                view: browser,
                edit: browseredit,
            };
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            cmd_validate(
                &session,
                session.config(),
                &result,
                &filter,
                browse,
                &XdgOpen,
                &mut out,
            )
            .await
        }
        Commands::Dump => cmd_dump(&result, Path::new(".")),
        // printed before login
        Commands::Completions { .. } => Ok(()),
    }
}

/// Classify the result set and print one line per test case
async fn cmd_validate(
    transport: &dyn WikiTransport,
    config: &WikiConfig,
    result: &QueryResult,
    filter: &QueryFilter,
    browse: BrowseMode,
    opener: &dyn UrlOpener,
    out: &mut dyn Write,
) -> Result<()> {
    let classifier = Classifier::new(transport, config, &SubstringProbe, opener);
    let classes = classifier
        .classify(&result.records, &filter.capability, filter.limit, browse, out)
        .await
        .context("Validation failed")?;

    info!(
        "{} of {} test cases still reference {}",
        classes.matched.len(),
        classes.processed(),
        filter.marker()
    );
    Ok(())
}

/// Write the raw and flattened result files below `dir`
fn cmd_dump(result: &QueryResult, dir: &Path) -> Result<()> {
    let paths = dump(result, dir).context("Failed to dump query result")?;
    println!("Wrote {}", paths.data.display());
    println!("Wrote {}", paths.consumed.display());
    Ok(())
}

/// Write the completion script for `shell`
fn cmd_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    clap_complete::generate(shell, &mut <Cli as CommandFactory>::command(), "tcbot", out);
    Ok(())
}
