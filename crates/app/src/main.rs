use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};

use api::{ApiClient, ApiConfig, InMemoryApi, StudyApi};
use recall_core::Clock;
use services::{Queries, QueryCache, ReviewWorkflow};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidApiUrl { raw: String, reason: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidApiUrl { raw, reason } => {
                write!(f, "invalid API url {raw:?}: {reason}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    has_session: bool,
    queries: Arc<Queries>,
    review_workflow: Arc<ReviewWorkflow>,
}

impl UiApp for DesktopApp {
    fn has_session(&self) -> bool {
        self.has_session
    }

    fn queries(&self) -> Arc<Queries> {
        Arc::clone(&self.queries)
    }

    fn review_workflow(&self) -> Arc<ReviewWorkflow> {
        Arc::clone(&self.review_workflow)
    }
}

struct Args {
    api_url: Option<String>,
    token: Option<String>,
    demo: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api <url>] [--token <token>] [--demo]");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --api <url>      base URL of the learning server");
    eprintln!("  --token <token>  bearer token for that server");
    eprintln!("  --demo           run against a built-in in-memory server");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RECALL_API_URL, RECALL_API_TOKEN");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut api_url = None;
        let mut token = None;
        let mut demo = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => {
                    let value = require_value(args, "--api")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidApiUrl {
                            raw: value,
                            reason: "empty".into(),
                        });
                    }
                    api_url = Some(value);
                }
                "--token" => {
                    token = Some(require_value(args, "--token")?);
                }
                "--demo" => {
                    demo = true;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            api_url,
            token,
            demo,
        })
    }
}

/// Flags win over environment variables; `None` means no server was
/// configured at all, which sends the UI to the connect screen.
fn resolve_config(args: &Args) -> Result<Option<ApiConfig>, ArgsError> {
    if let Some(url) = args.api_url.as_deref() {
        let token = args
            .token
            .clone()
            .or_else(|| std::env::var("RECALL_API_TOKEN").ok());
        let config = ApiConfig::new(url, token).map_err(|err| ArgsError::InvalidApiUrl {
            raw: url.to_string(),
            reason: err.to_string(),
        })?;
        return Ok(Some(config));
    }

    Ok(ApiConfig::from_env())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|err| {
        eprintln!("{err}");
        print_usage();
        err
    })?;

    let clock = Clock::default_clock();
    let (study_api, has_session): (Arc<dyn StudyApi>, bool) = if args.demo {
        (Arc::new(InMemoryApi::seeded(clock)), true)
    } else {
        match resolve_config(&args)? {
            Some(config) => (Arc::new(ApiClient::new(config)), true),
            None => {
                // No server configured: launch anyway so the connect screen
                // can explain what to set. Nothing is called on this client.
                (Arc::new(InMemoryApi::new(clock)), false)
            }
        }
    };

    let cache = Arc::new(QueryCache::new(clock));
    let queries = Arc::new(Queries::new(Arc::clone(&cache), Arc::clone(&study_api)));
    let review_workflow = Arc::new(
        ReviewWorkflow::new(clock, study_api, queries.as_ref().clone()).with_today_plan(true),
    );

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        has_session,
        queries,
        review_workflow,
    });
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Recall")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
