use chrono::{DateTime, Utc};
use clap::Parser;
use scanlytics::analytics::{AnalyticsConfig, ReportEngine, ReportKind, RunOptions};
use scanlytics::filter::RawParams;
use scanlytics::source::{parse_customers_json, parse_events_jsonl, InMemoryStore};
use scanlytics::{MonthLabels, ScanlyticsError};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scanlytics", about = "Run one scan analytics report and print it as JSON")]
struct Cli {
    /// Report to run: statistics, customer_activity, scanning_efficiency,
    /// scanning_activity, scanning_activity_pages, customers_by_city
    #[arg(long, short)]
    report: ReportKind,

    /// Scan events, one JSON object per line
    #[arg(long, env = "SCANLYTICS_EVENTS")]
    events: PathBuf,

    /// Customer directory as a JSON array
    #[arg(long, env = "SCANLYTICS_CUSTOMERS")]
    customers: Option<PathBuf>,

    /// Filter parameter, repeatable: --param lastDays=7 --param city=Lund
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Filter parameters as a query string, e.g. "quarter=2&year=2024"
    #[arg(long)]
    query: Option<String>,

    /// Evaluation instant (RFC 3339); defaults to the current time
    #[arg(long)]
    now: Option<String>,

    #[arg(long, env = "SCANLYTICS_CHAIN")]
    chain: Option<String>,

    /// Batch gap threshold in minutes
    #[arg(long, env = "SCANLYTICS_BATCH_GAP_MINUTES")]
    gap_minutes: Option<i64>,

    #[arg(long, env = "SCANLYTICS_MONTH_LABELS")]
    month_labels: Option<MonthLabels>,

    #[arg(long, env = "SCANLYTICS_CITY_LIMIT")]
    city_limit: Option<usize>,

    /// Keep every city in customers_by_city, even when filters are active
    #[arg(long)]
    all_cities: bool,

    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn config(&self) -> Result<AnalyticsConfig, ScanlyticsError> {
        let mut config = AnalyticsConfig::from_env();
        if let Some(ref chain) = self.chain {
            config.chain = chain.clone();
        }
        if let Some(minutes) = self.gap_minutes {
            if minutes < 0 {
                return Err(ScanlyticsError::Config(format!(
                    "gap minutes must not be negative, got {}",
                    minutes
                )));
            }
            config.batch_gap = chrono::Duration::minutes(minutes);
        }
        if let Some(labels) = self.month_labels {
            config.month_labels = labels;
        }
        if let Some(limit) = self.city_limit {
            config.city_limit = limit;
        }
        Ok(config)
    }

    fn raw_params(&self) -> Result<RawParams, ScanlyticsError> {
        let mut raw = match self.query {
            Some(ref q) => RawParams::from_query(q),
            None => RawParams::new(),
        };
        for pair in &self.params {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(ScanlyticsError::InvalidFilterInput {
                    param: pair.clone(),
                    value: "expected KEY=VALUE".to_string(),
                });
            };
            if !raw.set(key.trim(), value) {
                tracing::warn!("Ignoring unknown filter parameter '{}'", key);
            }
        }
        Ok(raw)
    }

    fn now(&self) -> Result<DateTime<Utc>, ScanlyticsError> {
        match self.now {
            Some(ref raw) => scanlytics::parse_timestamp(raw)
                .ok_or_else(|| ScanlyticsError::Config(format!("unparsable --now '{}'", raw))),
            None => Ok(Utc::now()),
        }
    }
}

async fn run(cli: Cli) -> Result<String, ScanlyticsError> {
    let config = cli.config()?;
    let raw = cli.raw_params()?;
    let now = cli.now()?;

    let events = parse_events_jsonl(&tokio::fs::read_to_string(&cli.events).await?)?;
    let customers = match cli.customers {
        Some(ref path) => parse_customers_json(&tokio::fs::read_to_string(path).await?)?,
        None => Vec::new(),
    };
    tracing::info!(
        "Loaded {} events and {} customers",
        events.len(),
        customers.len()
    );
    let store = InMemoryStore::new(events, customers);

    let mut options = RunOptions::for_request(&config, &raw);
    if cli.all_cities {
        options = options.with_city_limit(None);
    }

    let engine = ReportEngine::new(config);
    let spec = engine.normalize(&raw, cli.report, now);
    tracing::info!("Running {} over {}", cli.report, spec.time_window);
    let report = engine.run(cli.report, &spec, options, &store, &store, now)?;

    let out = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(out)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
