use clap::{Parser, ValueEnum};

use websift::config::Config;
use websift::data_models::{Query, TimeFilter};
use websift::orchestrator::{ProviderSelector, SearchOrchestrator};

#[derive(Parser, Debug)]
#[command(
    name = "websift",
    about = "Multi-provider web search with optional deep-dive content extraction"
)]
struct Cli {
    /// Search query words
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Fetch each result's page and extract its readable content
    #[arg(long)]
    deep: bool,

    /// Time filter: d(ay), w(eek), m(onth), y(ear)
    #[arg(short = 't', long = "time", value_enum)]
    time: Option<TimeArg>,

    /// Max results
    #[arg(short, long, default_value_t = 5)]
    count: usize,

    /// Search provider (auto fails over ddg -> google)
    #[arg(long, value_enum, default_value = "auto")]
    provider: ProviderArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TimeArg {
    D,
    W,
    M,
    Y,
}

impl From<TimeArg> for TimeFilter {
    fn from(arg: TimeArg) -> TimeFilter {
        match arg {
            TimeArg::D => TimeFilter::Day,
            TimeArg::W => TimeFilter::Week,
            TimeArg::M => TimeFilter::Month,
            TimeArg::Y => TimeFilter::Year,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ProviderArg {
    Ddg,
    Google,
    Auto,
}

impl From<ProviderArg> for ProviderSelector {
    fn from(arg: ProviderArg) -> ProviderSelector {
        match arg {
            ProviderArg::Ddg => ProviderSelector::DdgLite,
            ProviderArg::Google => ProviderSelector::GoogleCse,
            ProviderArg::Auto => ProviderSelector::Auto,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr; the JSON document owns stdout.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let query = Query::new(cli.query.join(" "), cli.count, cli.time.map(Into::into));
    let mut orchestrator = SearchOrchestrator::new(config, cli.deep)?;
    let output = orchestrator.run(&query, cli.provider.into()).await;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
