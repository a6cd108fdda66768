use clap::Parser;
use data_components::clients::{FlexibleTransport, TransportKind};
use data_components::config::DataConfig;
use data_components::DataRest;

#[derive(Parser)]
#[command(author, version, about = "Fetch a JSON resource and print it wrapped in a response envelope", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    DATA_REST_CREDENTIAL  Bearer token sent with the request
    DATA_LOGGING          Log the flow of execution (1|true|yes|on)
    DATA_TRANSPORT        Transport to use (http|mock)
    RUST_LOG              Log filter, e.g. data_components=debug")]
struct Args {
    /// Resource URL
    url: String,

    /// Query parameter as key=value; may be repeated
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Log the flow of execution
    #[arg(short, long)]
    logging: bool,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args = Args::parse();
    let mut config = DataConfig::from_env();
    if args.logging {
        config = config.with_logging(true);
    }

    let rest = DataRest::with_config(FlexibleTransport::from_kind(TransportKind::from_env()), config);
    let params: Vec<(&str, &str)> = args.params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let envelope = rest.fetch(&args.url, &params).await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
