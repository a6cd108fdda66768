use anyhow::Context;
use clap::Parser;
use data_components::clients::{FlexibleTransport, TransportKind};
use data_components::config::DataConfig;
use data_components::interceptors::FileInterceptor;
use data_components::{DataGql, QueryRequest};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "Run one GraphQL query and print the response envelope", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    DATA_GQL_URL          Default GraphQL server URL
    DATA_GQL_CREDENTIAL   Bearer token sent with the request
    DATA_LOGGING          Log the flow of execution (1|true|yes|on)
    DATA_TRANSPORT        Transport to use (http|mock)
    RUST_LOG              Log filter, e.g. data_components=debug

EXAMPLES:
    data-gql --url https://api.example/graphql --query '{ repo { id } }'
    data-gql --query 'query R($o: String!) { repo(owner: $o) { id } }' --variables '{\"o\":\"octo\"}'")]
struct Args {
    /// GraphQL server URL [default: $DATA_GQL_URL]
    #[arg(short, long)]
    url: Option<String>,

    /// Query document
    #[arg(short, long)]
    query: String,

    /// Variables as a JSON object
    #[arg(long)]
    variables: Option<String>,

    /// Operation to execute when the document defines several
    #[arg(long)]
    op: Option<String>,

    /// Log the flow of execution
    #[arg(short, long)]
    logging: bool,

    /// Also save the envelope as JSON under this directory
    #[arg(long)]
    save_to: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG in .env is seen
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args = Args::parse();

    let mut config = DataConfig::from_env();
    if let Some(url) = args.url {
        config = config.with_url(url);
    }
    if args.logging {
        config = config.with_logging(true);
    }

    let mut request = QueryRequest::from_config(&config, args.query)?;
    if let Some(raw) = args.variables {
        let variables: Map<String, Value> =
            serde_json::from_str(&raw).context("--variables must be a JSON object")?;
        request = request.with_variables(variables);
    }
    if let Some(op) = args.op {
        request = request.with_operation_name(op);
    }

    let mut gql = DataGql::with_config(FlexibleTransport::from_kind(TransportKind::from_env()), config);
    if let Some(dir) = args.save_to {
        gql = gql.with_interceptor(Arc::new(FileInterceptor::new(dir)));
    }

    let envelope = gql.fetch(&request).await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
