use std::path::PathBuf;
use std::sync::Arc;

use alloy::{
    providers::ProviderBuilder,
    transports::http::{Client, Http},
};
use clap::Parser;
use dotenv::dotenv;

use axie_transfers::{
    configure::load_config,
    logging::setup_logging,
    model::{load_json, load_secrets},
    AxieGraphql, BatchValidator, CancelSignal, ExecutorSettings, Reporter, RpcChain,
    TracingReporter, TransferExecutor, TransferOrchestrator,
};

#[derive(Debug, Parser)]
#[command(about = "Transfer Axies in bulk from accounts you hold the keys of")]
struct Args {
    /// Batch file listing the transfers per account
    transfers_file: PathBuf,
    /// Secrets file mapping accounts to private keys
    secrets_file: PathBuf,
    /// Only transfer to receivers present in the secrets file
    #[arg(long)]
    secure: bool,
    /// Config file, defaults to config/transfers.{toml,yaml,json} if present
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let results_file = setup_logging(&config.log_dir)?;
    tracing::info!("Important records go to {}", results_file.display());

    let reporter: Arc<dyn Reporter> = Arc::new(TracingReporter);

    let batch = load_json(&args.transfers_file)?;
    let secrets = load_secrets(&args.secrets_file)?;

    let batch = match BatchValidator::new(reporter.clone()).validate(&batch, &secrets) {
        Ok(batch) => batch,
        Err(report) => {
            tracing::error!("{report}, no transfer was attempted");
            std::process::exit(1);
        }
    };

    let (cancel_tx, cancel) = CancelSignal::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let provider = ProviderBuilder::new().on_http(config.rpc_url.parse()?);
    let executor = TransferExecutor::new(
        RpcChain::<_, Http<Client>>::new(provider),
        ExecutorSettings::from_config(&config)?,
        reporter.clone(),
    )
    .with_cancel(cancel);

    let orchestrator = TransferOrchestrator::new(
        AxieGraphql::new(config.graphql_url.clone()),
        executor,
        reporter,
    )
    .secure(args.secure);

    let results = orchestrator.run(&batch, &secrets).await;
    if config.reconcile_timed_out {
        orchestrator.reconcile(&results).await;
    }

    Ok(())
}
