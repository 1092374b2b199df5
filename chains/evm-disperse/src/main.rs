use anyhow::Result;
use clap::Parser;
use core_logic::{
    setup_logger, BatchLimits, ConfigError, CoreError, FundingAccount, KeyLoader, RandomSampler,
    RunMetrics, TokioPause,
};
use dialoguer::{theme::ColorfulTheme, Confirm};
use dotenv::dotenv;
use evm_disperse::config::DEFAULT_CONFIG_FILE;
use evm_disperse::{ClientOptions, DisperseConfig, DistributionParams, Distributor, EvmLedgerClient};
use std::path::PathBuf;
use tracing::{error, info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Randomized, paced bulk token distribution", long_about = None)]
struct Args {
    /// Recipient list, one address per line
    #[arg(short, long)]
    addresses: PathBuf,
    /// Batching contract address
    #[arg(short, long)]
    batcher: Option<String>,
    /// Amount per recipient, in whole-token units (e.g. 1.5)
    #[arg(long)]
    amount: String,
    /// ERC-20 token to distribute
    #[arg(short, long, conflicts_with = "native")]
    token: Option<String>,
    /// Distribute the native currency instead of a token
    #[arg(long)]
    native: bool,
    #[arg(long)]
    min_batch_size: Option<usize>,
    #[arg(long)]
    max_batch_size: Option<usize>,
    /// Minutes
    #[arg(long)]
    min_interval: Option<u64>,
    /// Minutes
    #[arg(long)]
    max_interval: Option<u64>,
    /// Which account holds the funds: batcher or signer
    #[arg(long)]
    funding_account: Option<FundingAccount>,
    /// Wait for each receipt and stop on a reverted batch
    #[arg(long)]
    await_receipt: bool,
    /// Seed for reproducible batch sizes and intervals
    #[arg(long)]
    seed: Option<u64>,
    /// Run all checks and print the batch plan without sending anything
    #[arg(long)]
    dry_run: bool,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
    /// Write a JSON run report here
    #[arg(long)]
    report: Option<PathBuf>,
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,
    #[arg(long)]
    rpc_url: Option<String>,
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> DisperseConfig {
        DisperseConfig {
            rpc_url: self.rpc_url.clone(),
            batcher_address: self.batcher.clone(),
            token_address: self.token.clone(),
            min_batch_size: self.min_batch_size,
            max_batch_size: self.max_batch_size,
            min_interval: self.min_interval,
            max_interval: self.max_interval,
            funding_account: self.funding_account,
            await_receipt: self.await_receipt.then_some(true),
            log_dir: None,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let args = Args::parse();

    let loaded = DisperseConfig::load(&args.config);
    let log_dir = loaded
        .as_ref()
        .map(|c| c.log_dir().to_string())
        .unwrap_or_else(|_| evm_disperse::config::DEFAULT_LOG_DIR.to_string());
    let console_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    // Flushes the file writer on drop
    let log_guard = setup_logger(&log_dir, console_level);

    let outcome = match loaded {
        Ok(file_config) => run(args, file_config).await,
        Err(e) => Err(e.context(format!("Failed to load config from {}", args.config))),
    };

    if let Err(e) = outcome {
        match e.downcast_ref::<CoreError>() {
            Some(core) => error!("[{}] {}", core.category(), core),
            None => error!("{:#}", e),
        }
        drop(log_guard);
        std::process::exit(1);
    }
}

async fn run(args: Args, file_config: DisperseConfig) -> Result<()> {
    let config = file_config.merge(args.overrides());
    let params = DistributionParams::resolve(
        &config,
        args.addresses.clone(),
        &args.amount,
        args.native,
        &BatchLimits::default(),
    )
    .map_err(CoreError::from)?;

    let rpc_url = config
        .rpc_url
        .as_deref()
        .ok_or_else(|| {
            CoreError::from(ConfigError::MissingField {
                field: "rpc_url".to_string(),
            })
        })?;

    let key = KeyLoader::new().load().map_err(CoreError::from)?;
    let client = EvmLedgerClient::connect(
        rpc_url,
        &key,
        params.batcher_address,
        ClientOptions {
            funding_account: params.funding_account,
            await_receipt: params.await_receipt,
        },
    )
    .await?;

    let distributor = Distributor::new(&client, &params);
    let prepared = distributor.prepare().await?;

    let mut sampler = match args.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            RandomSampler::seeded(seed)
        }
        None => RandomSampler::from_entropy(),
    };

    if args.dry_run {
        let plan = distributor.plan(&prepared, &mut sampler);
        info!(
            "Dry run: {} batches for {} recipients, {} each ({} total)",
            plan.len(),
            prepared.recipients.len(),
            prepared.display_amount(),
            prepared.display_total()
        );
        for (i, batch) in plan.iter().enumerate() {
            match batch.pause_after {
                Some(wait) => info!(
                    "  #{:<4} recipients {}..{} ({}), then wait {} min",
                    i + 1,
                    batch.range.start,
                    batch.range.end,
                    batch.range.len(),
                    wait.as_secs() / 60
                ),
                None => info!(
                    "  #{:<4} recipients {}..{} ({})",
                    i + 1,
                    batch.range.start,
                    batch.range.end,
                    batch.range.len()
                ),
            }
        }
        return Ok(());
    }

    if !args.yes {
        let prompt = format!(
            "Send {} ({}) to {} recipients, {} total from {}, batches of {}..={} every {}..={} min?",
            prepared.display_amount(),
            params.asset,
            prepared.recipients.len(),
            prepared.display_total(),
            prepared.preflight.funding_address,
            params.batch.min_batch_size,
            params.batch.max_batch_size,
            params.batch.min_interval_minutes,
            params.batch.max_interval_minutes
        );
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        if !confirmed {
            info!("Aborted, nothing sent.");
            return Ok(());
        }
    }

    let metrics = RunMetrics::new();
    let report = distributor
        .execute(&prepared, &mut sampler, &TokioPause, &metrics)
        .await;

    if let Some(path) = &args.report {
        match report.write_json(path).await {
            Ok(()) => info!("Report written to {}", path.display()),
            Err(e) => error!("{:#}", e),
        }
    }

    report.into_result()?;
    Ok(())
}
