use std::error::Error;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use txsleuth::analysis::scenario::SAMPLE_HASHES;
use txsleuth::analysis::{AnalysisFocus, HashAnalyzer};
use txsleuth::config::Config;
use txsleuth::context::AppContext;
use txsleuth::core::factory::{bump_fee, create_transaction};
use txsleuth::core::pipeline::{PipelineOutput, run_pipeline};
use txsleuth::core::{Coin, ScoredTransaction};
use txsleuth::session::UserSession;
use txsleuth::signals::RiskEngine;
use txsleuth::signals::report::RiskReport;
use txsleuth::ui;

#[derive(Parser, Debug)]
#[command(name = "txsleuth", version, about = "Mock forensic transaction analysis")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and score mock transactions
    Generate {
        #[arg(long, value_enum, default_value_t = CoinArg::Btc)]
        coin: CoinArg,
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
        /// Also show an RBF replacement for each replaceable transaction
        #[arg(long)]
        bump: bool,
    },
    /// Analyze a 64-hex transaction hash
    Analyze {
        hash: String,
        /// Use the RBF view
        #[arg(long)]
        rbf: bool,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Merge chain data from the block explorer
        #[arg(long)]
        explorer: bool,
    },
    /// List the bundled demo hashes
    Samples,
    /// Run the live dashboard timers and print events
    Dashboard {
        /// Stop after this many seconds (runs until Ctrl-C when omitted)
        #[arg(long)]
        duration_secs: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CoinArg {
    Btc,
    Eth,
}

impl From<CoinArg> for Coin {
    fn from(arg: CoinArg) -> Self {
        match arg {
            CoinArg::Btc => Coin::Btc,
            CoinArg::Eth => Coin::Eth,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "txsleuth=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config);
    tracing::debug!("Config: {:?}", config);

    match cli.command {
        Command::Generate { coin, count, bump } => generate(&config, coin.into(), count, bump),
        Command::Analyze {
            hash,
            rbf,
            json,
            explorer,
        } => {
            if explorer {
                config.explorer.enabled = true;
            }
            analyze(&config, &hash, rbf, json).await
        }
        Command::Samples => {
            for (label, hash) in SAMPLE_HASHES {
                println!("{label:<22} {hash}");
            }
            Ok(())
        }
        Command::Dashboard { duration_secs } => {
            dashboard(config, duration_secs).await;
            Ok(())
        }
    }
}

fn generate(config: &Config, coin: Coin, count: usize, bump: bool) -> Result<(), Box<dyn Error>> {
    let mut rng = match config.generator.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let engine = RiskEngine::new(&config.risk);
    let theme = config.ui.theme;

    // Every bump counts as an RBF attempt, so long --bump runs trip RBF_FLOODING.
    let mut session = UserSession::new("cli", "127.0.0.1", "txsleuth-cli");
    let mut scored: Vec<ScoredTransaction> = Vec::with_capacity(count);
    for _ in 0..count {
        let tx = create_transaction(coin, &mut rng);
        let replacement = (bump && tx.rbf_enabled).then(|| bump_fee(&tx, &mut rng));
        let entry = engine.score_transaction(tx, Some(&session), &mut rng);
        println!("{}", ui::feed::tx_row(&entry, theme));
        for hit in engine
            .tags()
            .check_transfer(&entry.tx.input_address, &entry.tx.output_address)
        {
            println!("  ⚑ {:?} address tagged {}", hit.role, hit.tag.entity);
        }
        scored.push(entry);

        if let Some(replacement) = replacement {
            session.record_rbf_attempt();
            let bumped = engine.score_transaction(replacement, Some(&session), &mut rng);
            println!("  ↳ {}", ui::feed::tx_row(&bumped, theme));
            scored.push(bumped);
        }
    }

    let report = RiskReport::from_scored(&scored, engine.high_risk_threshold());
    println!("{}", ui::stats::summary_line(&report));
    Ok(())
}

async fn analyze(config: &Config, hash: &str, rbf: bool, json: bool) -> Result<(), Box<dyn Error>> {
    let focus = if rbf { AnalysisFocus::Rbf } else { AnalysisFocus::General };
    let mut analyzer = HashAnalyzer::new(config);
    let mut ctx = AppContext::new(config.ui.theme);

    let result = analyzer.analyze_with_explorer(hash, focus, &mut ctx).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", ui::report::analysis_report(&result, ctx.theme));
    }
    for record in ctx.errors.records() {
        eprintln!("warning ({}): {}", record.source, record.message);
    }
    Ok(())
}

async fn dashboard(config: Config, duration_secs: Option<u64>) {
    let theme = config.ui.theme;
    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel::<PipelineOutput>();
    let pipeline = tokio::spawn(run_pipeline(config, ui_tx));

    let deadline = async {
        match duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!("Cannot listen for Ctrl-C ({e}), stopping dashboard");
                }
            }
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            msg = ui_rx.recv() => match msg {
                Some(output) => println!("{}", ui::render_output(&output, theme)),
                None => break,
            },
            _ = &mut deadline => break,
        }
    }

    // Closing the receiver stops the pipeline.
    drop(ui_rx);
    match pipeline.await {
        Ok(ctx) if !ctx.errors.is_empty() => {
            tracing::warn!("Dashboard absorbed {} errors", ctx.errors.len());
        }
        Ok(_) => {}
        Err(e) => tracing::error!("Pipeline task failed: {e}"),
    }
}
