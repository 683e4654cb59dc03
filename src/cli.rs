//! CLI definition and dispatch.

use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_post_adapter::CsvPostAdapter;
use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::{EvaluationsCsvReport, TradesCsvReport};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report::HtmlReportAdapter;
use crate::adapters::pine_script::PineScriptReport;
use crate::adapters::sample_post_adapter::SamplePostAdapter;
use crate::adapters::sample_price_adapter::SamplePriceAdapter;
use crate::domain::classifier::{ClassifierConfig, ImpactClassifier};
use crate::domain::config_validation::{
    validate_classifier_config, validate_config, validate_trading_params,
};
use crate::domain::error::PosttraderError;
use crate::domain::ledger::TradingParams;
use crate::domain::oracle::{PriceOracle, PricePoint};
use crate::domain::post::{Engagement, Post};
use crate::domain::report::{summarize, RunStats, Summary};
use crate::domain::simulator::{SimulationConfig, SimulationRun, TradeSimulator};
use crate::domain::thread::{consolidate_threads, dedupe_by_id};
use crate::ports::config_port::ConfigPort;
use crate::ports::post_port::PostPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::{ReportContext, ReportPort};

const DEFAULT_THREAD_WINDOW_MINUTES: i64 = 2;

#[derive(Parser, Debug)]
#[command(name = "posttrader", about = "Social-media impact trading simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay posts against a price history and report the trades
    Simulate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Posts CSV export (overrides [data] posts_csv)
        #[arg(long)]
        posts: Option<PathBuf>,
        /// Price CSV (overrides [data] prices_csv)
        #[arg(long)]
        prices: Option<PathBuf>,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Use the built-in sample posts and synthetic prices
        #[arg(long)]
        sample: bool,
    },
    /// Score a single piece of text
    Classify {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        text: String,
        #[arg(long)]
        likes: Option<u64>,
        #[arg(long)]
        retweets: Option<u64>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            posts,
            prices,
            output_dir,
            sample,
        } => run_simulate(
            config.as_deref(),
            posts.as_deref(),
            prices.as_deref(),
            output_dir.as_deref(),
            sample,
        ),
        Command::Classify {
            config,
            text,
            likes,
            retweets,
        } => run_classify(config.as_deref(), &text, likes, retweets),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PosttraderError> {
    FileConfigAdapter::from_file(path)
}

fn load_optional_config(path: Option<&Path>) -> Result<FileConfigAdapter, PosttraderError> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            load_config(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn int_in<T: TryFrom<i64>>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<T, PosttraderError> {
    let raw = config.get_int(section, key, default);
    T::try_from(raw).map_err(|_| {
        PosttraderError::config_invalid(section, key, format!("value {raw} is out of range"))
    })
}

pub fn build_trading_params(config: &dyn ConfigPort) -> Result<TradingParams, PosttraderError> {
    let defaults = TradingParams::default();
    let params = TradingParams {
        position_size_usdt: config.get_double(
            "trading",
            "position_size_usdt",
            defaults.position_size_usdt,
        ),
        hold_duration_minutes: config.get_int(
            "trading",
            "hold_duration_minutes",
            defaults.hold_duration_minutes,
        ),
    };
    validate_trading_params(&params)?;
    Ok(params)
}

pub fn build_classifier_config(config: &dyn ConfigPort) -> Result<ClassifierConfig, PosttraderError> {
    let defaults = ClassifierConfig::default();

    let categories = config.section_keys("keywords");
    let high_impact = if categories.is_empty() {
        defaults.high_impact
    } else {
        categories
            .into_iter()
            .map(|label| {
                let keywords = config.get_list("keywords", &label);
                (label, keywords)
            })
            .collect::<BTreeMap<_, _>>()
    };

    let low_impact = match config.get_list("classifier", "low_impact_keywords") {
        list if list.is_empty() => defaults.low_impact,
        list => list,
    };
    let excitement_indicators = match config.get_list("classifier", "excitement_indicators") {
        list if list.is_empty() => defaults.excitement_indicators,
        list => list,
    };

    let classifier = ClassifierConfig {
        high_impact,
        low_impact,
        excitement_indicators,
        threshold: int_in(config, "classifier", "threshold", i64::from(defaults.threshold))?,
        category_score: int_in(
            config,
            "classifier",
            "category_score",
            i64::from(defaults.category_score),
        )?,
        low_impact_penalty: int_in(
            config,
            "classifier",
            "low_impact_penalty",
            i64::from(defaults.low_impact_penalty),
        )?,
        engagement_weight: int_in(
            config,
            "classifier",
            "engagement_weight",
            defaults.engagement_weight as i64,
        )?,
        excitement_bonus: int_in(
            config,
            "classifier",
            "excitement_bonus",
            i64::from(defaults.excitement_bonus),
        )?,
    };
    validate_classifier_config(&classifier)?;
    Ok(classifier)
}

pub fn build_simulation_config(config: &dyn ConfigPort) -> Result<SimulationConfig, PosttraderError> {
    validate_config(config)?;
    Ok(SimulationConfig {
        trading: build_trading_params(config)?,
        classifier: build_classifier_config(config)?,
    })
}

/// Posts from the configured CSV export, or the built-in sample set.
///
/// Falls back to the sample set when no export is configured, or when it
/// cannot be read and `[data] fallback_to_sample` is on (the default).
pub fn select_post_source(
    config: &dyn ConfigPort,
    posts_override: Option<&Path>,
    force_sample: bool,
) -> Result<Vec<Post>, PosttraderError> {
    let path = posts_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "posts_csv").map(PathBuf::from));
    let fallback = config.get_bool("data", "fallback_to_sample", true);

    let csv = match (force_sample, path) {
        (false, Some(path)) => CsvPostAdapter::new(path),
        (false, None) if !fallback => {
            return Err(PosttraderError::ConfigMissing {
                section: "data".into(),
                key: "posts_csv".into(),
            });
        }
        _ => return fetch_sample_posts(),
    };

    match csv.fetch_posts() {
        Ok(posts) => {
            eprintln!("Loaded {} posts from {}", posts.len(), csv.name());
            Ok(posts)
        }
        Err(e) if fallback => {
            warn!(error = %e, "post source failed, using sample posts");
            eprintln!("warning: {e}; using sample posts");
            fetch_sample_posts()
        }
        Err(e) => Err(e),
    }
}

fn fetch_sample_posts() -> Result<Vec<Post>, PosttraderError> {
    let posts = SamplePostAdapter::new().fetch_posts()?;
    eprintln!("Using {} built-in sample posts", posts.len());
    Ok(posts)
}

/// Prices covering `[start, end]`, from the configured CSV or the synthetic series.
pub fn select_price_source(
    config: &dyn ConfigPort,
    prices_override: Option<&Path>,
    force_sample: bool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<PricePoint>, PosttraderError> {
    let path = prices_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "prices_csv").map(PathBuf::from));
    let fallback = config.get_bool("data", "fallback_to_sample", true);
    let sample = SamplePriceAdapter::new(config.get_int("data", "sample_step_minutes", 5));

    let csv = match (force_sample, path) {
        (false, Some(path)) => CsvPriceAdapter::new(path),
        (false, None) if !fallback => {
            return Err(PosttraderError::ConfigMissing {
                section: "data".into(),
                key: "prices_csv".into(),
            });
        }
        _ => {
            eprintln!("Using synthetic sample prices");
            return sample.fetch_prices(start, end);
        }
    };

    match csv.fetch_prices(start, end) {
        Ok(points) => {
            eprintln!("Loaded {} price points from {}", points.len(), csv.name());
            Ok(points)
        }
        Err(e) if fallback => {
            warn!(error = %e, "price source failed, using synthetic prices");
            eprintln!("warning: {e}; using synthetic prices");
            sample.fetch_prices(start, end)
        }
        Err(e) => Err(e),
    }
}

/// Drop repeated post ids, then merge threads per `[data] thread_window_minutes`.
pub fn preprocess_posts(
    config: &dyn ConfigPort,
    posts: Vec<Post>,
) -> Result<Vec<Post>, PosttraderError> {
    let fetched = posts.len();
    let posts = dedupe_by_id(posts);
    if posts.len() < fetched {
        warn!(dropped = fetched - posts.len(), "dropped posts with repeated ids");
    }

    let minutes: i64 = int_in(
        config,
        "data",
        "thread_window_minutes",
        DEFAULT_THREAD_WINDOW_MINUTES,
    )?;
    let window = Duration::try_minutes(minutes).ok_or_else(|| {
        PosttraderError::config_invalid("data", "thread_window_minutes", "window is too large")
    })?;
    let before = posts.len();
    let posts = consolidate_threads(posts, window);
    if posts.len() < before {
        info!(
            posts = before,
            consolidated = posts.len(),
            window_minutes = minutes,
            "merged threads"
        );
        eprintln!(
            "Consolidated {} posts into {} (threads within {} min)",
            before,
            posts.len(),
            minutes
        );
    }
    Ok(posts)
}

/// Output files named in `[report]`, resolved against `output_dir`.
pub struct ReportPaths {
    pub trades_csv: PathBuf,
    pub evaluations_csv: PathBuf,
    pub html: PathBuf,
    pub pine: PathBuf,
}

impl ReportPaths {
    pub fn from_config(config: &dyn ConfigPort, output_dir: &Path) -> Self {
        let path = |key: &str, default: &str| {
            output_dir.join(config.get_string("report", key).unwrap_or_else(|| default.to_string()))
        };
        ReportPaths {
            trades_csv: path("trades_csv", "trades.csv"),
            evaluations_csv: path("evaluations_csv", "evaluations.csv"),
            html: path("html", "report.html"),
            pine: path("pine", "markers.pine"),
        }
    }
}

/// Everything a finished simulation produced.
#[derive(Debug)]
pub struct SimulationOutput {
    pub config: SimulationConfig,
    pub prices: Vec<PricePoint>,
    pub run: SimulationRun,
    pub summary: Summary,
    pub stats: RunStats,
}

impl SimulationOutput {
    pub fn report_context(&self) -> ReportContext<'_> {
        ReportContext {
            run: &self.run,
            summary: &self.summary,
            stats: &self.stats,
            prices: &self.prices,
            position_size_usdt: self.config.trading.position_size_usdt,
            hold_duration_minutes: self.config.trading.hold_duration_minutes,
            threshold: self.config.classifier.threshold,
        }
    }
}

pub fn run_simulation_pipeline(
    config: &dyn ConfigPort,
    posts_override: Option<&Path>,
    prices_override: Option<&Path>,
    force_sample: bool,
) -> Result<SimulationOutput, PosttraderError> {
    let sim_config = build_simulation_config(config)?;
    let simulator = TradeSimulator::new(sim_config.clone())?;

    let posts = select_post_source(config, posts_override, force_sample)?;
    let posts = preprocess_posts(config, posts)?;

    let window = posts
        .iter()
        .map(|p| p.timestamp)
        .min()
        .zip(posts.iter().map(|p| p.timestamp).max());
    let prices = match window {
        Some((start, last)) => {
            let end = last
                .checked_add_signed(sim_config.trading.hold_duration()?)
                .ok_or(PosttraderError::OutOfRange { timestamp: last })?;
            select_price_source(config, prices_override, force_sample, start, end)?
        }
        None => Vec::new(),
    };
    let oracle = PriceOracle::new(prices)?;

    eprintln!(
        "Running simulation: {} posts, threshold > {}, hold {} min",
        posts.len(),
        sim_config.classifier.threshold,
        sim_config.trading.hold_duration_minutes,
    );
    let run = simulator.run(&posts, &oracle)?;

    Ok(SimulationOutput {
        summary: summarize(&run.trades),
        stats: RunStats::compute(&run.events),
        prices: oracle.points().to_vec(),
        run,
        config: sim_config,
    })
}

fn write_report(
    writer: &dyn ReportPort,
    ctx: &ReportContext,
    path: &Path,
) -> Result<(), PosttraderError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    writer.write(ctx, path)?;
    eprintln!("  wrote {}", path.display());
    Ok(())
}

pub fn write_reports(output: &SimulationOutput, paths: &ReportPaths) -> Result<(), PosttraderError> {
    let ctx = output.report_context();
    write_report(&TradesCsvReport, &ctx, &paths.trades_csv)?;
    write_report(&EvaluationsCsvReport, &ctx, &paths.evaluations_csv)?;
    write_report(&HtmlReportAdapter::new(), &ctx, &paths.html)?;
    write_report(&PineScriptReport, &ctx, &paths.pine)?;
    Ok(())
}

fn print_summary(output: &SimulationOutput) {
    let stats = &output.stats;
    let summary = &output.summary;

    eprintln!("\n=== Post Evaluation ===");
    eprintln!("Posts Evaluated:  {}", stats.total_posts);
    eprintln!(
        "Qualified:        {} ({:.1}%)",
        stats.qualified_posts, stats.qualification_rate
    );
    eprintln!("Average Score:    {:.2}", stats.average_score);
    if stats.abandoned_posts > 0 {
        eprintln!("Abandoned:        {}", stats.abandoned_posts);
    }

    eprintln!("\n=== Trading Results ===");
    eprintln!("Total Trades:     {}", summary.total_trades);
    eprintln!("Total PnL:        {:+.2} USDT", summary.total_pnl);
    eprintln!("Average Return:   {:+.3}%", summary.avg_return_pct);
    eprintln!("Win Rate:         {:.1}%", summary.win_rate * 100.0);
    if summary.total_trades > 0 {
        eprintln!("Best Trade:       {:+.2} USDT", summary.best_trade_pnl);
        eprintln!("Worst Trade:      {:+.2} USDT", summary.worst_trade_pnl);
    }

    if !output.run.trades.is_empty() {
        eprintln!("\n=== Trades ===");
        for t in &output.run.trades {
            eprintln!(
                "  {}  post {} (score {}):  {:.6} -> {:.6}  {:+.2} USDT",
                t.open_time.format("%Y-%m-%d %H:%M"),
                t.post_id,
                t.score,
                t.entry_price,
                t.exit_price,
                t.pnl_usdt,
            );
        }
    }
}

fn run_simulate(
    config_path: Option<&Path>,
    posts: Option<&Path>,
    prices: Option<&Path>,
    output_dir: Option<&Path>,
    sample: bool,
) -> ExitCode {
    let adapter = match load_optional_config(config_path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let output = match run_simulation_pipeline(&adapter, posts, prices, sample) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if output.run.events.is_empty() {
        eprintln!("error: no posts to simulate");
        return ExitCode::from(5);
    }

    print_summary(&output);

    let paths = ReportPaths::from_config(&adapter, output_dir.unwrap_or(Path::new(".")));
    eprintln!("\nWriting reports:");
    if let Err(e) = write_reports(&output, &paths) {
        eprintln!("error: failed to write report: {e}");
        return (&e).into();
    }

    ExitCode::SUCCESS
}

fn run_classify(
    config_path: Option<&Path>,
    text: &str,
    likes: Option<u64>,
    retweets: Option<u64>,
) -> ExitCode {
    let classifier = match load_optional_config(config_path)
        .and_then(|adapter| {
            validate_config(&adapter)?;
            build_classifier_config(&adapter)
        })
        .and_then(ImpactClassifier::new)
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let mut post = Post::new("cli", Utc::now(), text);
    if likes.is_some() || retweets.is_some() {
        post = post.with_engagement(Engagement {
            likes: likes.unwrap_or(0),
            retweets: retweets.unwrap_or(0),
            ..Engagement::default()
        });
    }
    let score = classifier.classify_post(&post);

    println!("Score:      {}/10", score.score);
    println!(
        "Qualifies:  {} (threshold > {})",
        if score.qualifies { "yes" } else { "no" },
        classifier.threshold()
    );
    println!("Reasoning:  {}", score.reasoning());
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Configuration is valid.");
    eprintln!(
        "  Position Size:  {:.2} USDT",
        config.trading.position_size_usdt
    );
    eprintln!("  Hold Duration:  {} min", config.trading.hold_duration_minutes);
    eprintln!("  Threshold:      > {}", config.classifier.threshold);
    eprintln!("  Categories:");
    for (label, keywords) in &config.classifier.high_impact {
        eprintln!("    {}: {}", label, keywords.join(", "));
    }
    ExitCode::SUCCESS
}
