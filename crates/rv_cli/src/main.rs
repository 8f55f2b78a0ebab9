use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser};
use rv_collector::{init_logging, CollectorConfig, Logger, ReviewCollector};
use rv_core::{Error, Result, ReviewTable, TextPreprocessor};
use rv_inference::{
    analyze_reviews, create_analyzer, save_analyzed_csv, AnalyzerKind, BasicPreprocessor, Config,
    SentimentSummary,
};
use tracing::{info, Level};

const API_KEY_ENV: &str = "HF_API_TOKEN";
const NO_REVIEWS: &str = "No reviews found for this product ID";

#[derive(Parser, Debug)]
#[command(author, version, about = "Collect and classify product reviews", long_about = None)]
pub struct Cli {
    /// Log every attempt and retry
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Collect reviews and write them as CSV
    Collect {
        #[command(flatten)]
        source: SourceArgs,
        /// Write CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Collect reviews, classify them and print a summary
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        model: ModelArgs,
        /// Write the classified reviews as CSV
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Classify a single piece of text
    Review {
        text: String,
        #[command(flatten)]
        model: ModelArgs,
        /// Print the text after preprocessing
        #[arg(long)]
        show_preprocessing: bool,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// 10 character product id (e.g. B08N5WRWNW)
    #[arg(value_parser = validate_product_id)]
    product_id: String,
    /// Number of review pages to fetch
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=10))]
    pages: u32,
    /// Attempts per page (defaults to the config value)
    #[arg(long)]
    retries: Option<u32>,
    /// JSON collector config
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Model to use for inference. Available models: vader (default), bert
    #[arg(long, default_value = "vader")]
    model: AnalyzerKind,
    /// Inference endpoint for the bert model
    #[arg(long)]
    model_url: Option<String>,
}

impl ModelArgs {
    fn config(&self) -> Config {
        Config {
            kind: self.model,
            model_url: self.model_url.clone(),
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            ..Default::default()
        }
    }
}

fn validate_product_id(id: &str) -> Result<String> {
    let valid = id.len() == 10 && id.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if valid {
        Ok(id.to_string())
    } else {
        Err(Error::InvalidProductId(id.to_string()))
    }
}

async fn collect(source: &SourceArgs, logger: &Logger) -> Result<ReviewTable> {
    let config = match &source.config {
        Some(path) => CollectorConfig::from_file(path)?,
        None => CollectorConfig::default(),
    };
    let retries = source.retries.unwrap_or(config.max_retries);
    let collector = ReviewCollector::new(config)?.with_log_sink(Arc::new(
        logger.clone().with_new_prefixes(format!("[{}]", source.product_id)),
    ));
    collector.collect(&source.product_id, source.pages, retries).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let logger = init_logging(level);

    match cli.command {
        Commands::Collect { source, output } => {
            let table = collect(&source, &logger).await?;
            if table.is_empty() {
                println!("{}", NO_REVIEWS);
                return Ok(());
            }
            match output {
                Some(path) => {
                    table.save_csv(&path)?;
                    info!("💾 Saved {} reviews to {}", table.len(), path.display());
                }
                None => table.write_csv(std::io::stdout().lock())?,
            }
        }
        Commands::Analyze { source, model, output } => {
            let analyzer = create_analyzer(Some(model.config())).await?;
            info!("🧠 Inference model initialized (using {})", analyzer.name());

            let table = collect(&source, &logger).await?;
            if table.is_empty() {
                println!("{}", NO_REVIEWS);
                return Ok(());
            }

            let reviews = analyze_reviews(&table, &BasicPreprocessor::new(), analyzer.as_ref()).await?;
            println!("{}", SentimentSummary::from_reviews(&reviews));
            if let Some(path) = output {
                save_analyzed_csv(&reviews, &path)?;
                info!("💾 Saved {} classified reviews to {}", reviews.len(), path.display());
            }
        }
        Commands::Review { text, model, show_preprocessing } => {
            let analyzer = create_analyzer(Some(model.config())).await?;
            let processed = BasicPreprocessor::new().preprocess(&text);
            if show_preprocessing {
                println!("Original:     {}", text);
                println!("Preprocessed: {}", processed);
            }

            let result = analyzer.analyze_text(&processed).await?;
            println!("Sentiment ({}): {}", analyzer.name(), result.sentiment);
            for (name, score) in &result.scores {
                println!("  {:<9} {:.4}", name, score);
            }
        }
    }

    Ok(())
}
