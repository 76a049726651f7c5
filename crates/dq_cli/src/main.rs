use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use dq_cli::config::{self, Config, EXIT_MISSING_CREDENTIALS};
use dq_cli::{DailyRun, RunOutcome};
use dq_core::{init_logging, Logger};
use dq_delivery::TelegramClient;
use dq_scrapers::{PageFetcher, QuoteScraper, GREATDAY_URL};
use dq_storage::JsonFileStore;
use rand::rngs::StdRng;
use rand::SeedableRng;

async fn run(config: Config, logger: Logger) -> anyhow::Result<RunOutcome> {
    let fetcher = PageFetcher::new(GREATDAY_URL)?.with_logger(logger.clone());
    let telegram = TelegramClient::new(&config.bot_token, &config.chat_id)?.with_logger(logger.clone());
    let store = JsonFileStore::new(&config.state_file).with_logger(logger.clone());
    let scraper = QuoteScraper::new(Arc::new(fetcher)).with_logger(logger.clone());

    let daily = DailyRun::new(scraper, Arc::new(store), Arc::new(telegram), logger);
    let mut rng = StdRng::from_entropy();
    Ok(daily.run(Local::now().date_naive(), &mut rng).await)
}

#[tokio::main]
async fn main() -> ExitCode {
    config::load_dotenv();
    let logger = init_logging(config::log_level_from_env());
    logger.info("🚀 Starting daily quote bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            logger.error(&format!("❌ {}", e));
            logger.error(&format!(
                "Please set {} and {} before running",
                config::BOT_TOKEN_VAR,
                config::CHAT_ID_VAR
            ));
            return ExitCode::from(EXIT_MISSING_CREDENTIALS);
        }
    };
    logger.info(&format!("Chat ID: {}", config.chat_id));
    logger.info(&format!("State file: {}", config.state_file.display()));

    match run(config, logger.clone()).await {
        Ok(outcome) => logger.info(&format!("Final result: {}", outcome)),
        Err(e) => logger.error(&format!("❌ Run aborted: {}", e)),
    }
    ExitCode::SUCCESS
}
