//! CLI command definitions and handlers

use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;

use crate::core::api::TranslationApi;
use crate::core::client::TranslationService;
use crate::core::config::ServiceConfig;
use crate::core::http::HttpApi;
use crate::core::storage::SpaceApi;

/// Commands for the space translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a stored translation, whatever its quality
    Free {
        /// Text to translate
        text: String,
    },

    /// Fetch stored translations for several texts, all or nothing
    Batch {
        /// Texts to translate
        texts: Vec<String>,
    },

    /// Ask the translators to translate a text
    Request {
        /// Text to translate
        text: String,

        /// Maximum number of submissions
        #[arg(long)]
        attempts: Option<u32>,
    },

    /// Fetch a translation of guaranteed quality, requesting it if needed
    Premium {
        /// Text to translate
        text: String,

        /// Minimum acceptable quality
        #[arg(short, long, default_value_t = 0)]
        min_quality: u32,
    },

    /// Serve the simulated API over HTTP
    Server {
        /// Bind address (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

/// Where translations come from
#[derive(Debug, Clone, Default)]
pub struct Backend {
    /// Catalog file seeding the simulated API
    pub catalog: Option<PathBuf>,
    /// Remote API endpoint, takes precedence over the catalog
    pub endpoint: Option<String>,
}

impl Backend {
    fn simulated(&self) -> anyhow::Result<SpaceApi> {
        match &self.catalog {
            Some(path) => {
                info!("Using simulated API from {}", path.display());
                Ok(SpaceApi::from_file(path)?)
            }
            None => {
                info!("No catalog given, every text is untranslatable");
                Ok(SpaceApi::new())
            }
        }
    }
}

/// Run a command against the configured backend
pub async fn execute(
    command: Commands,
    backend: Backend,
    mut config: ServiceConfig,
) -> anyhow::Result<()> {
    if let Some(endpoint) = backend.endpoint.clone() {
        config.api_endpoint = Some(endpoint);
    }

    let command = match command {
        Commands::Server { host, port } => {
            return handle_server(host, port, backend.simulated()?).await;
        }
        other => other,
    };

    match config.api_endpoint.clone() {
        Some(endpoint) => {
            info!("Using remote API at {}", endpoint);
            let api = HttpApi::from_config(&config)?;
            run(command, TranslationService::new(api, config)?).await
        }
        None => {
            let api = backend.simulated()?;
            run(command, TranslationService::new(api, config)?).await
        }
    }
}

async fn run<A: TranslationApi>(
    command: Commands,
    service: TranslationService<A>,
) -> anyhow::Result<()> {
    match command {
        Commands::Free { text } => handle_free(&service, &text).await,
        Commands::Batch { texts } => handle_batch(&service, &texts).await,
        Commands::Request { text, attempts } => handle_request(&service, &text, attempts).await,
        Commands::Premium { text, min_quality } => {
            handle_premium(&service, &text, min_quality).await
        }
        Commands::Server { .. } => anyhow::bail!("server is not a client command"),
    }
}

/// Handle free translation command
pub async fn handle_free<A: TranslationApi>(
    service: &TranslationService<A>,
    text: &str,
) -> anyhow::Result<()> {
    let translation = service.free(text).await?;
    println!("{}", translation);
    Ok(())
}

/// Handle batch translation command
pub async fn handle_batch<A: TranslationApi>(
    service: &TranslationService<A>,
    texts: &[String],
) -> anyhow::Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Translating {} texts", texts.len()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let translations = match service.batch(texts).await {
        Ok(translations) => translations,
        Err(e) => {
            pb.abandon_with_message("Batch failed");
            return Err(e.into());
        }
    };
    pb.finish_and_clear();

    for (text, translation) in texts.iter().zip(&translations) {
        println!("{}\t{}", text, translation);
    }

    info!("Batch of {} translated", translations.len());
    Ok(())
}

/// Handle translation request command
pub async fn handle_request<A: TranslationApi>(
    service: &TranslationService<A>,
    text: &str,
    attempts: Option<u32>,
) -> anyhow::Result<()> {
    let attempts = attempts.unwrap_or(service.config().request_attempts);
    service.request_with_attempts(text, attempts).await?;
    println!("✅ Translation of '{}' requested", text);
    Ok(())
}

/// Handle premium translation command
pub async fn handle_premium<A: TranslationApi>(
    service: &TranslationService<A>,
    text: &str,
    min_quality: u32,
) -> anyhow::Result<()> {
    let translation = service.premium(text, min_quality).await?;
    println!("{}", translation);
    Ok(())
}

/// Handle HTTP server command
pub async fn handle_server(host: String, port: u16, api: SpaceApi) -> anyhow::Result<()> {
    crate::server::api::run_server(host, port, api).await
}
