//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.
//!
//! Runtime secrets (the vision model key, the admin secret) do NOT live here;
//! they are stored in the `config` database table so admins can rotate them
//! without a restart. See `services::config_store`.

use serde::Deserialize;

/// Configuration for the `api` binary, loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 6671
/// - `SCRAPER_URL` (optional): search endpoint of the scraper service
/// - `LLM_BASE_URL` (optional): OpenAI-compatible base URL of the vision model provider
/// - `LLM_MODEL` (optional): model name used for image extraction
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_scraper_url")]
    pub scraper_url: String,

    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,

    #[serde(default = "default_llm_model")]
    pub llm_model: String,
}

/// Configuration for the `scraper` binary.
///
/// The scraper has no database and no outbound credentials, so the only
/// knob is its listen port (`SCRAPER_PORT`, defaults to 6674).
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_scraper_port")]
    pub scraper_port: u16,
}

fn default_port() -> u16 {
    6671
}

fn default_scraper_port() -> u16 {
    6674
}

fn default_scraper_url() -> String {
    "http://localhost:6674/search".to_string()
}

fn default_llm_base_url() -> String {
    "https://apis.iflow.cn/v1".to_string()
}

fn default_llm_model() -> String {
    "qwen3-vl-plus".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}

impl ScraperConfig {
    /// Load scraper configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<ScraperConfig>()
    }
}
