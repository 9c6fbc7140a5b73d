//! Runtime configuration, read once from the environment at startup.
//!
//! Values are layered with figment: built-in defaults first, then the
//! environment. Azure and OpenAlex settings use their conventional variable
//! names; everything else is prefixed with `INVESTOR_INTEL_`. Every value is
//! validated here; the program never starts with an invalid configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use figment::providers::{Env, Serialized};
use figment::Figment;
use llm::AzureOpenAiConfig;
use nodes::{ExecutorSettings, RetryConfig};
use openalex::OpenAlexConfig;
use pipeline::{DeploymentName, PageSize, PipelineError, DEFAULT_TOP_N};
use serde::{Deserialize, Serialize};

const PREFIX: &str = "INVESTOR_INTEL_";

/// Variables read under their own names rather than behind [`PREFIX`].
const UNPREFIXED: [&str; 7] = [
    "AZURE_OPENAI_ENDPOINT",
    "AZURE_OPENAI_API_KEY",
    "OPENAI_API_VERSION",
    "AZURE_OPENAI_DEPLOYMENT",
    "OPENALEX_BASE_URL",
    "OPENALEX_MAILTO",
    "OTEL_EXPORTER_OTLP_ENDPOINT",
];

/// How log events are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Settings as extracted from figment, before validation. Field names are the
/// lowercased variable names (prefix stripped).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct RawConfig {
    azure_openai_endpoint: Option<String>,
    azure_openai_api_key: Option<String>,
    openai_api_version: Option<String>,
    azure_openai_deployment: Option<String>,
    openalex_base_url: Option<String>,
    openalex_mailto: Option<String>,
    otel_exporter_otlp_endpoint: Option<String>,
    page_size: u32,
    top_n: usize,
    output_dir: String,
    max_retries: u32,
    timeout_secs: u64,
    log_format: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            azure_openai_endpoint: None,
            azure_openai_api_key: None,
            openai_api_version: None,
            azure_openai_deployment: None,
            openalex_base_url: None,
            openalex_mailto: None,
            otel_exporter_otlp_endpoint: None,
            page_size: PageSize::default().as_u32(),
            top_n: DEFAULT_TOP_N,
            output_dir: ".".to_string(),
            max_retries: 0,
            timeout_secs: 60,
            log_format: "text".to_string(),
        }
    }
}

/// Validated configuration for one process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openalex: OpenAlexConfig,
    pub azure: AzureOpenAiConfig,
    pub executor: ExecutorSettings,
    pub log_format: LogFormat,
    /// Collector endpoint; span export is disabled when absent.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads and validates the configuration from the process environment.
    pub fn load() -> Result<Self, PipelineError> {
        Self::from_figment(Self::figment())
    }

    /// Defaults merged with the environment, highest priority last.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(RawConfig::default()))
            .merge(Env::raw().only(&UNPREFIXED))
            .merge(Env::prefixed(PREFIX))
    }

    /// Extracts and validates the configuration from `figment`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] naming the first variable that is
    /// missing, blank when required, unparsable, or out of range.
    pub fn from_figment(figment: Figment) -> Result<Self, PipelineError> {
        let raw: RawConfig = figment.extract().map_err(extraction_error)?;
        raw.validate()
    }
}

impl RawConfig {
    fn validate(self) -> Result<AppConfig, PipelineError> {
        if self.timeout_secs == 0 {
            return Err(invalid("TIMEOUT_SECS", "must be at least 1"));
        }
        let timeout = Duration::from_secs(self.timeout_secs);

        let deployment = DeploymentName::new(required(
            self.azure_openai_deployment,
            "AZURE_OPENAI_DEPLOYMENT",
        )?)
        .ok_or_else(|| invalid("AZURE_OPENAI_DEPLOYMENT", "must not be blank"))?;
        let mut azure = AzureOpenAiConfig::new(
            required(self.azure_openai_endpoint, "AZURE_OPENAI_ENDPOINT")?,
            required(self.azure_openai_api_key, "AZURE_OPENAI_API_KEY")?,
            required(self.openai_api_version, "OPENAI_API_VERSION")?,
            deployment,
        );
        azure.timeout = timeout;

        let openalex = OpenAlexConfig {
            base_url: non_blank(self.openalex_base_url)
                .unwrap_or_else(|| openalex::DEFAULT_BASE_URL.to_string()),
            mailto: non_blank(self.openalex_mailto),
            timeout,
        };

        let page_size = PageSize::new(self.page_size).ok_or_else(|| {
            invalid(
                "PAGE_SIZE",
                &format!("must be between 1 and {}", PageSize::MAX),
            )
        })?;
        if self.top_n == 0 {
            return Err(invalid("TOP_N", "must be at least 1"));
        }

        let output_dir = non_blank(Some(self.output_dir)).unwrap_or_else(|| ".".to_string());
        let executor = ExecutorSettings {
            page_size,
            top_n: self.top_n,
            output_dir: PathBuf::from(output_dir),
            retry: RetryConfig::default().with_max_retries(self.max_retries),
        };

        let log_format = self
            .log_format
            .parse()
            .map_err(|()| invalid("LOG_FORMAT", "expected 'text' or 'json'"))?;

        Ok(AppConfig {
            openalex,
            azure,
            executor,
            log_format,
            otlp_endpoint: non_blank(self.otel_exporter_otlp_endpoint),
        })
    }
}

/// Trimmed value, with blank treated as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, variable: &str) -> Result<String, PipelineError> {
    non_blank(value).ok_or_else(|| {
        PipelineError::configuration(format!("{variable} is required but was not set"))
    })
}

/// Environment variable that feeds `field`.
fn variable_name(field: &str) -> String {
    let upper = field.to_ascii_uppercase();
    if UNPREFIXED.contains(&upper.as_str()) {
        upper
    } else {
        format!("{PREFIX}{upper}")
    }
}

/// `field` is a prefixed setting name without its prefix.
fn invalid(field: &str, reason: &str) -> PipelineError {
    PipelineError::configuration(format!("{} {reason}", variable_name(field)))
}

fn extraction_error(error: figment::Error) -> PipelineError {
    match error.path.last() {
        Some(field) => PipelineError::configuration(format!(
            "{} is invalid: {}",
            variable_name(field),
            error.kind
        )),
        None => PipelineError::configuration(error.to_string()),
    }
}
