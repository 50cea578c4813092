use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// How new record identifiers are minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    Uuid,
    Sequential,
}

impl IdStrategy {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "uuid" => Ok(Self::Uuid),
            "sequential" | "seq" => Ok(Self::Sequential),
            other => Err(ConfigError::InvalidIdStrategy(other.to_string())),
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub planning: PlanningConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let document_path = env::var("PLAN_DOCUMENT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("plan.json"));

        let default_indexation_percent = match env::var("PLAN_DEFAULT_INDEXATION") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|rate| rate.is_finite() && *rate >= 0.0)
                .ok_or(ConfigError::InvalidIndexation)?,
            Err(_) => 0.0,
        };

        let id_strategy =
            IdStrategy::from_str(&env::var("PLAN_ID_STRATEGY").unwrap_or_default())?;

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            planning: PlanningConfig {
                document_path,
                default_indexation_percent,
                id_strategy,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the plan document lives and the defaults applied to new schedules.
#[derive(Debug, Clone)]
pub struct PlanningConfig {
    pub document_path: PathBuf,
    pub default_indexation_percent: f64,
    pub id_strategy: IdStrategy,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidIndexation,
    InvalidIdStrategy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidIndexation => write!(
                f,
                "PLAN_DEFAULT_INDEXATION must be a non-negative percentage"
            ),
            ConfigError::InvalidIdStrategy(value) => write!(
                f,
                "PLAN_ID_STRATEGY must be 'uuid' or 'sequential', got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
