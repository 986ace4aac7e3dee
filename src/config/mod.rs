//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroU32, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::{
    listing::{DEFAULT_SEARCH_DEBOUNCE, ReconcileMode, SelectionScope},
    moderation::{BulkMode, BulkStrategy, ConfirmMode, DEFAULT_CONFIRM_PHRASE},
    pagination::DEFAULT_PAGE_SIZE,
};

mod cli;

pub use cli::*;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "pawboard";
const ENV_PREFIX: &str = "PAWBOARD";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api/admin/";
const DEFAULT_ACTOR: &str = "admin";

/// Fully-resolved client settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub list: ListSettings,
    pub moderation: ModerationSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub token: Option<String>,
    /// `None` leaves requests without a deadline.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ListSettings {
    pub page_size: NonZeroU32,
    pub selection_scope: SelectionScope,
    pub reconcile: ReconcileMode,
    pub search_debounce: Duration,
}

#[derive(Debug, Clone)]
pub struct ModerationSettings {
    pub actor: String,
    pub bulk_mode: BulkMode,
    pub bulk_strategy: BulkStrategy,
    pub confirm_mode: ConfirmMode,
    pub confirm_all_actions: bool,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    logging: RawLoggingSettings,
    list: RawListSettings,
    moderation: RawModerationSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    token: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawListSettings {
    page_size: Option<u64>,
    selection_scope: Option<String>,
    reconcile: Option<String>,
    search_debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawModerationSettings {
    actor: Option<String>,
    bulk_mode: Option<String>,
    bulk_strategy: Option<String>,
    confirm_phrase: Option<String>,
    confirm_all_actions: Option<bool>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(url) = overrides.api_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(token) = overrides.api_token.as_ref() {
            self.api.token = Some(token.clone());
        }
        if let Some(seconds) = overrides.api_timeout_seconds {
            self.api.timeout_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(actor) = overrides.actor.as_ref() {
            self.moderation.actor = Some(actor.clone());
        }
        if let Some(mode) = overrides.bulk_mode.as_ref() {
            self.moderation.bulk_mode = Some(mode.clone());
        }
        if let Some(strategy) = overrides.bulk_strategy.as_ref() {
            self.moderation.bulk_strategy = Some(strategy.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            logging,
            list,
            moderation,
        } = raw;

        let api = build_api_settings(api)?;
        let logging = build_logging_settings(logging)?;
        let list = build_list_settings(list)?;
        let moderation = build_moderation_settings(moderation)?;

        Ok(Self {
            api,
            logging,
            list,
            moderation,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let raw_url = api
        .base_url
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Url::parse(raw_url.trim())
        .map_err(|err| LoadError::invalid("api.base_url", format!("failed to parse: {err}")))?;
    if base_url.cannot_be_a_base() {
        return Err(LoadError::invalid(
            "api.base_url",
            "must be a hierarchical http(s) URL",
        ));
    }

    let token = api
        .token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    let timeout = match api.timeout_seconds {
        None | Some(0) => None,
        Some(seconds) => Some(Duration::from_secs(seconds)),
    };

    Ok(ApiSettings {
        base_url,
        token,
        timeout,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_list_settings(list: RawListSettings) -> Result<ListSettings, LoadError> {
    let page_size = non_zero_u32(
        list.page_size.unwrap_or(u64::from(DEFAULT_PAGE_SIZE)),
        "list.page_size",
    )?;
    let selection_scope = parse_choice(list.selection_scope, "list.selection_scope")?;
    let reconcile = parse_choice(list.reconcile, "list.reconcile")?;
    let search_debounce = list
        .search_debounce_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_SEARCH_DEBOUNCE);

    Ok(ListSettings {
        page_size,
        selection_scope,
        reconcile,
        search_debounce,
    })
}

fn build_moderation_settings(
    moderation: RawModerationSettings,
) -> Result<ModerationSettings, LoadError> {
    let actor = moderation
        .actor
        .map(|actor| actor.trim().to_string())
        .unwrap_or_else(|| DEFAULT_ACTOR.to_string());
    if actor.is_empty() {
        return Err(LoadError::invalid("moderation.actor", "must not be empty"));
    }

    let bulk_mode = parse_choice(moderation.bulk_mode, "moderation.bulk_mode")?;
    let bulk_strategy = parse_choice(moderation.bulk_strategy, "moderation.bulk_strategy")?;

    // An explicitly empty phrase downgrades destructive actions to a plain confirm.
    let confirm_mode = match moderation.confirm_phrase {
        None => ConfirmMode::TypedPhrase(DEFAULT_CONFIRM_PHRASE.to_string()),
        Some(phrase) if phrase.trim().is_empty() => ConfirmMode::Simple,
        Some(phrase) => ConfirmMode::TypedPhrase(phrase),
    };

    Ok(ModerationSettings {
        actor,
        bulk_mode,
        bulk_strategy,
        confirm_mode,
        confirm_all_actions: moderation.confirm_all_actions.unwrap_or(false),
    })
}

fn parse_choice<T>(value: Option<String>, key: &'static str) -> Result<T, LoadError>
where
    T: FromStr<Err = String> + Default,
{
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|reason| LoadError::invalid(key, reason)),
        None => Ok(T::default()),
    }
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
