use std::{fmt, path::PathBuf, time::Duration};

use crate::core::{
    errors::{AppError, AppResult},
    types::{ImageFormat, MatchPolicy},
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.figma.com";
pub const DEFAULT_ANCHOR_TEXT: &str = "Выберите цель";
pub const DEFAULT_OUTPUT_DIR: &str = "public/images/goals";
pub const DEFAULT_IMAGE_SCALE: f64 = 2.0;
pub const DEFAULT_MAX_DISTANCE: f64 = 300.0;
pub const DEFAULT_MAX_DEPTH: usize = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RUN_DEADLINE_SECS: u64 = 600;

#[derive(Clone)]
pub struct Config {
    pub api_token: String,
    pub file_key: String,
    pub api_base_url: String,
    pub anchor_text: String,
    pub output_dir: PathBuf,
    pub image_format: ImageFormat,
    pub image_scale: f64,
    pub max_distance: f64,
    pub max_depth: usize,
    pub match_policy: MatchPolicy,
    pub card_seeding: bool,
    pub request_timeout: Duration,
    pub run_deadline: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<redacted>")
            .field("file_key", &self.file_key)
            .field("api_base_url", &self.api_base_url)
            .field("anchor_text", &self.anchor_text)
            .field("output_dir", &self.output_dir)
            .field("image_format", &self.image_format)
            .field("image_scale", &self.image_scale)
            .field("max_distance", &self.max_distance)
            .field("max_depth", &self.max_depth)
            .field("match_policy", &self.match_policy)
            .field("card_seeding", &self.card_seeding)
            .field("request_timeout", &self.request_timeout)
            .field("run_deadline", &self.run_deadline)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key → value source. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &str| {
            get(key).ok_or_else(|| AppError::Config(format!("{key} is not set")))
        };

        let api_token = required("DESIGN_API_TOKEN")?;
        let file_key = required("DESIGN_FILE_KEY")?;

        let api_base_url = get("DESIGN_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let image_format = match get("DESIGN_IMAGE_FORMAT") {
            Some(raw) => parse_image_format(&raw)?,
            None => ImageFormat::default(),
        };

        let image_scale = parse_or(
            "DESIGN_IMAGE_SCALE",
            get("DESIGN_IMAGE_SCALE"),
            DEFAULT_IMAGE_SCALE,
        )?;
        if !(0.01..=4.0).contains(&image_scale) {
            return Err(AppError::Config(format!(
                "DESIGN_IMAGE_SCALE must be between 0.01 and 4, got {image_scale}"
            )));
        }

        let max_distance =
            parse_or("DESIGN_MAX_DISTANCE", get("DESIGN_MAX_DISTANCE"), DEFAULT_MAX_DISTANCE)?;
        if !max_distance.is_finite() || max_distance < 0.0 {
            return Err(AppError::Config(format!(
                "DESIGN_MAX_DISTANCE must be a non-negative number, got {max_distance}"
            )));
        }

        let match_policy = match get("DESIGN_MATCH_POLICY") {
            Some(raw) => parse_match_policy(&raw)?,
            None => MatchPolicy::default(),
        };

        let card_seeding = match get("DESIGN_CARD_SEEDING") {
            Some(raw) => parse_flag("DESIGN_CARD_SEEDING", &raw)?,
            None => false,
        };

        let request_timeout_secs = parse_or(
            "DESIGN_REQUEST_TIMEOUT_SECS",
            get("DESIGN_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let run_deadline_secs = parse_or(
            "DESIGN_RUN_DEADLINE_SECS",
            get("DESIGN_RUN_DEADLINE_SECS"),
            DEFAULT_RUN_DEADLINE_SECS,
        )?;
        if request_timeout_secs == 0 || run_deadline_secs == 0 {
            return Err(AppError::Config(
                "timeouts must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            api_token,
            file_key,
            api_base_url,
            anchor_text: get("DESIGN_ANCHOR_TEXT")
                .unwrap_or_else(|| DEFAULT_ANCHOR_TEXT.to_string()),
            output_dir: get("DESIGN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            image_format,
            image_scale,
            max_distance,
            max_depth: parse_or("DESIGN_MAX_DEPTH", get("DESIGN_MAX_DEPTH"), DEFAULT_MAX_DEPTH)?,
            match_policy,
            card_seeding,
            request_timeout: Duration::from_secs(request_timeout_secs),
            run_deadline: Duration::from_secs(run_deadline_secs),
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
{
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value: {raw}"))),
        None => Ok(default),
    }
}

fn parse_image_format(raw: &str) -> AppResult<ImageFormat> {
    match raw.to_ascii_lowercase().as_str() {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
        "svg" => Ok(ImageFormat::Svg),
        "pdf" => Ok(ImageFormat::Pdf),
        other => Err(AppError::Config(format!(
            "DESIGN_IMAGE_FORMAT must be png, jpg, svg or pdf, got {other}"
        ))),
    }
}

fn parse_match_policy(raw: &str) -> AppResult<MatchPolicy> {
    match raw.to_ascii_lowercase().as_str() {
        "first" => Ok(MatchPolicy::FirstWins),
        "last" => Ok(MatchPolicy::LastWins),
        other => Err(AppError::Config(format!(
            "DESIGN_MATCH_POLICY must be first or last, got {other}"
        ))),
    }
}

fn parse_flag(key: &str, raw: &str) -> AppResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Config(format!("{key} must be a boolean, got {other}"))),
    }
}

/// Log level for the subscriber, `info` unless `DESIGN_EXTRACT_LOG` names
/// another one.
pub fn log_level_from_env() -> &'static str {
    match std::env::var("DESIGN_EXTRACT_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}
