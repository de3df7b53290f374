use crate::image_classifier::models::model_config::ModelConfig;
use crate::image_classifier::preprocess::{parse_filter, TensorLayout};
use chrono::{FixedOffset, Offset, Utc};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

/// Where the class index -> label key convention comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassKeySource {
    /// key = index + offset, rendered as a decimal string.
    Offset(usize),
    /// Sorted sub-directory names of a training directory.
    TrainingDir(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelConfig,
    pub label_table_path: PathBuf,
    pub class_count: usize,
    pub class_keys: ClassKeySource,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub bind_address: SocketAddr,
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub logger_timezone: FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            label_table_path: PathBuf::from("model/cat_to_name.json"),
            class_count: 102,
            class_keys: ClassKeySource::Offset(1),
            upload_dir: PathBuf::from("static/uploads"),
            static_dir: PathBuf::from("static"),
            bind_address: SocketAddr::from(([0, 0, 0, 0], 5000)),
            max_upload_bytes: 16 * 1024 * 1024,
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "bmp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            logger_timezone: Utc.fix(),
        }
    }
}

impl Config {
    /// Defaults overridden by `FLOWER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("FLOWER_MODEL_PATH") {
            config.model.onnx_model_path = path;
        }
        if let Some(size) = parse::<u32, _>(&lookup, "FLOWER_INPUT_SIZE")? {
            if size == 0 {
                return Err(invalid("FLOWER_INPUT_SIZE", "0", "must be positive"));
            }
            config.model.input_shape = (size, size);
        }
        if let Some(layout) = parse::<TensorLayout, _>(&lookup, "FLOWER_INPUT_LAYOUT")? {
            config.model.layout = layout;
        }
        if let Some(value) = lookup("FLOWER_RESIZE_FILTER") {
            config.model.filter = parse_filter(&value).ok_or_else(|| {
                invalid(
                    "FLOWER_RESIZE_FILTER",
                    &value,
                    "expected nearest, triangle, catmullrom, gaussian or lanczos3",
                )
            })?;
        }
        if let Some(apply) = parse::<bool, _>(&lookup, "FLOWER_APPLY_SOFTMAX")? {
            config.model.apply_softmax = apply;
        }
        if let Some(path) = lookup("FLOWER_LABELS_PATH") {
            config.label_table_path = PathBuf::from(path);
        }
        if let Some(count) = parse::<usize, _>(&lookup, "FLOWER_CLASS_COUNT")? {
            config.class_count = count;
        }
        if let Some(offset) = parse::<usize, _>(&lookup, "FLOWER_CLASS_KEY_OFFSET")? {
            config.class_keys = ClassKeySource::Offset(offset);
        }
        if let Some(dir) = lookup("FLOWER_TRAIN_DIR") {
            config.class_keys = ClassKeySource::TrainingDir(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("FLOWER_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FLOWER_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(address) = parse::<SocketAddr, _>(&lookup, "FLOWER_BIND_ADDRESS")? {
            config.bind_address = address;
        }
        if let Some(limit) = parse::<usize, _>(&lookup, "FLOWER_MAX_UPLOAD_BYTES")? {
            config.max_upload_bytes = limit;
        }
        if let Some(hours) = parse::<i32, _>(&lookup, "FLOWER_LOG_UTC_OFFSET_HOURS")? {
            config.logger_timezone = FixedOffset::east_opt(hours * 3600).ok_or_else(|| {
                invalid(
                    "FLOWER_LOG_UTC_OFFSET_HOURS",
                    &hours.to_string(),
                    "offset out of range",
                )
            })?;
        }

        Ok(config)
    }

    pub fn is_allowed_extension(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        match lower.rsplit_once('.') {
            Some((_, extension)) => self.allowed_extensions.iter().any(|e| e == extension),
            None => false,
        }
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(key, &raw, &e.to_string())),
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
