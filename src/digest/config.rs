use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::digest::fallback::FallbackConfig;
use crate::digest::key_points::DEFAULT_MAX_KEY_POINTS;
use crate::digest::paths;
use crate::digest::segmenter::DEFAULT_MAX_SEGMENT_CHARS;

include!(concat!(env!("OUT_DIR"), "/docsum_env_allowlist.rs"));

pub const TOKEN_ENV_VARS: [&str; 2] = ["HF_API_TOKEN", "DOCSUM_API_TOKEN"];
pub const DEFAULT_API_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    pub max_length: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_SEGMENT_CHARS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub max_segments: usize,
    pub min_input_chars: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_segments: 4,
            min_input_chars: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityConfig {
    pub api_url: String,
    pub model_label: String,
    pub min_length: u32,
    pub max_length: u32,
    pub do_sample: bool,
    pub wait_for_model: bool,
    pub timeout_secs: u64,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model_label: "facebook/bart-large-cnn".to_string(),
            min_length: 80,
            max_length: 200,
            do_sample: false,
            wait_for_model: true,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPointsConfig {
    pub max_points: usize,
}

impl Default for KeyPointsConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_KEY_POINTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocsumConfig {
    pub segmenter: SegmenterConfig,
    pub orchestrator: OrchestratorConfig,
    pub capability: CapabilityConfig,
    pub fallback: FallbackConfig,
    pub key_points: KeyPointsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialDocsumConfig {
    segmenter: Option<SegmenterConfig>,
    orchestrator: Option<OrchestratorConfig>,
    capability: Option<CapabilityConfig>,
    fallback: Option<FallbackConfig>,
    key_points: Option<KeyPointsConfig>,
}

type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(var: &str) -> Option<String> {
    env::var(var).ok()
}

fn env_or_usize(env: EnvLookup, var: &str, fallback: usize) -> usize {
    match env(var) {
        Some(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        None => fallback,
    }
}

fn env_or_u32(env: EnvLookup, var: &str, fallback: u32) -> u32 {
    match env(var) {
        Some(v) => v.trim().parse::<u32>().ok().unwrap_or(fallback),
        None => fallback,
    }
}

fn env_or_u64(env: EnvLookup, var: &str, fallback: u64) -> u64 {
    match env(var) {
        Some(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        None => fallback,
    }
}

fn env_or_string(env: EnvLookup, var: &str, fallback: &str) -> String {
    match env(var) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

pub fn validate(cfg: &DocsumConfig) -> Result<()> {
    if cfg.segmenter.max_length == 0 {
        return Err(anyhow!("invalid segment max length: must be >= 1"));
    }
    if cfg.orchestrator.max_segments == 0 {
        return Err(anyhow!("invalid max segments: must be >= 1"));
    }
    if cfg.capability.min_length > cfg.capability.max_length {
        return Err(anyhow!(
            "invalid summary length bounds: require min_length <= max_length"
        ));
    }
    if cfg.capability.max_length == 0 {
        return Err(anyhow!("invalid summary max length: must be >= 1"));
    }
    if cfg.capability.timeout_secs == 0 {
        return Err(anyhow!("invalid capability timeout: must be >= 1 second"));
    }
    if cfg.capability.api_url.trim().is_empty() {
        return Err(anyhow!("invalid capability url: cannot be empty"));
    }
    if cfg.key_points.max_points == 0 {
        return Err(anyhow!("invalid key point count: must be >= 1"));
    }
    if cfg.fallback.sentence_budget() == 0 {
        return Err(anyhow!("invalid fallback blocks: at least one sentence required"));
    }
    Ok(())
}

fn resolve_config_path(env: EnvLookup) -> Option<PathBuf> {
    if let Some(custom) = env("DOCSUM_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    Some(paths::docsum_home(env("DOCSUM_HOME"))?.join("docsum.toml"))
}

fn merge_config_str(base: &mut DocsumConfig, raw: &str) -> Result<()> {
    let parsed: PartialDocsumConfig = toml::from_str(raw)?;
    if let Some(segmenter) = parsed.segmenter {
        base.segmenter = segmenter;
    }
    if let Some(orchestrator) = parsed.orchestrator {
        base.orchestrator = orchestrator;
    }
    if let Some(capability) = parsed.capability {
        base.capability = capability;
    }
    if let Some(fallback) = parsed.fallback {
        base.fallback = fallback;
    }
    if let Some(key_points) = parsed.key_points {
        base.key_points = key_points;
    }
    Ok(())
}

fn merge_file_config(base: &mut DocsumConfig, env: EnvLookup) -> Result<Option<PathBuf>> {
    let Some(path) = resolve_config_path(env) else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(&path)?;
    merge_config_str(base, &raw)
        .map_err(|err| anyhow!("failed to parse docsum config {}: {err}", path.display()))?;
    Ok(Some(path))
}

fn apply_env_overrides(cfg: &mut DocsumConfig, env: EnvLookup) {
    cfg.segmenter.max_length = env_or_usize(env, "DOCSUM_MAX_LENGTH", cfg.segmenter.max_length);
    cfg.orchestrator.max_segments =
        env_or_usize(env, "DOCSUM_MAX_SEGMENTS", cfg.orchestrator.max_segments);
    cfg.orchestrator.min_input_chars =
        env_or_usize(env, "DOCSUM_MIN_INPUT_CHARS", cfg.orchestrator.min_input_chars);
    cfg.capability.api_url = env_or_string(env, "DOCSUM_API_URL", &cfg.capability.api_url);
    cfg.capability.model_label =
        env_or_string(env, "DOCSUM_MODEL_LABEL", &cfg.capability.model_label);
    cfg.capability.min_length =
        env_or_u32(env, "DOCSUM_SUMMARY_MIN_LENGTH", cfg.capability.min_length);
    cfg.capability.max_length =
        env_or_u32(env, "DOCSUM_SUMMARY_MAX_LENGTH", cfg.capability.max_length);
    cfg.capability.timeout_secs =
        env_or_u64(env, "DOCSUM_TIMEOUT_SECS", cfg.capability.timeout_secs);
    cfg.key_points.max_points = env_or_usize(env, "DOCSUM_KEY_POINTS", cfg.key_points.max_points);
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: DocsumConfig,
    pub file_path: Option<PathBuf>,
}

pub fn load_config_with(env: EnvLookup) -> Result<LoadedConfig> {
    let mut cfg = DocsumConfig::default();
    let file_path = merge_file_config(&mut cfg, env)?;
    apply_env_overrides(&mut cfg, env);
    validate(&cfg)?;
    Ok(LoadedConfig {
        config: cfg,
        file_path,
    })
}

pub fn load_config() -> Result<LoadedConfig> {
    load_config_with(&process_env)
}

pub fn resolve_api_token_with(env: EnvLookup) -> Option<String> {
    TOKEN_ENV_VARS.iter().find_map(|var| match env(var) {
        Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    })
}

pub fn resolve_api_token() -> Option<String> {
    resolve_api_token_with(&process_env)
}

/// `DOCSUM_*` variables in the process environment that nothing reads.
pub fn unknown_env_keys<I>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut unknown: Vec<String> = keys
        .into_iter()
        .filter(|k| k.starts_with("DOCSUM_"))
        .filter(|k| !GENERATED_DOCSUM_ENV_ALLOWLIST.contains(&k.as_str()))
        .collect();
    unknown.sort();
    unknown
}
