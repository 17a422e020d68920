use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DocsumPaths {
    pub home: PathBuf,
    pub config_file: PathBuf,
    pub lock_file: PathBuf,
    pub dotenv_file: PathBuf,
}

/// `DOCSUM_HOME` when set, otherwise `~/.docsum`.
pub fn docsum_home(override_dir: Option<String>) -> Option<PathBuf> {
    match override_dir {
        Some(v) if !v.trim().is_empty() => Some(PathBuf::from(v.trim())),
        _ => dirs::home_dir().map(|home| home.join(".docsum")),
    }
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<DocsumPaths> {
    let home = docsum_home(env::var("DOCSUM_HOME").ok())
        .ok_or_else(|| anyhow::anyhow!("HOME directory could not be resolved"))?;

    let config_file = env_or_default_path("DOCSUM_CONFIG_PATH", home.join("docsum.toml"));
    let lock_file = env_or_default_path("DOCSUM_LOCK_FILE", home.join("docsum.lock"));
    let dotenv_file = home.join(".env");

    Ok(DocsumPaths {
        home,
        config_file,
        lock_file,
        dotenv_file,
    })
}
