use anyhow::Result;
use std::env;

use crate::commands::{CommandReport, ConfigOverrides, resolve_config};
use crate::digest::config::{TOKEN_ENV_VARS, resolve_api_token, unknown_env_keys};
use crate::digest::paths::resolve_paths;
use crate::error::ErrorCode;

pub fn run() -> Result<CommandReport> {
    let mut report = CommandReport::new("config");
    let Some(loaded) = resolve_config(&mut report, &ConfigOverrides::default()) else {
        return Ok(report);
    };

    let paths = resolve_paths()?;
    report.detail(format!("docsum_home={}", paths.home.display()));
    report.detail(format!("config_path={}", paths.config_file.display()));
    report.detail(format!("config_file_loaded={}", loaded.file_path.is_some()));
    report.detail(format!("lock_file={}", paths.lock_file.display()));
    report.detail(format!("dotenv_file={}", paths.dotenv_file.display()));

    let token_present = resolve_api_token().is_some();
    report.detail(format!("api_token_present={token_present}"));
    if !token_present {
        report.warning(
            ErrorCode::E005ConfigMissing.as_str(),
            format!(
                "no credential in {}; summaries will use the extractive fallback",
                TOKEN_ENV_VARS.join(" or ")
            ),
        );
    }

    for key in unknown_env_keys(env::vars_os().filter_map(|(k, _)| k.into_string().ok())) {
        report.warning(
            ErrorCode::E003ConfigInvalid.as_str(),
            format!("unknown environment variable {key} is ignored"),
        );
    }

    let rendered = toml::to_string_pretty(&loaded.config)?;
    for line in rendered.lines() {
        report.line(line);
    }
    report.attach(&loaded.config)?;
    Ok(report)
}
