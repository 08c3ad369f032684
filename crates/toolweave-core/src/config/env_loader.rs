//! Environment variable overrides

use crate::config::manager_config::ManagerConfig;
use crate::error::{CoreError, CoreResult};
use std::env;
use std::str::FromStr;

pub const ENV_ENABLE_LIMITER: &str = "TOOLWEAVE_ENABLE_LIMITER";
pub const ENV_MAX_CONCURRENCY: &str = "TOOLWEAVE_MAX_CONCURRENCY";
pub const ENV_TOOL_TIMEOUT_SECS: &str = "TOOLWEAVE_TOOL_TIMEOUT_SECS";

/// Apply `TOOLWEAVE_` overrides from the process environment
pub fn apply_env_overrides(config: &mut ManagerConfig) -> CoreResult<()> {
    apply_env_with(config, |key| env::var(key).ok())
}

/// Apply overrides read through `lookup`
pub fn apply_env_with<F>(config: &mut ManagerConfig, lookup: F) -> CoreResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_ENABLE_LIMITER) {
        config.enable_limiter = parse_bool(ENV_ENABLE_LIMITER, &value)?;
    }

    if let Some(value) = lookup(ENV_MAX_CONCURRENCY) {
        config.max_concurrency = parse_value(ENV_MAX_CONCURRENCY, &value)?;
    }

    if let Some(value) = lookup(ENV_TOOL_TIMEOUT_SECS) {
        config.tool_timeout_secs = Some(parse_value(ENV_TOOL_TIMEOUT_SECS, &value)?);
    }

    Ok(())
}

fn parse_bool(key: &str, value: &str) -> CoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CoreError::config(format!("Invalid {} value: '{}'", key, value))),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> CoreResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::config(format!("Invalid {} value: '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = ManagerConfig::default();
        apply_env_with(
            &mut config,
            lookup(&[
                (ENV_ENABLE_LIMITER, "true"),
                (ENV_MAX_CONCURRENCY, "12"),
                (ENV_TOOL_TIMEOUT_SECS, "45"),
            ]),
        )
        .unwrap();

        assert!(config.enable_limiter);
        assert_eq!(config.max_concurrency, 12);
        assert_eq!(config.tool_timeout_secs, Some(45));
    }

    #[test]
    fn test_absent_variables_leave_config_alone() {
        let mut config = ManagerConfig::default().with_limiter(3);
        apply_env_with(&mut config, lookup(&[])).unwrap();
        assert_eq!(config, ManagerConfig::default().with_limiter(3));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let mut config = ManagerConfig::default();
        let err = apply_env_with(&mut config, lookup(&[(ENV_MAX_CONCURRENCY, "lots")]))
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains(ENV_MAX_CONCURRENCY));

        let err =
            apply_env_with(&mut config, lookup(&[(ENV_ENABLE_LIMITER, "maybe")])).unwrap_err();
        assert!(err.is_config());
    }
}
