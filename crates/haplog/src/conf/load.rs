//! Load — config loading from file and environment variables.

use std::path::Path;
use std::fs::File;
use std::io::Read;

use super::model::HaplogConfig;

impl HaplogConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("HAPLOG_CONFIG_FILE")
            .unwrap_or_else(|_| "/etc/haplog/haplog.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!("Config file not found at {}, using environment variables", config_path);
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: HaplogConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply `HAPLOG_*` overrides read through `var`.
    ///
    /// A timezone that does not parse is an error; other malformed values
    /// are ignored and the current setting is kept.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(tz) = var("HAPLOG_TIMEZONE") {
            self.timezone = tz.parse()?;
        }
        if let Some(inputs) = var("HAPLOG_INPUTS") {
            self.inputs = inputs
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(size) = var("HAPLOG_MAX_LINE_SIZE").and_then(|s| s.parse().ok()) {
            self.max_line_size = size;
        }
        if let Some(flag) = var("HAPLOG_FAIL_FAST").and_then(|s| parse_bool(&s)) {
            self.fail_fast = flag;
        }
        if let Some(flag) = var("HAPLOG_EMIT_PARTIAL").and_then(|s| parse_bool(&s)) {
            self.emit_partial = flag;
        }
        if let Some(flag) = var("HAPLOG_PRETTY").and_then(|s| parse_bool(&s)) {
            self.pretty = flag;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::LogTimezone;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("HAPLOG_TIMEZONE", "utc"),
            ("HAPLOG_INPUTS", "/var/log/a.log, /var/log/b.log,"),
            ("HAPLOG_MAX_LINE_SIZE", "8192"),
            ("HAPLOG_FAIL_FAST", "true"),
            ("HAPLOG_PRETTY", "1"),
        ]);
        let mut cfg = HaplogConfig::default();
        cfg.apply_env(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(cfg.timezone, LogTimezone::Utc);
        assert_eq!(cfg.inputs, vec!["/var/log/a.log", "/var/log/b.log"]);
        assert_eq!(cfg.max_line_size, 8192);
        assert!(cfg.fail_fast);
        assert!(cfg.pretty);
        assert!(!cfg.emit_partial);
    }

    #[test]
    fn test_env_ignores_malformed_numbers() {
        let vars = env(&[("HAPLOG_MAX_LINE_SIZE", "lots"), ("HAPLOG_EMIT_PARTIAL", "maybe")]);
        let mut cfg = HaplogConfig::default();
        cfg.apply_env(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(cfg.max_line_size, crate::parser::MAX_LINE_SIZE);
        assert!(!cfg.emit_partial);
    }

    #[test]
    fn test_env_rejects_bad_timezone() {
        let vars = env(&[("HAPLOG_TIMEZONE", "somewhere")]);
        let mut cfg = HaplogConfig::default();
        let err = cfg.apply_env(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.contains("somewhere"), "{}", err);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("haplog-test-{}.toml", std::process::id()));
        std::fs::write(&path, "timezone = \"+01:00\"\nfail_fast = true\n").unwrap();

        let cfg = HaplogConfig::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.timezone, "+01:00".parse::<LogTimezone>().unwrap());
        assert!(cfg.fail_fast);
    }

    #[test]
    fn test_from_file_missing() {
        assert!(HaplogConfig::from_file("/nonexistent/haplog.toml").is_err());
    }
}
