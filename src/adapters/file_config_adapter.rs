//! INI file configuration adapter.

use std::path::Path;

use configparser::ini::Ini;

use crate::domain::error::RulesimError;
use crate::ports::config_port::ConfigPort;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RulesimError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| RulesimError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, RulesimError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| RulesimError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// An adapter with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[backtest]
initial_capital = 25000.0
max_trades = 3
start_date = 2023-01-01
data_path = data/spy.csv

[optimizer]
duration_ms = 1500
parallel = yes
"#;

    #[test]
    fn reads_sections_and_keys() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "data_path"),
            Some("data/spy.csv".to_string())
        );
        assert_eq!(adapter.get_double("backtest", "initial_capital", 0.0), 25000.0);
        assert_eq!(adapter.get_int("backtest", "max_trades", 0), 3);
        assert_eq!(adapter.get_int("optimizer", "duration_ms", 0), 1500);
        assert!(adapter.get_bool("optimizer", "parallel", false));
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "end_date"), None);
        assert_eq!(adapter.get_string("overlays", "show"), None);
        assert!(!adapter.has_key("optimizer", "seed"));
        assert!(adapter.has_key("optimizer", "duration_ms"));
        assert_eq!(adapter.get_int("optimizer", "chunk_size", 50), 50);
        assert_eq!(adapter.get_double("optimizer", "initial_capital", 1.5), 1.5);
    }

    #[test]
    fn non_numeric_values_fall_back() {
        let adapter =
            FileConfigAdapter::from_string("[optimizer]\nchunk_size = many\nparallel = maybe\n")
                .unwrap();
        assert_eq!(adapter.get_int("optimizer", "chunk_size", 50), 50);
        assert!(adapter.get_bool("optimizer", "parallel", true));
        assert!(!adapter.get_bool("optimizer", "parallel", false));
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[optimizer]\na = TRUE\nb = no\nc = 1\nd = false\n",
        )
        .unwrap();
        assert!(adapter.get_bool("optimizer", "a", false));
        assert!(!adapter.get_bool("optimizer", "b", true));
        assert!(adapter.get_bool("optimizer", "c", false));
        assert!(!adapter.get_bool("optimizer", "d", true));
    }

    #[test]
    fn empty_adapter_uses_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("backtest", "data_path"), None);
        assert_eq!(adapter.get_double("backtest", "initial_capital", 10000.0), 10000.0);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "start_date"),
            Some("2023-01-01".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/rulesim.ini").unwrap_err();
        assert!(matches!(err, RulesimError::ConfigParse { file, .. } if file.contains("rulesim.ini")));
    }
}
