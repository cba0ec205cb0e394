//! CLI orchestration tests: argument parsing, config assembly from INI files
//! on disk, and candle loading through the configured data path.

mod common;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use common::*;
use rulesim::cli::{
    self, build_backtest_config, build_optimizer_config, build_overlay_settings, load_candles,
    load_config, Cli, Command,
};
use rulesim::domain::config_validation::{validate_backtest_config, validate_overlay_config};
use rulesim::domain::error::RulesimError;

const VALID_INI: &str = "\
[backtest]
initial_capital = 2500
max_trades = 3
start_date = 2024-01-02
end_date = 2024-01-04

[optimizer]
duration_ms = 200
chunk_size = 20
report_every = 100
parallel = false
seed = 42

[overlays]
show = sma,rsi
sma_period = 3
";

mod argument_parsing {
    use super::*;

    #[test]
    fn backtest_arguments() {
        let cli = Cli::try_parse_from([
            "rulesim", "backtest", "--config", "bt.ini", "--strategy", "s.json", "--output", "out",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                config,
                strategy,
                data,
                output,
            } => {
                assert_eq!(config, Some(PathBuf::from("bt.ini")));
                assert_eq!(strategy, PathBuf::from("s.json"));
                assert_eq!(data, None);
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn optimize_arguments() {
        let cli = Cli::try_parse_from([
            "rulesim", "optimize", "-s", "s.json", "-d", "data.csv", "--duration-ms", "900",
            "--seed", "5",
        ])
        .unwrap();
        match cli.command {
            Command::Optimize {
                duration_ms, seed, data, ..
            } => {
                assert_eq!(duration_ms, Some(900));
                assert_eq!(seed, Some(5));
                assert_eq!(data, Some(PathBuf::from("data.csv")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn strategy_is_required() {
        assert!(Cli::try_parse_from(["rulesim", "validate"]).is_err());
        assert!(Cli::try_parse_from(["rulesim", "backtest"]).is_err());
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn ini_file_builds_every_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "rulesim.ini", VALID_INI);
        let adapter = load_config(Some(path.as_path())).unwrap();

        validate_backtest_config(&adapter).unwrap();
        validate_overlay_config(&adapter).unwrap();

        let bt = build_backtest_config(&adapter);
        assert_eq!(bt.initial_capital, 2500.0);
        assert_eq!(bt.max_trades, Some(3));

        let opt = build_optimizer_config(&adapter, None);
        assert_eq!(opt.initial_capital, 2500.0);
        assert_eq!(opt.duration, Duration::from_millis(200));
        assert_eq!(opt.chunk_size, 20);
        assert_eq!(opt.report_every, 100);
        assert!(!opt.parallel);

        let overlays = build_overlay_settings(&adapter);
        assert_eq!(overlays.sma, Some(3));
        assert_eq!(overlays.rsi, Some(14));
        assert_eq!(overlays.ema, None);
        assert_eq!(overlays.bollinger, None);
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("absent.ini").as_path())).err().unwrap();
        assert!(matches!(err, RulesimError::ConfigParse { .. }));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn no_config_uses_defaults() {
        let adapter = load_config(None).unwrap();
        assert_eq!(build_backtest_config(&adapter).initial_capital, 10_000.0);
    }

    #[test]
    fn invalid_capital_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.ini", "[backtest]\ninitial_capital = -5\n");
        let adapter = load_config(Some(path.as_path())).unwrap();
        let err = validate_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, RulesimError::ConfigInvalid { ref key, .. } if key == "initial_capital"));
    }
}

mod candle_loading {
    use super::*;

    #[test]
    fn data_path_and_range_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_file(dir.path(), "data.csv", &candles_csv(&sample_candles()));
        let ini = format!(
            "[backtest]\ndata_path = {}\nstart_date = 2024-01-02\nend_date = 2024-01-04\n",
            data.display()
        );
        let ini_path = write_file(dir.path(), "rulesim.ini", &ini);
        let adapter = load_config(Some(ini_path.as_path())).unwrap();

        let candles = load_candles(&adapter, None).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].date, date(2024, 1, 2));
        assert_eq!(candles[2].date, date(2024, 1, 4));
    }

    #[test]
    fn data_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_file(dir.path(), "data.csv", &candles_csv(&sample_candles()));
        let candles = load_candles(&load_config(None).unwrap(), Some(data.as_path())).unwrap();
        assert_eq!(candles.len(), 5);
    }

    #[test]
    fn unreadable_data_is_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_candles(&load_config(None).unwrap(), Some(dir.path().join("none.csv").as_path()))
            .unwrap_err();
        assert_eq!(err.exit_status(), 5);
    }
}

mod commands {
    use super::*;

    #[test]
    fn backtest_command_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_file(dir.path(), "data.csv", &candles_csv(&sample_candles()));
        let strategy = write_file(dir.path(), "s.json", THRESHOLD_JSON);
        let out = dir.path().join("out");

        cli::dispatch(Command::Backtest {
            config: None,
            strategy,
            data: Some(data),
            output: Some(out.clone()),
        })
        .unwrap();
        assert!(out.join("trades.csv").exists());
        assert!(out.join("equity.csv").exists());
    }

    #[test]
    fn validate_rejects_empty_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = write_file(dir.path(), "empty.json", r#"{"name": "Empty", "rules": []}"#);

        let err = cli::dispatch(Command::Validate { strategy }).unwrap_err();
        assert!(matches!(err, RulesimError::EmptyStrategy { ref strategy } if strategy == "Empty"));
        assert_eq!(err.exit_status(), 4);
    }

    #[test]
    fn optimize_saves_best_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_file(dir.path(), "data.csv", &candles_csv(&wave_candles(80)));
        let strategy = write_file(dir.path(), "s.json", THRESHOLD_JSON);
        let out = dir.path().join("best.json");

        cli::dispatch(Command::Optimize {
            config: None,
            strategy,
            data: Some(data),
            duration_ms: Some(100),
            seed: Some(9),
            output: Some(out.clone()),
        })
        .unwrap();
        let saved = std::fs::read_to_string(out).unwrap();
        assert!(saved.contains("\"rules\""));
    }
}
