use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::legacy::LegacyConfig;
use crate::core::scorer::{ScorerThresholds, DEFAULT_BEARISH_THRESHOLD, DEFAULT_BULLISH_THRESHOLD};
use crate::strategies::ScoringStrategy;

pub type SharedConfig = Arc<RwLock<Config>>;

const DEFAULT_SYMBOLS: &str = "BBCA,BBRI,BMRI,TLKM,ASII,GOTO,ANTM,ADRO";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTime {
    pub start: (u32, u32),
    pub end: (u32, u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Data source
    pub api_key: String,
    pub base_url: String,
    pub snapshot_dir: Option<String>,
    pub request_timeout: u64,
    pub request_delay_ms: u64,

    pub symbols: Vec<String>,
    pub strategy: ScoringStrategy,

    // Six-rule scorer
    pub bullish_threshold: u32,
    pub bearish_threshold: u32,

    // Legacy detectors
    pub large_volume: f64,
    pub min_multi_day: usize,

    // Scanner
    pub alert_confidence: u32,
    pub position_size: u64,
    pub scan_interval: u64,
    pub scan_once: bool,

    // Sessions (Asia/Jakarta wall clock)
    pub sessions: HashMap<String, SessionTime>,

    // Output
    pub output_dir: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            base_url: "https://api.datasaham.io/api".to_string(),
            snapshot_dir: None,
            request_timeout: 10,
            request_delay_ms: 500,
            symbols: parse_symbols(DEFAULT_SYMBOLS),
            strategy: ScoringStrategy::SixRule,
            bullish_threshold: DEFAULT_BULLISH_THRESHOLD,
            bearish_threshold: DEFAULT_BEARISH_THRESHOLD,
            large_volume: 50_000.0,
            min_multi_day: 2,
            alert_confidence: 75,
            position_size: 100,
            scan_interval: 60,
            scan_once: true,
            sessions: default_sessions(),
            output_dir: "output".to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };
        let d = Config::default();

        Config {
            api_key: env("DATASAHAM_API_KEY", ""),
            base_url: env("DATASAHAM_BASE_URL", d.base_url.as_str())
                .trim_end_matches('/')
                .to_string(),
            snapshot_dir: std::env::var("SNAPSHOT_DIR").ok().filter(|s| !s.is_empty()),
            request_timeout: env("REQUEST_TIMEOUT", "10").parse().unwrap_or(d.request_timeout),
            request_delay_ms: env("REQUEST_DELAY_MS", "500")
                .parse()
                .unwrap_or(d.request_delay_ms),
            symbols: parse_symbols(&env("SYMBOLS", DEFAULT_SYMBOLS)),
            strategy: env("STRATEGY", "six_rule").parse().unwrap_or(d.strategy),
            bullish_threshold: env("BULLISH_THRESHOLD", "80")
                .parse()
                .unwrap_or(d.bullish_threshold),
            bearish_threshold: env("BEARISH_THRESHOLD", "20")
                .parse()
                .unwrap_or(d.bearish_threshold),
            large_volume: env("LARGE_VOLUME", "50000").parse().unwrap_or(d.large_volume),
            min_multi_day: env("MIN_MULTI_DAY", "2").parse().unwrap_or(d.min_multi_day),
            alert_confidence: env("ALERT_CONFIDENCE", "75")
                .parse()
                .unwrap_or(d.alert_confidence),
            position_size: env("POSITION_SIZE", "100").parse().unwrap_or(d.position_size),
            scan_interval: env("SCAN_INTERVAL", "60").parse().unwrap_or(d.scan_interval),
            scan_once: env("SCAN_ONCE", "true").to_lowercase() == "true",
            sessions: d.sessions,
            output_dir: env("OUTPUT_DIR", "output"),
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }

    pub fn scorer_thresholds(&self) -> ScorerThresholds {
        ScorerThresholds {
            bullish: self.bullish_threshold,
            bearish: self.bearish_threshold,
        }
    }

    pub fn legacy_config(&self) -> LegacyConfig {
        LegacyConfig {
            large_volume: self.large_volume,
            min_multi_day: self.min_multi_day,
        }
    }

    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

fn default_sessions() -> HashMap<String, SessionTime> {
    let mut sessions = HashMap::new();
    sessions.insert(
        "session_1".to_string(),
        SessionTime {
            start: (9, 0),
            end: (12, 0),
        },
    );
    sessions.insert(
        "session_2".to_string(),
        SessionTime {
            start: (13, 30),
            end: (15, 50),
        },
    );
    sessions
}

fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
