//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

pub const DEFAULT_ANALYTICS_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("analytics timeout must be greater than zero")]
    ZeroTimeout,
    #[error("an access token was given without an analytics URL")]
    TokenWithoutEndpoint,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON file to load the quiz from
    #[arg(short, long, env = "STUDY_QUIZ_QUESTIONS")]
    pub questions: PathBuf,

    /// Interaction-recording endpoint; analytics is off when unset
    #[arg(long, env = "STUDY_QUIZ_ANALYTICS_URL")]
    pub analytics_url: Option<String>,

    /// Value for the `apikey` header
    #[arg(long, env = "STUDY_QUIZ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Bearer token of the signed-in user
    #[arg(long, env = "STUDY_QUIZ_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// User id attached to interaction records
    #[arg(long, env = "STUDY_QUIZ_USER_ID")]
    pub user_id: Option<String>,

    /// Quiz id attached to interaction records (overrides the file's)
    #[arg(long, env = "STUDY_QUIZ_QUIZ_ID")]
    pub quiz_id: Option<String>,

    /// Seconds before an interaction request is abandoned
    #[arg(long, default_value_t = DEFAULT_ANALYTICS_TIMEOUT_SECS)]
    pub analytics_timeout_secs: u64,

    /// Seed for a reproducible question order
    #[arg(long)]
    pub seed: Option<u64>,

    /// File to write logs to; logs are discarded when unset
    #[arg(long, env = "STUDY_QUIZ_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print the result summary as JSON on exit
    #[arg(long)]
    pub print_result: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub questions_path: PathBuf,
    pub quiz_id: Option<String>,
    pub seed: Option<u64>,
    pub analytics: Option<AnalyticsConfig>,
    pub log: LogConfig,
    pub print_result: bool,
}

impl Config {
    /// # Errors
    ///
    /// Returns `ConfigError` when the flags contradict each other.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if cli.analytics_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let analytics = match cli.analytics_url {
            Some(endpoint) => Some(AnalyticsConfig {
                endpoint,
                api_key: cli.api_key,
                access_token: cli.access_token,
                user_id: cli.user_id,
                timeout: Duration::from_secs(cli.analytics_timeout_secs),
            }),
            None if cli.access_token.is_some() => {
                return Err(ConfigError::TokenWithoutEndpoint);
            }
            None => None,
        };

        Ok(Self {
            questions_path: cli.questions,
            quiz_id: cli.quiz_id,
            seed: cli.seed,
            analytics,
            log: LogConfig {
                file: cli.log_file,
                level: cli.log_level,
            },
            print_result: cli.print_result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("study-quiz").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn minimal_flags_disable_analytics() {
        let config = Config::from_cli(parse(&["--questions", "quiz.json"])).unwrap();

        assert_eq!(config.questions_path, PathBuf::from("quiz.json"));
        assert_eq!(config.analytics, None);
        assert_eq!(config.log.level, "info");
        assert!(!config.print_result);
    }

    #[test]
    fn analytics_flags_are_collected() {
        let config = Config::from_cli(parse(&[
            "-q",
            "quiz.json",
            "--analytics-url",
            "http://localhost/rest/v1/quiz_interactions",
            "--access-token",
            "jwt",
            "--user-id",
            "u1",
            "--analytics-timeout-secs",
            "5",
            "--seed",
            "42",
        ]))
        .unwrap();

        let analytics = config.analytics.unwrap();
        assert_eq!(analytics.access_token.as_deref(), Some("jwt"));
        assert_eq!(analytics.user_id.as_deref(), Some("u1"));
        assert_eq!(analytics.timeout, Duration::from_secs(5));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cli = parse(&["-q", "quiz.json", "--analytics-timeout-secs", "0"]);
        assert_eq!(Config::from_cli(cli), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn token_needs_endpoint() {
        let cli = parse(&["-q", "quiz.json", "--access-token", "jwt"]);
        assert_eq!(
            Config::from_cli(cli),
            Err(ConfigError::TokenWithoutEndpoint)
        );
    }
}
