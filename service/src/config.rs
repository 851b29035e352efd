use clap::builder::TypedValueParser as _;
use clap::Args;
use log::LevelFilter;
use secrecy::SecretString;
use webhook_auth::{VerifyOptions, DEFAULT_SIGNATURE_HEADER, DEFAULT_TOLERANCE};

// Settings shared by every command, readable from the environment or a `.env` file.
#[derive(Clone, Debug, Args)]
pub struct Config {
    /// Fallback secret used whenever a command does not pass one explicitly.
    #[arg(long, env, hide_env_values = true)]
    webhook_secret: Option<String>,

    /// The request header that carries the webhook signature.
    #[arg(long, env, default_value = DEFAULT_SIGNATURE_HEADER)]
    pub signature_header: String,

    /// Maximum allowed difference, in milliseconds, between now and a signed timestamp.
    #[arg(long, env, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance_ms: u64,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Config {
    /// Load `.env` into the process environment before any parsing reads `env` values.
    pub fn load_dotenv() {
        dotenvy::dotenv().ok();
    }

    pub fn set_webhook_secret(mut self, webhook_secret: String) -> Self {
        self.webhook_secret = Some(webhook_secret);
        self
    }

    pub fn webhook_secret(&self) -> Option<SecretString> {
        self.webhook_secret
            .as_ref()
            .map(|secret| SecretString::new(secret.clone()))
    }

    /// Options carrying the configured fallback secret, header and tolerance.
    pub fn verify_options(&self) -> VerifyOptions {
        let options = VerifyOptions::new()
            .with_signature_header(self.signature_header.clone())
            .with_tolerance(self.tolerance_ms);

        match self.webhook_secret() {
            Some(secret) => options.with_default_secret(secret),
            None => options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use secrecy::ExposeSecret;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["webhooks"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().config
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--webhook-secret", "s3cret"]);
        assert_eq!(config.signature_header, DEFAULT_SIGNATURE_HEADER);
        assert_eq!(config.tolerance_ms, DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_verify_options_carry_configuration() {
        let config = parse(&[
            "--webhook-secret",
            "s3cret",
            "--signature-header",
            "X-Hub-Signature-256",
            "--tolerance-ms",
            "1000",
        ]);
        let options = config.verify_options();
        assert_eq!(options.signature_header(), "X-Hub-Signature-256");
        assert_eq!(options.tolerance(), 1000);
        assert_eq!(
            options.default_secret.as_ref().map(|s| s.expose_secret().as_str()),
            Some("s3cret")
        );
    }

    #[test]
    fn test_set_webhook_secret() {
        let config = parse(&["--webhook-secret", "old"]).set_webhook_secret("new".to_string());
        assert_eq!(
            config.webhook_secret().map(|s| s.expose_secret().clone()),
            Some("new".to_string())
        );
    }

    #[test]
    fn test_log_level_filter_parses() {
        let config = parse(&["--webhook-secret", "s", "--log-level-filter", "DEBUG"]);
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
    }
}
