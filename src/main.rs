use std::error::Error;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use service::{config::Config, logging::Logger};
use webhook_auth::{sign_payload, verify_signature, Payload, VerifierType, VerifyOptions};

/// Sign and verify webhook payloads.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the signature for a payload.
    Sign(PayloadArgs),
    /// Check a signature, exiting with a non-zero status when it is rejected.
    Verify(VerifyArgs),
}

#[derive(Args)]
struct PayloadArgs {
    /// Verifier name: secretKey, sha1, sha256, base64Sha1, base64Sha256, timestampScheme,
    /// jsonWebToken, none or skip.
    #[arg(short = 't', long = "type")]
    verifier_type: VerifierType,

    /// Payload text, signed as-is.
    #[arg(long, conflicts_with = "json")]
    payload: Option<String>,

    /// Payload as JSON, canonicalized before signing.
    #[arg(long)]
    json: Option<String>,

    /// Secret to use instead of the configured webhook secret.
    #[arg(long)]
    secret: Option<String>,

    /// Unix milliseconds to treat as "now" (timestampScheme).
    #[arg(long)]
    timestamp: Option<i64>,

    /// JWT issuer claim to attach or require (jsonWebToken).
    #[arg(long)]
    issuer: Option<String>,
}

#[derive(Args)]
struct VerifyArgs {
    #[command(flatten)]
    payload: PayloadArgs,

    /// The signature to check.
    #[arg(long)]
    signature: String,
}

impl PayloadArgs {
    fn payload(&self) -> Result<Payload, serde_json::Error> {
        match &self.json {
            Some(json) => Ok(Payload::Json(serde_json::from_str(json)?)),
            None => Ok(Payload::Text(self.payload.clone().unwrap_or_default())),
        }
    }

    fn options(&self, config: &Config) -> VerifyOptions {
        let mut options = config.verify_options();
        options.current_timestamp_override = self.timestamp;
        options.issuer = self.issuer.clone();
        options
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Command::Sign(args) => {
            let signature = sign_payload(
                args.verifier_type,
                &args.payload()?,
                args.secret.as_deref(),
                Some(args.options(&cli.config)),
            )?;
            println!("{signature}");
        }
        Command::Verify(args) => {
            verify_signature(
                args.payload.verifier_type,
                &args.payload.payload()?,
                args.payload.secret.as_deref(),
                &args.signature,
                Some(args.payload.options(&cli.config)),
            )?;
            info!("Signature verified with {}", args.payload.verifier_type);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    Config::load_dotenv();
    let cli = Cli::parse();

    if let Err(e) = Logger::init_logger(&cli.config) {
        eprintln!("Failed to start logger: {e}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["webhooks_rs", "--webhook-secret", "fallback"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_sign_then_verify_with_configured_secret() {
        let cli = parse(&["sign", "--type", "sha256", "--payload", "hello"]);
        let Command::Sign(args) = &cli.command else {
            panic!("expected sign command");
        };
        let signature = sign_payload(
            args.verifier_type,
            &args.payload().unwrap(),
            args.secret.as_deref(),
            Some(args.options(&cli.config)),
        )
        .unwrap();

        let verify = parse(&[
            "verify",
            "--type",
            "sha256",
            "--payload",
            "hello",
            "--signature",
            signature.as_str(),
        ]);
        assert!(run(&verify).is_ok());

        let tampered = parse(&[
            "verify",
            "--type",
            "sha256",
            "--payload",
            "hello!",
            "--signature",
            signature.as_str(),
        ]);
        assert!(run(&tampered).is_err());
    }

    #[test]
    fn test_json_payload_is_parsed() {
        let cli = parse(&["sign", "--type", "jsonWebToken", "--json", r#"{"a":1}"#]);
        let Command::Sign(args) = &cli.command else {
            panic!("expected sign command");
        };
        assert_eq!(
            args.payload().unwrap(),
            Payload::Json(serde_json::json!({"a": 1}))
        );
    }

    #[test]
    fn test_unknown_verifier_type_is_rejected() {
        let argv = ["webhooks_rs", "sign", "--type", "md5", "--payload", "x"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_payload_and_json_conflict() {
        let argv = [
            "webhooks_rs",
            "sign",
            "--type",
            "sha1",
            "--payload",
            "x",
            "--json",
            "{}",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
