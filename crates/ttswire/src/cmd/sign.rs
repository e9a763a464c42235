use serde::Serialize;
use ttswire_client::{authorization_header_at, AuthConfig};
use ttswire_transport::AUTHORIZATION;

use crate::cmd::SignArgs;
use crate::exit::{client_error, io_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat};

#[derive(Serialize)]
struct SignReport<'a> {
    scheme: &'static str,
    header: &'static str,
    value: &'a str,
    timestamp: u64,
}

pub fn run(args: SignArgs, format: OutputFormat) -> CliResult<i32> {
    let auth = args.auth.to_config();
    let timestamp = args.timestamp.unwrap_or_else(now_unix_seconds);
    let value = sign(&auth, timestamp)?;

    let report = SignReport {
        scheme: auth.scheme.name(),
        header: AUTHORIZATION,
        value: &value,
        timestamp,
    };
    let rows = [
        ("scheme", auth.scheme.name().to_string()),
        ("header", AUTHORIZATION.to_string()),
        ("value", value.clone()),
        ("timestamp", timestamp.to_string()),
    ];
    print_report(&report, &rows, format!("{value}\n").as_bytes(), format)
        .map_err(|err| io_error("failed writing output", err))?;
    Ok(SUCCESS)
}

fn sign(auth: &AuthConfig, timestamp: u64) -> CliResult<String> {
    authorization_header_at(auth, timestamp).map_err(|err| client_error("signing failed", err))
}

fn now_unix_seconds() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use ttswire_client::AuthScheme;

    use super::*;
    use crate::exit::USAGE;

    #[test]
    fn signs_with_fixed_timestamp() {
        let auth = AuthConfig::new("app", "t")
            .with_scheme(AuthScheme::HmacSha256)
            .with_secret_key("k");
        assert_eq!(
            sign(&auth, 0).unwrap(),
            "Signature 91e59e754991502c3db821e4fbef0a7c2d7d7440a42a25d4c2c5558e1cc97e96;t=0;appid=app"
        );
    }

    #[test]
    fn missing_secret_is_usage_error() {
        let auth = AuthConfig::new("app", "t").with_scheme(AuthScheme::HmacSha256);
        assert_eq!(sign(&auth, 0).unwrap_err().code, USAGE);
    }
}
