mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ttswire", version, about = "Binary WebSocket TTS client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{AuthFormat, Encoding};

    #[test]
    fn parses_synth_subcommand() {
        let cli = Cli::try_parse_from([
            "ttswire",
            "synth",
            "hello",
            "--voice",
            "BV001_streaming",
            "--encoding",
            "ogg_opus",
            "--app-id",
            "app",
            "--access-token",
            "tok",
            "--auth-format",
            "hmac_sha256",
            "-o",
            "out.ogg",
        ])
        .expect("synth args should parse");

        match cli.command {
            Command::Synth(args) => {
                assert_eq!(args.text.as_deref(), Some("hello"));
                assert_eq!(args.encoding, Encoding::OggOpus);
                assert_eq!(args.auth.auth_format, AuthFormat::HmacSha256);
                assert_eq!(args.timeout, "30s");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bearer_alias_selects_space_format() {
        let cli = Cli::try_parse_from([
            "ttswire",
            "sign",
            "--app-id",
            "app",
            "--access-token",
            "tok",
            "--auth-format",
            "bearer",
        ])
        .expect("sign args should parse");

        match cli.command {
            Command::Sign(args) => assert_eq!(args.auth.auth_format, AuthFormat::BearerSpace),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_text_with_text_file() {
        let err = Cli::try_parse_from([
            "ttswire",
            "synth",
            "hello",
            "--text-file",
            "in.txt",
            "--voice",
            "v",
            "--app-id",
            "app",
            "--access-token",
            "tok",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_decode_hex() {
        let cli = Cli::try_parse_from(["ttswire", "--format", "json", "decode", "--hex", "1110"])
            .expect("decode args should parse");
        assert!(matches!(cli.command, Command::Decode(_)));
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }
}
