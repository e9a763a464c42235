use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use ttswire_client::{AudioEncoding, AuthConfig, AuthScheme, DEFAULT_ENDPOINT};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod sign;
pub mod synth;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Synthesize text to an audio file or stdout.
    Synth(SynthArgs),
    /// Decode one binary protocol frame and print its fields.
    Decode(DecodeArgs),
    /// Print the Authorization header a connection would send.
    Sign(SignArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Synth(args) => synth::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Sign(args) => sign::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum AuthFormat {
    #[value(alias = "bearer")]
    BearerSpace,
    BearerSemicolon,
    HmacSha256,
}

impl From<AuthFormat> for AuthScheme {
    fn from(format: AuthFormat) -> Self {
        match format {
            AuthFormat::BearerSpace => AuthScheme::BearerSpace,
            AuthFormat::BearerSemicolon => AuthScheme::BearerSemicolon,
            AuthFormat::HmacSha256 => AuthScheme::HmacSha256,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Encoding {
    Wav,
    Mp3,
    OggOpus,
    Pcm,
}

impl From<Encoding> for AudioEncoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Wav => AudioEncoding::Wav,
            Encoding::Mp3 => AudioEncoding::Mp3,
            Encoding::OggOpus => AudioEncoding::OggOpus,
            Encoding::Pcm => AudioEncoding::Pcm,
        }
    }
}

#[derive(Args, Debug)]
pub struct AuthArgs {
    /// Application id.
    #[arg(long, env = "VOLCENGINE_APP_ID")]
    pub app_id: String,
    /// Access token.
    #[arg(long, env = "VOLCENGINE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,
    /// Secret key, required by hmac_sha256.
    #[arg(long, env = "VOLCENGINE_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,
    /// Authorization header format.
    #[arg(
        long,
        env = "VOLCENGINE_AUTH_FORMAT",
        value_enum,
        default_value = "bearer_semicolon"
    )]
    pub auth_format: AuthFormat,
}

impl AuthArgs {
    pub fn to_config(&self) -> AuthConfig {
        let mut auth = AuthConfig::new(self.app_id.as_str(), self.access_token.as_str())
            .with_scheme(self.auth_format.into());
        if let Some(secret) = &self.secret_key {
            auth = auth.with_secret_key(secret.as_str());
        }
        auth
    }
}

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Text to synthesize.
    #[arg(required_unless_present = "text_file", conflicts_with = "text_file")]
    pub text: Option<String>,
    /// Read the text from a UTF-8 file.
    #[arg(long, value_name = "PATH")]
    pub text_file: Option<PathBuf>,
    /// Voice id, e.g. BV001_streaming or a cloned S_ voice.
    #[arg(long, short = 'v')]
    pub voice: String,
    /// Cluster; derived from the voice id when omitted.
    #[arg(long, env = "VOLCENGINE_CLUSTER")]
    pub cluster: Option<String>,
    /// Audio encoding.
    #[arg(long, value_enum, default_value = "wav")]
    pub encoding: Encoding,
    /// Speech speed ratio.
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,
    /// Caller id sent as user.uid; random when omitted.
    #[arg(long)]
    pub uid: Option<String>,
    /// Request id; random when omitted.
    #[arg(long)]
    pub request_id: Option<String>,
    /// WebSocket endpoint.
    #[arg(long, env = "VOLCENGINE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
    /// Connect timeout (e.g. 10s, 500ms).
    #[arg(long, default_value = "30s")]
    pub connect_timeout: String,
    /// Request timeout, from sending the request to the last audio frame.
    #[arg(long, default_value = "30s")]
    pub timeout: String,
    /// Write audio here instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub auth: AuthArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding one binary frame.
    #[arg(required_unless_present = "hex", conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Frame bytes as a hex string (whitespace ignored).
    #[arg(long)]
    pub hex: Option<String>,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Unix timestamp to sign with instead of the current time.
    #[arg(long)]
    pub timestamp: Option<u64>,
    #[command(flatten)]
    pub auth: AuthArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
