use std::fs;
use std::path::Path;

use serde::Serialize;
use ttswire_client::{synthesize_detailed, ClientConfig, SynthesisOutcome, SynthesisRequest};

use crate::cmd::{parse_duration, SynthArgs};
use crate::exit::{client_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_raw, print_report, OutputFormat};

#[derive(Serialize)]
struct SynthReport<'a> {
    output: &'a str,
    voice: &'a str,
    cluster: &'a str,
    encoding: &'static str,
    bytes: usize,
    chunks: usize,
    ttfb_ms: Option<u64>,
    elapsed_ms: u64,
}

pub fn run(args: SynthArgs, format: OutputFormat) -> CliResult<i32> {
    let connect_timeout = parse_duration(&args.connect_timeout)?;
    let request_timeout = parse_duration(&args.timeout)?;
    let request = build_request(&args)?;

    let config = ClientConfig::new(args.auth.to_config())
        .with_endpoint(args.endpoint.as_str())
        .with_connect_timeout(connect_timeout)
        .with_request_timeout(request_timeout);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("failed to start runtime", err))?;
    let outcome = runtime
        .block_on(synthesize_detailed(config, &request))
        .map_err(|err| client_error("synthesis failed", err))?;

    match args.output.as_deref() {
        Some(path) if path != Path::new("-") => {
            fs::write(path, &outcome.audio).map_err(|err| {
                io_error(&format!("failed writing {}", path.display()), err)
            })?;
            report(&request, &outcome, &path.display().to_string(), format)?;
        }
        _ => {
            print_raw(&outcome.audio)
                .map_err(|err| io_error("failed writing audio to stdout", err))?;
            tracing::info!(
                bytes = outcome.audio.len(),
                chunks = outcome.chunks,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "audio written to stdout"
            );
        }
    }

    Ok(SUCCESS)
}

fn build_request(args: &SynthArgs) -> CliResult<SynthesisRequest> {
    let text = match (&args.text, &args.text_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
        (None, None) => String::new(),
    };
    if text.trim().is_empty() {
        return Err(CliError::new(USAGE, "text must not be empty"));
    }
    if !args.speed.is_finite() || args.speed <= 0.0 {
        return Err(CliError::new(
            USAGE,
            format!("--speed must be a positive number, got {}", args.speed),
        ));
    }

    let mut request = SynthesisRequest::new(text, args.voice.as_str())
        .with_encoding(args.encoding.into())
        .with_speed_ratio(args.speed);
    if let Some(cluster) = &args.cluster {
        request = request.with_cluster(cluster.as_str());
    }
    if let Some(uid) = &args.uid {
        request = request.with_uid(uid.as_str());
    }
    if let Some(request_id) = &args.request_id {
        request = request.with_request_id(request_id.as_str());
    }
    Ok(request)
}

fn report(
    request: &SynthesisRequest,
    outcome: &SynthesisOutcome,
    output: &str,
    format: OutputFormat,
) -> CliResult<()> {
    let ttfb_ms = outcome.first_chunk.map(|d| d.as_millis() as u64);
    let elapsed_ms = outcome.elapsed.as_millis() as u64;
    let summary = SynthReport {
        output,
        voice: &request.voice_type,
        cluster: request.resolved_cluster(),
        encoding: request.encoding.as_str(),
        bytes: outcome.audio.len(),
        chunks: outcome.chunks,
        ttfb_ms,
        elapsed_ms,
    };
    let rows = [
        ("output", output.to_string()),
        ("voice", request.voice_type.clone()),
        ("cluster", request.resolved_cluster().to_string()),
        ("encoding", request.encoding.as_str().to_string()),
        ("bytes", outcome.audio.len().to_string()),
        ("chunks", outcome.chunks.to_string()),
        (
            "ttfb_ms",
            ttfb_ms.map_or_else(|| "-".to_string(), |ms| ms.to_string()),
        ),
        ("elapsed_ms", elapsed_ms.to_string()),
    ];
    print_report(&summary, &rows, format!("{output}\n").as_bytes(), format)
        .map_err(|err| io_error("failed writing report", err))
}
