use std::fs;

use serde::Serialize;
use ttswire_frame::{decode, Message, MsgTypeFlag};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{payload_preview, print_raw, print_report, OutputFormat};

#[derive(Serialize)]
struct DecodedFrame<'a> {
    version: u8,
    header_size: usize,
    msg_type: &'static str,
    msg_type_bits: u8,
    flag: String,
    serialization: String,
    compression: String,
    event: Option<i32>,
    event_name: Option<&'static str>,
    session_id: Option<&'a str>,
    connect_id: Option<&'a str>,
    sequence: Option<i32>,
    error_code: Option<u32>,
    payload_size: usize,
    payload: String,
    wire_size: usize,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = read_frame(&args)?;
    let message = decode(&bytes).map_err(|err| frame_error("decode failed", err))?;

    if let OutputFormat::Pretty = format {
        print_raw(format!("{message}\n").as_bytes())
            .map_err(|err| io_error("failed writing output", err))?;
        return Ok(SUCCESS);
    }

    let decoded = describe(&message);
    let mut rows = vec![
        ("version", decoded.version.to_string()),
        ("header_size", decoded.header_size.to_string()),
        ("msg_type", decoded.msg_type.to_string()),
        ("flag", decoded.flag.clone()),
        ("serialization", decoded.serialization.clone()),
        ("compression", decoded.compression.clone()),
    ];
    if let (Some(event), Some(name)) = (decoded.event, decoded.event_name) {
        rows.push(("event", format!("{name} ({event})")));
    }
    if let Some(session_id) = decoded.session_id {
        rows.push(("session_id", session_id.to_string()));
    }
    if let Some(connect_id) = decoded.connect_id {
        rows.push(("connect_id", connect_id.to_string()));
    }
    if let Some(sequence) = decoded.sequence {
        rows.push(("sequence", sequence.to_string()));
    }
    if let Some(error_code) = decoded.error_code {
        rows.push(("error_code", error_code.to_string()));
    }
    rows.push(("payload_size", decoded.payload_size.to_string()));
    rows.push(("payload", decoded.payload.clone()));

    print_report(&decoded, &rows, &message.payload, format)
        .map_err(|err| io_error("failed writing output", err))?;
    Ok(SUCCESS)
}

fn read_frame(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(text) = &args.hex {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let compact = compact
            .strip_prefix("0x")
            .unwrap_or(compact.as_str())
            .to_string();
        return hex::decode(&compact)
            .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")));
    }
    match &args.file {
        Some(path) => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        None => Err(CliError::new(USAGE, "a frame file or --hex is required")),
    }
}

fn describe(message: &Message) -> DecodedFrame<'_> {
    let with_event = message.flag == MsgTypeFlag::WithEvent;
    DecodedFrame {
        version: message.version.bits(),
        header_size: message.header_size.byte_len(),
        msg_type: message.msg_type.name(),
        msg_type_bits: message.msg_type.bits(),
        flag: format!("{:?}", message.flag),
        serialization: format!("{:?}", message.serialization),
        compression: format!("{:?}", message.compression),
        event: with_event.then(|| message.event.value()),
        event_name: with_event.then(|| message.event.name()),
        session_id: message
            .has_session_id()
            .then_some(message.session_id.as_str()),
        connect_id: (!message.connect_id.is_empty()).then_some(message.connect_id.as_str()),
        sequence: message.has_sequence().then_some(message.sequence),
        error_code: message.has_error_code().then_some(message.error_code),
        payload_size: message.payload.len(),
        payload: payload_preview(&message.payload),
        wire_size: message.wire_size(),
    }
}
