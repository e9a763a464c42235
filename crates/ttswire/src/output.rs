use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Print a command report to stdout.
///
/// `report` is used for JSON, `rows` for the table and pretty forms, and
/// `raw` is written unmodified for [`OutputFormat::Raw`].
pub fn print_report<T: Serialize>(
    report: &T,
    rows: &[(&str, String)],
    raw: &[u8],
    format: OutputFormat,
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_report(&mut out, report, rows, raw, format)?;
    out.flush()
}

pub fn write_report<W: Write, T: Serialize>(
    out: &mut W,
    report: &T,
    rows: &[(&str, String)],
    raw: &[u8],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string(report).map_err(io::Error::other)?;
            writeln!(out, "{json}")
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in rows {
                table.add_row(vec![field.to_string(), value.clone()]);
            }
            writeln!(out, "{table}")
        }
        OutputFormat::Pretty => {
            let line: Vec<String> = rows
                .iter()
                .map(|(field, value)| format!("{field}={value}"))
                .collect();
            writeln!(out, "{}", line.join(" "))
        }
        OutputFormat::Raw => out.write_all(raw),
    }
}

pub fn print_raw(data: &[u8]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(data)?;
    out.flush()
}

pub fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
