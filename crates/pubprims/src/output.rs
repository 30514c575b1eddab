use std::io::{IsTerminal, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pubprims_envelope::{DecodedData, ParsedEnvelope};
use serde::Serialize;
use serde_json::Value;

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

#[derive(Serialize)]
struct ParsedOutput<'a> {
    message_identifier: &'a str,
    origin: &'a str,
    service_identity: &'a str,
    topic: &'a str,
    data_encoding: &'a str,
    timestamp: f64,
    data_kind: &'a str,
    data: Value,
}

pub fn print_parsed(parsed: &ParsedEnvelope, format: OutputFormat) {
    let metadata = &parsed.decoded.metadata;
    let data = &parsed.decoded.data;

    match format {
        OutputFormat::Json => {
            let out = ParsedOutput {
                message_identifier: parsed.message_id.as_str(),
                origin: parsed.message_id.origin(),
                service_identity: &parsed.service_identity,
                topic: &metadata.topic,
                data_encoding: metadata.data_encoding.as_str(),
                timestamp: parsed.timestamp,
                data_kind: data.kind(),
                data: data_as_json(data),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MESSAGE", "TOPIC", "ENCODING", "TIMESTAMP", "DATA"])
                .add_row(vec![
                    parsed.message_id.to_string(),
                    metadata.topic.clone(),
                    metadata.data_encoding.to_string(),
                    format!("{:.6}", parsed.timestamp),
                    data_preview(data),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "message={} topic={} encoding={} timestamp={:.6} data={}",
                parsed.message_id,
                metadata.topic,
                metadata.data_encoding,
                parsed.timestamp,
                data_preview(data)
            );
        }
        OutputFormat::Raw => match data {
            DecodedData::Bytes(bytes) => print_raw(bytes),
            other => print_raw(data_as_json(other).to_string().as_bytes()),
        },
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn data_as_json(data: &DecodedData) -> Value {
    match data {
        DecodedData::Json(value) => value.clone(),
        DecodedData::Bytes(bytes) => Value::String(STANDARD.encode(bytes)),
        DecodedData::Proto(message) => Value::String(format!("<{}>", message.type_name())),
    }
}

fn data_preview(data: &DecodedData) -> String {
    match data {
        DecodedData::Bytes(bytes) => format!("<binary {} bytes>", bytes.len()),
        other => data_as_json(other).to_string(),
    }
}
