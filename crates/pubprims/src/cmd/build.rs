use std::fs;

use pubprims_envelope::{build_message, CodecConfig, Payload, ServiceIdentity};
use serde_json::Value;

use crate::cmd::BuildArgs;
use crate::exit::{envelope_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::print_raw;

pub fn run(args: BuildArgs) -> CliResult<i32> {
    let identity = ServiceIdentity::parse(args.identity.trim())
        .map_err(|err| envelope_error("--identity", err))?;
    let config = load_config(&args)?;
    let payload = resolve_payload(&args)?;

    let message = build_message(&identity, &args.topic, payload, &config)
        .map_err(|err| envelope_error("build failed", err))?;
    tracing::info!(topic = %args.topic, size = message.len(), "envelope built");

    print_raw(message.as_bytes());
    println!();
    Ok(SUCCESS)
}

fn load_config(args: &BuildArgs) -> CliResult<CodecConfig> {
    let Some(path) = &args.config else {
        return Ok(CodecConfig::default());
    };

    let text = fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    CodecConfig::from_json_str(&text)
        .map_err(|err| envelope_error(&format!("invalid config {}", path.display()), err))
}

fn resolve_payload(args: &BuildArgs) -> CliResult<Payload> {
    let text = match (&args.json, &args.file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
        (None, None) => return Err(CliError::new(USAGE, "one of --json or --file is required")),
    };

    serde_json::from_str::<Value>(&text)
        .map(Payload::Json)
        .map_err(|err| CliError::new(USAGE, format!("payload is not valid JSON: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(json: Option<&str>) -> BuildArgs {
        BuildArgs {
            identity: "11111111-1111-1111-1111-111111111111".to_string(),
            topic: "topic".to_string(),
            json: json.map(str::to_string),
            file: None,
            config: None,
        }
    }

    #[test]
    fn payload_must_be_json() {
        assert!(matches!(
            resolve_payload(&args(Some("{\"a\":1}"))),
            Ok(Payload::Json(_))
        ));
        assert_eq!(resolve_payload(&args(Some("{"))).unwrap_err().code, USAGE);
        assert_eq!(resolve_payload(&args(None)).unwrap_err().code, USAGE);
    }

    #[test]
    fn missing_config_file_is_reported() {
        let mut args = args(Some("1"));
        args.config = Some("/nonexistent/pubprims-config.json".into());
        assert!(load_config(&args).is_err());
    }
}
