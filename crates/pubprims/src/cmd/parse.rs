use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use pubprims_envelope::{
    parse_envelope, DecodeError, DecodedData, Envelope, PayloadValidator,
    ValidationError,
};
use pubprims_schema::{SchemaRegistry, TopicValidator};
use pubprims_validate::FieldPattern;

use crate::cmd::ParseArgs;
use crate::exit::{envelope_error, io_error, schema_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_parsed, OutputFormat};

pub fn run(args: ParseArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = read_input(args.input.as_deref())?;
    let envelope: Envelope = serde_json::from_slice(&raw)
        .map_err(|err| envelope_error("parse failed", DecodeError::Envelope(err).into()))?;

    let registry = match &args.schemas {
        Some(dir) => Some(Arc::new(
            SchemaRegistry::from_directory(dir).map_err(|err| schema_error("schemas", err))?,
        )),
        None => None,
    };
    let checks = InboundChecks {
        schema: registry
            .map(|registry| TopicValidator::new(registry, envelope.metadata.topic.clone())),
        fields: args
            .matches
            .iter()
            .map(|arg| FieldMatch::parse(arg))
            .collect::<CliResult<Vec<_>>>()?,
    };

    let validator = (!checks.is_empty()).then_some(&checks as &dyn PayloadValidator);
    let parsed = parse_envelope(envelope, None, validator)
        .map_err(|err| envelope_error("parse failed", err))?;
    tracing::info!(
        message_identifier = %parsed.message_id,
        topic = %parsed.decoded.metadata.topic,
        "envelope parsed"
    );

    print_parsed(&parsed, format);
    Ok(SUCCESS)
}

fn read_input(input: Option<&Path>) -> CliResult<Vec<u8>> {
    match input {
        Some(path) if path != Path::new("-") => {
            fs::read(path).map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(buf)
        }
    }
}

/// `--match FIELD=REGEX`: a top-level string field that must fully match.
#[derive(Debug)]
struct FieldMatch {
    field: String,
    pattern: FieldPattern,
}

impl FieldMatch {
    fn parse(arg: &str) -> CliResult<Self> {
        let Some((field, pattern)) = arg.split_once('=') else {
            return Err(CliError::new(
                USAGE,
                format!("invalid --match {arg:?}: expected FIELD=REGEX"),
            ));
        };
        if field.is_empty() {
            return Err(CliError::new(USAGE, format!("invalid --match {arg:?}: empty field")));
        }

        let pattern = FieldPattern::new(pattern)
            .map_err(|err| CliError::new(USAGE, format!("invalid --match {arg:?}: {err}")))?;
        Ok(Self {
            field: field.to_string(),
            pattern,
        })
    }

    fn check(&self, data: &DecodedData) -> Result<(), ValidationError> {
        let value = data
            .as_json()
            .and_then(|value| value.get(&self.field))
            .and_then(|value| value.as_str())
            .ok_or_else(|| {
                ValidationError::failed(format!("field {} is missing or not a string", self.field))
            })?;
        self.pattern.check(value)
    }
}

struct InboundChecks {
    schema: Option<TopicValidator>,
    fields: Vec<FieldMatch>,
}

impl InboundChecks {
    fn is_empty(&self) -> bool {
        self.schema.is_none() && self.fields.is_empty()
    }
}

impl PayloadValidator for InboundChecks {
    fn validate(&self, data: &DecodedData) -> Result<(), ValidationError> {
        if let Some(schema) = &self.schema {
            schema.validate(data)?;
        }
        self.fields.iter().try_for_each(|field| field.check(data))
    }
}
