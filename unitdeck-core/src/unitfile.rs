//! Assembly of the create-service payload from user input.

use crate::error::{ClientError, Result};
use crate::models::CreateRequest;

/// Suffix every service identifier must carry.
pub const UNIT_SUFFIX: &str = ".service";

/// Skeleton offered when composing a unit file from scratch.
pub const UNIT_TEMPLATE: &str = "[Unit]
Description=
After=network.target

[Service]
Type=simple
ExecStart=
Restart=always

[Install]
WantedBy=multi-user.target
";

/// Append [`UNIT_SUFFIX`] when the user omitted it.
pub fn normalize_unit_name(name: &str) -> String {
    if name.ends_with(UNIT_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{UNIT_SUFFIX}")
    }
}

/// Splice a description into unit-file text. The first `Description=` line
/// has its value replaced in place; if none exists, a new line goes in
/// directly after the first section header. A blank description leaves the
/// text untouched, as does a text with neither a description line nor a
/// section header.
pub fn splice_description(config: &str, description: &str) -> String {
    let description = description.trim();
    if description.is_empty() {
        return config.to_string();
    }

    if let Some(start) = config.find("Description=") {
        let line_end = config[start..]
            .find('\n')
            .map(|offset| start + offset)
            .unwrap_or(config.len());
        let mut out = String::with_capacity(config.len() + description.len());
        out.push_str(&config[..start]);
        out.push_str("Description=");
        out.push_str(description);
        out.push_str(&config[line_end..]);
        return out;
    }

    let mut out = String::with_capacity(config.len() + description.len() + 16);
    let mut inserted = false;
    for segment in config.split_inclusive('\n') {
        out.push_str(segment);
        if !inserted && is_section_header(segment.trim_end()) {
            if !segment.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("Description=");
            out.push_str(description);
            out.push('\n');
            inserted = true;
        }
    }
    out
}

fn is_section_header(line: &str) -> bool {
    let line = line.trim();
    line.len() > 2 && line.starts_with('[') && line.ends_with(']')
}

/// User input for a new service, validated and normalized on assembly.
#[derive(Debug, Clone, Default)]
pub struct CreateServiceForm {
    pub name: String,
    pub description: String,
    pub unit_text: String,
}

impl CreateServiceForm {
    /// Build the creation payload. Fails with a validation error before any
    /// network traffic when a required field is blank.
    pub fn assemble(&self) -> Result<CreateRequest> {
        if self.name.trim().is_empty() {
            return Err(ClientError::Validation("service name is required".into()));
        }
        if self.unit_text.trim().is_empty() {
            return Err(ClientError::Validation(
                "unit configuration is required".into(),
            ));
        }
        Ok(CreateRequest {
            name: normalize_unit_name(self.name.trim()),
            command: splice_description(&self.unit_text, &self.description),
            description: self.description.trim().to_string(),
        })
    }
}
