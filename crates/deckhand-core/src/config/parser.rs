//! TOML parser with helpful error messages

use std::path::Path;

use super::{ConfigError, DeckhandConfig};

/// Parse deckhand.toml with detailed error messages
pub fn parse_config_file(path: &Path) -> Result<DeckhandConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&content).map_err(|e| match e {
        ConfigError::Parse { message, .. } => ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parse deckhand.toml content from string
pub fn parse_config_str(content: &str) -> Result<DeckhandConfig, ConfigError> {
    let config: DeckhandConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: Default::default(),
        message: enhance_toml_error(&e, content),
    })?;

    config.validate()?;

    Ok(config)
}

/// Attach the offending lines to a TOML error
fn enhance_toml_error(error: &toml::de::Error, content: &str) -> String {
    let message = error.message().to_string();

    match error.span() {
        Some(span) => {
            let offset = span.start.min(content.len());
            let line_num = content.as_bytes()[..offset]
                .iter()
                .filter(|b| **b == b'\n')
                .count()
                + 1;
            format!(
                "line {}:\n{}\n\n{}",
                line_num,
                get_line_context(content, line_num),
                message
            )
        }
        None => message,
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
