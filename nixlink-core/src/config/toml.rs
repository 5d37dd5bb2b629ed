//! Minimal TOML reader for the link configuration
//!
//! Handles only what `link.toml` needs, without allocating:
//! - `[link]` and `[pulses]` section headers
//! - `key = value` with integers (underscores allowed) and quoted strings
//! - Comments (# ...), whole-line and trailing
//!
//! Anything else is an error, so a typo never silently keeps a default.

use nixlink_hal::TransportKind;

use super::types::{LinkConfig, PulseConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value of the wrong type or out of range
    InvalidValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Link,
    Pulses,
}

/// Parse the link configuration
///
/// The result has already passed [`LinkConfig::validate`].
pub fn parse_config(input: &str) -> Result<LinkConfig, ConfigError> {
    let mut config = LinkConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header.strip_suffix(']').ok_or(ConfigError::InvalidSection)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidValue)?;
        match section {
            Section::Root => return Err(ConfigError::UnknownKey),
            Section::Link => apply_link(&mut config, key, value)?,
            Section::Pulses => apply_pulse(&mut config.pulses, key, value)?,
        }
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    match header.trim() {
        "link" => Ok(Section::Link),
        "pulses" => Ok(Section::Pulses),
        _ => Err(ConfigError::InvalidSection),
    }
}

fn apply_link(config: &mut LinkConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "transport" => {
            config.transport =
                TransportKind::from_name(parse_string(value)?).ok_or(ConfigError::InvalidValue)?;
        }
        "baudrate" => config.baudrate = parse_int(value)?,
        "tick_us" => config.tick_us = parse_int(value)?,
        "resync_timeout_ticks" => config.resync_timeout_ticks = parse_int(value)?,
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

fn apply_pulse(pulses: &mut PulseConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let ticks = parse_int(value)?;
    match key {
        "activity" => pulses.activity = ticks,
        "checksum_error" => pulses.checksum_error = ticks,
        "unimplemented" => pulses.unimplemented = ticks,
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

/// Drop a trailing comment, leaving `#` inside strings alone
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (pos, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..pos],
            _ => {}
        }
    }
    line
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> Result<&str, ConfigError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ConfigError::InvalidValue)
}

fn parse_int(value: &str) -> Result<u32, ConfigError> {
    if value.starts_with('_') || value.ends_with('_') || value.contains("__") {
        return Err(ConfigError::InvalidValue);
    }

    let mut result: u32 = 0;
    let mut digits = 0;
    for ch in value.chars().filter(|&c| c != '_') {
        let digit = ch.to_digit(10).ok_or(ConfigError::InvalidValue)?;
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(digit))
            .ok_or(ConfigError::InvalidValue)?;
        digits += 1;
    }

    if digits == 0 {
        return Err(ConfigError::InvalidValue);
    }
    Ok(result)
}
