//! Line parser turning raw feed text into candidates

use crate::error::ParseError;
use crate::proxy::models::Candidate;
use crate::proxy::store::ConfirmedSet;
use once_cell::sync::Lazy;
use regex::Regex;

/// Diagnostics some providers embed in their list bodies instead of data
static ERROR_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)error\s+code|<!doctype|<html").expect("Invalid error marker regex")
});

/// Proxy parser for `host:port` feed lines
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single feed line into an untested candidate.
    ///
    /// The host is everything before the first colon and the port everything
    /// up to the next one, so `ip:port:user:pass` keeps only `ip:port`.
    /// Blank lines yield `Ok(None)`.
    pub fn parse_line(line: &str) -> Result<Option<Candidate>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if Self::has_error_marker(line) {
            return Err(ParseError::ErrorMarker(line.to_string()));
        }

        let mut parts = line.split(':');
        let host = parts.next().unwrap_or_default();
        let port = parts
            .next()
            .ok_or_else(|| ParseError::MissingSeparator(line.to_string()))?;

        if host.is_empty() || port.is_empty() {
            return Err(ParseError::EmptyField(line.to_string()));
        }

        Ok(Some(Candidate::new(host, port)))
    }

    /// Whether the line is a provider-side diagnostic rather than data
    pub fn has_error_marker(line: &str) -> bool {
        ERROR_MARKER_REGEX.is_match(line)
    }

    /// Parse a durable `host:port` line; malformed lines are `None`
    pub fn parse_durable(line: &str) -> Option<Candidate> {
        Self::parse_line(line).ok().flatten()
    }
}

/// Parse `line` and keep it only if its key is not already confirmed.
///
/// `Ok(None)` covers both blank lines and keys present in `confirmed`.
pub fn ingest(line: &str, confirmed: &ConfirmedSet) -> Result<Option<Candidate>, ParseError> {
    let Some(candidate) = ProxyParser::parse_line(line)? else {
        return Ok(None);
    };

    if confirmed.contains(&candidate.key()) {
        tracing::debug!(host = %candidate.host, port = %candidate.port, "already confirmed, skipping");
        return Ok(None);
    }

    Ok(Some(candidate))
}
