use std::io::{self, Write};

use anyhow::Result;
use predictive_search::{ResultEnvelope, SearchError, SearchEvent};
use serde_json::{Value, json};

use super::OutputFormat;

/// Write one event to stdout in the chosen format.
pub(crate) fn print_event(format: OutputFormat, event: &SearchEvent) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Plain => stdout.write_all(format_plain(event).as_bytes())?,
        OutputFormat::Json => writeln!(stdout, "{}", format_event_json(event)?)?,
    }
    Ok(())
}

/// Human-readable rendering: a header line, then one line per result.
pub(crate) fn format_plain(event: &SearchEvent) -> String {
    match event {
        SearchEvent::Success(envelope) => format_success(envelope),
        SearchEvent::Error(err) => format_error(err),
    }
}

fn format_success(envelope: &ResultEnvelope) -> String {
    let mut out = format!("success \"{}\"\n", envelope.query());
    let results = envelope
        .resources()
        .and_then(|resources| resources.get("results"))
        .and_then(Value::as_object);

    let Some(results) = results else {
        out.push_str("  (no results)\n");
        return out;
    };

    let mut any = false;
    for (group, items) in results {
        for item in items.as_array().into_iter().flatten() {
            any = true;
            let title = item.get("title").and_then(Value::as_str).unwrap_or("(untitled)");
            let url = item.get("url").and_then(Value::as_str).unwrap_or_default();
            out.push_str(&format!("  {group:<12} {title}  {url}\n"));
        }
    }
    if !any {
        out.push_str("  (no results)\n");
    }
    out
}

fn format_error(err: &SearchError) -> String {
    let mut out = format!("error   {}", err.kind());
    if let Some(status) = err.status() {
        out.push_str(&format!(" {status}"));
    }
    out.push_str(&format!(": {}: {}", err.name(), err.message()));
    if let Some(seconds) = err.retry_after() {
        out.push_str(&format!(" (retry after {seconds}s)"));
    }
    out.push('\n');
    out
}

/// Format an event as a single-line JSON object.
pub(crate) fn format_event_json(event: &SearchEvent) -> Result<String> {
    let payload = match event {
        SearchEvent::Success(envelope) => json!({
            "event": "success",
            "query": envelope.query(),
            "body": envelope.body(),
        }),
        SearchEvent::Error(err) => json!({
            "event": "error",
            "kind": err.kind(),
            "name": err.name(),
            "message": err.message(),
            "status": err.status(),
            "retry_after": err.retry_after(),
        }),
    };

    Ok(serde_json::to_string(&payload)?)
}
