//! Result rendering for resolve and import commands.

use std::borrow::Cow;
use std::io::Write;

use bathyquery::scheduler::ResolutionResult;
use console::{measure_text_width, pad_str, Alignment};

use super::common::OutputFormat;
use crate::error::CliError;

/// Text shown for coordinates without data.
pub const NO_DATA: &str = "no data found";

/// Write results to `out` in the chosen format.
pub fn write_results<W: Write>(
    out: &mut W,
    results: &[ResolutionResult],
    depth_field: &str,
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => write_table(out, results, depth_field),
        OutputFormat::Json => write_json(out, results),
        OutputFormat::Csv => write_csv(out, results, depth_field),
    }
}

/// Depth cell for a result.
fn depth_text(result: &ResolutionResult, depth_field: &str) -> String {
    match result.depth(depth_field) {
        Some(depth) => format!("{}", depth),
        None if result.has_data() => format!("{} feature(s)", result.features.len()),
        None => NO_DATA.to_string(),
    }
}

fn layer_text(result: &ResolutionResult) -> String {
    result.layer.map(|l| l.to_string()).unwrap_or_default()
}

fn write_table<W: Write>(
    out: &mut W,
    results: &[ResolutionResult],
    depth_field: &str,
) -> Result<(), CliError> {
    let io = |e: std::io::Error| CliError::Output(e.to_string());

    let lat_width = column_width("Latitude", results.iter().map(|r| r.coord.latitude.as_str()));
    let lon_width = column_width("Longitude", results.iter().map(|r| r.coord.longitude.as_str()));
    let rule_width = 4 + 2 + lat_width + 2 + lon_width + 2 + 5 + 2 + 13;

    writeln!(
        out,
        "{:>4}  {}  {}  {:>5}  Depth",
        "#",
        pad("Latitude", lat_width),
        pad("Longitude", lon_width),
        "Layer"
    )
    .map_err(io)?;
    writeln!(out, "{}", "─".repeat(rule_width)).map_err(io)?;

    for result in results {
        writeln!(
            out,
            "{:>4}  {}  {}  {:>5}  {}",
            result.index + 1,
            pad(&result.coord.latitude, lat_width),
            pad(&result.coord.longitude, lon_width),
            layer_text(result),
            depth_text(result, depth_field)
        )
        .map_err(io)?;
    }
    Ok(())
}

/// Display width of the widest cell, header included.
fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(measure_text_width)
        .chain(std::iter::once(measure_text_width(header)))
        .max()
        .unwrap_or_default()
}

/// Left-aligns `text` to a display width.
fn pad(text: &str, width: usize) -> Cow<'_, str> {
    pad_str(text, width, Alignment::Left, None)
}

fn write_json<W: Write>(out: &mut W, results: &[ResolutionResult]) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, results).map_err(|e| CliError::Output(e.to_string()))?;
    writeln!(out).map_err(|e| CliError::Output(e.to_string()))
}

fn write_csv<W: Write>(
    out: &mut W,
    results: &[ResolutionResult],
    depth_field: &str,
) -> Result<(), CliError> {
    let csv_error = |e: csv::Error| CliError::Output(e.to_string());
    let mut writer = csv::Writer::from_writer(out);

    writer
        .write_record(["index", "latitude", "longitude", "layer", "attempts", "depth"])
        .map_err(csv_error)?;
    for result in results {
        let depth = result
            .depth(depth_field)
            .map(|d| d.to_string())
            .unwrap_or_default();
        writer
            .write_record([
                result.index.to_string(),
                result.coord.latitude.clone(),
                result.coord.longitude.clone(),
                layer_text(result),
                result.attempts.to_string(),
                depth,
            ])
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|e| CliError::Output(e.to_string()))
}
