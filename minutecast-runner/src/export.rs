//! Export: feature tables to CSV, reports to JSON and Markdown.
//!
//! Persisted JSON carries a `schema_version`. Newer versions are rejected on
//! load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::SecondsFormat;
use minutecast_core::FeatureTable;

use crate::harness::FitResult;
use crate::pipeline::{ComparisonReport, RunReport, SCHEMA_VERSION};

/// Header of the timestamp column in exported feature CSVs.
pub const TIMESTAMP_HEADER: &str = "timestamp";

// ─── CSV export ─────────────────────────────────────────────────────

fn write_features<W: std::io::Write>(wtr: &mut csv::Writer<W>, table: &FeatureTable) -> Result<()> {
    let mut header = Vec::with_capacity(table.width() + 1);
    header.push(TIMESTAMP_HEADER);
    header.extend(table.names().iter().map(String::as_str));
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(table.width() + 1);
        record.push(row.timestamp().to_rfc3339_opts(SecondsFormat::Secs, true));
        record.extend(row.values().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    Ok(())
}

/// Feature table as CSV text: a `timestamp` column (RFC 3339, UTC) followed
/// by every table column in order.
pub fn export_features_csv(table: &FeatureTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    write_features(&mut wtr, table)?;
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Stream a feature table to a CSV file.
pub fn write_features_csv(table: &FeatureTable, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_features(&mut wtr, table)?;
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

/// One row per feature: name and fitted coefficient, intercept first.
pub fn export_coefficients_csv(result: &FitResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["feature", "coefficient"])?;
    wtr.write_record(["(intercept)", &result.intercept.to_string()])?;
    for (name, coef) in result.feature_names.iter().zip(&result.coefficients) {
        wtr.write_record([name.as_str(), &coef.to_string()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_fit_json(result: &FitResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize FitResult to JSON")
}

/// Serialize a `RunReport` to pretty JSON.
pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a `RunReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

pub fn export_comparison_json(report: &ComparisonReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ComparisonReport to JSON")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set of one run under `output_dir/{run_id prefix}/`:
/// - `manifest.json`: the full `RunReport`
/// - `coefficients.csv`: intercept and per-feature coefficients
///
/// Returns the created directory.
pub fn save_artifacts(report: &RunReport, output_dir: &Path) -> Result<PathBuf> {
    let prefix = report.run_id.get(..16).unwrap_or(&report.run_id);
    let run_dir = output_dir.join(prefix);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), export_json(report)?)?;
    std::fs::write(
        run_dir.join("coefficients.csv"),
        export_coefficients_csv(&report.result)?,
    )?;
    Ok(run_dir)
}

/// Load a `RunReport` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<RunReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Side-by-side Markdown table of a model comparison.
pub fn generate_comparison(report: &ComparisonReport) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Model Comparison\n\n");
    md.push_str(&format!(
        "Run `{}` on {} bars ({} rows){}\n\n",
        report.run_id.get(..12).unwrap_or(&report.run_id),
        report.bars,
        report.rows,
        if report.synthetic { ", synthetic data" } else { "" }
    ));

    md.push_str("| Model | Train rows | Test rows | Test MSE | Test R² | Train R² | Zeroed |\n");
    md.push_str("| --- | ---: | ---: | ---: | ---: | ---: | ---: |\n");
    for entry in &report.entries {
        match (&entry.result, &entry.error) {
            (Some(r), _) => md.push_str(&format!(
                "| {} | {} | {} | {:.6e} | {:.4} | {:.4} | {}/{} |\n",
                entry.model,
                r.train_rows,
                r.test_rows,
                r.test.mse,
                r.test.r2,
                r.train.r2,
                r.zeroed_features().len(),
                r.feature_names.len(),
            )),
            (None, error) => md.push_str(&format!(
                "| {} | | | | | | failed: {} |\n",
                entry.model,
                error.as_deref().unwrap_or("unknown error")
            )),
        }
    }

    if let Some(best) = report.best() {
        md.push_str(&format!("\nLowest test MSE: **{}**\n", best.model));
    }
    md
}
