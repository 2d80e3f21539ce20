//! Rendering of composite tables, summaries and observations.

use std::fmt::Write as _;

use clap::ValueEnum;
use indexa::{CompositeTable, CompositionReport, IndexaError, SeriesSummary};

/// Output layout selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Aligned plain-text columns.
    #[default]
    Table,
    /// Comma-separated values with a header row.
    Csv,
    /// Pretty-printed JSON.
    Json,
}

fn cell(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |x| format!("{x:.4}"))
}

/// Plain-text table with a `date` column followed by every composite column.
pub fn table(t: &CompositeTable) -> String {
    let mut header = vec!["date".to_string()];
    header.extend(t.keys().map(|k| k.as_str().to_string()));

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(t.len());
    for (i, date) in t.dates().iter().enumerate() {
        let mut row = vec![date.format("%d-%m-%Y").to_string()];
        row.extend(t.columns().iter().map(|c| cell(c.values.get(i).copied().flatten())));
        rows.push(row);
    }

    let widths: Vec<usize> = (0..header.len())
        .map(|j| {
            rows.iter()
                .map(|r| r[j].len())
                .chain(std::iter::once(header[j].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let line = |out: &mut String, cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:>w$}"))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };
    line(&mut out, &header);
    for r in &rows {
        line(&mut out, r);
    }
    out
}

/// CSV with ISO dates and empty cells for absent values.
pub fn csv(t: &CompositeTable) -> anyhow::Result<String> {
    let mut w = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["date".to_string()];
    header.extend(t.keys().map(|k| k.as_str().to_string()));
    w.write_record(&header)?;
    for (i, date) in t.dates().iter().enumerate() {
        let mut row = vec![date.format("%Y-%m-%d").to_string()];
        row.extend(
            t.columns()
                .iter()
                .map(|c| c.values.get(i).copied().flatten().map_or_else(String::new, |x| x.to_string())),
        );
        w.write_record(&row)?;
    }
    let bytes = w
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing csv output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Row-oriented JSON document with attribution, warnings and optional summaries.
pub fn json(report: &CompositionReport, stats: &[SeriesSummary]) -> anyhow::Result<String> {
    let t = &report.table;
    let rows: Vec<serde_json::Value> = t
        .dates()
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let mut obj = serde_json::Map::new();
            obj.insert("date".into(), serde_json::Value::String(date.to_string()));
            for c in t.columns() {
                let v = c.values.get(i).copied().flatten();
                obj.insert(c.key.as_str().into(), serde_json::json!(v));
            }
            serde_json::Value::Object(obj)
        })
        .collect();
    let sources: Vec<serde_json::Value> = report
        .attribution
        .sources
        .iter()
        .map(|(code, connector, coverage)| {
            serde_json::json!({ "code": code, "connector": connector, "coverage": coverage })
        })
        .collect();
    let doc = serde_json::json!({
        "rows": rows,
        "sources": sources,
        "warnings": report.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "stats": stats,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Human-readable summary block for one column.
pub fn summary(s: &SeriesSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} points)", s.name, s.count);
    let _ = writeln!(out, "  first   {}  {:.4}", s.first.0, s.first.1);
    let _ = writeln!(out, "  last    {}  {:.4}", s.last.0, s.last.1);
    let _ = writeln!(out, "  min     {}  {:.4}", s.min.0, s.min.1);
    let _ = writeln!(out, "  max     {}  {:.4}", s.max.0, s.max.1);
    let _ = writeln!(out, "  mean    {:.4}", s.mean);
    let _ = writeln!(out, "  median  {:.4}", s.median);
    if let Some(sd) = s.std_dev {
        let _ = writeln!(out, "  std dev {sd:.4}");
    }
    if let Some(total) = s.total_change_pct {
        let _ = writeln!(out, "  change  {total:.2}%");
    }
    if let Some(ann) = s.annualized_change_pct {
        let _ = writeln!(out, "  annual  {ann:.2}%");
    }
    for y in &s.yearly {
        let _ = writeln!(out, "  {}  mean {:.4}  {:+.2}%", y.year, y.mean, y.change_pct);
    }
    out
}

/// Print annotation warnings to stderr.
pub fn warnings(ws: &[IndexaError]) {
    for w in ws {
        eprintln!("warning: {w}");
    }
}
