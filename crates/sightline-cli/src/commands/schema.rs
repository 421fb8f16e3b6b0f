//! Semantic schema display

use std::path::Path;

use anyhow::Result;
use sightline_core::{config::default_schema_path, SemanticSchema};

use super::load_schema;

pub fn cmd_schema(schema_path: Option<&Path>) -> Result<()> {
    let schema = load_schema(schema_path)?;
    println!("{}", render_schema(&schema, &schema_origin(schema_path)));
    Ok(())
}

/// Where the schema in effect was read from
fn schema_origin(schema_path: Option<&Path>) -> String {
    if let Some(path) = schema_path {
        return path.display().to_string();
    }
    match default_schema_path() {
        Some(path) if path.exists() => path.display().to_string(),
        _ => "(built-in default)".to_string(),
    }
}

pub fn render_schema(schema: &SemanticSchema, origin: &str) -> String {
    let mut out = vec![
        "🗺️  Semantic Schema".to_string(),
        "   ─────────────────────────────".to_string(),
        format!("   Source: {}", origin),
        format!("   Date column: {}", schema.source.date_column),
        format!("   Order column: {}", schema.source.order_column),
        String::new(),
        "   Metrics:".to_string(),
    ];

    for (name, column) in &schema.metrics {
        out.push(format!("     {:<12} → {}", name, column));
    }

    out.push(String::new());
    out.push("   Dimensions:".to_string());
    for (name, columns) in &schema.dimensions {
        out.push(format!("     {:<12} → {}", name, columns.join(" + ")));
    }

    if !schema.vocabulary.is_empty() {
        out.push(String::new());
        out.push("   Vocabulary:".to_string());
        for entry in &schema.vocabulary {
            out.push(format!("     {:<12} ← {}", entry.metric, entry.words.join(", ")));
        }
    }

    let t = &schema.thresholds;
    out.push(String::new());
    out.push("   Thresholds:".to_string());
    out.push(format!("     Anomaly:            {}%", t.anomaly_pct));
    out.push(format!("     Change band:        ±{}%", t.change_reason_band_pct));
    out.push(format!("     Primary driver:     {}%", t.primary_driver_pct));
    out.push(format!(
        "     High confidence:    {}% change, {}% driver",
        t.high_confidence_change_pct, t.high_confidence_driver_pct
    ));
    out.push(format!(
        "     Medium confidence:  {}% change",
        t.medium_confidence_change_pct
    ));

    out.join("\n")
}
