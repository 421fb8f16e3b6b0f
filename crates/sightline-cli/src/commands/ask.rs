//! Question answering and summary commands

use anyhow::{Context, Result};
use sightline_core::{answer, db::Database, summarize, InsightFlag, InsightResult, SemanticSchema};

pub fn cmd_ask(db: &Database, schema: &SemanticSchema, question: &str, json: bool) -> Result<()> {
    tracing::debug!(question, db = db.path(), "Answering question");
    let result = answer(question, schema, db).context("Failed to answer question")?;
    print_result(&result, json)
}

pub fn cmd_summary(
    db: &Database,
    schema: &SemanticSchema,
    question: &str,
    json: bool,
) -> Result<()> {
    tracing::debug!(question, db = db.path(), "Summarizing");
    let result = summarize(question, schema, db).context("Failed to summarize")?;
    print_result(&result, json)
}

fn print_result(result: &InsightResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", render_result(result));
    }
    Ok(())
}

/// Human-readable form of an answer
pub fn render_result(result: &InsightResult) -> String {
    let insight = match result {
        InsightResult::Ok(insight) => insight,
        InsightResult::Failure { kind, message } => {
            return format!("❌ {}: {}", kind, message);
        }
    };

    let mut out = vec![
        format!("📊 {}", insight.title),
        "   ─────────────────────────────".to_string(),
    ];
    out.extend(insight.lines.iter().map(|line| format!("   {}", line)));

    if let Some(confidence) = insight.confidence {
        out.push(String::new());
        out.push(format!("   Confidence: {}", confidence.as_str()));
    }

    for flag in &insight.flags {
        match flag {
            InsightFlag::DivisionPolicyApplied => out.push(
                "   ⚠️  A previous value was zero, so its change is shown as 0%.".to_string(),
            ),
        }
    }

    out.join("\n")
}
