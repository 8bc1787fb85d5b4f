use std::fmt::Write;

use super::runner::EvaluationSummary;

/// Plain-text evaluation report.
pub fn render_report(summary: &EvaluationSummary) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, summary);
    out
}

fn write_report(out: &mut String, summary: &EvaluationSummary) -> std::fmt::Result {
    writeln!(out, "═══ Evaluation {} ═══", summary.run_id)?;
    writeln!(out, "Cases:    {}", summary.total_cases)?;
    writeln!(
        out,
        "Overall:  {:.1}% ({:.1}/{:.1} points)",
        summary.overall.percent(),
        summary.overall.earned,
        summary.overall.possible
    )?;

    writeln!(out, "\n── By difficulty ──")?;
    for (difficulty, totals) in &summary.by_difficulty {
        writeln!(out, "  {difficulty:<8} {:>6.1}%", totals.percent())?;
    }

    writeln!(out, "\n── By field ──")?;
    for (field, totals) in &summary.by_field {
        writeln!(out, "  {field:<18} {:>6.1}%", totals.percent())?;
    }

    let t = &summary.timing;
    writeln!(out, "\n── Timing ──")?;
    writeln!(
        out,
        "  total {:.2} ms, avg {:.2} ms, min {:.2} ms, max {:.2} ms",
        t.total_ms, t.avg_ms, t.min_ms, t.max_ms
    )?;
    if !summary.slowest.is_empty() {
        writeln!(out, "  Slowest:")?;
        for slow in &summary.slowest {
            writeln!(out, "    {:>8.2} ms  {}", slow.elapsed_ms, slow.query)?;
        }
    }

    writeln!(out, "\n── Failed cases ({}) ──", summary.failed.len())?;
    for case in &summary.failed {
        writeln!(out, "  [{}] {:.1}%  {}", case.difficulty, case.percent, case.query)?;
        for mismatch in &case.mismatches {
            writeln!(out, "      - {mismatch}")?;
        }
    }
    Ok(())
}
