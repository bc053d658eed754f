//! Renders the validated report and merged pool into the combined daily log.

use chrono::NaiveDate;
use daybook_core::StructuredReport;
use daybook_pool::{MergeOutcome, OpportunityPool};
use std::fmt::Write;

pub fn render_daily_log(
    date: NaiveDate,
    report: &StructuredReport,
    pool: &OpportunityPool,
    outcome: &MergeOutcome,
    repaired: bool,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Daily log ({date})\n");

    let _ = writeln!(out, "## Memory\n");
    let _ = writeln!(out, "**Worldview:** {}\n", report.memory.worldview);
    let _ = writeln!(out, "Key insights:");
    for insight in &report.memory.key_insights {
        let _ = writeln!(out, "- {insight}");
    }
    let _ = writeln!(out, "\nNext actions:");
    for action in &report.memory.next_actions {
        let _ = writeln!(out, "- {action}");
    }

    let _ = writeln!(out, "\n## Ops\n");
    let _ = writeln!(
        out,
        "A/B ratio: {:.2} / {:.2} ({})",
        report.ops.ab_ratio.a, report.ops.ab_ratio.b, report.ops.why_ratio_changed
    );
    let _ = writeln!(out, "\nMetrics to watch:");
    for metric in &report.ops.metrics_to_watch {
        let _ = writeln!(out, "- {metric}");
    }
    let _ = writeln!(out, "\nRollback rule: {}", report.ops.rollback_rule);
    let _ = writeln!(out, "Backup note: {}", report.ops.backup_note);

    let _ = writeln!(out, "\n## Opportunity pool\n");
    let _ = writeln!(out, "| id | status | title | last update |");
    let _ = writeln!(out, "|---|---|---|---|");
    for opp in &pool.opportunities {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            opp.id,
            opp.status.as_str(),
            opp.title,
            opp.last_update.map(|d| d.to_string()).unwrap_or_default()
        );
    }

    let mut notes = Vec::new();
    if !outcome.created.is_empty() {
        notes.push(format!("created: {}", outcome.created.join(", ")));
    }
    if !outcome.updated.is_empty() {
        notes.push(format!("updated: {}", outcome.updated.join(", ")));
    }
    if !outcome.rejected.is_empty() {
        notes.push(format!(
            "rejected outside review cycle: {}",
            outcome.rejected.join(", ")
        ));
    }
    if !outcome.downgraded.is_empty() {
        notes.push(format!(
            "auto-downgraded to backlog: {}",
            outcome.downgraded.join(", ")
        ));
    }
    if repaired {
        notes.push("report recovered via one repair pass".to_string());
    }
    if !notes.is_empty() {
        let _ = writeln!(out, "\nMerge notes: {}", notes.join("; "));
    }

    let _ = writeln!(out, "\n## Public post\n");
    let _ = writeln!(out, "**{}**\n", report.post.title);
    let _ = writeln!(out, "{}\n", report.post.body);
    let _ = writeln!(out, "Tags: {}", report.post.tags.join(", "));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::{AbRatio, MemorySection, OpsSection, PostSection};
    use daybook_pool::{Opportunity, OpportunityStatus};

    fn sample_report() -> StructuredReport {
        StructuredReport {
            post: PostSection {
                submolt: "general".into(),
                title: "A quiet day".into(),
                body: "One small step.".into(),
                tags: vec!["growth".into(), "daily".into(), "log".into()],
            },
            memory: MemorySection {
                worldview: "steady".into(),
                key_insights: vec!["i1".into(), "i2".into(), "i3".into()],
                next_actions: vec!["a1".into(), "a2".into(), "a3".into()],
            },
            ops: OpsSection {
                ab_ratio: AbRatio { a: 0.7, b: 0.3 },
                why_ratio_changed: "unchanged".into(),
                metrics_to_watch: vec!["m1".into(), "m2".into(), "m3".into()],
                rollback_rule: "revert on loss".into(),
                backup_note: "done".into(),
            },
            opportunities: vec![],
        }
    }

    #[test]
    fn test_render_includes_all_sections() {
        let mut pool = OpportunityPool::new(7);
        pool.opportunities.push(Opportunity {
            id: "opp-1".into(),
            title: "Alpha".into(),
            status: OpportunityStatus::Active,
            next_actions: vec![],
            risk: String::new(),
            notes: String::new(),
            progress_today: String::new(),
            last_update: Some("2026-08-24".parse().unwrap()),
            history: vec![],
        });
        let outcome = MergeOutcome {
            review_allowed: true,
            updated: vec!["opp-1".into()],
            created: vec![],
            rejected: vec!["late-idea".into()],
            downgraded: vec![],
        };
        let log = render_daily_log(
            "2026-08-24".parse().unwrap(),
            &sample_report(),
            &pool,
            &outcome,
            true,
        );
        assert!(log.contains("# Daily log (2026-08-24)"));
        assert!(log.contains("**Worldview:** steady"));
        assert!(log.contains("| opp-1 | active | Alpha | 2026-08-24 |"));
        assert!(log.contains("rejected outside review cycle: late-idea"));
        assert!(log.contains("repair pass"));
        assert!(log.contains("A quiet day"));
        assert!(log.contains("Tags: growth, daily, log"));
    }

    #[test]
    fn test_no_merge_notes_line_when_nothing_happened() {
        let log = render_daily_log(
            "2026-08-24".parse().unwrap(),
            &sample_report(),
            &OpportunityPool::new(7),
            &MergeOutcome::default(),
            false,
        );
        assert!(!log.contains("Merge notes:"));
    }
}
