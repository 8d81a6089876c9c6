//! Console output utilities
//!
//! Plain-text summaries printed by the command-line tool after a stage.

use std::path::PathBuf;

use crate::algorithm::duration::DurationSummary;
use crate::algorithm::emit::{EmitReport, EmitSummary};
use crate::algorithm::matching::MatchingStats;
use crate::normalize::NormalizationAudit;
use crate::pipeline::RunAudit;

/// Print the normalization counts
pub fn print_normalization_summary(audit: &NormalizationAudit) {
    println!("Normalization:");
    println!("  Records in: {}", audit.records_in);
    println!("  Records out: {}", audit.records_out);
    if audit.duplicate_subject_ids > 0 {
        println!("  Duplicate subject ids dropped: {}", audit.duplicate_subject_ids);
    }
    println!("  Corrections applied: {}", audit.corrections_applied);
    println!("  Field failures: {}", audit.total_field_failures());
    for (field, count) in &audit.field_failures {
        println!("    - {field}: {count}");
    }
    println!("  Order violations: {}", audit.order_violations);
}

/// Print observed / censored / unknown counts per duration kind
pub fn print_duration_summary(summary: &DurationSummary) {
    println!("Durations:");
    for (kind, counts) in &summary.kinds {
        println!(
            "  {kind}: {} observed, {} censored, {} unknown",
            counts.observed,
            counts.censored,
            counts.unknown_total()
        );
        for (reason, count) in &counts.unknown {
            println!("    - {reason:?}: {count}");
        }
    }
}

/// Print the matching counts
pub fn print_matching_summary(stats: &MatchingStats) {
    println!("Matching:");
    println!("  Inductees: {}", stats.inductees);
    println!("  Treatment subjects: {}", stats.treatments);
    for (reason, count) in &stats.treatment_exclusions {
        println!("    - excluded, {reason}: {count}");
    }
    println!("  Matched treatment subjects: {}", stats.matched_treatments);
    println!("  Pairs: {}", stats.pairs);
    println!("  Distinct controls: {}", stats.distinct_controls);
    println!("  Indeterminate candidates: {}", stats.indeterminate_candidates);
    if stats.dropped_by_cap > 0 {
        println!("  Dropped by per-treatment cap: {}", stats.dropped_by_cap);
    }
}

/// Print the rows emitted and excluded for one emission
pub fn print_emit_summary(label: &str, report: &EmitReport, summary: &EmitSummary) {
    println!("{label}:");
    println!("  Rows emitted: {} of {}", report.emitted, report.candidates);
    println!(
        "  Excluded: {} unknown status, {} null duration, {} non-positive, {} outside cohort",
        report.unknown_status,
        report.null_duration,
        report.non_positive_duration,
        report.outside_cohort
    );
    for cell in summary.cells() {
        println!(
            "    {} group {}: {} observed, {} censored, {} excluded",
            cell.kind, cell.group, cell.observed, cell.censored, cell.excluded
        );
    }
}

/// Print the full run summary
pub fn print_run_summary(audit: &RunAudit) {
    println!("Source: {} ({} rows)", audit.load.source, audit.load.rows_read);
    println!("As-of date: {}", audit.as_of_date);
    print_normalization_summary(&audit.normalization);
    print_duration_summary(&audit.durations);
    print_matching_summary(&audit.matching);
    print_emit_summary("Survival rows", &audit.survival, &audit.survival_summary);
    print_emit_summary("Matched survival rows", &audit.matched, &audit.matched_summary);
    println!("Finished in {} ms", audit.elapsed_ms);
}

/// Print the files a command wrote
pub fn print_written_files(paths: &[PathBuf]) {
    println!("Wrote {} files:", paths.len());
    for path in paths {
        println!("  - {}", path.display());
    }
}
