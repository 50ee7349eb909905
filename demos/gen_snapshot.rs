//! Generate a seeded snapshot and print its score report and insights

use vitals_core::{score_report, CorrelationAnalyzer, MetricKind, SnapshotGenerator};

fn main() {
    let snapshot = SnapshotGenerator::from_seed(42).generate();

    match serde_json::to_string_pretty(&score_report(&snapshot)) {
        Ok(report) => println!("{report}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }

    for insight in CorrelationAnalyzer::pairwise(&snapshot, &MetricKind::ALL) {
        println!("{}", insight.describe());
    }
}
