// ==============================================
// DRIVER TESTS (integration)
// ==============================================
//
// Text workload in, two-line report out, across lookahead strategies and
// execution modes.

use pagesim::policy::optimal::Lookahead;
use pagesim::simulate::{SimulationError, SimulationMode, SimulationOptions, simulate};
use pagesim::workload::{Workload, WorkloadError};

const ALL_OPTIONS: [SimulationOptions; 4] = [
    SimulationOptions {
        lookahead: Lookahead::Indexed,
        mode: SimulationMode::Lockstep,
    },
    SimulationOptions {
        lookahead: Lookahead::Scan,
        mode: SimulationMode::Lockstep,
    },
    SimulationOptions {
        lookahead: Lookahead::Indexed,
        mode: SimulationMode::Parallel,
    },
    SimulationOptions {
        lookahead: Lookahead::Scan,
        mode: SimulationMode::Parallel,
    },
];

fn report_for(input: &str, options: &SimulationOptions) -> String {
    let workload = Workload::parse(input).unwrap();
    simulate(&workload, options).unwrap().render()
}

#[test]
fn cyclic_scan_report() {
    for options in &ALL_OPTIONS {
        assert_eq!(
            report_for("2 9\n1 2 3 1 2 3 1 2 3\n", options),
            "LRU hits: 0/9\nORA hits: 3/9"
        );
    }
}

#[test]
fn alternating_pair_report() {
    for options in &ALL_OPTIONS {
        assert_eq!(
            report_for("2 6 1 2 1 2 1 2", options),
            "LRU hits: 4/6\nORA hits: 4/6"
        );
    }
}

#[test]
fn worked_example_report() {
    for options in &ALL_OPTIONS {
        assert_eq!(
            report_for("2 6 1 2 3 1 2 4", options),
            "LRU hits: 0/6\nORA hits: 1/6"
        );
    }
}

#[test]
fn negative_keys_are_pages_too() {
    assert_eq!(
        report_for("1 4 -5 -5 7 -5", &SimulationOptions::default()),
        "LRU hits: 1/4\nORA hits: 1/4"
    );
}

#[test]
fn modes_agree_on_a_larger_stream() {
    let requests: Vec<i64> = (0..2_000).map(|i| (i * 7919 % 97) % 23).collect();
    let workload = Workload::new(5, requests);
    let reports: Vec<_> = ALL_OPTIONS
        .iter()
        .map(|options| simulate(&workload, options).unwrap())
        .collect();
    for report in &reports[1..] {
        assert_eq!(report.lru.hits, reports[0].lru.hits);
        assert_eq!(report.optimal.hits, reports[0].optimal.hits);
    }
    assert!(reports[0].optimal.hits >= reports[0].lru.hits);
    assert!(reports[0].optimal.hit_ratio() <= 1.0);
}

#[test]
fn malformed_input_is_rejected_before_simulation() {
    assert!(matches!(
        Workload::parse("2 3 1 two 3"),
        Err(WorkloadError::Malformed { position: 3, .. })
    ));
    assert!(matches!(
        Workload::parse("2 5 1 2 3"),
        Err(WorkloadError::TooFewRequests { declared: 5, found: 3 })
    ));
}

#[test]
fn zero_capacity_workload_fails() {
    let workload = Workload::parse("0 2 1 1").unwrap();
    let err = simulate(&workload, &SimulationOptions::default()).unwrap_err();
    assert!(matches!(err, SimulationError::Config(_)));
    assert!(err.to_string().contains("capacity"));
}
