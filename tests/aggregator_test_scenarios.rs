use shop_bench::aggregator::{aggregate, list_run_directories, result_sets};
use shop_bench::benchmarks::Benchmark;
use shop_bench::csv_parser::write_report_csv;
use shop_bench::datastructures::*;
mod common;
use common::*;

const TABLE: &str = "Dataset,Path,Objective,Time limit,Format,Best known solution value,Number of jobs,Number of machines\n\
vallada2015_small,small/a,makespan,10,default,100,10,5\n\
vallada2015_large,large/x,makespan,10,default,1000,100,20\n\
vallada2015_small,small/b,makespan,10,default,200,20,5\n";

fn benchmark(dir: &std::path::Path, bins: Option<SizeBins>) -> Benchmark {
    let table = dir.join("data/data_pfss_makespan.csv");
    write_table(&table, TABLE);
    Benchmark {
        name: "pfss_makespan_vallada2015_small".to_string(),
        table,
        dataset: Some("vallada2015_small".to_string()),
        bins,
    }
}

#[test]
fn test_two_rows_one_run() {
    let dir = tempfile::tempdir().unwrap();
    let rows = benchmark(dir.path(), None).load_rows().unwrap();
    let results = dir.path().join("benchmark_results/pfss_makespan_vallada2015_small");
    write_result(&results.join("run"), "small/a", "Makespan", 100);
    write_result(&results.join("run"), "small/b", "Makespan", 250);
    let runs = list_run_directories(&results).unwrap();
    let report = aggregate(&rows, &result_sets(&rows, &runs), None).unwrap();
    let gaps = report
        .instance_rows()
        .map(|r| r.entries[0].gap)
        .collect::<Vec<_>>();
    assert_eq!(gaps, vec![0.0, 25.0]);
    let total = report.total().unwrap();
    assert_eq!(total.best_known_value, 300);
    assert_eq!(total.entries[0].value(), 350);
    assert_eq!(total.entries[0].gap, 25.0);
}

#[test]
fn test_missing_result_dominates_total() {
    let dir = tempfile::tempdir().unwrap();
    let rows = benchmark(dir.path(), None).load_rows().unwrap();
    let run = dir.path().join("benchmark_results/b/run");
    write_result(&run, "small/a", "Makespan", 100);
    let report = aggregate(&rows, &result_sets(&rows, &[run]), None).unwrap();
    assert_eq!(report.rows[1].entries[0].value(), SENTINEL_VALUE);
    assert_eq!(report.rows[1].entries[0].gap, 4_999_899.5);
    assert_eq!(report.total().unwrap().entries[0].gap, 4_999_899.5);
}

#[test]
fn test_competing_runs_with_size_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let bins = SizeBins {
        jobs: vec![10, 20],
        machines: vec![5],
    };
    let rows = benchmark(dir.path(), Some(bins.clone())).load_rows().unwrap();
    let results = dir.path().join("benchmark_results/b");
    write_result(&results.join("run_a"), "small/a", "Makespan", 90);
    write_result(&results.join("run_a"), "small/b", "Makespan", 220);
    write_result(&results.join("run_b"), "small/a", "Makespan", 100);
    write_result(&results.join("run_b"), "small/b", "Makespan", 200);
    let runs = list_run_directories(&results).unwrap();
    let report = aggregate(&rows, &result_sets(&rows, &runs), Some(&bins)).unwrap();

    let labels = report.rows.iter().map(|r| r.label()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["small/a", "small/b", "10_5", "20_5", "Total"]);
    let total = report.total().unwrap();
    assert_eq!(total.entries[0].value(), 310);
    assert_eq!(total.entries[0].gap, 0.0);
    assert_eq!(total.entries[1].value(), 300);
    assert_eq!(total.entries[1].gap, 0.0);
    assert_eq!(report.bucket("10_5").unwrap().entries[0].gap, -10.0);

    let out = dir.path().join("report.csv");
    write_report_csv(&report, &out).unwrap();
    let first = std::fs::read(&out).unwrap();
    let again = aggregate(&rows, &result_sets(&rows, &runs), Some(&bins)).unwrap();
    write_report_csv(&again, &out).unwrap();
    assert_eq!(first, std::fs::read(&out).unwrap());
}
