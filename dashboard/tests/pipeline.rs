use bench_dashboard::aggregate::StackedClusters;
use bench_dashboard::group::{ALL_GROUPS, MEMORY, TIMER};
use bench_dashboard::units::{to_megabytes, BYTES_PER_MEGABYTE};
use bench_dashboard::{DashboardConfig, MetricTable};
use bench_run_model::{DirectorySource, Metric, MetricRecord};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

fn test_data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(name)
}

#[test]
fn two_documents_two_rows() -> anyhow::Result<()> {
    env_logger::try_init().ok();

    let table = MetricTable::load(&DirectorySource::new(test_data("two_baselines")))?;

    assert_eq!(table.height(), 2);
    assert_eq!(table.baselines()?, vec!["X", "Y"]);
    assert_eq!(
        table.records()?,
        vec![
            MetricRecord {
                baseline: "X".to_string(),
                step_id: "0_Load".to_string(),
                bytes_in_use: 200.0,
                ..Default::default()
            },
            MetricRecord {
                baseline: "Y".to_string(),
                step_id: "0_Load".to_string(),
                bytes_in_use: 400.0,
                ..Default::default()
            },
        ]
    );
    Ok(())
}

#[test]
fn run_directory_is_flattened_in_file_then_step_order() -> anyhow::Result<()> {
    env_logger::try_init().ok();

    let table = MetricTable::load(&DashboardConfig::new(test_data("runs")).source())?;

    assert_eq!(table.height(), 5);
    assert_eq!(
        table.baselines()?,
        vec!["Release 2024.1", "Candidate <rc1>", "Unknown"]
    );
    assert_eq!(table.steps()?, vec!["0_Load", "1_Regenerate", "2_Save"]);
    assert_eq!(
        table.values(Metric::OperationTime)?,
        vec![4.2, 11.8, 3.9, 1.1, 0.0]
    );
    Ok(())
}

#[test]
fn every_record_is_fully_populated() -> anyhow::Result<()> {
    let table = MetricTable::load(&DirectorySource::new(test_data("runs")))?;

    for record in table.records()? {
        assert!(!record.baseline.is_empty());
        for metric in Metric::ALL {
            assert!(!record.value(metric).is_nan(), "{}", metric.column());
        }
    }
    Ok(())
}

#[test]
fn filter_then_aggregate() -> anyhow::Result<()> {
    let table = MetricTable::load(&DirectorySource::new(test_data("runs")))?;
    let filtered = table.filter(&["Candidate <rc1>", "Unknown"])?;

    let clusters = StackedClusters::aggregate(&filtered, TIMER)?;
    assert_eq!(clusters.baselines, vec!["Candidate <rc1>", "Unknown"]);
    assert_eq!(clusters.steps, vec!["0_Load", "2_Save"]);
    assert_eq!(clusters.value("Candidate <rc1>", "2_Save", Metric::OperationTime), Some(1.1));
    assert_eq!(clusters.value("Unknown", "2_Save", Metric::OperationTime), Some(0.0));
    Ok(())
}

#[test]
fn megabytes_for_memory_only() -> anyhow::Result<()> {
    let table = MetricTable::load(&DirectorySource::new(test_data("runs")))?;
    let converted = to_megabytes(table.clone(), &MEMORY.byte_columns())?;

    assert_eq!(
        converted.values(Metric::BytesInUse)?,
        table
            .values(Metric::BytesInUse)?
            .into_iter()
            .map(|v| v / BYTES_PER_MEGABYTE)
            .collect::<Vec<_>>()
    );
    for group in &ALL_GROUPS[1..] {
        for metric in group.columns {
            assert_eq!(converted.values(*metric)?, table.values(*metric)?);
        }
    }
    Ok(())
}

#[test]
fn malformed_document_fails_the_load() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::copy(
        test_data("two_baselines").join("doc1.json"),
        dir.path().join("doc1.json"),
    )?;
    std::fs::write(dir.path().join("doc2.json"), "{\"StepDetails\": [")?;

    assert!(MetricTable::load(&DirectorySource::new(dir.path())).is_err());
    Ok(())
}

#[test]
fn numeric_labels_do_not_fail_the_load() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("numbered.json"),
        r#"{"Environment": {"Environment": {"Group": 2024}}, "StepDetails": [{"StepId": 3}]}"#,
    )?;

    let table = MetricTable::load(&DirectorySource::new(dir.path()))?;
    assert_eq!(table.baselines()?, vec!["2024"]);
    assert_eq!(table.steps()?, vec!["3"]);
    Ok(())
}
