// sieve-core/src/application/processor.rs
//
// One validation run: file checks -> expectations -> classification ->
// quarantine sinks -> report.

use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, instrument, warn};

use crate::application::report::{ExpectationSummary, RunReport, SinkOutcome};
use crate::domain::classifier::{AbortReason, Outcome, RowClassifier};
use crate::domain::dataset::Dataset;
use crate::domain::error::DomainError;
use crate::domain::file_check::FileCheckResult;
use crate::domain::policy::ExpectationPolicy;
use crate::error::SieveError;
use crate::infrastructure::adapters::tabular::{CsvOptions, read_dataset};
use crate::infrastructure::adapters::{LocalFileSink, ObjectStoreSink, UnavailableSink};
use crate::infrastructure::config::{QuarantineSettings, ValidationConfig};
use crate::infrastructure::file_validation::FileValidator;
use crate::ports::engine::ExpectationEngine;
use crate::ports::sink::QuarantineSink;

/// Result of a run. An abort carries the triggering expectation and nothing else:
/// no sink has been invoked and no report written.
#[derive(Debug)]
pub enum RunOutcome {
    Completed {
        report: Box<RunReport>,
        valid_rows: Dataset,
    },
    Aborted(AbortReason),
}

impl RunOutcome {
    pub fn into_result(self) -> Result<(RunReport, Dataset), DomainError> {
        match self {
            RunOutcome::Completed { report, valid_rows } => Ok((*report, valid_rows)),
            RunOutcome::Aborted(reason) => Err(reason.into()),
        }
    }
}

/// Sinks described by the quarantine settings: local file first, then object store.
///
/// A sink that cannot be set up is replaced by an `UnavailableSink`, so the
/// run still completes and the report records the failed write.
pub fn build_sinks(settings: &QuarantineSettings, process_id: &str) -> Vec<Arc<dyn QuarantineSink>> {
    let mut sinks: Vec<Arc<dyn QuarantineSink>> = Vec::new();
    if let Some(path) = &settings.local_path {
        sinks.push(Arc::new(LocalFileSink::new(path)));
    }
    if let Some(store) = &settings.object_store {
        match ObjectStoreSink::from_settings(store, process_id) {
            Ok(sink) => sinks.push(Arc::new(sink)),
            Err(e) => {
                error!(bucket = %store.bucket, error = %e, "Failed to set up object store sink");
                sinks.push(Arc::new(UnavailableSink::new("object_store", e)));
            }
        }
    }
    sinks
}

pub struct ValidationProcessor {
    engine: Arc<dyn ExpectationEngine>,
    sinks: Vec<Arc<dyn QuarantineSink>>,
    process_id: String,
}

impl ValidationProcessor {
    pub fn new(engine: Arc<dyn ExpectationEngine>, process_id: impl Into<String>) -> Self {
        Self {
            engine,
            sinks: Vec::new(),
            process_id: process_id.into(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn QuarantineSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_sinks(mut self, sinks: impl IntoIterator<Item = Arc<dyn QuarantineSink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    /// Runs the configured file checks on `source`, loads it and processes it.
    #[instrument(skip(self, config, csv), fields(process_id = %self.process_id))]
    pub async fn run(
        &self,
        config: &ValidationConfig,
        source: &Path,
        csv: &CsvOptions,
    ) -> Result<RunOutcome, SieveError> {
        let file_checks = FileValidator::new(source).validate(&config.file_checks)?;
        let dataset = read_dataset(source, csv)?;
        info!(rows = dataset.len(), columns = dataset.columns().len(), "Source loaded");

        let mut outcome = self.process(config, &dataset, file_checks).await?;
        if let RunOutcome::Completed { report, .. } = &mut outcome {
            report.source = Some(source.display().to_string());
            self.save_report(config, report);
        }
        Ok(outcome)
    }

    /// Evaluates, classifies and dispatches an already loaded dataset.
    pub async fn process(
        &self,
        config: &ValidationConfig,
        dataset: &Dataset,
        file_checks: Vec<FileCheckResult>,
    ) -> Result<RunOutcome, SieveError> {
        let kinds = config.expectation_kinds();
        let results = self.engine.evaluate(dataset, &kinds).await?;
        info!(
            engine = self.engine.name(),
            evaluated = results.len(),
            failed = results.iter().filter(|r| !r.success).count(),
            "Expectations evaluated"
        );

        let policy = ExpectationPolicy::from_declarations(&config.expectations);
        let partition = match RowClassifier::new(&policy).classify(dataset, &results)? {
            Outcome::Completed(partition) => partition,
            Outcome::Aborted(reason) => {
                error!(
                    expectation = %reason.expectation_id,
                    column = %reason.target,
                    "Policy violation, run aborted"
                );
                return Ok(RunOutcome::Aborted(reason));
            }
        };

        let mut report = RunReport::new(&self.process_id, self.engine.name());
        report.total_rows = dataset.len();
        report.valid_rows = partition.valid_rows.len();
        report.invalid_rows = partition.invalid_rows.len();
        report.quarantine_records = partition.quarantine_records.len();
        report.file_checks = file_checks;
        report.expectations = results
            .iter()
            .map(|r| ExpectationSummary::from_result(r, &policy))
            .collect();

        if partition.quarantine_records.is_empty() {
            info!("No invalid rows, quarantine sinks skipped");
        } else {
            let quarantine = partition.quarantine_dataset()?;
            report.sinks = self.dispatch(&quarantine).await;
        }

        info!(
            valid = report.valid_rows,
            invalid = report.invalid_rows,
            "Validation run completed"
        );
        Ok(RunOutcome::Completed {
            report: Box::new(report),
            valid_rows: partition.valid_rows,
        })
    }

    /// Every sink runs concurrently; a failure never stops the others.
    async fn dispatch(&self, quarantine: &Dataset) -> Vec<SinkOutcome> {
        let writes = self.sinks.iter().map(|sink| async move {
            match sink.write(quarantine).await {
                Ok(location) => SinkOutcome::written(sink.name(), location),
                Err(e) => {
                    error!(sink = sink.name(), error = %e, "Failed to write quarantine records");
                    SinkOutcome::failed(sink.name(), e)
                }
            }
        });
        join_all(writes).await
    }

    fn save_report(&self, config: &ValidationConfig, report: &RunReport) {
        let Some(dir) = &config.quarantine.report_dir else {
            return;
        };
        // Un rapport manquant ne doit pas invalider le run
        if let Err(e) = report.save(dir) {
            warn!(error = %e, dir = %dir.display(), "Could not save run report");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::classifier::{FAILED_COLUMN_COLUMN, FAILED_EXPECTATION_COLUMN};
    use crate::domain::expectation::{ExpectationKind, ExpectationResult, TargetColumn};
    use crate::infrastructure::config::{ObjectStoreSettings, parse_validation_config};
    use crate::infrastructure::engine::NativeEngine;
    use crate::infrastructure::error::{InfrastructureError, StorageError};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const CONFIG: &str = r#"
expectations:
  - name: ExpectColumnValuesToNotBeNull
    column: MMSI
    action: skip
  - name: ExpectColumnValuesToBeBetween
    column: Latitude
    min: -90
    max: 90
    action: skip
"#;

    const CSV: &str = "MMSI,Latitude\n1,10\n,20\n3,95\n4,-5\n";

    #[derive(Default)]
    struct CapturingSink {
        written: Mutex<Vec<Dataset>>,
    }

    #[async_trait]
    impl QuarantineSink for CapturingSink {
        fn name(&self) -> &str {
            "capture"
        }

        async fn write(&self, quarantine: &Dataset) -> Result<String, SieveError> {
            self.written.lock().unwrap().push(quarantine.clone());
            Ok("memory://capture".into())
        }
    }

    struct BrokenSink;

    #[async_trait]
    impl QuarantineSink for BrokenSink {
        fn name(&self) -> &str {
            "broken"
        }

        async fn write(&self, _quarantine: &Dataset) -> Result<String, SieveError> {
            Err(InfrastructureError::from(StorageError::Sink {
                sink: "broken".into(),
                message: "access denied".into(),
            })
            .into())
        }
    }

    struct Scripted(Vec<ExpectationResult>);

    #[async_trait]
    impl ExpectationEngine for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn evaluate(
            &self,
            _dataset: &Dataset,
            _expectations: &[ExpectationKind],
        ) -> Result<Vec<ExpectationResult>, SieveError> {
            Ok(self.0.clone())
        }
    }

    fn dataset() -> Dataset {
        crate::infrastructure::adapters::tabular::read_dataset_from(
            CSV.as_bytes(),
            &CsvOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_skip_run_quarantines_and_keeps_going_on_sink_failure() -> Result<()> {
        let config = parse_validation_config(CONFIG)?;
        let capture = Arc::new(CapturingSink::default());
        let processor = ValidationProcessor::new(Arc::new(NativeEngine::new()), "42")
            .with_sink(capture.clone())
            .with_sink(Arc::new(BrokenSink));

        let outcome = processor.process(&config, &dataset(), Vec::new()).await?;
        let (report, valid) = outcome.into_result()?;

        assert_eq!(valid.len(), 2);
        assert_eq!(report.invalid_rows, 2);
        assert_eq!(report.quarantine_records, 2);
        assert_eq!(report.failed_expectations().count(), 2);

        assert_eq!(report.sinks.len(), 2);
        assert!(report.sinks[0].success);
        assert!(!report.sinks[1].success);

        let written = capture.written.lock().unwrap();
        let columns = written[0].columns();
        assert_eq!(columns[columns.len() - 2], FAILED_EXPECTATION_COLUMN);
        assert_eq!(columns[columns.len() - 1], FAILED_COLUMN_COLUMN);
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_policy_aborts_without_touching_sinks() -> Result<()> {
        let config = parse_validation_config(&CONFIG.replace("action: skip", "action: failure"))?;
        let capture = Arc::new(CapturingSink::default());
        let processor =
            ValidationProcessor::new(Arc::new(NativeEngine::new()), "42").with_sink(capture.clone());

        let outcome = processor.process(&config, &dataset(), Vec::new()).await?;
        match outcome {
            RunOutcome::Aborted(reason) => {
                assert_eq!(reason.expectation_id, "ExpectColumnValuesToNotBeNull");
                assert_eq!(reason.target, TargetColumn::column("MMSI"));
            }
            RunOutcome::Completed { .. } => panic!("expected abort"),
        }
        assert!(capture.written.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_clean_data_skips_sinks() -> Result<()> {
        let config = parse_validation_config(CONFIG)?;
        let capture = Arc::new(CapturingSink::default());
        let engine = Scripted(vec![ExpectationResult::passed(
            "ExpectColumnValuesToNotBeNull",
            TargetColumn::column("MMSI"),
        )]);
        let processor = ValidationProcessor::new(Arc::new(engine), "7").with_sink(capture.clone());

        let (report, valid) = processor
            .process(&config, &dataset(), Vec::new())
            .await?
            .into_result()?;
        assert_eq!(valid.len(), 4);
        assert!(report.sinks.is_empty());
        assert!(capture.written.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_an_error() -> Result<()> {
        let config = parse_validation_config(CONFIG)?;
        let engine = Scripted(vec![ExpectationResult::failed(
            "ExpectColumnValuesToNotBeNull",
            TargetColumn::column("MMSI"),
            vec![99],
        )]);
        let processor = ValidationProcessor::new(Arc::new(engine), "7");

        let err = processor
            .process(&config, &dataset(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SieveError::Domain(DomainError::IndexOutOfRange { index: 99, .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_run_reads_file_and_saves_report() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("ais.csv");
        std::fs::write(&source, CSV)?;

        let yaml = format!(
            "file_validation:\n  - name: ValidateFileFormat\n    allowed_extensions: ['.csv']\n{CONFIG}quarantine:\n  local_path: {}\n  report_dir: {}\n",
            dir.path().join("invalid.csv").display(),
            dir.path().join("reports").display(),
        );
        let config = parse_validation_config(&yaml)?;
        let processor = ValidationProcessor::new(Arc::new(NativeEngine::new()), "42")
            .with_sinks(build_sinks(&config.quarantine, "42"));

        let (report, _) = processor
            .run(&config, &source, &CsvOptions::default())
            .await?
            .into_result()?;

        assert!(report.file_checks[0].passed);
        assert_eq!(report.sinks[0].sink, "local");
        assert!(dir.path().join("invalid.csv").exists());
        assert!(dir.path().join("reports").join("run_results.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_unbuildable_object_store_still_completes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        // A regular file where the store root directory should be created
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "")?;

        let mut store = ObjectStoreSettings::new("dq-bucket");
        store.local_root = Some(blocker.join("store"));
        let settings = QuarantineSettings {
            local_path: Some(dir.path().join("invalid.csv")),
            object_store: Some(store),
            ..QuarantineSettings::default()
        };

        let sinks = build_sinks(&settings, "42");
        assert_eq!(sinks.len(), 2);

        let config = parse_validation_config(CONFIG)?;
        let processor = ValidationProcessor::new(Arc::new(NativeEngine::new()), "42").with_sinks(sinks);
        let (report, valid) = processor
            .process(&config, &dataset(), Vec::new())
            .await?
            .into_result()?;

        assert_eq!(valid.len(), 2);
        assert_eq!(report.sinks[0].sink, "local");
        assert!(report.sinks[0].success);
        assert_eq!(report.sinks[1].sink, "object_store");
        assert!(!report.sinks[1].success);
        assert!(report.sinks[1].error.as_deref().unwrap().contains("setup failed"));
        assert!(dir.path().join("invalid.csv").exists());
        Ok(())
    }
}
