use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use nhanes_explorer::utils::test::{SOURCE_LAYOUT, source_batch, test_config};
use nhanes_explorer::{PipelineConfig, SourceConfig};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

/// Fixture sources in a temporary directory, with an output directory beside them
pub struct Workspace {
    pub dir: TempDir,
    pub config: PipelineConfig,
}

impl Workspace {
    /// CSV sources with `n` subjects
    #[must_use]
    pub fn with_rows(n: usize) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let data = dir.path().join("data");
        fs::create_dir_all(&data).expect("data dir");
        let config = test_config(&data, &dir.path().join("output"), n).expect("fixture sources");
        Self { dir, config }
    }

    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Replace a configured source file with the given content
    pub fn overwrite_source(&self, name: &str, content: &str) {
        let source = self.source(name);
        fs::write(&source.path, content).expect("overwrite source");
    }

    #[must_use]
    pub fn source(&self, name: &str) -> &SourceConfig {
        self.config
            .sources
            .iter()
            .find(|s| s.name == name)
            .expect("configured source")
    }
}

/// Write a batch as a Parquet file
pub fn write_parquet(path: &Path, batch: &RecordBatch) {
    let file = File::create(path).expect("create parquet file");
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).expect("parquet writer");
    writer.write(batch).expect("write batch");
    writer.close().expect("close writer");
}

/// Survey columns of a fixture source
#[must_use]
pub fn layout_columns(name: &str) -> &'static [&'static str] {
    SOURCE_LAYOUT
        .iter()
        .find(|(source, _)| *source == name)
        .map(|(_, columns)| *columns)
        .unwrap_or_default()
}

/// Fixture batch of one source
#[must_use]
pub fn fixture_source_batch(name: &str, n: usize) -> RecordBatch {
    source_batch(layout_columns(name), n)
}
