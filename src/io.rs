//! Import/export in JSON Lines and CSV formats
//!
//! Exports stream through the keyset scan (or metadata pagination when
//! filters are given), so memory use is bounded by `batch_size`. Imports
//! buffer up to `batch_size` records and feed them through `add`, which
//! applies the same validation as any other write.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::SqliteVecClient;
use crate::error::{Error, Result};
use crate::types::{Metadata, Record};
use crate::validation::validate_limit;

/// One line of a JSON Lines export; also the shape accepted on import.
#[derive(Debug, Serialize, Deserialize)]
struct ExportRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rowid: Option<i64>,
    text: String,
    #[serde(default)]
    metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    embedding: Option<Vec<f32>>,
}

impl ExportRecord {
    fn from_record(record: Record, include_embeddings: bool) -> Self {
        ExportRecord {
            rowid: Some(record.rowid),
            text: record.text,
            metadata: record.metadata,
            embedding: include_embeddings.then_some(record.embedding),
        }
    }
}

impl SqliteVecClient {
    /// Export records to JSON Lines; returns the number written.
    pub fn export_to_json(
        &self,
        path: impl AsRef<Path>,
        include_embeddings: bool,
        filters: Option<&Metadata>,
        batch_size: usize,
    ) -> Result<usize> {
        validate_limit(batch_size)?;
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "exporting to JSON");

        let mut writer = BufWriter::new(create_output_file(path)?);
        let mut count = 0;
        for record in export_stream(self, filters, batch_size)? {
            let line = serde_json::to_string(&ExportRecord::from_record(
                record?,
                include_embeddings,
            ))?;
            writeln!(writer, "{line}")?;
            count += 1;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), count, "exported records to JSON");
        Ok(count)
    }

    /// Import records from JSON Lines; returns the number imported.
    ///
    /// Every line must carry an embedding (export with
    /// `include_embeddings = true`). With `skip_duplicates`, lines whose
    /// rowid already exists are skipped.
    pub fn import_from_json(
        &self,
        path: impl AsRef<Path>,
        skip_duplicates: bool,
        batch_size: usize,
    ) -> Result<usize> {
        validate_limit(batch_size)?;
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "importing from JSON");

        let reader = BufReader::new(File::open(path)?);
        let mut batch = ImportBatch::new(self, batch_size);

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ExportRecord = serde_json::from_str(&line)?;
            let embedding = record.embedding.ok_or_else(|| {
                Error::Validation(
                    "JSON record is missing 'embedding'; export with \
                     include_embeddings = true to support import"
                        .to_string(),
                )
            })?;

            if skip_duplicates && self.exists(record.rowid)? {
                continue;
            }
            batch.push(record.text, record.metadata, embedding)?;
        }
        let count = batch.finish()?;

        tracing::info!(path = %path.display(), count, "imported records from JSON");
        Ok(count)
    }

    /// Export records to CSV; returns the number written. Metadata (and
    /// the embedding, when included) are serialized as JSON strings inside
    /// their cells.
    pub fn export_to_csv(
        &self,
        path: impl AsRef<Path>,
        include_embeddings: bool,
        filters: Option<&Metadata>,
        batch_size: usize,
    ) -> Result<usize> {
        validate_limit(batch_size)?;
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "exporting to CSV");

        let mut writer = csv::Writer::from_writer(create_output_file(path)?);
        if include_embeddings {
            writer.write_record(["rowid", "text", "metadata", "embedding"])?;
        } else {
            writer.write_record(["rowid", "text", "metadata"])?;
        }

        let mut count = 0;
        for record in export_stream(self, filters, batch_size)? {
            let record = record?;
            let rowid = record.rowid.to_string();
            let metadata = serde_json::to_string(&record.metadata)?;
            if include_embeddings {
                let embedding = serde_json::to_string(&record.embedding)?;
                writer.write_record([
                    rowid.as_str(),
                    record.text.as_str(),
                    metadata.as_str(),
                    embedding.as_str(),
                ])?;
            } else {
                writer.write_record([rowid.as_str(), record.text.as_str(), metadata.as_str()])?;
            }
            count += 1;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), count, "exported records to CSV");
        Ok(count)
    }

    /// Import records from CSV; returns the number imported. The file must
    /// carry `text`, `metadata`, and `embedding` columns.
    pub fn import_from_csv(
        &self,
        path: impl AsRef<Path>,
        skip_duplicates: bool,
        batch_size: usize,
    ) -> Result<usize> {
        validate_limit(batch_size)?;
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "importing from CSV");

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let text_idx = column(&headers, "text")?;
        let metadata_idx = column(&headers, "metadata")?;
        let embedding_idx = column(&headers, "embedding")?;
        let rowid_idx = headers.iter().position(|h| h == "rowid");

        let mut batch = ImportBatch::new(self, batch_size);
        for row in reader.records() {
            let row = row?;

            let rowid: Option<i64> = rowid_idx
                .and_then(|i| row.get(i))
                .filter(|s| !s.is_empty())
                .and_then(|s| s.parse().ok());
            if skip_duplicates && self.exists(rowid)? {
                continue;
            }

            let embedding_cell = row.get(embedding_idx).unwrap_or("");
            if embedding_cell.trim().is_empty() {
                return Err(Error::Validation(
                    "CSV record is missing embedding data; export with \
                     include_embeddings = true"
                        .to_string(),
                ));
            }
            let embedding: Vec<f32> = serde_json::from_str(embedding_cell)?;
            let metadata: Metadata = match row.get(metadata_idx) {
                Some(cell) if !cell.trim().is_empty() => serde_json::from_str(cell)?,
                _ => Metadata::new(),
            };
            let text = row.get(text_idx).unwrap_or("").to_string();

            batch.push(text, metadata, embedding)?;
        }
        let count = batch.finish()?;

        tracing::info!(path = %path.display(), count, "imported records from CSV");
        Ok(count)
    }

    fn exists(&self, rowid: Option<i64>) -> Result<bool> {
        match rowid {
            Some(rowid) => Ok(self.get(rowid)?.is_some()),
            None => Ok(false),
        }
    }
}

/// Stream records either from a filtered pagination loop or the full scan.
fn export_stream<'a>(
    client: &'a SqliteVecClient,
    filters: Option<&'a Metadata>,
    batch_size: usize,
) -> Result<Box<dyn Iterator<Item = Result<Record>> + 'a>> {
    match filters {
        Some(filters) => Ok(Box::new(FilteredStream {
            client,
            filters,
            batch_size,
            offset: 0,
            buffer: std::collections::VecDeque::new(),
            done: false,
        })),
        None => Ok(Box::new(client.get_all(batch_size)?)),
    }
}

struct FilteredStream<'a> {
    client: &'a SqliteVecClient,
    filters: &'a Metadata,
    batch_size: usize,
    offset: usize,
    buffer: std::collections::VecDeque<Record>,
    done: bool,
}

impl Iterator for FilteredStream<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.done {
            match self
                .client
                .filter_by_metadata(self.filters, self.batch_size, self.offset)
            {
                Ok(records) => {
                    if records.len() < self.batch_size {
                        self.done = true;
                    }
                    self.offset += records.len();
                    self.buffer.extend(records);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

/// Accumulates parsed rows and flushes them through `add` per batch.
struct ImportBatch<'a> {
    client: &'a SqliteVecClient,
    batch_size: usize,
    texts: Vec<String>,
    metadata: Vec<Metadata>,
    embeddings: Vec<Vec<f32>>,
    imported: usize,
}

impl<'a> ImportBatch<'a> {
    fn new(client: &'a SqliteVecClient, batch_size: usize) -> Self {
        ImportBatch {
            client,
            batch_size,
            texts: Vec::new(),
            metadata: Vec::new(),
            embeddings: Vec::new(),
            imported: 0,
        }
    }

    fn push(&mut self, text: String, metadata: Metadata, embedding: Vec<f32>) -> Result<()> {
        self.texts.push(text);
        self.metadata.push(metadata);
        self.embeddings.push(embedding);
        if self.texts.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.texts.is_empty() {
            return Ok(());
        }
        self.client
            .add(&self.texts, &self.embeddings, Some(&self.metadata))?;
        self.imported += self.texts.len();
        self.texts.clear();
        self.metadata.clear();
        self.embeddings.clear();
        Ok(())
    }

    fn finish(mut self) -> Result<usize> {
        self.flush()?;
        Ok(self.imported)
    }
}

fn create_output_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(File::create(path)?)
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| Error::Validation(format!("CSV file is missing '{name}' column")))
}
