use crate::error::{EXTRACTION_FAILED, ErrorKind, ExtractionError, Result, ZipError};
use crate::io::{ArchiveBytes, ByteSource};

use super::decoder::MemberDecoder;
use super::encoding::{NameEncoding, TextEncoding};
use super::index::IndexReader;
use super::integrity::{ContentMode, EntryContent, decode_content, verify_crc32};
use super::structures::CentralDirectoryEntry;

/// Progress of one extraction.
///
/// `Idle → ReadingBytes → IndexingDirectory → DecodingEntries → Done`, with
/// any failure jumping straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    Idle,
    ReadingBytes,
    IndexingDirectory,
    DecodingEntries,
    Done,
    Failed,
}

impl ExtractionState {
    /// Whether work is in progress, e.g. to drive a loading indicator
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::ReadingBytes | Self::IndexingDirectory | Self::DecodingEntries
        )
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// What to do with entries whose compression method cannot be decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnsupportedPolicy {
    /// Fail the whole extraction.
    #[default]
    Abort,
    /// Leave the entry out of the result and log a warning.
    Skip,
}

/// Options for an extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub content: ContentMode,
    pub name_encoding: NameEncoding,
    pub on_unsupported: UnsupportedPolicy,
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode content as strict UTF-8 text
    pub fn text(self) -> Self {
        self.content(ContentMode::Text(TextEncoding::Utf8))
    }

    pub fn content(mut self, content: ContentMode) -> Self {
        self.content = content;
        self
    }

    pub fn name_encoding(mut self, name_encoding: NameEncoding) -> Self {
        self.name_encoding = name_encoding;
        self
    }

    pub fn on_unsupported(mut self, policy: UnsupportedPolicy) -> Self {
        self.on_unsupported = policy;
        self
    }
}

/// One extracted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
    name: String,
    content: EntryContent,
}

impl ExtractedEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &EntryContent {
        &self.content
    }

    pub fn into_parts(self) -> (String, EntryContent) {
        (self.name, self.content)
    }
}

type Observer = Box<dyn Fn(ExtractionState) + Send + Sync>;

/// ZIP file extractor
///
/// Holds only configuration, so one extractor can serve any number of
/// independent extractions, concurrently or not.
#[derive(Default)]
pub struct Extractor {
    options: ExtractOptions,
    observer: Option<Observer>,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            observer: None,
        }
    }

    /// Register a callback that receives every state transition
    pub fn with_observer(
        mut self,
        observer: impl Fn(ExtractionState) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Read `source` and extract every file in it.
    ///
    /// Reading the source is the only await point; everything after runs
    /// synchronously. Directory entries are left out, the order of the
    /// Central Directory is kept, and the first failure aborts the whole
    /// extraction.
    pub async fn extract<S: ByteSource>(
        &self,
        source: S,
    ) -> Result<Vec<ExtractedEntry>, ExtractionError> {
        self.notify(ExtractionState::ReadingBytes);
        let bytes = match source.read_all().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(e)),
        };
        self.run(&bytes)
    }

    /// Extract every file from bytes that are already in memory
    pub fn extract_bytes(
        &self,
        bytes: impl Into<ArchiveBytes>,
    ) -> Result<Vec<ExtractedEntry>, ExtractionError> {
        let bytes = bytes.into();
        self.run(&bytes)
    }

    /// List all entries of the archive, directories included, without decoding any data
    pub fn list_files(
        &self,
        bytes: &ArchiveBytes,
    ) -> Result<Vec<CentralDirectoryEntry>, ExtractionError> {
        IndexReader::new(bytes, self.options.name_encoding)
            .read_entries()
            .map_err(ExtractionError::new)
    }

    /// Extract a single entry previously returned by [`list_files`](Self::list_files)
    ///
    /// Returns `Ok(None)` when the entry cannot be decoded and the options
    /// say to skip such entries.
    pub fn extract_entry(
        &self,
        bytes: &ArchiveBytes,
        entry: &CentralDirectoryEntry,
    ) -> Result<Option<ExtractedEntry>, ExtractionError> {
        self.decode_or_skip(&MemberDecoder::new(bytes), entry)
            .map_err(ExtractionError::new)
    }

    fn run(&self, bytes: &ArchiveBytes) -> Result<Vec<ExtractedEntry>, ExtractionError> {
        match self.decode_all(bytes) {
            Ok(entries) => {
                self.notify(ExtractionState::Done);
                Ok(entries)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn decode_all(&self, bytes: &ArchiveBytes) -> Result<Vec<ExtractedEntry>> {
        self.notify(ExtractionState::IndexingDirectory);
        let catalog = IndexReader::new(bytes, self.options.name_encoding).read_entries()?;

        self.notify(ExtractionState::DecodingEntries);
        let decoder = MemberDecoder::new(bytes);
        let mut extracted = Vec::with_capacity(catalog.len());

        for entry in catalog.iter().filter(|e| !e.is_directory) {
            if let Some(file) = self.decode_or_skip(&decoder, entry)? {
                extracted.push(file);
            }
        }

        log::debug!(
            "extracted {} of {} catalog entries",
            extracted.len(),
            catalog.len()
        );
        Ok(extracted)
    }

    /// Decode `entry`, applying the unsupported-entry policy.
    fn decode_or_skip(
        &self,
        decoder: &MemberDecoder<'_>,
        entry: &CentralDirectoryEntry,
    ) -> Result<Option<ExtractedEntry>> {
        match self.decode_entry(decoder, entry) {
            Ok(file) => Ok(Some(file)),
            Err(e)
                if e.kind() == ErrorKind::UnsupportedCompression
                    && self.options.on_unsupported == UnsupportedPolicy::Skip =>
            {
                log::warn!("skipping {}: {}", entry.file_name, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn decode_entry(
        &self,
        decoder: &MemberDecoder<'_>,
        entry: &CentralDirectoryEntry,
    ) -> Result<ExtractedEntry> {
        let data = decoder.decode(entry)?;
        verify_crc32(entry, &data)?;
        let content = decode_content(&entry.file_name, data, self.options.content)?;

        Ok(ExtractedEntry {
            name: entry.file_name.clone(),
            content,
        })
    }

    fn fail(&self, cause: ZipError) -> ExtractionError {
        log::error!("{EXTRACTION_FAILED}: {cause}");
        self.notify(ExtractionState::Failed);
        ExtractionError::new(cause)
    }

    fn notify(&self, state: ExtractionState) {
        log::trace!("extraction state: {state:?}");
        if let Some(observer) = &self.observer {
            observer(state);
        }
    }
}
