//! Server-side meeting pipeline: upload, transcription, summarization,
//! diagrams, status, sharing and retention.
//!
//! [`MeetingService`] owns the collaborators and is shared by the HTTP
//! handlers and the CLI. Every operation validates its identifiers before
//! touching storage or a remote provider.

use anyhow::Result;
use rusqlite::Connection;
use std::sync::Arc;

use crate::config::{Config, RetentionConfig, ShareConfig};
use crate::db::Database;
use crate::error::{PipelineError, PipelineResult};
use crate::llm::{OpenAISummarizer, Summarizer};
use crate::storage::{LocalObjectStore, ObjectStore};
use crate::transcription::{Transcriber, TranscriptionProvider};

pub mod cleanup;
pub mod recording;
pub mod status;
pub mod summary;

pub use cleanup::CleanupReport;
pub use recording::{TranscribeOutcome, TranscribeRequest, TranscriptSaved, TranscriptUpdate, UploadOutcome};
pub use status::{MeetingStatusView, MeetingWithRecordings, RecordingMatches};
pub use summary::{DiagramOutcome, SummarizeRequest};

/// Meetings returned by the history listing.
pub const MEETING_PAGE_SIZE: usize = 20;

/// Recordings included in a status view when none is requested.
pub const STATUS_RECORDING_LIMIT: usize = 5;

#[derive(Clone)]
pub struct MeetingService {
    db: Database,
    store: Arc<dyn ObjectStore>,
    transcriber: Arc<dyn TranscriptionProvider>,
    summarizer: Arc<dyn Summarizer>,
    retention: RetentionConfig,
    pub(crate) share: ShareConfig,
}

impl MeetingService {
    pub fn new(
        db: Database,
        store: Arc<dyn ObjectStore>,
        transcriber: Arc<dyn TranscriptionProvider>,
        summarizer: Arc<dyn Summarizer>,
        config: &Config,
    ) -> Self {
        Self {
            db,
            store,
            transcriber,
            summarizer,
            retention: config.retention.clone(),
            share: config.share.clone(),
        }
    }

    /// Wire the default collaborators described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let db = Database::open_default()?;
        let store = LocalObjectStore::new(config.bucket_dir()?);

        Ok(Self::new(
            db,
            Arc::new(store),
            Arc::new(Transcriber::new(config.stt.clone())),
            Arc::new(OpenAISummarizer::new(config.llm.clone())),
            config,
        ))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn transcription_available(&self) -> bool {
        self.transcriber.is_available()
    }

    /// Run a database closure, reporting failures as storage errors.
    pub(crate) async fn with_db<F, T>(&self, context: &'static str, f: F) -> PipelineResult<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.db.call(f).await.map_err(PipelineError::storage(context))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-process collaborators for service tests.

    use super::*;
    use crate::error::ProviderError;
    use crate::summary::SummaryResult;
    use async_trait::async_trait;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    pub struct FakeTranscriber {
        pub text: Option<String>,
        pub calls: Mutex<Vec<(usize, String, Option<String>)>>,
    }

    impl FakeTranscriber {
        pub fn returning(text: &str) -> Self {
            Self {
                text: Some(text.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn unimplemented() -> Self {
            Self {
                text: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl TranscriptionProvider for FakeTranscriber {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn is_available(&self) -> bool {
            self.text.is_some()
        }

        fn transcribe<'a>(
            &'a self,
            audio: Vec<u8>,
            file_name: &'a str,
            language: Option<&'a str>,
        ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push((
                    audio.len(),
                    file_name.to_string(),
                    language.map(str::to_string),
                ));
                match &self.text {
                    Some(text) => Ok(text.clone()),
                    None => Err(ProviderError::NotImplemented("assemblyai".to_string()).into()),
                }
            })
        }
    }

    pub struct FakeSummarizer {
        pub result: SummaryResult,
        pub fail: bool,
        pub seen: Mutex<Vec<String>>,
    }

    impl FakeSummarizer {
        pub fn returning(result: SummaryResult) -> Self {
            Self {
                result,
                fail: false,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(
            &self,
            transcript: &str,
            _meeting_id: &str,
            _language: Option<&str>,
        ) -> Result<SummaryResult> {
            self.seen.lock().unwrap().push(transcript.to_string());
            if self.fail {
                anyhow::bail!("Summarizer returned invalid JSON");
            }
            Ok(self.result.clone())
        }
    }

    pub struct Harness {
        pub service: MeetingService,
        pub transcriber: Arc<FakeTranscriber>,
        pub summarizer: Arc<FakeSummarizer>,
        pub store: Arc<LocalObjectStore>,
        _dir: tempfile::TempDir,
    }

    pub fn harness_with(transcriber: FakeTranscriber, summarizer: FakeSummarizer, config: Config) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(dir.path().join("test.db")).unwrap();
        let store = Arc::new(LocalObjectStore::new(dir.path().join("bucket")));
        let transcriber = Arc::new(transcriber);
        let summarizer = Arc::new(summarizer);

        let service = MeetingService::new(
            db,
            store.clone(),
            transcriber.clone(),
            summarizer.clone(),
            &config,
        );

        Harness {
            service,
            transcriber,
            summarizer,
            store,
            _dir: dir,
        }
    }

    pub fn harness() -> Harness {
        harness_with(
            FakeTranscriber::returning("We agreed to ship on Friday."),
            FakeSummarizer::returning(SummaryResult::default()),
            Config::default(),
        )
    }

    pub const MEETING: &str = "3b241101-e2bb-4255-8caf-4136c566a962";
}
