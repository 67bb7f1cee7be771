//! In-process stand-ins for the model, git and mail seams.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::analysis::repository::{CheckedOutRepository, RepositoryFetchError};
use crate::analysis::{PullRequestRef, RepositoryFetcher};
use crate::llm_client::{LlmError, TextGenerator};
use crate::notify::{DeliveryAck, MailError, MailTransport, OutgoingEmail};
use crate::store::{Collection, MemoryBackend, StorageBackend, StoreError};

enum Script {
    Reply(String),
    Fail,
    Stall,
}

pub struct ScriptedGenerator {
    script: Script,
    prompts: Mutex<Vec<String>>,
    systems: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            prompts: Mutex::new(Vec::new()),
            systems: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self::with_script(Script::Reply(reply.to_string()))
    }

    pub fn failing() -> Self {
        Self::with_script(Script::Fail)
    }

    /// Never answers.
    pub fn stalled() -> Self {
        Self::with_script(Script::Stall)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn systems(&self) -> Vec<String> {
        self.systems.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.systems.lock().unwrap().push(system.to_string());
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.script {
            Script::Reply(reply) => Ok(reply.clone()),
            Script::Fail => Err(LlmError::Api {
                status: 500,
                message: "scripted failure".to_string(),
            }),
            Script::Stall => std::future::pending().await,
        }
    }
}

/// Materializes a fixed file tree in a fresh temp dir per fetch.
pub struct FakeFetcher {
    files: Vec<(String, String)>,
    fail: bool,
    fetched: Mutex<Vec<PullRequestRef>>,
}

impl FakeFetcher {
    pub fn empty() -> Self {
        Self::with_files(&[])
    }

    pub fn with_files(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(path, body)| (path.to_string(), body.to_string()))
                .collect(),
            fail: false,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::empty()
        }
    }

    pub fn fetched(&self) -> Vec<PullRequestRef> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositoryFetcher for FakeFetcher {
    async fn fetch(&self, pr: &PullRequestRef) -> Result<CheckedOutRepository, RepositoryFetchError> {
        self.fetched.lock().unwrap().push(pr.clone());
        if self.fail {
            return Err(RepositoryFetchError::Git {
                step: "clone",
                stderr: "fatal: repository not found".to_string(),
            });
        }
        let dir = tempfile::tempdir().map_err(RepositoryFetchError::Spawn)?;
        for (path, body) in &self.files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).map_err(RepositoryFetchError::Spawn)?;
            }
            std::fs::write(&full, body).map_err(RepositoryFetchError::Spawn)?;
        }
        Ok(CheckedOutRepository::new(dir))
    }
}

/// Captures outgoing mail. Optionally refuses everything, or one recipient.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_all: bool,
    fail_recipient: Option<String>,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn failing_for(recipient: &str) -> Self {
        Self {
            fail_recipient: Some(recipient.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, message: &OutgoingEmail) -> Result<DeliveryAck, MailError> {
        if self.fail_all || self.fail_recipient.as_deref() == Some(message.to.as_str()) {
            return Err(MailError::Rejected {
                status: 422,
                message: "scripted rejection".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(DeliveryAck {
            message_id: Some(format!("msg-{}", sent.len())),
        })
    }
}

/// Reads like a memory backend; refuses writes to the listed collections.
pub struct ReadOnlyBackend {
    inner: MemoryBackend,
    refuse: Vec<Collection>,
}

impl ReadOnlyBackend {
    pub fn refusing(refuse: &[Collection]) -> Self {
        Self {
            inner: MemoryBackend::default(),
            refuse: refuse.to_vec(),
        }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        self.inner.load(collection).await
    }

    async fn save(&self, collection: Collection, records: &[Value]) -> Result<(), StoreError> {
        if self.refuse.contains(&collection) {
            return Err(StoreError::Unavailable(format!("{collection} is read-only")));
        }
        self.inner.save(collection, records).await
    }
}

/// Test handle on every seam at once.
pub struct Seams {
    pub generator: Arc<ScriptedGenerator>,
    pub fetcher: Arc<FakeFetcher>,
    pub mailer: Arc<RecordingMailer>,
}

impl Seams {
    pub fn new(generator: ScriptedGenerator, fetcher: FakeFetcher, mailer: RecordingMailer) -> Self {
        Self {
            generator: Arc::new(generator),
            fetcher: Arc::new(fetcher),
            mailer: Arc::new(mailer),
        }
    }

    pub fn scoring(reply: &str) -> Self {
        Self::new(
            ScriptedGenerator::replying(reply),
            FakeFetcher::empty(),
            RecordingMailer::default(),
        )
    }

    /// Subjects of delivered mail keyed by recipient.
    pub fn subjects_by_recipient(&self) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for message in self.mailer.sent() {
            map.entry(message.to).or_default().push(message.subject);
        }
        map
    }
}
