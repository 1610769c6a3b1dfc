//! Persisted chat sessions.
//!
//! An explicit store object owned by the caller: `load` once at startup,
//! mutate in memory, `flush` after each write. The file is a JSON map of
//! `session_id -> Session`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use docrag_core::error::{Error, Result};
use docrag_core::types::{ChatMessage, Role};

pub const DEFAULT_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub role: Role,
    pub content: String,
    pub ts: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub messages: Vec<SessionMessage>,
}

impl Session {
    fn new(session_id: &str, now: i64) -> Self {
        Self { session_id: session_id.to_string(), created_at: now, updated_at: now, messages: Vec::new() }
    }
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    sessions: BTreeMap<String, Session>,
}

fn now() -> i64 { chrono::Utc::now().timestamp() }

impl SessionStore {
    /// A missing file is an empty store; unreadable JSON is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let sessions = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            serde_json::from_reader(reader).map_err(|e| Error::InvalidConfig(format!("session file {} is malformed: {e}", path.display())))?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), sessions = sessions.len(), "sessions loaded");
        Ok(Self { path: path.to_path_buf(), sessions })
    }

    pub fn path(&self) -> &Path { &self.path }
    pub fn len(&self) -> usize { self.sessions.len() }
    pub fn is_empty(&self) -> bool { self.sessions.is_empty() }
    pub fn get(&self, session_id: &str) -> Option<&Session> { self.sessions.get(session_id) }

    pub fn get_or_create(&mut self, session_id: &str) -> &mut Session {
        self.get_or_create_at(session_id, now())
    }

    pub fn get_or_create_at(&mut self, session_id: &str, now: i64) -> &mut Session {
        self.sessions.entry(session_id.to_string()).or_insert_with(|| Session::new(session_id, now))
    }

    pub fn append_message(&mut self, session_id: &str, role: Role, content: &str) {
        self.append_message_at(session_id, role, content, now());
    }

    pub fn append_message_at(&mut self, session_id: &str, role: Role, content: &str, now: i64) {
        let session = self.get_or_create_at(session_id, now);
        session.messages.push(SessionMessage { role, content: content.to_string(), ts: now });
        session.updated_at = now;
    }

    /// The last `limit` messages, oldest first. Creates the session if needed.
    pub fn recent_messages(&mut self, session_id: &str, limit: usize) -> Vec<SessionMessage> {
        let session = self.get_or_create(session_id);
        let start = session.messages.len().saturating_sub(limit);
        session.messages[start..].to_vec()
    }

    /// `recent_messages` shaped for a chat provider.
    pub fn history(&mut self, session_id: &str, limit: usize) -> Vec<ChatMessage> {
        self.recent_messages(session_id, limit)
            .into_iter()
            .map(|m| ChatMessage { role: m.role, content: m.content })
            .collect()
    }

    /// Drop sessions idle for longer than `max_age_secs`; returns how many went.
    pub fn cleanup(&mut self, max_age_secs: i64) -> usize {
        self.cleanup_at(max_age_secs, now())
    }

    pub fn cleanup_at(&mut self, max_age_secs: i64, now: i64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| now - s.updated_at <= max_age_secs);
        let removed = before - self.sessions.len();
        if removed > 0 {
            info!(removed, "expired sessions removed");
        }
        removed
    }

    /// Write every session to disk, replacing the file atomically.
    pub fn flush(&self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &self.sessions)?;
            writer.flush()?;
        }
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}
