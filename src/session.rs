//! Chat sessions and their optional on-disk store under `.aide/`.
//!
//! A [`Session`] is an append-only log of user/assistant messages. Messages
//! are only added in pairs through [`Session::record_exchange`], so a user
//! message is always directly followed by its assistant reply.

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SessionError;
use crate::types::ChatTurn;

/// Subdirectory under the store root holding per-session JSON files.
const SESSIONS_DIR: &str = "sessions";
const SESSION_FILE_EXT: &str = "json";
/// On-disk schema version for [`PersistedSession`].
const SESSION_FILE_VERSION: u32 = 1;
/// Default store root, relative to the working directory.
const DEFAULT_SESSION_ROOT: &str = ".aide";

/// Conversation participant role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One immutable entry in a session log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// In-memory record of one interactive chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    id: String,
    model: String,
    #[serde(default)]
    context: Option<String>,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Start an empty session with a freshly generated id.
    pub fn new(model: impl Into<String>, context: Option<String>) -> Self {
        Self::with_id(generate_session_id(), model, context)
    }

    /// Start an empty session under a caller-chosen id.
    pub fn with_id(id: impl Into<String>, model: impl Into<String>, context: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            model: model.into(),
            context,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Append a user message and its assistant reply as one unit.
    ///
    /// Each message is stamped at the moment it is appended.
    pub fn record_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        let user_at = self.next_timestamp();
        self.messages.push(Message {
            role: Role::User,
            content: user.into(),
            timestamp: user_at,
        });
        let assistant_at = self.next_timestamp();
        self.messages.push(Message {
            role: Role::Assistant,
            content: assistant.into(),
            timestamp: assistant_at,
        });
        self.updated_at = assistant_at;
    }

    /// Prior turns in the shape forwarded to the provider.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.messages
            .iter()
            .map(|m| ChatTurn {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect()
    }

    /// Current time, clamped so timestamps never run backwards on clock skew.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }
}

/// Listing metadata for stored sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub model: String,
    pub message_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// Filesystem-backed storage for named chat sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    version: u32,
    session: Session,
}

impl SessionStore {
    /// Open/create the default local store (`.aide/sessions`).
    pub fn open_default() -> Result<Self, SessionError> {
        Self::open(DEFAULT_SESSION_ROOT)
    }

    /// Open/create a store rooted under the given directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SessionError> {
        let sessions_dir = root.as_ref().join(SESSIONS_DIR);
        fs::create_dir_all(&sessions_dir)?;
        Ok(Self { sessions_dir })
    }

    /// Save a session under its id, replacing any earlier snapshot.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        validate_session_id(session.id())?;
        let payload = PersistedSession {
            version: SESSION_FILE_VERSION,
            session: session.clone(),
        };
        let json = serde_json::to_vec_pretty(&payload)?;
        let path = self.session_path(session.id());
        // Temp file + rename keeps the last good snapshot on partial writes.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;
        tracing::debug!(session = session.id(), path = %path.display(), "session saved");
        Ok(())
    }

    /// Load a saved session, or `None` when no file exists for `session_id`.
    pub fn load(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
        validate_session_id(session_id)?;
        let path = self.session_path(session_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let payload: PersistedSession = serde_json::from_str(&raw)?;
        if payload.version != SESSION_FILE_VERSION {
            return Err(SessionError::UnsupportedVersion {
                version: payload.version,
                path: path.display().to_string(),
            });
        }
        Ok(Some(payload.session))
    }

    /// All readable sessions, most recently updated first.
    pub fn list(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let mut sessions = Vec::new();
        // Unreadable or malformed files are skipped so one bad file does not
        // break listing.
        for entry in fs::read_dir(&self.sessions_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SESSION_FILE_EXT) {
                continue;
            }
            let Ok(raw) = fs::read_to_string(&path) else {
                continue;
            };
            let Ok(payload) = serde_json::from_str::<PersistedSession>(&raw) else {
                continue;
            };
            let session = payload.session;
            sessions.push(SessionSummary {
                message_count: session.messages.len(),
                id: session.id,
                model: session.model,
                updated_at: session.updated_at,
            });
        }
        sessions.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(sessions)
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.sessions_dir
            .join(format!("{session_id}.{SESSION_FILE_EXT}"))
    }
}

/// Validate session ids before they touch the filesystem.
///
/// The id is checked exactly as given and becomes the file name verbatim, so
/// surrounding whitespace is rejected rather than trimmed.
pub fn validate_session_id(session_id: &str) -> Result<(), SessionError> {
    if session_id.is_empty() {
        return Err(SessionError::InvalidId("session id cannot be empty".into()));
    }
    if session_id == "." || session_id == ".." {
        return Err(SessionError::InvalidId(
            "session id cannot be '.' or '..'".into(),
        ));
    }
    if session_id
        .chars()
        .any(|ch| !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.'))
    {
        return Err(SessionError::InvalidId(
            "session id can only contain ASCII letters, numbers, '.', '-', '_'".into(),
        ));
    }
    Ok(())
}

/// Generate an opaque grouped-hex session id (`xxxx-xxxx-xxxx-xxxx`).
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    let hex = format!("{:016x}", u64::from_be_bytes(bytes));
    format!(
        "{}-{}-{}-{}",
        &hex[0..4],
        &hex[4..8],
        &hex[8..12],
        &hex[12..16]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::TestTempDir;
    use std::time::Duration;

    #[test]
    fn record_exchange_appends_user_then_assistant() {
        let mut session = Session::new("claude-3", None);
        session.record_exchange("hello", "hi there");
        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), Role::User);
        assert_eq!(messages[0].content(), "hello");
        assert_eq!(messages[1].role(), Role::Assistant);
        assert_eq!(messages[1].content(), "hi there");
        assert!(messages[0].timestamp() <= messages[1].timestamp());
        assert_eq!(session.updated_at(), messages[1].timestamp());
        assert!(session.created_at() <= session.updated_at());
    }

    #[test]
    fn history_mirrors_log_order() {
        let mut session = Session::new("claude-3", Some("src/".into()));
        session.record_exchange("a", "b");
        session.record_exchange("c", "d");
        let roles = session
            .history()
            .into_iter()
            .map(|t| t.role)
            .collect::<Vec<_>>();
        assert_eq!(roles, ["user", "assistant", "user", "assistant"]);
        assert_eq!(session.context(), Some("src/"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TestTempDir::new("session-store");
        let store = SessionStore::open(dir.path()).unwrap();
        let mut session = Session::with_id("demo", "claude-3", None);
        session.record_exchange("hello", "world");
        store.save(&session).unwrap();

        let loaded = store.load("demo").unwrap().expect("session exists");
        assert_eq!(loaded, session);
    }

    #[test]
    fn load_missing_session_is_none() {
        let dir = TestTempDir::new("session-missing");
        let store = SessionStore::open(dir.path()).unwrap();
        assert!(store.load("ghost").unwrap().is_none());
    }

    #[test]
    fn list_orders_by_last_update() {
        let dir = TestTempDir::new("session-list");
        let store = SessionStore::open(dir.path()).unwrap();
        let mut first = Session::with_id("a", "m", None);
        first.record_exchange("1", "2");
        store.save(&first).unwrap();
        std::thread::sleep(Duration::from_millis(15));
        let mut second = Session::with_id("b", "m", None);
        second.record_exchange("1", "2");
        store.save(&second).unwrap();
        dir.write_text("sessions/broken.json", "{not json");

        let sessions = store.list().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, "b");
        assert_eq!(sessions[0].message_count, 2);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let dir = TestTempDir::new("session-version");
        let store = SessionStore::open(dir.path()).unwrap();
        let session = Session::with_id("old", "m", None);
        let mut payload = serde_json::to_value(PersistedSession {
            version: SESSION_FILE_VERSION,
            session,
        })
        .unwrap();
        payload["version"] = serde_json::json!(99);
        dir.write_text("sessions/old.json", &payload.to_string());
        let err = store.load("old").unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedVersion { version: 99, .. }));
    }

    #[test]
    fn invalid_session_id_is_rejected() {
        let dir = TestTempDir::new("session-invalid");
        let store = SessionStore::open(dir.path()).unwrap();
        let err = store
            .save(&Session::with_id("bad/name", "m", None))
            .unwrap_err();
        assert!(err.to_string().contains("session id"));
        assert!(validate_session_id("..").is_err());
        assert!(validate_session_id("ok.id-1_2").is_ok());
    }

    #[test]
    fn padded_session_id_is_rejected_without_writing() {
        let dir = TestTempDir::new("session-padded");
        let store = SessionStore::open(dir.path()).unwrap();
        for id in [" work", "work ", "\twork"] {
            assert!(validate_session_id(id).is_err(), "accepted {id:?}");
            assert!(store.save(&Session::with_id(id, "m", None)).is_err());
            assert!(store.load(id).is_err());
        }
        assert!(store.list().unwrap().is_empty());
        assert!(!dir.child("sessions/ work.json").exists());
    }

    #[test]
    fn generate_session_id_is_hex_groups() {
        let id = generate_session_id();
        let parts = id.split('-').collect::<Vec<_>>();
        assert_eq!(parts.len(), 4);
        assert!(parts.iter().all(|part| part.len() == 4));
        assert!(parts
            .iter()
            .all(|part| part.chars().all(|ch| ch.is_ascii_hexdigit())));
    }
}
