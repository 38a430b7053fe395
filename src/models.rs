use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Naive forms accepted for client timestamps; they are read as UTC.
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current time at microsecond precision, the resolution `TIMESTAMPTZ` keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn parse_client_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(_) => NAIVE_TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())?
            .and_utc(),
    };
    Some(parsed.trunc_subsecs(6))
}

fn deserialize_client_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_client_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'"))),
    }
}

// ── Status checks ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
    pub fn new(client_name: String) -> Self {
        Self { id: new_id(), client_name, timestamp: now() }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusCheckCreate {
    pub client_name: String,
}

// ── Generation ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub task: String,
    pub prompt: String,
    #[serde(rename = "amendmentPrompt", default, skip_serializing_if = "Option::is_none")]
    pub amendment_prompt: Option<String>,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl GenerationRecord {
    pub fn new(
        user_id: String,
        task: String,
        prompt: String,
        amendment_prompt: Option<String>,
        response: String,
    ) -> Self {
        Self {
            id: new_id(),
            user_id,
            task,
            prompt,
            amendment_prompt,
            response,
            timestamp: now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub task: String,
    pub prompt: String,
    #[serde(rename = "amendmentPrompt", default)]
    pub amendment_prompt: Option<String>,
}

// ── Chat sessions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Assistant,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::User => "user",
            MessageType::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(kind: MessageType, content: String) -> Self {
        Self { id: new_id(), kind, content, timestamp: now() }
    }
}

/// Client payload for appending to a transcript. Any `id` the client sends
/// is ignored; the server always assigns one.
#[derive(Debug, Clone, Deserialize)]
pub struct NewChatMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
    /// RFC 3339, or a naive ISO-8601 date-time taken as UTC.
    #[serde(default, deserialize_with = "deserialize_client_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<NewChatMessage> for ChatMessage {
    fn from(m: NewChatMessage) -> Self {
        let mut message = ChatMessage::new(m.kind, m.content);
        if let Some(ts) = m.timestamp {
            message.timestamp = ts;
        }
        message
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub task: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(user_id: String, task: String, title: String) -> Self {
        let created = now();
        Self {
            id: new_id(),
            user_id,
            task,
            title,
            messages: Vec::new(),
            created_at: created,
            updated_at: created,
        }
    }
}

/// Parameters for `POST /chat/sessions`, read from the query string and/or a
/// JSON body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionParams {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl CreateSessionParams {
    /// Fields already present on `self` win over `other`.
    pub fn or(self, other: CreateSessionParams) -> Self {
        Self {
            user_id: self.user_id.or(other.user_id),
            task: self.task.or(other.task),
            title: self.title.or(other.title),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    #[test]
    fn session_serializes_with_wire_field_names() {
        let mut session = ChatSession::new("u1".into(), "research".into(), "Test".into());
        session.messages.push(ChatMessage::new(MessageType::User, "hello".into()));

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["messages"][0]["type"], "user");
        assert!(value.get("created_at").is_some());
        assert!(value.get("updated_at").is_some());
    }

    #[test]
    fn new_session_timestamps_match() {
        let session = ChatSession::new("u1".into(), "speech".into(), DEFAULT_SESSION_TITLE.into());
        assert_eq!(session.created_at, session.updated_at);
        assert!(session.messages.is_empty());
    }

    #[test]
    fn new_message_ignores_client_id_and_keeps_timestamp() {
        let payload = json!({
            "id": "client-chosen",
            "type": "assistant",
            "content": "hi there",
            "timestamp": "2024-05-01T10:00:00Z"
        });
        let incoming: NewChatMessage = serde_json::from_value(payload).unwrap();
        let message = ChatMessage::from(incoming);

        assert_ne!(message.id, "client-chosen");
        assert_eq!(message.kind, MessageType::Assistant);
        assert_eq!(message.timestamp.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn naive_client_timestamp_is_read_as_utc() {
        let payload = json!({
            "type": "user",
            "content": "Test message content",
            "timestamp": "2024-05-01T10:00:00.123456"
        });
        let incoming: NewChatMessage = serde_json::from_value(payload).unwrap();
        assert_eq!(
            incoming.timestamp.unwrap().to_rfc3339(),
            "2024-05-01T10:00:00.123456+00:00"
        );

        let whole_seconds: NewChatMessage =
            serde_json::from_value(json!({ "type": "user", "content": "x", "timestamp": "2024-05-01T10:00:00" }))
                .unwrap();
        assert_eq!(whole_seconds.timestamp.unwrap().to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn offset_timestamp_is_normalised_to_utc() {
        let incoming: NewChatMessage = serde_json::from_value(
            json!({ "type": "user", "content": "x", "timestamp": "2024-05-01T12:00:00+02:00" }),
        )
        .unwrap();
        assert_eq!(incoming.timestamp.unwrap().to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn null_or_garbage_timestamp() {
        let null: NewChatMessage =
            serde_json::from_value(json!({ "type": "user", "content": "x", "timestamp": null })).unwrap();
        assert!(null.timestamp.is_none());

        let garbage = json!({ "type": "user", "content": "x", "timestamp": "yesterday" });
        assert!(serde_json::from_value::<NewChatMessage>(garbage).is_err());
    }

    #[test]
    fn constructed_timestamps_keep_microsecond_precision() {
        let session = ChatSession::new("u1".into(), "speech".into(), "t".into());
        let message = ChatMessage::new(MessageType::User, "hi".into());
        let check = StatusCheck::new("health-monitor".into());
        let record = GenerationRecord::new("u".into(), "speech".into(), "p".into(), None, "r".into());

        for ts in [session.created_at, message.timestamp, check.timestamp, record.timestamp] {
            assert_eq!(ts.nanosecond() % 1_000, 0);
        }
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let payload = json!({ "type": "system", "content": "x" });
        assert!(serde_json::from_value::<NewChatMessage>(payload).is_err());
    }

    #[test]
    fn generation_record_omits_absent_amendment() {
        let record = GenerationRecord::new("u".into(), "speech".into(), "p".into(), None, "r".into());
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("amendmentPrompt").is_none());
        assert_eq!(value["userId"], "u");
    }

    #[test]
    fn create_params_prefer_first_source() {
        let query = CreateSessionParams { user_id: Some("q".into()), ..Default::default() };
        let body = CreateSessionParams {
            user_id: Some("b".into()),
            task: Some("rebuttal".into()),
            title: None,
        };
        let merged = query.or(body);
        assert_eq!(merged.user_id.as_deref(), Some("q"));
        assert_eq!(merged.task.as_deref(), Some("rebuttal"));
        assert!(merged.title.is_none());
    }
}
