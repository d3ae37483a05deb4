//! Domain models.
//!
//! Row types serialize with the column names the frontend already reads
//! (`file_name`, `source_count`, ...). Request types deserialize the camelCase
//! bodies the frontend sends.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;

// =============================================================================
// USERS
// =============================================================================

/// Public view of a user row (never carries the password hash).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub avatar_url: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// User id and password hash, used only for credential checks.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

// =============================================================================
// NOTEBOOKS, SOURCES, NOTES
// =============================================================================

/// A user-owned folder of sources and notes, mirrored as a remote workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notebook {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    /// Remote workspace slug. `None` only for rows created before workspaces existed.
    pub slug: Option<String>,
    pub source_count: i64,
    pub created_at: DateTime<Utc>,
}

/// An uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub file_url: String,
    /// Denormalized notebook title.
    pub folder_name: String,
    /// Remote document location, when the document was ingested.
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to record a source.
#[derive(Debug, Clone)]
pub struct CreateSourceRequest {
    pub user_id: i64,
    pub file_name: String,
    pub file_url: String,
    pub folder_name: String,
    pub location: Option<String>,
}

/// A user note, optionally generated by the workspace chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub folder_name: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to record a note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub folder_name: String,
}

/// Note as it appears in an exported notebook bundle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Source as it appears in an exported notebook bundle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceDraft {
    #[serde(default, alias = "label", alias = "fileName")]
    pub file_name: String,
    #[serde(default, alias = "url", alias = "fileUrl")]
    pub file_url: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// Rows written by a notebook import.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ImportedBundle {
    pub notes: Vec<Note>,
    pub sources: Vec<Source>,
}

/// Preset prompts for generated notes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    StudyGuide,
    Briefing,
    Faq,
    Timeline,
}

impl NoteKind {
    /// Title given to the generated note.
    pub fn title(self) -> &'static str {
        match self {
            NoteKind::StudyGuide => "Study guide",
            NoteKind::Briefing => "Briefing document",
            NoteKind::Faq => "Frequently asked questions",
            NoteKind::Timeline => "Timeline",
        }
    }

    /// Prompt sent to the workspace chat.
    pub fn prompt(self) -> &'static str {
        match self {
            NoteKind::StudyGuide => {
                "Write a study guide covering every source document in this workspace, including any annotations."
            }
            NoteKind::Briefing => {
                "Summarize the content of each source document in this workspace as a short briefing."
            }
            NoteKind::Faq => {
                "For each source document in this workspace, list the questions a reader is likely to ask about it, with answers."
            }
            NoteKind::Timeline => {
                "Summarize every conversation, document upload and annotation in this workspace since it was created as a detailed timeline."
            }
        }
    }
}

impl std::str::FromStr for NoteKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "study_guide" => Ok(Self::StudyGuide),
            "briefing" => Ok(Self::Briefing),
            "faq" => Ok(Self::Faq),
            "timeline" => Ok(Self::Timeline),
            _ => Err(crate::Error::InvalidInput(format!("unknown note kind: {s}"))),
        }
    }
}

// =============================================================================
// CHAT
// =============================================================================

/// Workspace returned by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workspace {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub slug: String,
}

impl Workspace {
    /// A slug must be one URL path segment: ASCII letters, digits, `-` and `_`.
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug.len() <= 255
            && slug
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }
}

/// Document ingested by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedDocument {
    pub location: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Message sent to a workspace chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceChatRequest {
    pub message: String,
    #[serde(default = "default_chat_mode")]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
}

fn default_chat_mode() -> String {
    defaults::CHAT_MODE.to_string()
}

/// Reply of a workspace chat, passed through to the client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceChatResponse {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text_response: Option<String>,
    #[serde(default)]
    pub sources: Vec<serde_json::Value>,
    #[serde(default)]
    pub close: bool,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<serde_json::Value>,
}

impl WorkspaceChatResponse {
    /// The remote service reports failures as `type: "abort"` with an error text.
    pub fn abort_reason(&self) -> Option<String> {
        if self.kind.as_deref() != Some("abort") {
            return None;
        }
        Some(match &self.error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "chat aborted".to_string(),
        })
    }
}

/// Query for a workspace chat history.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryQuery {
    pub limit: Option<i64>,
    pub order_by: Option<String>,
    pub api_session_id: Option<String>,
}

/// One turn of a legacy conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}

// =============================================================================
// FORUM
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForumPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: String,
    /// Author email.
    pub created_by: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForumComment {
    pub id: i64,
    pub post_id: i64,
    pub content: String,
    pub is_anonymous: bool,
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub screenshot_url: Option<String>,
    pub email_updates: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// CALENDAR
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub schedule: String,
}

// =============================================================================
// ADMIN STATS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TotalCounts {
    pub user_count: i64,
    pub note_count: i64,
    pub notebook_count: i64,
    pub file_count: i64,
    pub feedback_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DailyStats {
    pub users: Vec<DailyCount>,
    pub notes: Vec<DailyCount>,
    pub files: Vec<DailyCount>,
    pub feedback: Vec<DailyCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopUser {
    pub id: i64,
    pub email: String,
    pub note_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationCount {
    pub location: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailUpdatesCount {
    pub email_updates: bool,
    pub count: i64,
}

/// Everything the admin dashboard charts.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_counts: TotalCounts,
    pub daily_stats: DailyStats,
    pub top_users_by_notes: Vec<TopUser>,
    pub file_location_distribution: Vec<LocationCount>,
    pub feedback_email_updates: Vec<EmailUpdatesCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_created_at_as_camel_case() {
        let user = User {
            id: 1,
            email: "a@b.co".to_string(),
            avatar_url: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_note_kind_from_str() {
        assert_eq!("study_guide".parse::<NoteKind>().unwrap(), NoteKind::StudyGuide);
        assert_eq!(" FAQ ".parse::<NoteKind>().unwrap(), NoteKind::Faq);
        assert!(matches!(
            "poem".parse::<NoteKind>(),
            Err(crate::Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_workspace_slug_is_single_segment() {
        assert!(Workspace::is_valid_slug("biology"));
        assert!(Workspace::is_valid_slug("cell-bio_2"));
        for slug in ["", "../x?", "a/b", "a%2Fb", "a b", "a.b", "笔记"] {
            assert!(!Workspace::is_valid_slug(slug), "{slug:?}");
        }
    }

    #[test]
    fn test_source_draft_accepts_frontend_aliases() {
        let draft: SourceDraft =
            serde_json::from_str(r#"{"label": "paper.pdf", "url": "http://x/paper.pdf"}"#).unwrap();
        assert_eq!(draft.file_name, "paper.pdf");
        assert_eq!(draft.file_url, "http://x/paper.pdf");
        assert!(draft.location.is_none());
    }

    #[test]
    fn test_note_kind_parses_snake_case() {
        let kind: NoteKind = serde_json::from_str(r#""study_guide""#).unwrap();
        assert_eq!(kind, NoteKind::StudyGuide);
        assert_eq!(kind.title(), "Study guide");
        assert!(!NoteKind::Timeline.prompt().is_empty());
    }

    #[test]
    fn test_chat_request_defaults_mode() {
        let req: WorkspaceChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.mode, "chat");
        assert!(req.session_id.is_none());
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("sessionId"));
    }

    #[test]
    fn test_chat_response_abort_reason() {
        let resp: WorkspaceChatResponse = serde_json::from_str(
            r#"{"type": "abort", "textResponse": null, "error": "No workspace"}"#,
        )
        .unwrap();
        assert_eq!(resp.abort_reason().as_deref(), Some("No workspace"));

        let ok: WorkspaceChatResponse =
            serde_json::from_str(r#"{"type": "textResponse", "textResponse": "hello", "error": null}"#)
                .unwrap();
        assert!(ok.abort_reason().is_none());
        assert_eq!(ok.text_response.as_deref(), Some("hello"));
    }

    #[test]
    fn test_admin_stats_shape() {
        let json = serde_json::to_value(AdminStats::default()).unwrap();
        assert!(json["totalCounts"]["userCount"].is_number());
        assert!(json["dailyStats"]["users"].is_array());
        assert!(json["topUsersByNotes"].is_array());
        assert!(json["fileLocationDistribution"].is_array());
        assert!(json["feedbackEmailUpdates"].is_array());
    }
}
