//! Shared API request/response types
//!
//! Wire shapes for the backend REST API. Server-assigned identifiers are
//! opaque strings. Timestamps are RFC 3339 UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ========================================
// Auth
// ========================================

/// Subscription plan tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Business,
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Free => write!(f, "free"),
            Plan::Pro => write!(f, "pro"),
            Plan::Business => write!(f, "business"),
        }
    }
}

/// POST /api/auth/verify request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Authenticated user, from /api/auth/verify and /api/auth/me
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
}

// ========================================
// Interviews & upload
// ========================================

/// POST /api/interviews/upload-url request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlRequest {
    pub filename: String,
    pub content_type: String,
    pub file_size_bytes: u64,
}

/// Signed upload slot: a write target plus the storage path to register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub storage_path: String,
}

/// POST /api/interviews request body (registers the record and triggers
/// processing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewCreate {
    pub filename: String,
    pub file_type: String,
    pub file_size_bytes: u64,
    pub storage_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
}

/// One interview record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewResponse {
    pub id: String,
    pub filename: String,
    pub file_type: String,
    pub file_size_bytes: u64,
    pub status: String,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Detected or user-supplied speaker in an interview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerResponse {
    pub id: String,
    pub speaker_label: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub is_interviewer: bool,
    pub auto_detected: bool,
}

/// GET /api/interviews/{id}: the record plus transcript, speakers, and
/// extracted insights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewDetailResponse {
    #[serde(flatten)]
    pub interview: InterviewResponse,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub metadata_json: Option<serde_json::Value>,
    #[serde(default)]
    pub speakers: Vec<SpeakerResponse>,
    #[serde(default)]
    pub insights: Vec<InsightResponse>,
}

// ========================================
// Themes
// ========================================

/// Whether a theme is part of the current synthesis or a previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeStatus {
    Active,
    Previous,
}

/// One extracted theme with aggregate sentiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub mention_count: u32,
    pub sentiment_positive: f32,
    pub sentiment_neutral: f32,
    pub sentiment_negative: f32,
    pub is_new: bool,
    pub status: ThemeStatus,
    pub created_at: DateTime<Utc>,
}

/// Named sub-theme reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubThemeRef {
    pub id: String,
    pub name: String,
}

/// GET /api/themes/{id}: the theme plus sub-themes and insights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeDetailResponse {
    #[serde(flatten)]
    pub theme: ThemeResponse,
    #[serde(default)]
    pub sub_themes: Vec<SubThemeRef>,
    #[serde(default)]
    pub insights: Vec<InsightResponse>,
}

/// PATCH /api/themes/{id} request body (rename)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeUpdate {
    pub name: String,
}

// ========================================
// Insights
// ========================================

/// One extracted (or manually added) insight. Quote offsets are stored
/// character positions into the transcript, so citation linking never
/// depends on substring search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightResponse {
    pub id: String,
    pub interview_id: String,
    #[serde(default)]
    pub theme_id: Option<String>,
    pub category: String,
    pub title: String,
    pub quote: String,
    #[serde(default)]
    pub quote_start_index: Option<u32>,
    #[serde(default)]
    pub quote_end_index: Option<u32>,
    pub confidence: f32,
    pub is_flagged: bool,
    pub is_dismissed: bool,
    pub is_manual: bool,
    #[serde(default)]
    pub theme_suggestion: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// POST /api/insights request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightCreate {
    pub interview_id: String,
    pub category: String,
    pub title: String,
    pub quote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_start_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_end_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
}

/// PATCH /api/insights/{id} request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
}

// ========================================
// Ask (Q&A)
// ========================================

/// POST /api/ask request body. `conversation_id` is attached on every
/// follow-up so the backend keeps multi-turn context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Source reference attached to an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskCitation {
    pub interview_id: String,
    pub filename: String,
    pub quote: String,
}

/// POST /api/ask response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<AskCitation>,
    #[serde(default)]
    pub suggested_followups: Vec<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn in the ask conversation, as held client-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    #[serde(default)]
    pub citations: Vec<AskCitation>,
    #[serde(default)]
    pub suggested_followups: Vec<String>,
}

/// GET /api/ask/conversations list entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored message inside a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    #[serde(default)]
    pub citations: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// GET /api/ask/conversations/{id} response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationDetail {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
}

// ========================================
// Billing
// ========================================

/// GET /api/billing/usage response: the current month's counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageResponse {
    pub month: NaiveDate,
    pub interviews_uploaded: u32,
    pub qa_queries_used: u32,
    pub storage_bytes_used: u64,
}

/// Usage counters nested in the limits response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageCounters {
    pub interviews_uploaded: u32,
    pub qa_queries_used: u32,
    pub storage_bytes_used: u64,
}

/// Per-plan monthly quotas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanLimits {
    pub interviews_per_month: u32,
    pub qa_queries_per_month: u32,
    pub storage_bytes: u64,
}

/// Quota headroom remaining this month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemainingQuota {
    pub interviews: u32,
    pub qa_queries: u32,
    pub storage_bytes: u64,
}

/// GET /api/billing/limits response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsResponse {
    pub plan: Plan,
    pub usage: UsageCounters,
    pub limits: PlanLimits,
    pub remaining: RemainingQuota,
}
