//! Telegram Bot API Wire Types
//!
//! Serde mapping for the subset of the Bot API the gate drives. Field names
//! follow the wire format exactly; anything the bot does not read is simply
//! not declared.

use serde::{Deserialize, Serialize};

/// Envelope every Bot API method returns
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ApiUpdate {
    pub update_id: i64,
    pub chat_member: Option<ChatMemberUpdated>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    pub old_chat_member: ChatMember,
    pub new_chat_member: ChatMember,
}

#[derive(Debug, Deserialize)]
pub struct ChatMember {
    pub status: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<MessageInfo>,
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageInfo {
    pub message_id: i64,
    pub chat: Chat,
}

#[derive(Debug, Deserialize)]
pub struct UserProfilePhotos {
    pub total_count: i64,
}

/// Full permission set for restrictChatMember.
///
/// The gate only ever issues all-false (restrict-all) or all-true
/// (restore-all); there are no partial edits.
#[derive(Debug, Serialize)]
pub struct ChatPermissions {
    pub can_send_messages: bool,
    pub can_send_audios: bool,
    pub can_send_documents: bool,
    pub can_send_photos: bool,
    pub can_send_videos: bool,
    pub can_send_video_notes: bool,
    pub can_send_voice_notes: bool,
    pub can_send_polls: bool,
    pub can_send_other_messages: bool,
    pub can_add_web_page_previews: bool,
    pub can_invite_users: bool,
}

impl ChatPermissions {
    pub fn none() -> Self {
        Self::uniform(false)
    }

    pub fn all() -> Self {
        Self::uniform(true)
    }

    fn uniform(allow: bool) -> Self {
        Self {
            can_send_messages: allow,
            can_send_audios: allow,
            can_send_documents: allow,
            can_send_photos: allow,
            can_send_videos: allow,
            can_send_video_notes: allow,
            can_send_voice_notes: allow,
            can_send_polls: allow,
            can_send_other_messages: allow,
            can_add_web_page_previews: allow,
            can_invite_users: allow,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// ----------------------------------------------------------------------------
// Method payloads
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GetChatMember {
    pub chat_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct GetUserProfilePhotos {
    pub user_id: i64,
    pub limit: u8,
}

#[derive(Debug, Serialize)]
pub struct RestrictChatMember {
    pub chat_id: i64,
    pub user_id: i64,
    pub permissions: ChatPermissions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until_date: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    pub parse_mode: &'static str,
    pub reply_markup: InlineKeyboardMarkup,
}

#[derive(Debug, Serialize)]
pub struct DeleteMessage {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQuery {
    pub callback_query_id: String,
    pub text: String,
    pub show_alert: bool,
}

#[derive(Debug, Serialize)]
pub struct GetUpdates {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}
