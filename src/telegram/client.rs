//! Telegram Bot API Client
//!
//! Thin HTTP implementation of `ChatGateway` over the Bot API. Event ingress
//! is getUpdates long polling; the client tracks the update offset so each
//! update is delivered once.

use super::api;
use super::traits::*;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Long-poll window for getUpdates, in seconds.
const LONG_POLL_SECS: u64 = 25;

/// Update kinds the bot subscribes to. chat_member updates are only
/// delivered when explicitly requested.
const ALLOWED_UPDATES: &[&str] = &["chat_member", "callback_query"];

/// Telegram Bot API client
#[derive(Clone)]
pub struct BotApiClient {
    http: reqwest::Client,
    base_url: String,
    offset: Arc<Mutex<i64>>,
}

impl BotApiClient {
    /// Create a client for the given bot token.
    ///
    /// `api_url` is normally `https://api.telegram.org`; overridable for
    /// local Bot API servers.
    pub fn new(token: &str, api_url: &str) -> Self {
        let base_url = format!("{}/bot{}", api_url.trim_end_matches('/'), token);

        // Read timeout must outlast the long-poll window
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_SECS + 15))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url,
            offset: Arc::new(Mutex::new(0)),
        }
    }

    /// Call a Bot API method and unwrap its response envelope.
    async fn call<T, P>(&self, method: &str, payload: &P) -> GatewayResult<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let body: api::ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if body.ok {
            body.result
                .ok_or_else(|| GatewayError::Api(format!("{}: missing result", method)))
        } else {
            Err(api_error(method, body.error_code, body.description))
        }
    }
}

/// Map a Bot API failure envelope to a gateway error.
fn api_error(method: &str, error_code: Option<i64>, description: Option<String>) -> GatewayError {
    let description = description.unwrap_or_else(|| "unknown error".to_string());
    match error_code {
        Some(403) => GatewayError::Forbidden(format!("{}: {}", method, description)),
        Some(400) if description.contains("not found") => {
            GatewayError::NotFound(format!("{}: {}", method, description))
        }
        _ => GatewayError::Api(format!("{}: {}", method, description)),
    }
}

/// Convert one raw update into a gate event.
///
/// Updates the bot does not care about (unknown statuses, callback queries
/// without data) yield `None` and are skipped.
fn convert_update(update: api::ApiUpdate) -> Option<Update> {
    if let Some(change) = update.chat_member {
        let old_status = MembershipStatus::from_api(&change.old_chat_member.status)?;
        let new_status = MembershipStatus::from_api(&change.new_chat_member.status)?;
        return Some(Update::Membership(MembershipChange {
            chat: ChatId(change.chat.id),
            user: UserId(change.new_chat_member.user.id),
            display_name: change.new_chat_member.user.first_name,
            old_status,
            new_status,
        }));
    }

    if let Some(query) = update.callback_query {
        return Some(Update::Callback(CallbackAction {
            callback_id: query.id,
            action: query.data?,
            user: UserId(query.from.id),
            message: query.message.map(|message| MessageRef {
                chat: ChatId(message.chat.id),
                message_id: message.message_id,
            }),
        }));
    }

    None
}

#[async_trait]
impl ChatGateway for BotApiClient {
    async fn get_profile(&self, chat: &ChatId, user: &UserId) -> GatewayResult<UserProfile> {
        let member: api::ChatMember = self
            .call(
                "getChatMember",
                &api::GetChatMember {
                    chat_id: chat.0,
                    user_id: user.0,
                },
            )
            .await?;

        let photos: api::UserProfilePhotos = self
            .call(
                "getUserProfilePhotos",
                &api::GetUserProfilePhotos {
                    user_id: user.0,
                    limit: 1,
                },
            )
            .await?;

        Ok(UserProfile {
            user_id: *user,
            display_name: member.user.first_name,
            has_visible_photo: photos.total_count > 0,
        })
    }

    async fn restrict_member(
        &self,
        chat: &ChatId,
        user: &UserId,
        allow_all: bool,
        until_epoch_secs: Option<u64>,
    ) -> GatewayResult<()> {
        let permissions = if allow_all {
            api::ChatPermissions::all()
        } else {
            api::ChatPermissions::none()
        };

        let _: bool = self
            .call(
                "restrictChatMember",
                &api::RestrictChatMember {
                    chat_id: chat.0,
                    user_id: user.0,
                    permissions,
                    until_date: until_epoch_secs,
                },
            )
            .await?;
        Ok(())
    }

    async fn send_notice(
        &self,
        chat: &ChatId,
        html_text: &str,
        actions: &[InlineAction],
    ) -> GatewayResult<MessageRef> {
        // One button per row, matching how the notice reads best on mobile
        let inline_keyboard = actions
            .iter()
            .map(|action| {
                let (callback_data, url) = match &action.kind {
                    ActionKind::Callback(data) => (Some(data.clone()), None),
                    ActionKind::Url(url) => (None, Some(url.clone())),
                };
                vec![api::InlineKeyboardButton {
                    text: action.label.clone(),
                    callback_data,
                    url,
                }]
            })
            .collect();

        let message: api::MessageInfo = self
            .call(
                "sendMessage",
                &api::SendMessage {
                    chat_id: chat.0,
                    text: html_text.to_string(),
                    parse_mode: "HTML",
                    reply_markup: api::InlineKeyboardMarkup { inline_keyboard },
                },
            )
            .await?;

        Ok(MessageRef {
            chat: ChatId(message.chat.id),
            message_id: message.message_id,
        })
    }

    async fn delete_message(&self, message: &MessageRef) -> GatewayResult<()> {
        let _: bool = self
            .call(
                "deleteMessage",
                &api::DeleteMessage {
                    chat_id: message.chat.0,
                    message_id: message.message_id,
                },
            )
            .await?;
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: &str,
        prominent: bool,
    ) -> GatewayResult<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &api::AnswerCallbackQuery {
                    callback_query_id: callback_id.to_string(),
                    text: text.to_string(),
                    show_alert: prominent,
                },
            )
            .await?;
        Ok(())
    }

    async fn receive_updates(&self) -> GatewayResult<Vec<Update>> {
        let offset = *self.offset.lock().unwrap();

        let raw: Vec<api::ApiUpdate> = self
            .call(
                "getUpdates",
                &api::GetUpdates {
                    offset,
                    timeout: LONG_POLL_SECS,
                    allowed_updates: ALLOWED_UPDATES,
                },
            )
            .await?;

        let mut next_offset = offset;
        let mut updates = Vec::with_capacity(raw.len());
        for update in raw {
            next_offset = next_offset.max(update.update_id + 1);
            if let Some(update) = convert_update(update) {
                updates.push(update);
            }
        }

        *self.offset.lock().unwrap() = next_offset;
        Ok(updates)
    }
}
