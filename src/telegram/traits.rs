//! Chat Gateway Trait Abstractions
//!
//! These traits enable full test coverage via MockChatGateway: the gate logic
//! never talks to the Telegram Bot API directly, only through this interface.

use async_trait::async_trait;
use std::fmt;

/// Telegram user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telegram chat identifier (group chats are negative numbers on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a message the bot has sent (needed to delete it later)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message_id: i64,
}

/// Snapshot of a user's profile at inspection time.
///
/// Fetched fresh for every inspection and never cached, so a profile fixed
/// between the mute and the retry is correctly detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    /// Display name as shown in the chat. May be empty or symbols-only.
    pub display_name: String,
    /// Whether at least one profile photo is visible to the bot.
    pub has_visible_photo: bool,
}

/// Membership status of a user within a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MembershipStatus {
    /// Parse a Bot API `status` string. Unknown statuses yield `None`.
    pub fn from_api(status: &str) -> Option<Self> {
        match status {
            "creator" => Some(Self::Creator),
            "administrator" => Some(Self::Administrator),
            "member" => Some(Self::Member),
            "restricted" => Some(Self::Restricted),
            "left" => Some(Self::Left),
            "kicked" => Some(Self::Banned),
            _ => None,
        }
    }
}

/// A chat_member update: some user's status changed in some chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipChange {
    pub chat: ChatId,
    pub user: UserId,
    /// Display name carried by the update itself (used for the mention;
    /// inspection always re-fetches the profile).
    pub display_name: String,
    pub old_status: MembershipStatus,
    pub new_status: MembershipStatus,
}

impl MembershipChange {
    /// True when the update denotes a transition INTO active membership.
    ///
    /// Leaves, bans, promotions and permission edits all return false.
    pub fn is_join(&self) -> bool {
        self.new_status == MembershipStatus::Member && self.old_status != MembershipStatus::Member
    }
}

/// An inline button press (callback query)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackAction {
    /// Callback query id, needed to acknowledge the press
    pub callback_id: String,
    /// The button's callback data (e.g. "verify_profile")
    pub action: String,
    /// The user who pressed the button
    pub user: UserId,
    /// The message carrying the button, if Telegram still has it
    pub message: Option<MessageRef>,
}

/// Inbound event delivered by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Membership(MembershipChange),
    Callback(CallbackAction),
}

/// An inline button attached to a notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAction {
    pub label: String,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Button that fires a callback query with this data
    Callback(String),
    /// Button that opens a URL
    Url(String),
}

impl InlineAction {
    pub fn callback(label: &str, data: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: ActionKind::Callback(data.to_string()),
        }
    }

    pub fn url(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: ActionKind::Url(url.to_string()),
        }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Chat gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),

    #[error("telegram api error: {0}")]
    Api(String),

    #[error("bot lacks required rights: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Chat gateway abstraction.
///
/// The gate logic depends only on this trait; `BotApiClient` implements it
/// over the Telegram Bot API and `MockChatGateway` replaces it in tests.
#[async_trait]
pub trait ChatGateway: Clone {
    /// Fetch a fresh profile snapshot for a user in a chat.
    async fn get_profile(&self, chat: &ChatId, user: &UserId) -> GatewayResult<UserProfile>;

    /// Apply a full permission set to a member.
    ///
    /// `allow_all = false` revokes every posting permission (restrict-all),
    /// `allow_all = true` grants them all back (restore-all). There are no
    /// partial edits. `until_epoch_secs` is the restriction expiry; `None`
    /// means no expiry.
    async fn restrict_member(
        &self,
        chat: &ChatId,
        user: &UserId,
        allow_all: bool,
        until_epoch_secs: Option<u64>,
    ) -> GatewayResult<()>;

    /// Post an HTML notice with inline buttons to a chat.
    async fn send_notice(
        &self,
        chat: &ChatId,
        html_text: &str,
        actions: &[InlineAction],
    ) -> GatewayResult<MessageRef>;

    /// Delete a message the bot sent earlier.
    async fn delete_message(&self, message: &MessageRef) -> GatewayResult<()>;

    /// Acknowledge a button press with a transient notice.
    ///
    /// `prominent = true` shows an alert dialog instead of a toast.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: &str,
        prominent: bool,
    ) -> GatewayResult<()>;

    /// Receive pending updates (blocks until updates arrive or the poll
    /// window elapses).
    async fn receive_updates(&self) -> GatewayResult<Vec<Update>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_status_from_api() {
        assert_eq!(
            MembershipStatus::from_api("member"),
            Some(MembershipStatus::Member)
        );
        assert_eq!(
            MembershipStatus::from_api("kicked"),
            Some(MembershipStatus::Banned)
        );
        assert_eq!(
            MembershipStatus::from_api("creator"),
            Some(MembershipStatus::Creator)
        );
        assert_eq!(MembershipStatus::from_api("weird"), None);
    }

    #[test]
    fn test_is_join_detects_new_member() {
        let change = MembershipChange {
            chat: ChatId(-100),
            user: UserId(42),
            display_name: "Alice".to_string(),
            old_status: MembershipStatus::Left,
            new_status: MembershipStatus::Member,
        };
        assert!(change.is_join());
    }

    #[test]
    fn test_is_join_ignores_non_joins() {
        // Promotion to admin
        let promotion = MembershipChange {
            chat: ChatId(-100),
            user: UserId(42),
            display_name: "Alice".to_string(),
            old_status: MembershipStatus::Member,
            new_status: MembershipStatus::Administrator,
        };
        assert!(!promotion.is_join());

        // Leaving the chat
        let leave = MembershipChange {
            chat: ChatId(-100),
            user: UserId(42),
            display_name: "Alice".to_string(),
            old_status: MembershipStatus::Member,
            new_status: MembershipStatus::Left,
        };
        assert!(!leave.is_join());

        // Ban
        let ban = MembershipChange {
            chat: ChatId(-100),
            user: UserId(42),
            display_name: "Alice".to_string(),
            old_status: MembershipStatus::Member,
            new_status: MembershipStatus::Banned,
        };
        assert!(!ban.is_join());
    }
}
