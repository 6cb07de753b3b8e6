//! Mock Chat Gateway for Testing
//!
//! Provides MockChatGateway so the gate logic can be exercised without the
//! real Telegram Bot API. Records every side effect for assertions and can
//! inject failures per operation kind.

use super::traits::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock chat gateway for testing
#[derive(Clone)]
pub struct MockChatGateway {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    profiles: HashMap<(i64, i64), UserProfile>,
    restrictions: Vec<RestrictionCommand>,
    notices: Vec<SentNotice>,
    deleted_messages: Vec<MessageRef>,
    acknowledgments: Vec<Acknowledgment>,
    incoming_updates: Vec<Update>,
    next_message_id: i64,
    fail_profile_fetches: bool,
    fail_restrictions: bool,
    fail_sends: bool,
    fail_deletes: bool,
}

/// A recorded restrict/restore command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionCommand {
    pub chat: ChatId,
    pub user: UserId,
    pub allow_all: bool,
    pub until_epoch_secs: Option<u64>,
}

/// A recorded notice message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotice {
    pub message: MessageRef,
    pub text: String,
    pub actions: Vec<InlineAction>,
}

/// A recorded callback acknowledgment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgment {
    pub callback_id: String,
    pub text: String,
    pub prominent: bool,
}

impl MockChatGateway {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Configure the profile returned for (chat, user)
    pub fn set_profile(&self, chat: ChatId, user: UserId, profile: UserProfile) {
        let mut state = self.state.lock().unwrap();
        state.profiles.insert((chat.0, user.0), profile);
    }

    /// Force get_profile to fail with a network error
    pub fn fail_profile_fetches(&self, fail: bool) {
        self.state.lock().unwrap().fail_profile_fetches = fail;
    }

    /// Force restrict_member to fail (e.g. bot lost admin rights)
    pub fn fail_restrictions(&self, fail: bool) {
        self.state.lock().unwrap().fail_restrictions = fail;
    }

    /// Force send_notice to fail
    pub fn fail_sends(&self, fail: bool) {
        self.state.lock().unwrap().fail_sends = fail;
    }

    /// Force delete_message to fail
    pub fn fail_deletes(&self, fail: bool) {
        self.state.lock().unwrap().fail_deletes = fail;
    }

    /// Queue an update for receive_updates
    pub fn add_incoming_update(&self, update: Update) {
        self.state.lock().unwrap().incoming_updates.push(update);
    }

    /// Restriction commands issued so far
    pub fn restrictions(&self) -> Vec<RestrictionCommand> {
        self.state.lock().unwrap().restrictions.clone()
    }

    /// Notices sent so far
    pub fn notices(&self) -> Vec<SentNotice> {
        self.state.lock().unwrap().notices.clone()
    }

    /// Messages deleted so far
    pub fn deleted_messages(&self) -> Vec<MessageRef> {
        self.state.lock().unwrap().deleted_messages.clone()
    }

    /// Callback acknowledgments issued so far
    pub fn acknowledgments(&self) -> Vec<Acknowledgment> {
        self.state.lock().unwrap().acknowledgments.clone()
    }

    /// Clear all recorded state
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        *state = MockState::default();
    }
}

impl Default for MockChatGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatGateway for MockChatGateway {
    async fn get_profile(&self, chat: &ChatId, user: &UserId) -> GatewayResult<UserProfile> {
        let state = self.state.lock().unwrap();
        if state.fail_profile_fetches {
            return Err(GatewayError::Network("connection reset".to_string()));
        }
        state
            .profiles
            .get(&(chat.0, user.0))
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("user {} in chat {}", user, chat)))
    }

    async fn restrict_member(
        &self,
        chat: &ChatId,
        user: &UserId,
        allow_all: bool,
        until_epoch_secs: Option<u64>,
    ) -> GatewayResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_restrictions {
            return Err(GatewayError::Forbidden(
                "not enough rights to restrict/unrestrict chat member".to_string(),
            ));
        }
        state.restrictions.push(RestrictionCommand {
            chat: *chat,
            user: *user,
            allow_all,
            until_epoch_secs,
        });
        Ok(())
    }

    async fn send_notice(
        &self,
        chat: &ChatId,
        html_text: &str,
        actions: &[InlineAction],
    ) -> GatewayResult<MessageRef> {
        let mut state = self.state.lock().unwrap();
        if state.fail_sends {
            return Err(GatewayError::Api("message send failed".to_string()));
        }
        state.next_message_id += 1;
        let message = MessageRef {
            chat: *chat,
            message_id: state.next_message_id,
        };
        state.notices.push(SentNotice {
            message,
            text: html_text.to_string(),
            actions: actions.to_vec(),
        });
        Ok(message)
    }

    async fn delete_message(&self, message: &MessageRef) -> GatewayResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_deletes {
            return Err(GatewayError::Api(
                "message to delete not found".to_string(),
            ));
        }
        state.deleted_messages.push(*message);
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: &str,
        prominent: bool,
    ) -> GatewayResult<()> {
        let mut state = self.state.lock().unwrap();
        state.acknowledgments.push(Acknowledgment {
            callback_id: callback_id.to_string(),
            text: text.to_string(),
            prominent,
        });
        Ok(())
    }

    async fn receive_updates(&self) -> GatewayResult<Vec<Update>> {
        let mut state = self.state.lock().unwrap();
        let updates = state.incoming_updates.drain(..).collect();
        Ok(updates)
    }
}
