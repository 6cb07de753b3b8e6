//! Membership Gate
//!
//! Reacts to membership events in the guarded group:
//! - New member joins → inspect profile, mute incomplete profiles and post a
//!   notice with a re-verification button
//! - Re-verification button press → re-inspect fresh, restore rights on pass
//!
//! All side effects go through the `ChatGateway` trait; no state survives
//! between events. The platform's restriction state is the only ground
//! truth, never shadowed locally.

use super::inspector::{ProfileInspector, Verdict};
use super::traits::*;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

/// Callback data carried by the re-verification button.
pub const VERIFY_PROFILE_ACTION: &str = "verify_profile";

/// Restriction expiry applied on a failed inspection, in seconds.
///
/// Effectively indefinite: the member stays muted until they press the
/// re-verification button. A short grace window would defeat the gate.
pub const DEFAULT_RESTRICTION_SECS: u64 = 9_999_999;

/// Gate configuration
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Support handle used verbatim in user-facing text (no leading @)
    pub support_contact: String,
    /// How long a failed member stays restricted before Telegram would
    /// auto-expire the mute
    pub restriction_duration: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            support_contact: "support".to_string(),
            restriction_duration: Duration::from_secs(DEFAULT_RESTRICTION_SECS),
        }
    }
}

/// Membership gate: the verification-and-restriction state machine.
///
/// Constructed with a gateway and an inspector at composition time; holds no
/// per-user state. Each invocation is self-contained given its input event,
/// so independent users' events may be handled concurrently.
pub struct MembershipGate<G: ChatGateway> {
    gateway: G,
    inspector: ProfileInspector,
    config: GateConfig,
}

impl<G: ChatGateway> MembershipGate<G> {
    pub fn new(gateway: G, inspector: ProfileInspector, config: GateConfig) -> Self {
        Self {
            gateway,
            inspector,
            config,
        }
    }

    /// Run the gate event loop.
    ///
    /// Receives updates from the gateway and dispatches them. A daemon must
    /// survive individual handler failures, so errors are logged, never
    /// propagated out of the loop.
    pub async fn run(&self) -> GatewayResult<()> {
        let mut poll_interval = tokio::time::interval(tokio::time::Duration::from_millis(200));

        loop {
            poll_interval.tick().await;

            let updates = match self.gateway.receive_updates().await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("error receiving updates, will retry: {}", e);
                    continue;
                }
            };

            for update in updates {
                if let Err(e) = self.handle_update(update).await {
                    warn!("error handling update: {}", e);
                }
            }
        }
    }

    /// Dispatch a single inbound update to its handler.
    pub async fn handle_update(&self, update: Update) -> GatewayResult<()> {
        match update {
            Update::Membership(change) => self.handle_member_joined(&change).await,
            Update::Callback(action) => self.handle_verification_request(&action).await,
        }
    }

    /// Handle a membership change: gate newly joined members.
    async fn handle_member_joined(&self, change: &MembershipChange) -> GatewayResult<()> {
        // Only transitions INTO active membership matter (not leaves, bans,
        // promotions or permission edits)
        if !change.is_join() {
            return Ok(());
        }

        info!(
            "new member {} ({}) in chat {}",
            change.display_name, change.user, change.chat
        );

        let verdict = self.inspect_member(&change.chat, &change.user).await;

        if verdict.passed {
            info!("member {} passed profile inspection", change.user);
            return Ok(());
        }

        info!(
            "member {} failed profile inspection: {}. restricting.",
            change.user,
            verdict.reasons_text()
        );

        // 1. Mute with a far-future expiry. The member stays restricted
        //    until they explicitly re-request verification.
        let until = now_epoch_secs().saturating_add(self.config.restriction_duration.as_secs());
        if let Err(e) = self
            .gateway
            .restrict_member(&change.chat, &change.user, false, Some(until))
            .await
        {
            // Fail closed: no notice goes out unless the mute applied.
            // Usually means the bot lacks admin rights in this chat.
            error!(
                "failed to restrict {} in chat {}: {}",
                change.user, change.chat, e
            );
            return Ok(());
        }

        // 2. Post the notice with the re-verification button and support
        //    link. Best-effort: the restriction stands even if this fails.
        let text = msg_incomplete_profile(
            &change.user,
            &change.display_name,
            &verdict.reasons_text(),
        );
        let actions = [
            InlineAction::callback("✅ I've updated my profile", VERIFY_PROFILE_ACTION),
            InlineAction::url(
                "Support",
                &format!("https://t.me/{}", self.config.support_contact),
            ),
        ];

        if let Err(e) = self.gateway.send_notice(&change.chat, &text, &actions).await {
            warn!(
                "failed to send profile notice to chat {}: {}",
                change.chat, e
            );
        }

        Ok(())
    }

    /// Handle a press on the re-verification button.
    ///
    /// Re-entrant: a user may retry any number of times; each attempt
    /// re-fetches the profile and is independent of previous attempts.
    async fn handle_verification_request(&self, action: &CallbackAction) -> GatewayResult<()> {
        if action.action != VERIFY_PROFILE_ACTION {
            return Ok(());
        }

        // The notice message ties the press to the chat it was posted in
        let notice = match &action.message {
            Some(message) => *message,
            None => {
                warn!(
                    "verification callback from {} without originating message",
                    action.user
                );
                return Ok(());
            }
        };

        info!(
            "member {} requested re-verification in chat {}",
            action.user, notice.chat
        );

        // Never reuse the stale profile from join time
        let verdict = self.inspect_member(&notice.chat, &action.user).await;

        if verdict.passed {
            info!("member {} passed re-verification, restoring", action.user);

            // 1. Restore full permissions, no expiry
            if let Err(e) = self
                .gateway
                .restrict_member(&notice.chat, &action.user, true, None)
                .await
            {
                error!(
                    "failed to restore {} in chat {}: {}",
                    action.user, notice.chat, e
                );
                return Ok(());
            }

            // 2. Transient success notice
            if let Err(e) = self
                .gateway
                .answer_callback(&action.callback_id, MSG_VERIFIED, true)
                .await
            {
                warn!(
                    "failed to acknowledge verification for {}: {}",
                    action.user, e
                );
            }

            // 3. Remove the original notice. If this fails the notice is
            //    abandoned in place, no retry.
            if let Err(e) = self.gateway.delete_message(&notice).await {
                warn!(
                    "failed to delete notice {} in chat {}: {}",
                    notice.message_id, notice.chat, e
                );
            }
        } else {
            info!(
                "member {} failed re-verification: {}",
                action.user,
                verdict.reasons_text()
            );

            // No restriction-state change; the notice stays in place
            let text = msg_still_incomplete(&self.config.support_contact);
            if let Err(e) = self
                .gateway
                .answer_callback(&action.callback_id, &text, true)
                .await
            {
                warn!(
                    "failed to acknowledge failed verification for {}: {}",
                    action.user, e
                );
            }
        }

        Ok(())
    }

    /// Fetch a fresh profile and inspect it.
    ///
    /// Fetch failures fail OPEN: when the inspection mechanism itself is
    /// degraded the member is treated as verified rather than locked out.
    async fn inspect_member(&self, chat: &ChatId, user: &UserId) -> Verdict {
        match self.gateway.get_profile(chat, user).await {
            Ok(profile) => self.inspector.inspect(&profile),
            Err(e) => {
                warn!(
                    "profile fetch failed for {} in chat {}, treating as verified: {}",
                    user, chat, e
                );
                Verdict::pass()
            }
        }
    }
}

fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

// ============================================================================
// User-Facing Message Templates
// ============================================================================

/// Notice posted after a mute, mentioning the user by identity link.
///
/// # Arguments
/// * `user` - The muted member (mention target)
/// * `display_name` - Name shown in the mention
/// * `reasons` - Failure reasons already joined for display
pub fn msg_incomplete_profile(user: &UserId, display_name: &str, reasons: &str) -> String {
    format!(
        "Hello, <a href=\"tg://user?id={}\">{}</a>! Welcome.\n\n\
         We noticed your profile is incomplete ({}).\n\n\
         Please update your profile and tap the button below to unlock your access.",
        user.0,
        escape_html(display_name),
        reasons
    )
}

/// Transient acknowledgment after a successful re-verification.
pub const MSG_VERIFIED: &str = "✅ Profile verified! Your access has been restored.";

/// Transient acknowledgment after a failed re-verification.
pub fn msg_still_incomplete(support_contact: &str) -> String {
    format!(
        "Oops! Your profile still looks incomplete. \
         Make sure you added a PUBLIC photo and a name with letters, then try again.\n\n\
         If this is a mistake, contact @{}",
        support_contact
    )
}

/// Minimal HTML escaping for names interpolated into parse_mode=HTML text.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
