//! Porteiro - Telegram Profile Gate Bot
//!
//! A moderation bot that inspects newly joined members' profiles, mutes
//! incomplete ones until they self-certify via a button press, and restores
//! posting rights once the profile re-passes inspection.
//!
//! Key principles:
//! - Stateless between events (every decision rebuilt from live profile data)
//! - Telegram is the only source of truth for restriction state
//! - Fail open when the inspection mechanism itself is degraded

pub mod telegram;
