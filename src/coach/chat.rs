//! Coach chat - transcript, staged attachments and in-flight replies
//!
//! At most one request is in flight. Each request gets an id; a reply is
//! applied only if its id is still the in-flight one, so replies that
//! arrive after `teardown` are dropped. Messages are shared, so handing the
//! transcript to a request never copies attachment payloads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::Coach;
use super::attachment::{Attachment, AttachmentError, AttachmentKind};
use super::prompts::{ANALYZE_IMAGE, ANALYZE_VIDEO, CHAT_ERROR_FALLBACK, GREETING};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub image: Option<Attachment>,
    pub video: Option<Attachment>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn assistant(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            image: None,
            video: None,
            timestamp,
        }
    }
}

/// Everything needed to make one gateway call
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub request_id: Uuid,
    /// Transcript as it was before this message
    pub history: Vec<Arc<ChatMessage>>,
    pub prompt: String,
    pub image: Option<Attachment>,
    pub video: Option<Attachment>,
}

#[derive(Debug, Clone)]
pub struct ChatState {
    messages: Vec<Arc<ChatMessage>>,
    staged_image: Option<Attachment>,
    staged_video: Option<Attachment>,
    in_flight: Option<Uuid>,
}

impl ChatState {
    /// Transcript seeded with the greeting
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            messages: vec![Arc::new(ChatMessage::assistant(GREETING, now))],
            staged_image: None,
            staged_video: None,
            in_flight: None,
        }
    }

    pub fn messages(&self) -> &[Arc<ChatMessage>] {
        &self.messages
    }

    pub fn staged_image(&self) -> Option<&Attachment> {
        self.staged_image.as_ref()
    }

    pub fn staged_video(&self) -> Option<&Attachment> {
        self.staged_video.as_ref()
    }

    /// Stage an attachment, replacing any earlier one of the same kind.
    /// Oversized payloads are rejected and the staging area is unchanged.
    pub fn stage(&mut self, attachment: Attachment) -> Result<(), AttachmentError> {
        attachment.validate()?;
        let slot = match attachment.kind() {
            AttachmentKind::Image => &mut self.staged_image,
            AttachmentKind::Video => &mut self.staged_video,
        };
        if slot.replace(attachment).is_some() {
            debug!("Replaced staged attachment");
        }
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.staged_image = None;
    }

    pub fn clear_video(&mut self) {
        self.staged_video = None;
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<Uuid> {
        self.in_flight
    }

    /// Record the user's message and hand back the request to dispatch.
    /// Returns `None` when there is nothing to send or a reply is pending.
    /// Staged attachments are cleared either way once a message goes out.
    pub fn begin_send(&mut self, input: &str, now: DateTime<Utc>) -> Option<OutboundMessage> {
        if self.is_loading() {
            debug!("Send ignored, reply pending");
            return None;
        }
        let blank = input.trim().is_empty();
        if blank && self.staged_image.is_none() && self.staged_video.is_none() {
            return None;
        }

        let image = self.staged_image.take();
        let video = self.staged_video.take();
        let history = self.messages.clone();

        self.messages.push(Arc::new(ChatMessage {
            role: Role::User,
            text: input.to_string(),
            image: image.clone(),
            video: video.clone(),
            timestamp: now,
        }));

        let prompt = if !blank {
            input.to_string()
        } else if video.is_some() {
            ANALYZE_VIDEO.to_string()
        } else {
            ANALYZE_IMAGE.to_string()
        };

        let request_id = Uuid::new_v4();
        self.in_flight = Some(request_id);
        info!(
            %request_id,
            image = image.is_some(),
            video = video.is_some(),
            "Chat message sent"
        );

        Some(OutboundMessage {
            request_id,
            history,
            prompt,
            image,
            video,
        })
    }

    /// Apply a reply. Returns false (and drops it) when `request_id` is
    /// not the in-flight request.
    pub fn complete(&mut self, request_id: Uuid, reply: String, now: DateTime<Utc>) -> bool {
        if self.in_flight != Some(request_id) {
            warn!(%request_id, "Discarding stale reply");
            return false;
        }
        self.in_flight = None;
        self.messages.push(Arc::new(ChatMessage::assistant(reply, now)));
        true
    }

    /// Forget the in-flight request so a late reply is discarded
    pub fn teardown(&mut self) -> Option<Uuid> {
        self.in_flight.take()
    }
}

/// A gateway call running on its own task
#[derive(Debug)]
pub struct PendingReply {
    request_id: Uuid,
    handle: JoinHandle<String>,
}

impl PendingReply {
    pub fn spawn(coach: Coach, outbound: OutboundMessage) -> Self {
        let request_id = outbound.request_id;
        let handle = tokio::spawn(async move {
            coach
                .generate_ai_response(
                    &outbound.history,
                    &outbound.prompt,
                    outbound.image.as_ref(),
                    outbound.video.as_ref(),
                )
                .await
        });
        Self { request_id, handle }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Wait for the reply text. Cancel-safe, so it can sit in a `select!`;
    /// must not be awaited again after it has resolved.
    pub async fn reply(&mut self) -> String {
        match (&mut self.handle).await {
            Ok(text) => text,
            Err(e) => {
                warn!(request_id = %self.request_id, error = %e, "Reply task ended abnormally");
                CHAT_ERROR_FALLBACK.to_string()
            }
        }
    }

    /// Abort the call; nothing will be delivered
    pub fn cancel(self) {
        debug!(request_id = %self.request_id, "Cancelling reply");
        self.handle.abort();
    }
}
