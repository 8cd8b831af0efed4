//! AI coach - gateway to the generative model plus chat state
//!
//! Gateway calls never fail from the caller's point of view: transport,
//! API and parse errors are logged and replaced by fixed fallback text.

pub mod attachment;
pub mod chat;
pub mod gemini;
pub mod prompts;

pub use attachment::{Attachment, AttachmentError, AttachmentKind, MAX_VIDEO_BYTES};
pub use chat::{ChatMessage, ChatState, OutboundMessage, PendingReply, Role};
pub use gemini::GeminiClient;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::GatewayConfig;
use crate::exercises::Goal;
use prompts::{
    CHAT_EMPTY_FALLBACK, CHAT_ERROR_FALLBACK, PLAN_EMPTY_FALLBACK, PLAN_ERROR_FALLBACK,
    workout_plan_prompt,
};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("API key not configured")]
    MissingApiKey,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One content part of an outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Base64 payload with its declared MIME type
    Inline { mime_type: String, data: String },
}

impl From<&Attachment> for Part {
    fn from(attachment: &Attachment) -> Self {
        Part::Inline {
            mime_type: attachment.mime_type().to_string(),
            data: attachment.data().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub parts: Vec<Part>,
    pub system_instruction: Option<String>,
}

/// A hosted model that turns a request into reply text
#[async_trait]
pub trait CoachModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Reply text, possibly empty when the model produced none
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError>;
}

/// Gateway used by onboarding and chat
#[derive(Clone)]
pub struct Coach {
    model: Arc<dyn CoachModel>,
    persona: Arc<str>,
}

impl Coach {
    pub fn new(model: Arc<dyn CoachModel>, persona: impl Into<String>) -> Self {
        Self {
            model,
            persona: Arc::from(persona.into()),
        }
    }

    /// Gemini-backed coach from configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = GeminiClient::new(config)?;
        info!(model = client.model(), "Coach gateway ready");
        Ok(Self::new(Arc::new(client), config.persona.clone()))
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Coach's protocol for a goal and level. Falls back to fixed text.
    #[instrument(skip(self), fields(provider = self.model.name()))]
    pub async fn generate_workout_plan(&self, goal: Goal, level: u8) -> String {
        let request = GenerateRequest {
            parts: vec![Part::Text(workout_plan_prompt(goal, level))],
            system_instruction: None,
        };

        match self.model.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Empty protocol reply");
                PLAN_EMPTY_FALLBACK.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Protocol generation failed");
                PLAN_ERROR_FALLBACK.to_string()
            }
        }
    }

    /// Chat reply for `message` with optional inline image/video.
    /// The persona instruction accompanies every call. The transcript is
    /// accepted but not forwarded: each call is a single turn.
    /// Attachments over the size cap are refused without a model call.
    #[instrument(
        skip_all,
        fields(provider = self.model.name(), image = image.is_some(), video = video.is_some())
    )]
    pub async fn generate_ai_response(
        &self,
        _history: &[Arc<ChatMessage>],
        message: &str,
        image: Option<&Attachment>,
        video: Option<&Attachment>,
    ) -> String {
        for attachment in [image, video].into_iter().flatten() {
            if let Err(e) = attachment.validate() {
                warn!(error = %e, "Refusing oversized attachment");
                return e.to_string();
            }
        }

        let mut parts = Vec::with_capacity(3);
        if let Some(image) = image {
            parts.push(Part::from(image));
        }
        if let Some(video) = video {
            parts.push(Part::from(video));
        }
        parts.push(Part::Text(message.to_string()));

        let request = GenerateRequest {
            parts,
            system_instruction: Some(self.persona.to_string()),
        };

        match self.model.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Empty chat reply");
                CHAT_EMPTY_FALLBACK.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                CHAT_ERROR_FALLBACK.to_string()
            }
        }
    }
}
