//! Image/video attachments for coach messages

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Hard cap on video size, checked before the file is read
pub const MAX_VIDEO_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
}

impl AttachmentKind {
    pub fn default_mime(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "image/jpeg",
            AttachmentKind::Video => "video/mp4",
        }
    }

    /// MIME type from the file extension, falling back to the kind's default
    pub fn mime_for(&self, path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match (self, ext.as_deref()) {
            (AttachmentKind::Image, Some("jpg" | "jpeg")) => "image/jpeg",
            (AttachmentKind::Image, Some("png")) => "image/png",
            (AttachmentKind::Image, Some("webp")) => "image/webp",
            (AttachmentKind::Image, Some("gif")) => "image/gif",
            (AttachmentKind::Image, Some("heic")) => "image/heic",
            (AttachmentKind::Video, Some("mp4")) => "video/mp4",
            (AttachmentKind::Video, Some("webm")) => "video/webm",
            (AttachmentKind::Video, Some("mov")) => "video/quicktime",
            _ => self.default_mime(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Video too large ({size} bytes). Please keep under 20MB.")]
    VideoTooLarge { size: u64 },
    #[error("Failed to read attachment: {0}")]
    Io(#[from] std::io::Error),
}

/// Base64-encoded payload ready for inlining into a request.
/// Only built through [`Attachment::from_bytes`] or [`Attachment::load`],
/// so a video over the cap cannot exist. Clones share the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    kind: AttachmentKind,
    mime_type: String,
    data: Arc<str>,
}

impl Attachment {
    /// Reject oversized videos. Images are not capped.
    pub fn check_size(kind: AttachmentKind, size: u64) -> Result<(), AttachmentError> {
        if kind == AttachmentKind::Video && size > MAX_VIDEO_BYTES {
            return Err(AttachmentError::VideoTooLarge { size });
        }
        Ok(())
    }

    pub fn from_bytes(
        kind: AttachmentKind,
        mime_type: impl Into<String>,
        bytes: &[u8],
    ) -> Result<Self, AttachmentError> {
        Self::check_size(kind, bytes.len() as u64)?;
        Ok(Self {
            kind,
            mime_type: mime_type.into(),
            data: Arc::from(STANDARD.encode(bytes)),
        })
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 payload
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Re-check the size cap against the payload itself
    pub fn validate(&self) -> Result<(), AttachmentError> {
        Self::check_size(self.kind, self.decoded_len() as u64)
    }

    /// Read and encode a file. The size check runs on metadata first,
    /// so an oversized video is never loaded.
    pub async fn load(kind: AttachmentKind, path: &Path) -> Result<Self, AttachmentError> {
        let size = tokio::fs::metadata(path).await?.len();
        Self::check_size(kind, size)?;

        let bytes = tokio::fs::read(path).await?;
        let attachment = Self::from_bytes(kind, kind.mime_for(path), &bytes)?;
        debug!(
            path = %path.display(),
            mime = %attachment.mime_type,
            bytes = bytes.len(),
            "Loaded attachment"
        );
        Ok(attachment)
    }

    /// Size of the decoded payload, computed from the encoded length
    pub fn decoded_len(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|&b| b == b'=').count();
        (self.data.len() / 4 * 3).saturating_sub(padding)
    }

    /// Payload of arbitrary size that skips the cap
    #[cfg(test)]
    pub(crate) fn unchecked(kind: AttachmentKind, mime_type: &str, data: String) -> Self {
        Self {
            kind,
            mime_type: mime_type.to_string(),
            data: Arc::from(data),
        }
    }
}
