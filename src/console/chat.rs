//! Coach chat console

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use uuid::Uuid;

use crate::coach::{
    Attachment, AttachmentKind, ChatMessage, ChatState, Coach, PendingReply, Role,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ChatInput {
    Send(String),
    Attach(AttachmentKind, PathBuf),
    Clear(AttachmentKind),
    Help,
    Quit,
}

impl ChatInput {
    /// Slash commands manage attachments; anything else is a message
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let (cmd, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (trimmed, ""),
        };
        match (cmd, rest) {
            ("/image", path) if !path.is_empty() => {
                ChatInput::Attach(AttachmentKind::Image, PathBuf::from(path))
            }
            ("/video", path) if !path.is_empty() => {
                ChatInput::Attach(AttachmentKind::Video, PathBuf::from(path))
            }
            ("/clear", "image") => ChatInput::Clear(AttachmentKind::Image),
            ("/clear", "video") => ChatInput::Clear(AttachmentKind::Video),
            ("/help", _) => ChatInput::Help,
            ("/quit" | "/exit", _) => ChatInput::Quit,
            _ => ChatInput::Send(line.to_string()),
        }
    }
}

fn write_message(out: &mut impl Write, message: &ChatMessage) -> std::io::Result<()> {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "stitch",
    };
    let mut tags = Vec::new();
    if let Some(image) = &message.image {
        tags.push(format!("[image {}]", image.mime_type()));
    }
    if let Some(video) = &message.video {
        tags.push(format!("[video {}]", video.mime_type()));
    }
    if tags.is_empty() {
        writeln!(out, "{who}> {}", message.text)
    } else {
        writeln!(out, "{who}> {} {}", tags.join(" "), message.text)
    }
}

/// Resolves with the pending reply, or never when nothing is in flight
async fn next_reply(pending: &mut Option<PendingReply>) -> (Uuid, String) {
    match pending {
        Some(p) => (p.request_id(), p.reply().await),
        None => std::future::pending().await,
    }
}

const USAGE: &str = "(/image <path>, /video <path>, /clear image|video, /quit)";

/// Apply one input. Returns false when the user asked to leave.
async fn handle_input(
    chat: &mut ChatState,
    coach: &Coach,
    pending: &mut Option<PendingReply>,
    input: ChatInput,
    out: &mut impl Write,
) -> Result<bool> {
    match input {
        ChatInput::Send(text) => match chat.begin_send(&text, Utc::now()) {
            Some(outbound) => {
                *pending = Some(PendingReply::spawn(coach.clone(), outbound));
                writeln!(out, "...")?;
            }
            None if chat.is_loading() => writeln!(out, "Still waiting for the last reply.")?,
            None => {}
        },
        ChatInput::Attach(kind, path) => {
            let staged = match Attachment::load(kind, &path).await {
                Ok(attachment) => {
                    let mime = attachment.mime_type().to_string();
                    chat.stage(attachment).map(|()| mime)
                }
                Err(e) => Err(e),
            };
            match staged {
                Ok(mime) => writeln!(out, "Attached {} ({mime})", path.display())?,
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        ChatInput::Clear(AttachmentKind::Image) => chat.clear_image(),
        ChatInput::Clear(AttachmentKind::Video) => chat.clear_video(),
        ChatInput::Help => writeln!(out, "{USAGE}")?,
        ChatInput::Quit => return Ok(false),
    }
    Ok(true)
}

/// Run the coach chat against stdin/stdout until /quit, EOF or Ctrl-C.
/// A reply still in flight at exit is aborted and never applied.
pub async fn run_coach(coach: Coach) -> Result<()> {
    let mut chat = ChatState::new(Utc::now());
    let mut pending: Option<PendingReply> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = std::io::stdout();

    for message in chat.messages() {
        write_message(&mut out, message)?;
    }
    writeln!(out, "{USAGE}")?;

    loop {
        tokio::select! {
            (request_id, text) = next_reply(&mut pending) => {
                pending = None;
                if chat.complete(request_id, text, Utc::now()) {
                    if let Some(message) = chat.messages().last() {
                        write_message(&mut out, message)?;
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = ChatInput::parse(&line);
                if !handle_input(&mut chat, &coach, &mut pending, input, &mut out).await? {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                writeln!(out)?;
                break;
            }
        }
    }

    if let Some(p) = pending.take() {
        chat.teardown();
        p.cancel();
    }
    info!(messages = chat.messages().len(), "Chat closed");
    Ok(())
}
