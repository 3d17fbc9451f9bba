//! Plain-text rendering of a transcript into a scrollable window.

use crate::scroll::{ScrollFollow, Viewport};
use crate::session::{Message, Sender};

/// Shown below the transcript while a request is in flight.
pub const PROCESSING_LABEL: &str = "Processing...";

pub fn sender_label(sender: Sender) -> &'static str {
    match sender {
        Sender::Human => "You",
        Sender::Assistant => "Assistant",
    }
}

/// `"You: ..."` / `"Assistant: ..."`, unwrapped.
pub fn render_message(message: &Message) -> String {
    format!("{}: {}", sender_label(message.sender), message.text)
}

/// Greedy word wrap. Words longer than `width` are split; blank source lines are kept.
///
/// Widths are counted in `char`s, so double-width glyphs (CJK, emoji) can
/// exceed the view width on a terminal.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for source in text.lines() {
        let mut line = String::new();
        for word in source.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if !line.is_empty() && line.chars().count() + 1 + word.len() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.extend(word);
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Rendered transcript plus the viewport the user sees.
///
/// `width` is measured in `char`s, not terminal columns.
#[derive(Debug, Clone)]
pub struct TranscriptView {
    width: usize,
    lines: Vec<String>,
    viewport: Viewport,
    follow: ScrollFollow,
}

impl TranscriptView {
    pub fn new(width: usize, height: usize, follow: ScrollFollow) -> Self {
        Self {
            width,
            lines: Vec::new(),
            viewport: Viewport {
                offset: 0,
                height,
                content_height: 0,
            },
            follow,
        }
    }

    /// Re-render after the transcript or the pending flag changed.
    pub fn sync(&mut self, transcript: &[Message], pending: bool) {
        let mut lines = Vec::new();
        for message in transcript {
            lines.extend(wrap(&render_message(message), self.width));
        }
        if pending {
            lines.push(PROCESSING_LABEL.to_string());
        }
        if lines == self.lines {
            return;
        }
        self.viewport = self.follow.reflow(&self.viewport, lines.len());
        self.lines = lines;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.viewport.offset = self.viewport.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.viewport.offset = self
            .viewport
            .offset
            .saturating_add(lines)
            .min(self.viewport.max_offset());
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn visible(&self) -> &[String] {
        let start = self.viewport.offset.min(self.lines.len());
        let end = (start + self.viewport.height).min(self.lines.len());
        &self.lines[start..end]
    }
}
