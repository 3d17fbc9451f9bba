//! Scroll-follow policy for a growing transcript.
//!
//! Positions are measured in rendered lines. A view that sits near the bottom
//! follows new content; a view the user scrolled up stays where it is.

/// Default near-bottom distance, in lines.
pub const DEFAULT_FOLLOW_THRESHOLD: usize = 3;

/// Visible window over the rendered transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Lines scrolled past at the top.
    pub offset: usize,
    /// Visible lines.
    pub height: usize,
    /// Total rendered lines.
    pub content_height: usize,
}

impl Viewport {
    pub fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.height)
    }

    pub fn distance_from_bottom(&self) -> usize {
        self.max_offset().saturating_sub(self.offset)
    }

    pub fn at_bottom(&self) -> Viewport {
        Viewport {
            offset: self.max_offset(),
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollFollow {
    threshold: usize,
}

impl Default for ScrollFollow {
    fn default() -> Self {
        Self::new(DEFAULT_FOLLOW_THRESHOLD)
    }
}

impl ScrollFollow {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn is_near_bottom(&self, viewport: &Viewport) -> bool {
        viewport.distance_from_bottom() <= self.threshold
    }

    /// Viewport after the content under `before` changes to `content_height` lines.
    pub fn reflow(&self, before: &Viewport, content_height: usize) -> Viewport {
        let after = Viewport {
            content_height,
            ..*before
        };
        if self.is_near_bottom(before) {
            after.at_bottom()
        } else {
            Viewport {
                offset: before.offset.min(after.max_offset()),
                ..after
            }
        }
    }
}
