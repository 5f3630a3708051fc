//! Reading progress indicator for the post page
//!
//! Scroll events only record the latest metrics; the width is recomputed at
//! most once per animation frame.

use std::str::FromStr;
use thiserror::Error;

/// Scroll position and layout sizes sampled on a scroll event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub content_top: f64,
    pub content_height: f64,
    pub window_height: f64,
}

#[derive(Debug, Error)]
#[error("expected `scrollTop,contentTop,contentHeight,windowHeight`, got {0:?}")]
pub struct ParseScrollError(String);

impl FromStr for ScrollMetrics {
    type Err = ParseScrollError;

    /// Parse `scrollTop,contentTop,contentHeight,windowHeight` in pixels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseScrollError(s.to_string()))?;

        match values[..] {
            [scroll_top, content_top, content_height, window_height] => Ok(Self {
                scroll_top,
                content_top,
                content_height,
                window_height,
            }),
            _ => Err(ParseScrollError(s.to_string())),
        }
    }
}

/// Percentage of the article scrolled past, clamped to 0..=100
pub fn reading_progress(m: &ScrollMetrics) -> f64 {
    let distance = m.scroll_top - m.content_top;
    let scrollable = m.content_height - m.window_height;

    if distance <= 0.0 {
        0.0
    } else if distance >= scrollable {
        100.0
    } else {
        distance / scrollable * 100.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    pending: Option<ScrollMetrics>,
    width: f64,
}

impl ProgressTracker {
    /// Record a scroll event; returns true when a frame must be requested
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        let first = self.pending.is_none();
        self.pending = Some(metrics);
        first
    }

    /// Run a scheduled frame and return the new width, if anything was pending
    pub fn on_frame(&mut self) -> Option<f64> {
        let metrics = self.pending.take()?;
        self.width = reading_progress(&metrics);
        Some(self.width)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// CSS width value
    pub fn style(&self) -> String {
        format!("{}%", self.width)
    }
}
