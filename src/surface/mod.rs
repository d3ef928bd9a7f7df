//! Page Surface
//!
//! Everything the controllers write to: containers addressed by id,
//! summary cards, transient notices, blocking alerts and the theme
//! attribute. [`Document`] keeps the page in memory and renders it to HTML.

pub mod document;

pub use document::Document;

use std::time::Duration;

use crate::charts::RenderedPlot;
use crate::theme::Theme;

/// Content state of one container
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Blank,
    Loading,
    Error(String),
    /// Content produced by the rendering port
    Plot(RenderedPlot),
    Insights(Vec<InsightItem>),
    Empty(String),
}

impl Panel {
    pub fn is_plot(&self) -> bool {
        matches!(self, Panel::Plot(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Panel::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// One rendered insight line
#[derive(Debug, Clone, PartialEq)]
pub struct InsightItem {
    pub text: String,
    /// Fade-in animation delay
    pub delay: Duration,
}

/// Scale-on-hover effect for chart containers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverEffect {
    pub scale: f64,
    pub transition: Duration,
}

impl Default for HoverEffect {
    fn default() -> Self {
        Self {
            scale: 1.02,
            transition: Duration::from_millis(200),
        }
    }
}

impl HoverEffect {
    pub fn enter_transform(&self) -> String {
        format!("scale({})", self.scale)
    }

    pub fn leave_transform(&self) -> &'static str {
        "scale(1)"
    }

    pub fn transition_css(&self) -> String {
        format!("transform {}s ease", self.transition.as_secs_f64())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Transient, self-dismissing notification
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub dismiss_after: Duration,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            dismiss_after: Duration::from_secs(5),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
            dismiss_after: Duration::from_secs(5),
        }
    }

    /// Global error banner
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            dismiss_after: Duration::from_secs(8),
        }
    }
}

/// What a print snapshot covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotScope {
    /// The whole dashboard content area
    Dashboard,
    /// The content of one container
    Container(String),
}

/// The page the dashboard draws on
pub trait Surface: Send + Sync {
    fn has_container(&self, id: &str) -> bool;

    /// Ids of all chart containers, in page order
    fn chart_containers(&self) -> Vec<String>;

    /// Whether the container exists and currently shows a drawn plot
    fn shows_plot(&self, id: &str) -> bool;

    /// Replace the content of a container; unknown ids are ignored
    fn set_panel(&self, id: &str, panel: Panel);

    fn set_transform(&self, id: &str, transform: &str);

    fn attach_hover(&self, id: &str, effect: HoverEffect);

    /// Pointer entered (`true`) or left (`false`) a container
    fn hover(&self, id: &str, entered: bool);

    fn set_card(&self, card_id: &str, text: &str);

    /// Reveal summary cards, each `stagger` after the previous one
    fn reveal_cards(&self, stagger: Duration);

    fn notify(&self, notice: Notice);

    /// Blocking alert
    fn alert(&self, message: &str);

    fn set_theme(&self, theme: Theme);

    /// Script-free markup for printing; `None` if the scope does not exist
    fn snapshot(&self, scope: &SnapshotScope) -> Option<String>;

    fn show_loading(&self, id: &str) {
        self.set_panel(id, Panel::Loading);
    }

    fn show_error(&self, id: &str, message: &str) {
        self.set_panel(id, Panel::Error(message.to_string()));
    }

    fn show_success(&self, message: &str) {
        self.notify(Notice::success(message));
    }

    fn show_global_error(&self, message: &str) {
        self.notify(Notice::error(message));
    }
}
