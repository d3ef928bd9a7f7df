//! In-memory Document
//!
//! A [`Surface`] that keeps the page as plain data behind a mutex and
//! renders it to HTML on demand.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use super::{HoverEffect, InsightItem, Notice, NoticeLevel, Panel, SnapshotScope, Surface};
use crate::charts::plotly::PLOTLY_CDN;
use crate::charts::ChartSlot;
use crate::insights::INSIGHTS_CONTAINER;
use crate::shell::cards::SUMMARY_CARDS;
use crate::theme::Theme;
use crate::util::dom::escape_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Chart,
    Insights,
}

#[derive(Debug)]
struct Container {
    id: String,
    title: String,
    role: Role,
    panel: Panel,
    transform: Option<String>,
    transition: Option<String>,
    hover: Option<HoverEffect>,
}

#[derive(Debug)]
struct Card {
    id: String,
    label: String,
    value: String,
    reveal_delay: Option<Duration>,
}

#[derive(Debug)]
struct PostedNotice {
    notice: Notice,
    posted_at: Instant,
}

#[derive(Debug, Default)]
struct State {
    containers: Vec<Container>,
    cards: Vec<Card>,
    notices: Vec<PostedNotice>,
    alerts: Vec<String>,
    theme: Theme,
}

impl State {
    fn container(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    fn container_mut(&mut self, id: &str) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.id == id)
    }
}

/// Which rendition of plot content to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Live,
    Print,
}

#[derive(Debug, Default)]
pub struct Document {
    state: Mutex<State>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finance dashboard page: summary cards, one chart container per
    /// slot, and the insights panel
    pub fn finance_dashboard(slots: &[ChartSlot]) -> Self {
        let mut doc = Self::new();
        for card in SUMMARY_CARDS {
            doc = doc.with_card(card.id, card.label);
        }
        for slot in slots {
            doc = doc.with_chart_container(&slot.container_id, slot.kind.title());
        }
        doc.with_insights_container(INSIGHTS_CONTAINER, "Financial Insights")
    }

    pub fn with_chart_container(self, id: &str, title: &str) -> Self {
        self.with_container(id, title, Role::Chart)
    }

    pub fn with_insights_container(self, id: &str, title: &str) -> Self {
        self.with_container(id, title, Role::Insights)
    }

    fn with_container(self, id: &str, title: &str, role: Role) -> Self {
        self.lock().containers.push(Container {
            id: id.to_string(),
            title: title.to_string(),
            role,
            panel: Panel::Blank,
            transform: None,
            transition: None,
            hover: None,
        });
        self
    }

    pub fn with_card(self, id: &str, label: &str) -> Self {
        self.lock().cards.push(Card {
            id: id.to_string(),
            label: label.to_string(),
            value: "-".to_string(),
            reveal_delay: None,
        });
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Detach a container from the page
    pub fn remove_container(&self, id: &str) -> bool {
        let mut state = self.lock();
        let before = state.containers.len();
        state.containers.retain(|c| c.id != id);
        state.containers.len() != before
    }

    pub fn panel(&self, id: &str) -> Option<Panel> {
        self.lock().container(id).map(|c| c.panel.clone())
    }

    pub fn transform(&self, id: &str) -> Option<String> {
        self.lock().container(id).and_then(|c| c.transform.clone())
    }

    pub fn card(&self, id: &str) -> Option<String> {
        self.lock()
            .cards
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.value.clone())
    }

    /// Reveal delay per card in page order; `None` until revealed
    pub fn card_reveal_delays(&self) -> Vec<Option<Duration>> {
        self.lock().cards.iter().map(|c| c.reveal_delay).collect()
    }

    pub fn theme(&self) -> Theme {
        self.lock().theme
    }

    pub fn alerts(&self) -> Vec<String> {
        self.lock().alerts.clone()
    }

    /// Every notice ever posted, oldest first
    pub fn notice_log(&self) -> Vec<Notice> {
        self.lock().notices.iter().map(|p| p.notice.clone()).collect()
    }

    /// Notices that have not dismissed themselves yet
    pub fn active_notices(&self) -> Vec<Notice> {
        let now = Instant::now();
        self.lock()
            .notices
            .iter()
            .filter(|p| now < p.posted_at + p.notice.dismiss_after)
            .map(|p| p.notice.clone())
            .collect()
    }

    /// Full page, including the Plotly bundle and active notices
    pub fn to_html(&self) -> String {
        let notices = self.active_notices();
        let state = self.lock();

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Finance Analytics Dashboard</title>\n");
        html.push_str(&format!("<script src=\"{}\"></script>\n", PLOTLY_CDN));
        html.push_str("</head>\n");
        html.push_str(&format!("<body data-theme=\"{}\">\n", state.theme));
        html.push_str("<main class=\"container-fluid\">\n");

        for notice in &notices {
            html.push_str(&notice_html(notice));
        }

        html.push_str("<div class=\"dashboard-content\">\n");
        html.push_str(&dashboard_html(&state, Output::Live));
        html.push_str("</div>\n</main>\n</body>\n</html>\n");
        html
    }
}

impl Surface for Document {
    fn has_container(&self, id: &str) -> bool {
        self.lock().container(id).is_some()
    }

    fn chart_containers(&self) -> Vec<String> {
        self.lock()
            .containers
            .iter()
            .filter(|c| c.role == Role::Chart)
            .map(|c| c.id.clone())
            .collect()
    }

    fn shows_plot(&self, id: &str) -> bool {
        self.lock()
            .container(id)
            .map_or(false, |c| c.panel.is_plot())
    }

    fn set_panel(&self, id: &str, panel: Panel) {
        if let Some(container) = self.lock().container_mut(id) {
            container.panel = panel;
        }
    }

    fn set_transform(&self, id: &str, transform: &str) {
        if let Some(container) = self.lock().container_mut(id) {
            container.transform = Some(transform.to_string());
        }
    }

    fn attach_hover(&self, id: &str, effect: HoverEffect) {
        if let Some(container) = self.lock().container_mut(id) {
            container.hover = Some(effect);
        }
    }

    fn hover(&self, id: &str, entered: bool) {
        let mut state = self.lock();
        let Some(container) = state.container_mut(id) else {
            return;
        };
        let Some(effect) = container.hover else {
            return;
        };

        if entered {
            container.transform = Some(effect.enter_transform());
            container.transition = Some(effect.transition_css());
        } else {
            container.transform = Some(effect.leave_transform().to_string());
        }
    }

    fn set_card(&self, card_id: &str, text: &str) {
        if let Some(card) = self.lock().cards.iter_mut().find(|c| c.id == card_id) {
            card.value = text.to_string();
        }
    }

    fn reveal_cards(&self, stagger: Duration) {
        for (index, card) in self.lock().cards.iter_mut().enumerate() {
            card.reveal_delay = Some(stagger * index as u32);
        }
    }

    fn notify(&self, notice: Notice) {
        self.lock().notices.push(PostedNotice {
            notice,
            posted_at: Instant::now(),
        });
    }

    fn alert(&self, message: &str) {
        tracing::warn!(message = %message, "Alert");
        self.lock().alerts.push(message.to_string());
    }

    fn set_theme(&self, theme: Theme) {
        self.lock().theme = theme;
    }

    fn snapshot(&self, scope: &SnapshotScope) -> Option<String> {
        let state = self.lock();
        match scope {
            SnapshotScope::Dashboard => Some(dashboard_html(&state, Output::Print)),
            SnapshotScope::Container(id) => state
                .container(id)
                .map(|c| panel_html(&c.panel, Output::Print)),
        }
    }
}

fn dashboard_html(state: &State, output: Output) -> String {
    let mut html = String::from("<div class=\"row\" id=\"summaryCards\">\n");
    for card in &state.cards {
        html.push_str(&card_html(card));
    }
    html.push_str("</div>\n");

    for container in &state.containers {
        html.push_str(&container_html(container, output));
    }
    html
}

fn card_html(card: &Card) -> String {
    let (class, style) = match card.reveal_delay {
        Some(delay) => (
            "card summary-card slide-in-left",
            format!(" style=\"animation-delay: {}s\"", delay.as_secs_f64()),
        ),
        None => ("card summary-card", String::new()),
    };

    format!(
        "<div class=\"col-lg-3 col-md-6\"><div class=\"{class}\"{style}><div class=\"card-body\">\
         <h6 class=\"card-title\">{label}</h6><h3 class=\"card-value\" id=\"{id}\">{value}</h3>\
         </div></div></div>\n",
        class = class,
        style = style,
        label = escape_html(&card.label),
        id = escape_html(&card.id),
        value = escape_html(&card.value),
    )
}

fn container_html(container: &Container, output: Output) -> String {
    let class = match container.role {
        Role::Chart => " class=\"chart-container\"",
        Role::Insights => "",
    };

    let mut style = String::new();
    if let Some(transform) = &container.transform {
        style.push_str(&format!("transform: {};", transform));
    }
    if let Some(transition) = &container.transition {
        style.push_str(&format!(" transition: {};", transition));
    }
    let style = if style.is_empty() {
        style
    } else {
        format!(" style=\"{}\"", escape_html(style.trim()))
    };

    format!(
        "<div class=\"card\"><div class=\"card-header\">{title}</div><div class=\"card-body\">\
         <div id=\"{id}\"{class}{style}>{panel}</div></div></div>\n",
        title = escape_html(&container.title),
        id = escape_html(&container.id),
        class = class,
        style = style,
        panel = panel_html(&container.panel, output),
    )
}

fn panel_html(panel: &Panel, output: Output) -> String {
    match panel {
        Panel::Blank => String::new(),
        Panel::Loading => "<div class=\"d-flex justify-content-center align-items-center\" \
             style=\"height: 200px;\"><div class=\"spinner-border text-primary\" role=\"status\">\
             <span class=\"visually-hidden\">Loading...</span></div></div>"
            .to_string(),
        Panel::Error(message) => format!(
            "<div class=\"alert alert-danger text-center\" role=\"alert\">\
             <i class=\"fas fa-exclamation-triangle me-2\"></i>{}</div>",
            escape_html(message)
        ),
        Panel::Plot(plot) => match output {
            Output::Live => plot.markup.clone(),
            Output::Print => plot.print.clone(),
        },
        Panel::Insights(items) => {
            let list: String = items.iter().map(insight_html).collect();
            format!("<div class=\"insights-list\">{}</div>", list)
        }
        Panel::Empty(message) => format!(
            "<div class=\"text-center text-muted\"><i class=\"fas fa-info-circle fa-2x mb-3\"></i>\
             <p>{}</p></div>",
            escape_html(message)
        ),
    }
}

fn insight_html(item: &InsightItem) -> String {
    format!(
        "<div class=\"insight-item fade-in\" style=\"animation-delay: {delay}s\">\
         <div class=\"d-flex align-items-start\"><div class=\"insight-icon me-3\">\
         <i class=\"fas fa-lightbulb text-warning\"></i></div><div class=\"insight-content\">\
         <p class=\"mb-0\">{text}</p></div></div></div>",
        delay = item.delay.as_secs_f64(),
        text = escape_html(&item.text),
    )
}

fn notice_html(notice: &Notice) -> String {
    let (class, icon) = match notice.level {
        NoticeLevel::Success => ("alert-success", "fa-check-circle"),
        NoticeLevel::Warning => ("alert-warning", "fa-exclamation-circle"),
        NoticeLevel::Error => ("alert-danger position-fixed", "fa-exclamation-triangle"),
    };

    format!(
        "<div class=\"alert {class} alert-dismissible fade show\"><i class=\"fas {icon} me-2\"></i>\
         {message}<button type=\"button\" class=\"btn-close\" data-bs-dismiss=\"alert\"></button></div>\n",
        class = class,
        icon = icon,
        message = escape_html(&notice.message),
    )
}
