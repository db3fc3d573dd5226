//! Dashboard screen.
//!
//! Read-only: one fetch fills every figure and both insight tables. `j`/`k`
//! move focus between the tables, `h`/`l` page the focused one and `r`
//! reloads.

use crate::events::{Completion, TuiEvent};
use crate::keys::{Action, InputMode};
use crate::nav::View;
use crate::notifications::{Notification, NotificationAction, NotificationLevel};
use crate::screen::{ScreenContext, ScreenOps};
use crate::theme::Theme;
use crate::views;
use backoffice_core::{
    ClientError, ClientResult, DashboardSource, DashboardSummary, PageRequest, PageWindow,
    INSIGHT_PAGE_SIZE,
};
use ratatui::{layout::Rect, Frame};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsightTable {
    #[default]
    Students,
    Mentors,
}

pub struct DashboardScreen {
    mount: u64,
    source: Arc<dyn DashboardSource>,
    summary: Option<DashboardSummary>,
    error: Option<ClientError>,
    /// Generation of the fetch in flight, if any.
    loading: Option<u64>,
    generation: u64,
    focus: InsightTable,
    students: PageRequest,
    mentors: PageRequest,
}

impl DashboardScreen {
    pub fn new(source: Arc<dyn DashboardSource>, mount: u64) -> Self {
        debug!(mount, "Dashboard mounted");
        Self {
            mount,
            source,
            summary: None,
            error: None,
            loading: None,
            generation: 0,
            focus: InsightTable::default(),
            students: PageRequest::new(INSIGHT_PAGE_SIZE),
            mentors: PageRequest::new(INSIGHT_PAGE_SIZE),
        }
    }

    pub fn summary(&self) -> Option<&DashboardSummary> {
        self.summary.as_ref()
    }

    /// Why the last fetch failed, while no newer fetch has succeeded.
    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    pub fn focus(&self) -> InsightTable {
        self.focus
    }

    pub fn student_window(&self) -> PageWindow {
        self.students.window(self.summary.as_ref().map_or(0, |s| s.students().len()))
    }

    pub fn mentor_window(&self) -> PageWindow {
        self.mentors.window(self.summary.as_ref().map_or(0, |s| s.mentors().len()))
    }

    fn focused_len(&self) -> usize {
        self.summary.as_ref().map_or(0, |s| match self.focus {
            InsightTable::Students => s.students().len(),
            InsightTable::Mentors => s.mentors().len(),
        })
    }

    fn focused_page(&mut self) -> &mut PageRequest {
        match self.focus {
            InsightTable::Students => &mut self.students,
            InsightTable::Mentors => &mut self.mentors,
        }
    }

    fn spawn_refresh(&mut self, ctx: &ScreenContext<'_>) {
        if self.loading.is_some() {
            debug!("Dashboard refresh already in flight");
            return;
        }
        self.generation += 1;
        let generation = self.generation;
        self.loading = Some(generation);
        let source = Arc::clone(&self.source);
        let events = ctx.events.clone();
        let mount = self.mount;
        tokio::spawn(async move {
            let result = source.summary().await;
            let completion = Completion::Dashboard { generation, result };
            let _ = events.send(TuiEvent::Completed { mount, completion }).await;
        });
    }

    fn apply(&mut self, generation: u64, result: ClientResult<DashboardSummary>) -> Option<Notification> {
        if self.loading != Some(generation) {
            debug!(generation, "Dropping stale dashboard result");
            return None;
        }
        self.loading = None;
        match result {
            Ok(summary) => {
                info!(
                    students = summary.students().len(),
                    mentors = summary.mentors().len(),
                    "Dashboard loaded"
                );
                self.students.clamp(summary.students().len());
                self.mentors.clamp(summary.mentors().len());
                self.summary = Some(summary);
                self.error = None;
                None
            }
            Err(err) => {
                warn!(error = %err, kept = self.summary.is_some(), "Dashboard refresh failed");
                let action = if err.is_retryable() {
                    NotificationAction::Retry(View::Dashboard)
                } else {
                    NotificationAction::Dismiss
                };
                let message = format!("Failed to load dashboard: {}", err);
                self.error = Some(err);
                Some(Notification::new(NotificationLevel::Error, message).with_action(action))
            }
        }
    }
}

impl ScreenOps for DashboardScreen {
    fn view(&self) -> View {
        View::Dashboard
    }

    fn mount_id(&self) -> u64 {
        self.mount
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Normal
    }

    fn is_idle(&self) -> bool {
        true
    }

    fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    fn record_count(&self) -> usize {
        self.summary
            .as_ref()
            .map_or(0, |s| s.students().len() + s.mentors().len())
    }

    fn start_refresh(&mut self, ctx: &ScreenContext<'_>) {
        self.spawn_refresh(ctx);
    }

    fn handle(&mut self, action: Action, ctx: &ScreenContext<'_>) -> Option<Notification> {
        match action {
            Action::MoveDown => self.focus = InsightTable::Mentors,
            Action::MoveUp => self.focus = InsightTable::Students,
            Action::NextPage => {
                let len = self.focused_len();
                self.focused_page().next(len);
            }
            Action::PrevPage => {
                let len = self.focused_len();
                self.focused_page().previous(len);
            }
            Action::Refresh => self.spawn_refresh(ctx),
            Action::OpenSearch
            | Action::CycleFilter
            | Action::NewItem
            | Action::EditItem
            | Action::DeleteItem
            | Action::Export => {
                return Some(Notification::new(
                    NotificationLevel::Info,
                    "The dashboard is read-only",
                ))
            }
            _ => {}
        }
        None
    }

    fn complete(&mut self, completion: Completion) -> Option<Notification> {
        match completion {
            Completion::Dashboard { generation, result } => self.apply(generation, result),
            other => {
                debug!(completion = ?other, "Dropping result for another screen");
                None
            }
        }
    }

    fn render(&self, f: &mut Frame<'_>, area: Rect, theme: &Theme) {
        views::dashboard::render(f, self, area, theme);
    }
}
