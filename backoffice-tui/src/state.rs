//! Application state.
//!
//! The app holds exactly one mounted screen. Switching views drops the old
//! screen (its store and any open editing session go with it) and mounts a
//! fresh one that starts loading straight away.

use crate::clients::Clients;
use crate::config::TuiConfig;
use crate::dashboard::DashboardScreen;
use crate::events::TuiEvent;
use crate::keys::{map_key, Action, InputMode};
use crate::nav::View;
use crate::notifications::{Notification, NotificationAction, NotificationLevel};
use crate::persistence::PersistedState;
use crate::screen::{Screen, ScreenContext, ScreenOps, ScreenRecord};
use crate::theme::Theme;
use backoffice_core::{ResourceClient, ResourceKind};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// How long info and success notices stay in the footer.
const NOTICE_TTL_SECS: i64 = 5;
const MAX_NOTIFICATIONS: usize = 50;

pub struct App {
    pub config: TuiConfig,
    pub theme: Theme,
    pub active_view: View,
    pub notifications: Vec<Notification>,
    active: Box<dyn ScreenOps>,
    clients: Clients,
    events: mpsc::Sender<TuiEvent>,
    next_mount: u64,
}

impl App {
    /// Build the app with the dashboard mounted but not yet loading.
    pub fn new(config: TuiConfig, clients: Clients, events: mpsc::Sender<TuiEvent>) -> Self {
        let theme = Theme::named(&config.theme.name);
        let active_view = View::default();
        let active = mount(active_view, &clients, &config, 1);
        Self {
            config,
            theme,
            active_view,
            notifications: Vec::new(),
            active,
            clients,
            events,
            next_mount: 2,
        }
    }

    pub fn active(&self) -> &dyn ScreenOps {
        self.active.as_ref()
    }

    pub fn input_mode(&self) -> InputMode {
        self.active.input_mode()
    }

    /// Mount a fresh screen for `view` and start loading it.
    pub fn switch_to(&mut self, view: View) {
        let mount_id = self.next_mount;
        self.next_mount += 1;
        debug!(
            from = %self.active.view(),
            to = %view,
            mount = mount_id,
            "Switching view"
        );
        self.active = mount(view, &self.clients, &self.config, mount_id);
        self.active_view = view;
        self.refresh();
    }

    fn refresh(&mut self) {
        let view = self.active.view();
        self.notifications.retain(|note| note.action != Some(NotificationAction::Retry(view)));
        let ctx = ScreenContext {
            events: &self.events,
            export_dir: &self.config.export_dir,
        };
        self.active.start_refresh(&ctx);
    }

    pub fn notify(&mut self, notification: Notification) {
        if notification.level == NotificationLevel::Error {
            info!(message = %notification.message, "Error shown");
        }
        self.notifications.push(notification);
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }

    /// Drop info and success notices older than their lifetime. Warnings and
    /// errors stay until dismissed.
    pub fn expire_notifications(&mut self, now: DateTime<Utc>) {
        let ttl = Duration::seconds(NOTICE_TTL_SECS);
        self.notifications.retain(|note| match note.level {
            NotificationLevel::Info | NotificationLevel::Success => now - note.created_at < ttl,
            NotificationLevel::Warning | NotificationLevel::Error => true,
        });
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            active_view: self.active_view,
        }
    }

    /// Apply one event. Returns `true` when the app should quit.
    pub fn handle_event(&mut self, event: TuiEvent) -> bool {
        match event {
            TuiEvent::Input(key) => {
                if let Some(action) = map_key(key, self.active.input_mode()) {
                    return self.handle_action(action);
                }
            }
            TuiEvent::Completed { mount, completion } => {
                if mount != self.active.mount_id() {
                    debug!(mount, active = self.active.mount_id(), "Dropping result for unmounted screen");
                    return false;
                }
                if let Some(notification) = self.active.complete(completion) {
                    self.notify(notification);
                }
            }
            TuiEvent::Tick => self.expire_notifications(Utc::now()),
            TuiEvent::Resize { .. } => {}
        }
        false
    }

    pub fn handle_action(&mut self, action: Action) -> bool {
        let idle = self.active.is_idle();
        match action {
            Action::Quit if idle => return true,
            Action::Quit => self.dispatch(Action::Cancel),
            Action::NextView => self.switch_to(self.active_view.next()),
            Action::PrevView => self.switch_to(self.active_view.previous()),
            Action::SwitchView(index) => {
                if let Some(view) = View::from_index(index) {
                    self.switch_to(view);
                }
            }
            Action::Cancel if idle && !self.notifications.is_empty() => self.notifications.clear(),
            Action::Refresh if idle => self.refresh(),
            other => self.dispatch(other),
        }
        false
    }

    fn dispatch(&mut self, action: Action) {
        let ctx = ScreenContext {
            events: &self.events,
            export_dir: &self.config.export_dir,
        };
        if let Some(notification) = self.active.handle(action, &ctx) {
            self.notify(notification);
        }
    }
}

fn mount(view: View, clients: &Clients, config: &TuiConfig, mount_id: u64) -> Box<dyn ScreenOps> {
    let Some(kind) = view.resource() else {
        return Box::new(DashboardScreen::new(Arc::clone(&clients.dashboard), mount_id));
    };
    match kind {
        ResourceKind::User => screen(&clients.users, clients, config, mount_id),
        ResourceKind::Mentor => screen(&clients.mentors, clients, config, mount_id),
        ResourceKind::CourseModule => screen(&clients.course_modules, clients, config, mount_id),
        ResourceKind::Course => screen(&clients.courses, clients, config, mount_id),
        ResourceKind::Attendance => screen(&clients.attendance, clients, config, mount_id),
        ResourceKind::LiveClass => screen(&clients.live_classes, clients, config, mount_id),
    }
}

fn screen<R: ScreenRecord>(
    client: &Arc<dyn ResourceClient<R>>,
    clients: &Clients,
    config: &TuiConfig,
    mount_id: u64,
) -> Box<dyn ScreenOps> {
    Box::new(
        Screen::new(Arc::clone(client), config.page_size(R::KIND), mount_id)
            .with_lookups(Arc::clone(&clients.lookups)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_test_utils::fixtures::{dashboard, mentor, users};
    use backoffice_test_utils::{
        ClientError, Course, CourseModule, LiveClass, Mentor, MockDashboardSource,
        MockLookupSource, MockResourceClient, MutationKind, Operation, User,
    };
    use backoffice_core::AttendanceRecord;

    const CONFIG: &str = r#"
api_base_url = "http://localhost:4000/api"
request_timeout_ms = 1000
persistence_path = "state.json"
log_path = "backoffice.log"
export_dir = "exports"

[theme]
name = "classic"
"#;

    struct Mocks {
        users: MockResourceClient<User>,
        mentors: MockResourceClient<Mentor>,
        dashboard: MockDashboardSource,
    }

    fn app() -> (App, Mocks, mpsc::Receiver<TuiEvent>) {
        let mocks = Mocks {
            users: MockResourceClient::new(users(12)),
            mentors: MockResourceClient::new(vec![mentor("m1", "Ravi", "Kumar", &["HTML"])]),
            dashboard: MockDashboardSource::new(dashboard(7, 2)),
        };
        let clients = Clients {
            users: mocks.users.shared(),
            mentors: mocks.mentors.shared(),
            course_modules: MockResourceClient::<CourseModule>::empty().shared(),
            courses: MockResourceClient::<Course>::empty().shared(),
            attendance: MockResourceClient::<AttendanceRecord>::empty().shared(),
            live_classes: MockResourceClient::<LiveClass>::empty().shared(),
            dashboard: mocks.dashboard.shared(),
            lookups: MockLookupSource::new().shared(),
        };
        let (tx, rx) = mpsc::channel(16);
        let config = TuiConfig::parse(CONFIG).unwrap();
        (App::new(config, clients, tx), mocks, rx)
    }

    async fn pump(app: &mut App, rx: &mut mpsc::Receiver<TuiEvent>) {
        let event = rx.recv().await.unwrap();
        assert!(!app.handle_event(event));
    }

    #[tokio::test]
    async fn test_switch_mounts_and_loads() {
        let (mut app, mocks, mut rx) = app();
        app.switch_to(View::Mentors);
        assert!(app.active().is_loading());
        pump(&mut app, &mut rx).await;

        assert_eq!(app.active().view(), View::Mentors);
        assert_eq!(app.active().record_count(), 1);
        assert!(!app.active().is_loading());
        assert_eq!(mocks.mentors.calls(Operation::List), 1);
        assert_eq!(mocks.users.calls(Operation::List), 0);
    }

    #[tokio::test]
    async fn test_late_result_for_unmounted_screen_is_dropped() {
        let (mut app, mocks, mut rx) = app();
        mocks.users.pause();
        app.switch_to(View::Users);
        let first_mount = app.active().mount_id();

        app.handle_action(Action::SwitchView(2));
        assert_ne!(app.active().mount_id(), first_mount);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.active().record_count(), 1);

        mocks.users.resume();
        pump(&mut app, &mut rx).await;
        assert_eq!(app.active().view(), View::Mentors);
        assert_eq!(app.active().record_count(), 1);
        assert!(app.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_offers_retry() {
        let (mut app, mocks, mut rx) = app();
        mocks
            .users
            .fail_next(Operation::List, ClientError::network("connection refused"));
        app.switch_to(View::Users);
        pump(&mut app, &mut rx).await;

        let note = app.notifications.last().unwrap();
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(note.action, Some(NotificationAction::Retry(View::Users)));

        app.handle_action(Action::Refresh);
        assert!(app.notifications.is_empty());
        pump(&mut app, &mut rx).await;
        assert_eq!(app.active().record_count(), 12);
        assert_eq!(mocks.users.calls(Operation::List), 2);
    }

    #[tokio::test]
    async fn test_cancel_dismisses_notifications_when_idle() {
        let (mut app, _mocks, _rx) = app();
        app.notify(Notification::error("boom"));
        app.handle_action(Action::Cancel);
        assert!(app.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_delete_is_refused() {
        let (mut app, mocks, mut rx) = app();
        mocks.mentors.set_unsupported(MutationKind::Delete);
        app.switch_to(View::Mentors);
        pump(&mut app, &mut rx).await;

        app.handle_action(Action::DeleteItem);
        let note = app.notifications.last().unwrap();
        assert_eq!(note.level, NotificationLevel::Info);
        assert!(app.active().is_idle());
    }

    #[tokio::test]
    async fn test_quit_closes_modal_before_quitting() {
        let (mut app, _mocks, mut rx) = app();
        app.switch_to(View::Users);
        pump(&mut app, &mut rx).await;

        app.handle_action(Action::ViewItem);
        assert!(!app.active().is_idle());
        assert!(!app.handle_action(Action::Quit));
        assert!(app.active().is_idle());
        assert!(app.handle_action(Action::Quit));
    }

    #[tokio::test]
    async fn test_expire_keeps_errors() {
        let (mut app, _mocks, _rx) = app();
        app.notify(Notification::success("saved"));
        app.notify(Notification::error("failed"));
        app.expire_notifications(Utc::now() + Duration::seconds(NOTICE_TTL_SECS + 1));
        assert_eq!(app.notifications.len(), 1);
        assert_eq!(app.notifications[0].level, NotificationLevel::Error);
    }

    #[test]
    fn test_persisted_state_tracks_view() {
        let (app, _mocks, _rx) = app();
        assert_eq!(app.persisted_state().active_view, View::Dashboard);
    }

    #[tokio::test]
    async fn test_dashboard_is_mounted_first_and_loads() {
        let (mut app, mocks, mut rx) = app();
        assert_eq!(app.active().view(), View::Dashboard);
        app.switch_to(View::Dashboard);
        pump(&mut app, &mut rx).await;

        assert_eq!(app.active().record_count(), 9);
        assert_eq!(mocks.dashboard.calls(), 1);
        assert_eq!(mocks.users.calls(Operation::List), 0);
    }

    #[tokio::test]
    async fn test_dashboard_retry_clears_its_notice() {
        let (mut app, mocks, mut rx) = app();
        mocks.dashboard.fail_next(ClientError::network("connection refused"));
        app.switch_to(View::Dashboard);
        pump(&mut app, &mut rx).await;
        assert_eq!(
            app.notifications.last().and_then(|note| note.action),
            Some(NotificationAction::Retry(View::Dashboard))
        );

        app.handle_action(Action::Refresh);
        assert!(app.notifications.is_empty());
        pump(&mut app, &mut rx).await;
        assert_eq!(app.active().record_count(), 9);
    }
}
