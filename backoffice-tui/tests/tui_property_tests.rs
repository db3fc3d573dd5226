use backoffice_core::{FieldOption, LiveClass, MutationKind, Relation, ResourceKind, User};
use backoffice_test_utils::fixtures::{live_class, user, users};
use backoffice_test_utils::{ClientError, MockLookupSource, MockResourceClient, Operation};
use backoffice_tui::config::{default_page_size, TuiConfig};
use backoffice_tui::events::TuiEvent;
use backoffice_tui::keys::{map_key, Action, InputMode};
use backoffice_tui::nav::View;
use backoffice_tui::notifications::{Notification, NotificationLevel};
use backoffice_tui::screen::{Screen, ScreenContext, ScreenOps, ScreenRecord};
use backoffice_tui::theme::{attendance_status_color, role_color, Theme};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use proptest::prelude::*;
use std::path::Path;
use tokio::sync::mpsc;

const CONFIG: &str = r#"
api_base_url = "http://localhost:4000/api"
request_timeout_ms = 5000
persistence_path = "tmp/backoffice.json"
log_path = "tmp/backoffice.log"
export_dir = "tmp/exports"

[theme]
name = "synthbrute"
"#;

fn base_config() -> TuiConfig {
    TuiConfig::parse(CONFIG).unwrap()
}

fn key(ch: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(ch),
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

#[test]
fn config_requires_known_theme() {
    let mut config = base_config();
    config.theme.name = "neon".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_zero_page_size() {
    let contents = format!("{}\n[resources.users]\npage_size = 0\n", CONFIG);
    let config = TuiConfig::parse(&contents).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn config_route_override_disables_action() {
    let contents = format!("{}\n[resources.courses.routes]\ncreate = \"\"\n", CONFIG);
    let config = TuiConfig::parse(&contents).unwrap();
    config.validate().unwrap();
    assert!(!config.endpoints(ResourceKind::Course).supports(MutationKind::Create));
    assert!(config.endpoints(ResourceKind::Course).supports(MutationKind::Update));
}

#[test]
fn text_mode_swallows_command_keys() {
    for ch in ['q', 'd', 'x', '1'] {
        assert_eq!(map_key(key(ch), InputMode::Text), Some(Action::Input(ch)));
    }
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(map_key(ctrl_c, InputMode::Text), Some(Action::Quit));
}

proptest! {
    #[test]
    fn keybinding_digit_switches_view(digit in 0u8..=9u8) {
        let ch = char::from(b'0' + digit);
        let action = map_key(key(ch), InputMode::Normal);
        match ch {
            '1'..='7' => {
                let index = (digit - 1) as usize;
                prop_assert_eq!(action, Some(Action::SwitchView(index)));
                prop_assert!(View::from_index(index).is_some());
            }
            _ => prop_assert!(action.is_none()),
        }
    }

    #[test]
    fn navigation_keys_consistent(use_vim in prop::bool::ANY) {
        let event = if use_vim {
            key('j')
        } else {
            KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)
        };
        prop_assert_eq!(map_key(event, InputMode::Normal), Some(Action::MoveDown));
    }

    #[test]
    fn all_action_keys_mapped(key_char in "[qfcvendrx/]") {
        let ch = key_char.chars().next().unwrap();
        prop_assert!(map_key(key(ch), InputMode::Normal).is_some(), "Key '{}' should map to an action", ch);
    }

    #[test]
    fn view_cycle_round_trips(index in 0usize..7, steps in 0usize..20) {
        let start = View::from_index(index).unwrap();
        let mut view = start;
        for _ in 0..steps {
            view = view.next();
        }
        for _ in 0..steps {
            view = view.previous();
        }
        prop_assert_eq!(view, start);
        match start.resource() {
            Some(kind) => prop_assert_eq!(View::for_resource(kind), start),
            None => prop_assert_eq!(start, View::Dashboard),
        }
    }

    #[test]
    fn page_size_override_applies(size in 1usize..200) {
        let contents = format!("{}\n[resources.mentors]\npage_size = {}\n", CONFIG, size);
        let config = TuiConfig::parse(&contents).unwrap();
        prop_assert!(config.validate().is_ok());
        prop_assert_eq!(config.page_size(ResourceKind::Mentor).get(), size);
        prop_assert_eq!(config.page_size(ResourceKind::User), default_page_size(ResourceKind::User));
    }

    #[test]
    fn attendance_status_colors_correct(status in prop::sample::select(vec!["present", "Absent", "late", "excused"])) {
        let theme = Theme::synthbrute();
        let expected = match status.to_ascii_lowercase().as_str() {
            "present" => theme.success,
            "absent" => theme.error,
            "late" => theme.warning,
            _ => theme.text_dim,
        };
        prop_assert_eq!(attendance_status_color(status, &theme), expected);
    }

    #[test]
    fn role_colors_correct(role in prop::sample::select(vec!["admin", "mentor", "student", ""])) {
        let theme = Theme::classic();
        let expected = match role {
            "admin" => theme.secondary,
            "mentor" => theme.warning,
            "student" => theme.primary,
            _ => theme.text_dim,
        };
        prop_assert_eq!(role_color(role, &theme), expected);
    }
}

// ============================================================================
// SCREEN FLOWS
// ============================================================================

async fn loaded_screen(
    mock: &MockResourceClient<User>,
    events: &mpsc::Sender<TuiEvent>,
    rx: &mut mpsc::Receiver<TuiEvent>,
) -> Screen<User> {
    let mut screen = Screen::new(mock.shared(), default_page_size(ResourceKind::User), 1);
    let ctx = ScreenContext {
        events,
        export_dir: Path::new("unused"),
    };
    screen.start_refresh(&ctx);
    complete_next(&mut screen, rx).await;
    screen
}

async fn complete_next<R: ScreenRecord>(
    screen: &mut Screen<R>,
    rx: &mut mpsc::Receiver<TuiEvent>,
) -> Option<Notification> {
    match rx.recv().await.unwrap() {
        TuiEvent::Completed { mount, completion } => {
            assert_eq!(mount, screen.mount_id());
            screen.complete(completion)
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn search_narrows_the_table_live() {
    let mock = MockResourceClient::new(users(12));
    let (tx, mut rx) = mpsc::channel(8);
    let mut screen = loaded_screen(&mock, &tx, &mut rx).await;
    let ctx = ScreenContext {
        events: &tx,
        export_dir: Path::new("unused"),
    };

    assert_eq!(screen.store().page().len(), 10);
    screen.handle(Action::OpenSearch, &ctx);
    assert_eq!(screen.input_mode(), InputMode::Text);
    for ch in "user 1".chars() {
        screen.handle(Action::Input(ch), &ctx);
    }
    // "user 1", "user 10", "user 11", "user 12"
    assert_eq!(screen.store().filtered().len(), 4);

    screen.handle(Action::Cancel, &ctx);
    assert_eq!(screen.input_mode(), InputMode::Normal);
    assert_eq!(screen.store().filtered().len(), 12);
}

#[tokio::test]
async fn backspacing_search_to_empty_restores_the_table() {
    let mock = MockResourceClient::new(users(12));
    let (tx, mut rx) = mpsc::channel(8);
    let mut screen = loaded_screen(&mock, &tx, &mut rx).await;
    let ctx = ScreenContext {
        events: &tx,
        export_dir: Path::new("unused"),
    };

    screen.handle(Action::OpenSearch, &ctx);
    for ch in "user 1".chars() {
        screen.handle(Action::Input(ch), &ctx);
    }
    assert_eq!(screen.store().filtered().len(), 4);
    for _ in 0.."user 1".len() {
        screen.handle(Action::Backspace, &ctx);
    }
    assert_eq!(screen.search_input(), Some(""));
    assert_eq!(screen.store().filtered().len(), 12);
    assert_eq!(screen.store().page().len(), 10);

    // Esc after confirming an empty search leaves the full view too.
    screen.handle(Action::Confirm, &ctx);
    screen.handle(Action::OpenSearch, &ctx);
    screen.handle(Action::Cancel, &ctx);
    assert_eq!(screen.store().search_text(), "");
    assert_eq!(screen.store().filtered().len(), 12);
}

#[tokio::test]
async fn choice_filter_keeps_its_value_across_reloads() {
    let mut mentor = user("m", "mentor one");
    mentor.role = Some("mentor".to_string());
    let mut records = users(2);
    records.push(mentor.clone());
    let mock = MockResourceClient::new(records);
    let (tx, mut rx) = mpsc::channel(8);
    let mut screen = loaded_screen(&mock, &tx, &mut rx).await;
    let ctx = ScreenContext {
        events: &tx,
        export_dir: Path::new("unused"),
    };

    screen.handle(Action::CycleFilter, &ctx);
    screen.handle(Action::CycleFilter, &ctx);
    assert_eq!(screen.choice(), Some("student"));

    // "admin" sorts ahead of both, so an index would now point at "mentor".
    let mut admin = user("a", "admin one");
    admin.role = Some("admin".to_string());
    let mut reloaded = users(2);
    reloaded.push(mentor);
    reloaded.push(admin);
    mock.set_records(reloaded);
    screen.handle(Action::Refresh, &ctx);
    complete_next(&mut screen, &mut rx).await;

    assert_eq!(screen.choices().len(), 3);
    assert_eq!(screen.choice(), Some("student"));
    let filtered = screen.store().filtered();
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|u| u.role.as_deref() == Some("student")));

    screen.handle(Action::CycleFilter, &ctx);
    assert_eq!(screen.choice(), None);
    assert_eq!(screen.store().filtered().len(), 4);
}

#[tokio::test]
async fn choice_filter_cycles_through_roles() {
    let mut records = users(3);
    let mut mentor = user("m", "mentor one");
    mentor.role = Some("mentor".to_string());
    records.push(mentor);
    let mock = MockResourceClient::new(records);
    let (tx, mut rx) = mpsc::channel(8);
    let mut screen = loaded_screen(&mock, &tx, &mut rx).await;
    let ctx = ScreenContext {
        events: &tx,
        export_dir: Path::new("unused"),
    };

    assert_eq!(screen.choices(), vec!["mentor".to_string(), "student".to_string()]);
    screen.handle(Action::CycleFilter, &ctx);
    assert_eq!(screen.choice(), Some("mentor"));
    assert_eq!(screen.store().filtered().len(), 1);
    screen.handle(Action::CycleFilter, &ctx);
    assert_eq!(screen.store().filtered().len(), 3);
    screen.handle(Action::CycleFilter, &ctx);
    assert_eq!(screen.choice(), None);
    assert_eq!(screen.store().filtered().len(), 4);
}

#[tokio::test]
async fn edit_flow_submits_and_replaces_the_row() {
    let mock = MockResourceClient::new(vec![user("u1", "Asha"), user("u2", "Ravi")]);
    let (tx, mut rx) = mpsc::channel(8);
    let mut screen = loaded_screen(&mock, &tx, &mut rx).await;
    let ctx = ScreenContext {
        events: &tx,
        export_dir: Path::new("unused"),
    };

    screen.handle(Action::EditItem, &ctx);
    assert!(!screen.is_idle());
    screen.handle(Action::EditItem, &ctx);
    assert_eq!(screen.form().input.as_deref(), Some("Asha"));
    for _ in 0..4 {
        screen.handle(Action::Backspace, &ctx);
    }
    for ch in "Zed".chars() {
        screen.handle(Action::Input(ch), &ctx);
    }
    screen.handle(Action::Confirm, &ctx);
    assert!(screen.form().input.is_none());

    assert!(screen.handle(Action::Confirm, &ctx).is_none());
    let note = complete_next(&mut screen, &mut rx).await.unwrap();
    assert_eq!(note.level, NotificationLevel::Success);
    assert!(screen.is_idle());
    assert_eq!(screen.store().records()[0].name.as_deref(), Some("Zed"));
    assert_eq!(screen.store().records()[1].name.as_deref(), Some("Ravi"));
    assert_eq!(mock.calls(Operation::Update), 1);
}

#[tokio::test]
async fn delete_flow_removes_the_row() {
    let mock = MockResourceClient::new(users(3));
    let (tx, mut rx) = mpsc::channel(8);
    let mut screen = loaded_screen(&mock, &tx, &mut rx).await;
    let ctx = ScreenContext {
        events: &tx,
        export_dir: Path::new("unused"),
    };

    screen.handle(Action::MoveDown, &ctx);
    screen.handle(Action::DeleteItem, &ctx);
    screen.handle(Action::Confirm, &ctx);
    let note = complete_next(&mut screen, &mut rx).await.unwrap();
    assert_eq!(note.level, NotificationLevel::Success);
    let ids: Vec<String> = screen
        .store()
        .records()
        .iter()
        .map(|r| r.id.to_string())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(mock.records().len(), 2);
}

#[tokio::test]
async fn export_writes_the_filtered_view() {
    let mock = MockResourceClient::new(users(12));
    let (tx, mut rx) = mpsc::channel(8);
    let screen = loaded_screen(&mock, &tx, &mut rx).await;
    let dir = tempfile::tempdir().unwrap();

    let (path, rows) = screen.export_to(dir.path()).unwrap();
    assert_eq!(rows, 12);
    assert!(path.starts_with(dir.path()));
    let contents = std::fs::read_to_string(&path).unwrap();
    let header = contents.lines().next().unwrap();
    assert!(header.contains("email"));
    assert!(contents.contains("user 12"));
}

async fn form_screen(
    mock: &MockResourceClient<LiveClass>,
    lookups: &MockLookupSource,
    events: &mpsc::Sender<TuiEvent>,
    rx: &mut mpsc::Receiver<TuiEvent>,
) -> Screen<LiveClass> {
    let mut screen = Screen::new(mock.shared(), default_page_size(ResourceKind::LiveClass), 1)
        .with_lookups(lookups.shared());
    let ctx = ScreenContext {
        events,
        export_dir: Path::new("unused"),
    };
    screen.start_refresh(&ctx);
    complete_next(&mut screen, rx).await;
    screen
}

fn select_field<R: ScreenRecord>(screen: &mut Screen<R>, name: &str, ctx: &ScreenContext<'_>) {
    let target = screen
        .form_fields()
        .iter()
        .position(|spec| spec.name == name)
        .unwrap();
    while screen.form().field != target {
        screen.handle(Action::MoveDown, ctx);
    }
}

fn draft_value<R: ScreenRecord>(screen: &Screen<R>, name: &str) -> String {
    screen.editing().session().unwrap().draft().display(name)
}

#[tokio::test]
async fn create_form_picks_enrollment_and_mentor_from_lists() {
    let mock = MockResourceClient::new(vec![live_class("l1", "Hooks", "React")]);
    let lookups = MockLookupSource::new();
    lookups.set_options(
        Relation::Enrollments,
        vec![FieldOption::new("e1", "FS-Jan (1)"), FieldOption::new("e2", "DS-Feb (2)")],
    );
    lookups.set_options(Relation::Mentors, vec![FieldOption::new("m1", "Ravi Kumar")]);
    let (tx, mut rx) = mpsc::channel(8);
    let mut screen = form_screen(&mock, &lookups, &tx, &mut rx).await;
    let ctx = ScreenContext {
        events: &tx,
        export_dir: Path::new("unused"),
    };

    screen.handle(Action::NewItem, &ctx);
    assert!(complete_next(&mut screen, &mut rx).await.is_none());
    assert!(complete_next(&mut screen, &mut rx).await.is_none());
    assert_eq!(lookups.calls(Relation::Enrollments), 1);
    assert_eq!(lookups.calls(Relation::Mentors), 1);
    assert!(screen.field_options("className").is_none());

    select_field(&mut screen, "enrollmentId", &ctx);
    screen.handle(Action::NextPage, &ctx);
    screen.handle(Action::NextPage, &ctx);
    assert_eq!(draft_value(&screen, "enrollmentId"), "e2");
    screen.handle(Action::NextPage, &ctx);
    assert_eq!(draft_value(&screen, "enrollmentId"), "e1");
    assert_eq!(screen.option_label("enrollmentId", "e1"), Some("FS-Jan (1)"));

    select_field(&mut screen, "mentorId", &ctx);
    screen.handle(Action::PrevPage, &ctx);
    assert_eq!(draft_value(&screen, "mentorId"), "m1");

    screen.handle(Action::Confirm, &ctx);
    let note = complete_next(&mut screen, &mut rx).await.unwrap();
    assert_eq!(note.level, NotificationLevel::Success);
    let created = mock.records().pop().unwrap();
    assert_eq!(created.enrollment_id.as_ref().map(|id| id.as_str()), Some("e1"));
    assert_eq!(created.mentor_id.as_ref().map(|id| id.as_str()), Some("m1"));

    // Choices are cached for the life of the screen.
    screen.handle(Action::NewItem, &ctx);
    assert_eq!(lookups.calls(Relation::Enrollments), 1);
}

#[tokio::test]
async fn user_form_takes_course_name_and_id_from_courses() {
    let mock = MockResourceClient::new(users(2));
    let lookups = MockLookupSource::new();
    lookups.set_options(
        Relation::Courses,
        vec![FieldOption::new("c1", "Full Stack"), FieldOption::new("c2", "Data Science")],
    );
    let (tx, mut rx) = mpsc::channel(8);
    let mut screen = Screen::new(mock.shared(), default_page_size(ResourceKind::User), 1)
        .with_lookups(lookups.shared());
    let ctx = ScreenContext {
        events: &tx,
        export_dir: Path::new("unused"),
    };
    screen.start_refresh(&ctx);
    complete_next(&mut screen, &mut rx).await;

    screen.handle(Action::NewItem, &ctx);
    complete_next(&mut screen, &mut rx).await;
    assert_eq!(lookups.calls(Relation::Courses), 1);

    select_field(&mut screen, "courseId", &ctx);
    screen.handle(Action::PrevPage, &ctx);
    assert_eq!(draft_value(&screen, "courseId"), "c2");
    select_field(&mut screen, "course", &ctx);
    screen.handle(Action::NextPage, &ctx);
    assert_eq!(draft_value(&screen, "course"), "Full Stack");

    // Editing offers the course name only; the id is not an edit field.
    screen.handle(Action::Cancel, &ctx);
    screen.handle(Action::EditItem, &ctx);
    assert!(screen.field_options("courseId").is_none());
    assert_eq!(screen.field_options("course").map(<[FieldOption]>::len), Some(2));
}

#[tokio::test]
async fn failed_option_load_warns_and_keeps_free_text() {
    let mock = MockResourceClient::new(vec![live_class("l1", "Hooks", "React")]);
    let lookups = MockLookupSource::new();
    lookups.fail_next(ClientError::network("connection refused"));
    let (tx, mut rx) = mpsc::channel(8);
    let mut screen = form_screen(&mock, &lookups, &tx, &mut rx).await;
    let ctx = ScreenContext {
        events: &tx,
        export_dir: Path::new("unused"),
    };

    screen.handle(Action::NewItem, &ctx);
    let first = complete_next(&mut screen, &mut rx).await;
    let second = complete_next(&mut screen, &mut rx).await;
    let warnings: Vec<Notification> = first.into_iter().chain(second).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, NotificationLevel::Warning);

    // The relation that failed is fetched again when a form reopens.
    screen.handle(Action::Cancel, &ctx);
    screen.handle(Action::NewItem, &ctx);
    complete_next(&mut screen, &mut rx).await;
    assert_eq!(
        lookups.calls(Relation::Enrollments) + lookups.calls(Relation::Mentors),
        3
    );

    select_field(&mut screen, "enrollmentId", &ctx);
    screen.handle(Action::EditItem, &ctx);
    for ch in "e9".chars() {
        screen.handle(Action::Input(ch), &ctx);
    }
    screen.handle(Action::Confirm, &ctx);
    assert_eq!(draft_value(&screen, "enrollmentId"), "e9");
}
