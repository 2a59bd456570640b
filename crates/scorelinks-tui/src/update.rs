//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use scorelinks_core::ApiError;
use scorelinks_core::auth::ends_session;
use scorelinks_core::links::ListSnapshot;

use crate::effects::{UiEffect, assign_task_ids};
use crate::events::{AuthUiEvent, FormId, LinksUiEvent, MutationOrigin, UiEvent};
use crate::features::{links, login};
use crate::overlays::{
    LinkFormState, Overlay, OverlayRequest, OverlayTransition, OverlayUpdate,
};
use crate::state::{AppState, SESSION_EXPIRED_MESSAGE, Screen, Tab};

/// The main reducer function.
///
/// Task-spawning effects leave here with their ids assigned.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    let effects = reduce(app, event);
    assign_task_ids(&mut app.tui.task_seq, effects)
}

fn reduce(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            app.tui.links.expire_copied(Instant::now());
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TaskStarted { kind, started } => {
            app.tui.tasks.on_started(kind, &started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tui.tasks.state_mut(kind).finish_if_active(completed.id) {
                reduce(app, *completed.result)
            } else {
                tracing::debug!(?kind, id = completed.id.0, "dropping result of inactive task");
                vec![]
            }
        }
        UiEvent::Auth(auth_event) => handle_auth_event(app, auth_event),
        UiEvent::Links(links_event) => handle_links_event(app, links_event),
        UiEvent::Copied { link_id, result } => {
            match result {
                Ok(()) => app.tui.links.mark_copied(link_id, Instant::now()),
                Err(message) => app.tui.links.error = Some(format!("Copy failed: {message}")),
            }
            vec![]
        }
    }
}

// ============================================================================
// Terminal input
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Paste(text) => {
            handle_paste(app, &text);
            vec![]
        }
        _ => vec![],
    }
}

fn handle_paste(app: &mut AppState, text: &str) {
    if let Some(form) = app.overlay.as_mut().and_then(Overlay::as_link_form_mut) {
        form.paste(text);
    } else if app.overlay.is_none() && app.tui.screen() == Screen::Login {
        let busy = app.tui.auth.is_loading();
        login::handle_paste(&mut app.tui.login, busy, text);
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if let Some(overlay) = &mut app.overlay {
        let update = overlay.handle_key(key);
        return apply_overlay_update(app, update);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match app.tui.screen() {
        Screen::Loading => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => vec![UiEffect::Quit],
            KeyCode::Char('c') if ctrl => vec![UiEffect::Quit],
            _ => vec![],
        },
        Screen::Login => {
            let busy = app.tui.auth.is_loading();
            login::handle_key(&mut app.tui.login, &mut app.tui.auth, busy, key)
        }
        Screen::Dashboard | Screen::ManageLinks => handle_main_key(app, key),
    }
}

fn handle_main_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return vec![UiEffect::Quit],
        KeyCode::Char('q') => return vec![UiEffect::Quit],
        KeyCode::Tab | KeyCode::BackTab => {
            let next = app.tui.tab.next();
            return switch_tab(app, next);
        }
        KeyCode::Char('1') => return switch_tab(app, Tab::Dashboard),
        KeyCode::Char('2') => return switch_tab(app, Tab::ManageLinks),
        KeyCode::Char('L') => {
            tracing::info!("logging out");
            return end_session(app, None);
        }
        _ => {}
    }

    match app.tui.tab {
        Tab::Dashboard => match key.code {
            KeyCode::Char('r') => {
                app.tui.notice = None;
                vec![UiEffect::RefreshUser { task: None }]
            }
            _ => vec![],
        },
        Tab::ManageLinks => {
            let (effects, request) = links::handle_key(&mut app.tui.links, key);
            if let Some(request) = request {
                open_overlay(app, request);
            }
            effects
        }
    }
}

/// Switching to the links tab always re-fetches, so the table never shows
/// data older than the last visit.
fn switch_tab(app: &mut AppState, tab: Tab) -> Vec<UiEffect> {
    if app.tui.tab == tab {
        return vec![];
    }
    app.tui.tab = tab;
    app.tui.notice = None;
    match tab {
        Tab::Dashboard => vec![],
        Tab::ManageLinks => vec![UiEffect::FetchLinks { task: None }],
    }
}

fn apply_overlay_update(app: &mut AppState, update: OverlayUpdate) -> Vec<UiEffect> {
    match update.transition {
        OverlayTransition::Stay => {}
        OverlayTransition::Close => app.overlay = None,
        OverlayTransition::Open(request) => open_overlay(app, request),
    }
    update.effects
}

fn open_overlay(app: &mut AppState, request: OverlayRequest) {
    let form = app.tui.next_form_id();
    app.overlay = Some(Overlay::from_request(request, form));
}

/// The open link form, if it is the one with id `form`.
fn link_form_mut(overlay: &mut Option<Overlay>, form: FormId) -> Option<&mut LinkFormState> {
    overlay
        .as_mut()
        .and_then(Overlay::as_link_form_mut)
        .filter(|open| open.id == form)
}

// ============================================================================
// Session
// ============================================================================

/// Signs out locally and asks the runtime to clear the stored session.
fn end_session(app: &mut AppState, reason: Option<&str>) -> Vec<UiEffect> {
    app.overlay = None;
    app.tui.reset_session_view();
    app.tui.login.error = reason.map(str::to_string);
    vec![UiEffect::Logout]
}

/// Ends the session if `err` is a rejected token.
fn expire_if_unauthorized(app: &mut AppState, err: &ApiError) -> Option<Vec<UiEffect>> {
    if !ends_session(err, app.tui.logout_on_unauthorized) {
        return None;
    }
    tracing::warn!(status = ?err.status, "server rejected the session token");
    Some(end_session(app, Some(SESSION_EXPIRED_MESSAGE)))
}

fn handle_auth_event(app: &mut AppState, event: AuthUiEvent) -> Vec<UiEffect> {
    match event {
        AuthUiEvent::SessionRestored(state) => {
            app.tui.auth.adopt(&state);
            vec![]
        }
        AuthUiEvent::LoginFinished(result) => {
            login::handle_login_finished(&mut app.tui.login, &mut app.tui.auth, result);
            if app.tui.auth.is_authenticated() {
                app.tui.tab = Tab::Dashboard;
            }
            vec![]
        }
        AuthUiEvent::UserRefreshed(Ok(Some(user))) => {
            app.tui.auth.set_user(user);
            vec![]
        }
        AuthUiEvent::UserRefreshed(Ok(None)) => {
            app.tui.notice = Some("Profile refresh returned no user".to_string());
            vec![]
        }
        AuthUiEvent::UserRefreshed(Err(err)) => {
            if let Some(effects) = expire_if_unauthorized(app, &err) {
                return effects;
            }
            app.tui.notice = Some(format!("Failed to refresh profile: {}", err.message));
            vec![]
        }
    }
}

// ============================================================================
// Links
// ============================================================================

fn handle_links_event(app: &mut AppState, event: LinksUiEvent) -> Vec<UiEffect> {
    match event {
        LinksUiEvent::Loaded(result) => apply_list_result(app, result),
        LinksUiEvent::Mutated { origin, refetch } => {
            match origin {
                MutationOrigin::Row { link_id } => app.tui.links.end_row_action(&link_id),
                MutationOrigin::Form { form } => {
                    if link_form_mut(&mut app.overlay, form).is_some() {
                        app.overlay = None;
                    }
                }
            }
            apply_list_result(app, refetch)
        }
        LinksUiEvent::MutationFailed { origin, error } => {
            if let MutationOrigin::Row { link_id } = &origin {
                app.tui.links.end_row_action(link_id);
            }
            if let Some(effects) = expire_if_unauthorized(app, &error) {
                return effects;
            }
            let form = match origin {
                MutationOrigin::Form { form } => link_form_mut(&mut app.overlay, form),
                MutationOrigin::Row { .. } => None,
            };
            match form {
                Some(form) => form.fail(error.message),
                None => app.tui.links.error = Some(error.message),
            }
            vec![]
        }
    }
}

fn apply_list_result(app: &mut AppState, result: Result<ListSnapshot, ApiError>) -> Vec<UiEffect> {
    match result {
        Ok(snapshot) => {
            app.tui.links.apply_snapshot(snapshot);
            vec![]
        }
        Err(err) => {
            if let Some(effects) = expire_if_unauthorized(app, &err) {
                return effects;
            }
            tracing::warn!(kind = %err.kind, "failed to load api links: {}", err.message);
            app.tui.links.error = Some(format!("Failed to load API links: {}", err.message));
            vec![]
        }
    }
}
