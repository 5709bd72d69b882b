//! Server-side HTML rendering of the application state.
//!
//! The `data-cy` attributes are the contract automated UI tests select on and
//! must not change. Every interactive element is a plain form post (or link)
//! back to the host, which maps it onto a `TodoApp` operation.

use std::fmt::Write;

use crate::filter::Filter;
use crate::store::{AppState, ERROR_DISPLAY};
use crate::types::Todo;

/// Render the full page for `state`.
pub fn render_page(state: &AppState) -> String {
    let refresh = match state.error() {
        Some(_) => format!(
            r#"<meta http-equiv="refresh" content="{}">"#,
            ERROR_DISPLAY.as_secs()
        ),
        None => String::new(),
    };
    document(&refresh, &render_app(state))
}

/// The static screen shown when no owner id is configured.
pub fn render_user_warning() -> String {
    let body = concat!(
        r#"<section class="section">"#,
        r#"<p class="box is-size-3">"#,
        "Please set <b>TODO_USER_ID</b> (or pass <code>--user-id</code>) ",
        "to the id of the user whose todos should be shown, then restart the app.",
        "</p>",
        "</section>",
    );
    document("", body)
}

/// Render the application markup without the surrounding document.
pub fn render_app(state: &AppState) -> String {
    let mut out = String::new();
    out.push_str(r#"<div class="todoapp"><h1 class="todoapp__title">todos</h1><div class="todoapp__content">"#);
    render_header(&mut out, state);
    out.push_str(r#"<section class="todoapp__main" data-cy="TodoList">"#);
    for todo in state.filtered() {
        render_todo(&mut out, state, todo);
    }
    out.push_str("</section>");
    if state.footer_visible() {
        render_footer(&mut out, state);
    }
    out.push_str("</div>");
    render_error(&mut out, state);
    out.push_str("</div>");
    out
}

fn document(head: &str, body: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>",
            r#"<html lang="en"><head><meta charset="utf-8"><title>todos</title>{}</head>"#,
            "<body>{}</body></html>",
        ),
        head, body
    )
}

fn render_header(out: &mut String, state: &AppState) {
    out.push_str(r#"<header class="todoapp__header">"#);
    if !state.todos().is_empty() {
        let active = if state.all_completed() { " active" } else { "" };
        let _ = write!(
            out,
            r#"<form method="post" action="/todos/toggle-all"><button type="submit" class="todoapp__toggle-all{active}" data-cy="ToggleAllButton"></button></form>"#
        );
    }

    let composer = state.composer();
    let disabled = if composer.submitting { " disabled" } else { "" };
    let autofocus = if composer.focus_requested { " autofocus" } else { "" };
    let _ = write!(
        out,
        r#"<form method="post" action="/todos"><input data-cy="NewTodoField" type="text" name="title" class="todoapp__new-todo" placeholder="What needs to be done?" value="{}"{disabled}{autofocus}></form>"#,
        escape(&composer.title)
    );
    out.push_str("</header>");
}

fn render_todo(out: &mut String, state: &AppState, todo: &Todo) {
    let id = todo.id;
    let completed = if todo.completed { " completed" } else { "" };
    let checked = if todo.completed { " checked" } else { "" };
    let _ = write!(
        out,
        r#"<div data-cy="Todo" class="todo{completed}"><form method="post" action="/todos/{id}/toggle"><label class="todo__status-label"><input data-cy="TodoStatus" type="checkbox" class="todo__status"{checked} onchange="this.form.submit()"></label></form>"#
    );

    match state.inline_edit().filter(|edit| edit.id == id) {
        Some(edit) => {
            let _ = write!(
                out,
                r#"<form method="post" action="/todos/{id}/title"><input data-cy="TodoTitleField" type="text" name="title" class="todo__title-field" placeholder="Empty todo will be deleted" value="{}" autofocus onblur="this.form.submit()" onkeyup="if (event.key === 'Escape') {{ this.form.action = '/todos/{id}/cancel'; this.form.submit(); }}"></form>"#,
                escape(&edit.draft)
            );
        }
        None => {
            let _ = write!(
                out,
                r#"<form method="post" action="/todos/{id}/edit"><span data-cy="TodoTitle" class="todo__title" ondblclick="this.closest('form').submit()">{}</span></form>"#,
                escape(&todo.title)
            );
        }
    }

    let _ = write!(
        out,
        r#"<form method="post" action="/todos/{id}/delete"><button type="submit" class="todo__remove" data-cy="TodoDelete">×</button></form>"#
    );

    let busy = if state.is_busy(id) { " is-active" } else { "" };
    let _ = write!(
        out,
        r#"<div data-cy="TodoLoader" class="modal overlay{busy}"><div class="modal-background has-background-white-ter"></div><div class="loader"></div></div></div>"#
    );
}

fn render_footer(out: &mut String, state: &AppState) {
    let _ = write!(
        out,
        r#"<footer class="todoapp__footer" data-cy="Footer"><span class="todo-count" data-cy="TodosCounter">{} items left</span><nav class="filter" data-cy="Filter">"#,
        state.active_count()
    );
    for filter in Filter::ALL {
        let selected = if filter == state.filter() { " selected" } else { "" };
        let _ = write!(
            out,
            r#"<a href="/filter/{filter}" class="filter__link{selected}" data-cy="{}">{}</a>"#,
            filter.link_tag(),
            filter.label()
        );
    }
    out.push_str("</nav>");
    if state.any_completed() {
        out.push_str(r#"<form method="post" action="/clear-completed"><button type="submit" class="todoapp__clear-completed" data-cy="ClearCompletedButton">Clear completed</button></form>"#);
    }
    out.push_str("</footer>");
}

fn render_error(out: &mut String, state: &AppState) {
    let (hidden, message) = match state.error() {
        Some(banner) => ("", banner.message()),
        None => (" hidden", String::new()),
    };
    let _ = write!(
        out,
        r#"<div data-cy="ErrorNotification" class="notification is-danger is-light has-text-weight-normal{hidden}"><form method="post" action="/error/dismiss"><button data-cy="HideErrorButton" type="submit" class="delete"></button></form>{}</div>"#,
        escape(&message)
    );
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Action;
    use tokio::time::Instant;

    fn todo(id: i64, title: &str, completed: bool) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            completed,
            user_id: 1,
        }
    }

    fn state_with(todos: Vec<Todo>) -> AppState {
        let mut state = AppState::new();
        state.apply(Action::LoadSucceeded(todos), Instant::now());
        state
    }

    fn count(html: &str, tag: &str) -> usize {
        html.matches(&format!(r#"data-cy="{tag}""#)).count()
    }

    #[test]
    fn renders_every_contract_tag() {
        let html = render_app(&state_with(vec![todo(1, "a", false), todo(2, "b", true)]));
        for tag in [
            "NewTodoField",
            "ToggleAllButton",
            "TodoList",
            "TodoStatus",
            "TodoTitle",
            "TodoDelete",
            "TodoLoader",
            "Footer",
            "TodosCounter",
            "Filter",
            "FilterLinkAll",
            "FilterLinkActive",
            "FilterLinkCompleted",
            "ClearCompletedButton",
        ] {
            assert!(count(&html, tag) >= 1, "missing {tag}");
        }
        assert_eq!(count(&html, "Todo"), 2);
        assert!(html.contains("1 items left"));
    }

    #[test]
    fn empty_list_hides_toggle_all_and_footer() {
        let html = render_app(&AppState::new());
        assert_eq!(count(&html, "ToggleAllButton"), 0);
        assert_eq!(count(&html, "Footer"), 0);
        assert_eq!(count(&html, "Todo"), 0);
    }

    #[test]
    fn toggle_all_is_active_only_when_all_completed() {
        let html = render_app(&state_with(vec![todo(1, "a", true)]));
        assert!(html.contains("todoapp__toggle-all active"));
        let html = render_app(&state_with(vec![todo(1, "a", false)]));
        assert!(!html.contains("todoapp__toggle-all active"));
    }

    #[test]
    fn clear_completed_needs_a_completed_todo() {
        let html = render_app(&state_with(vec![todo(1, "a", false)]));
        assert_eq!(count(&html, "ClearCompletedButton"), 0);
    }

    #[test]
    fn busy_todo_shows_active_overlay() {
        let mut state = state_with(vec![todo(1, "a", false), todo(2, "b", false)]);
        state.apply(Action::DeleteRequested(2), Instant::now());
        let html = render_app(&state);
        assert_eq!(html.matches("modal overlay is-active").count(), 1);
    }

    #[test]
    fn inline_edit_replaces_title_for_that_todo_only() {
        let mut state = state_with(vec![todo(1, "a", false), todo(2, "b", false)]);
        state.apply(Action::EditStarted(2), Instant::now());
        let html = render_app(&state);
        assert_eq!(count(&html, "TodoTitleField"), 1);
        assert_eq!(count(&html, "TodoTitle"), 1);
        assert!(html.contains(r#"action="/todos/2/title""#));
    }

    #[test]
    fn selected_filter_link_is_marked() {
        let mut state = state_with(vec![todo(1, "a", false)]);
        state.apply(Action::FilterSelected(Filter::Active), Instant::now());
        let html = render_app(&state);
        assert!(html.contains(r#"class="filter__link selected" data-cy="FilterLinkActive""#));
    }

    #[test]
    fn filter_links_target_host_filter_routes() {
        let html = render_app(&state_with(vec![todo(1, "a", false)]));
        assert!(html.contains(r#"<a href="/filter/all" class="filter__link selected" data-cy="FilterLinkAll">"#));
        assert!(html.contains(r#"<a href="/filter/active" class="filter__link" data-cy="FilterLinkActive">"#));
        assert!(html.contains(r#"<a href="/filter/completed" class="filter__link" data-cy="FilterLinkCompleted">"#));
        assert!(!html.contains("href=\"#"));
    }

    #[test]
    fn error_notification_shows_message_or_hides() {
        let mut state = state_with(vec![todo(1, "a", false)]);
        assert!(render_app(&state).contains("has-text-weight-normal hidden"));
        state.apply(Action::AddRejected, Instant::now());
        let html = render_app(&state);
        assert!(html.contains("Title should not be empty"));
        assert!(!html.contains("has-text-weight-normal hidden"));
        assert!(render_page(&state).contains(r#"http-equiv="refresh""#));
    }

    #[test]
    fn titles_are_escaped() {
        let html = render_app(&state_with(vec![todo(1, "<b>\"x\"</b>", false)]));
        assert!(html.contains("&lt;b&gt;&quot;x&quot;&lt;/b&gt;"));
        assert!(!html.contains("<b>\"x\""));
    }

    #[test]
    fn user_warning_is_a_full_document() {
        let html = render_user_warning();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("TODO_USER_ID"));
    }
}
