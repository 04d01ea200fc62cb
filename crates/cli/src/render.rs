//! Plain-text rendering of the application screen

use std::fmt::Write;

use taskflow_core::app::{AuthMode, Notice, Screen};
use taskflow_core::view::{TaskCard, TaskListView};

pub fn render_screen(screen: &Screen) -> String {
    let mut out = String::new();
    if let Some(notice) = screen.notice() {
        render_notice(&mut out, notice);
    }

    match screen {
        Screen::Auth { mode, loading, .. } => {
            let prompt = match mode {
                AuthMode::Register => {
                    "Not signed in. Use 'register <email> <password>' or 'login <email> <password>'."
                }
                AuthMode::Login => "Account created. Use 'login <email> <password>' to continue.",
            };
            out.push_str(prompt);
            out.push('\n');
            if *loading {
                out.push_str("(working...)\n");
            }
        }
        Screen::Main {
            identity,
            view,
            loading,
            ..
        } => {
            let _ = writeln!(out, "Signed in as {}", identity.email);
            render_list(&mut out, view);
            if *loading {
                out.push_str("(working...)\n");
            }
        }
    }
    out
}

fn render_notice(out: &mut String, notice: &Notice) {
    let _ = writeln!(out, "{}", notice.message);
}

pub fn render_list(out: &mut String, view: &TaskListView) {
    let _ = writeln!(out, "== {} ({}) ==", view.filter.label(), view.len());
    if view.is_empty() {
        out.push_str("  No tasks here.\n");
        return;
    }
    for (index, card) in view.cards.iter().enumerate() {
        let _ = writeln!(out, "{}", render_card(index + 1, card));
    }
}

/// One line per card: position, check box, title, tags, then the actions
pub fn render_card(position: usize, card: &TaskCard) -> String {
    let mut line = format!(
        "{:>3}. [{}] {}",
        position,
        if card.completed { "x" } else { " " },
        card.title
    );

    for tag in &card.tags {
        line.push_str("  ");
        line.push_str(&tag.display());
        if tag.overdue {
            line.push_str(" (overdue)");
        }
    }

    for action in [&card.toggle, &card.delete] {
        if action.disabled {
            let _ = write!(line, "  <{}>", action.label);
        } else {
            let _ = write!(line, "  [{}]", action.label);
        }
    }
    line
}
