//! HTML rendering for the list and category pages.
//!
//! All user-provided text is escaped before it is written into markup.

use std::fmt::Write;
use tasklist_core::{Category, Task, WorkingSet};

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto}\
.badge{display:inline-block;padding:0 .5rem;border-radius:.5rem;color:#fff}\
.done{text-decoration:line-through;color:#777}\
form.inline{display:inline}";

/// Renders the to-do list page: outstanding and completed tasks plus the
/// add-task form.
pub fn todo_list_page(owner: &str, working_set: &WorkingSet) -> String {
    let mut body = String::new();
    let _ = write!(body, "<h1>{}'s to-do list</h1>", escape_html(owner));
    body.push_str(r#"<p><a href="/categories">Manage categories</a></p>"#);

    body.push_str("<h2>To do</h2><ul>");
    for task in working_set.outstanding() {
        let color = category_color(working_set.categories(), &task.category);
        let _ = write!(
            body,
            r#"<li><form class="inline" method="post" action="/ticktask"><label class="todo"><input type="checkbox" name="check" value="{value}" onchange="this.form.submit()"> {name}</label></form> {badge}</li>"#,
            value = escape_html(&composite(task)),
            name = escape_html(&task.name),
            badge = badge(&task.category, color),
        );
    }
    body.push_str("</ul>");

    body.push_str("<h2>Done</h2><ul>");
    for task in working_set.completed() {
        let color = category_color(working_set.categories(), &task.category);
        let _ = write!(
            body,
            r#"<li><span class="done">{name}</span> {badge} <form class="inline" method="post" action="/removetask"><button type="submit" name="tasktoRemove" value="{value}">Remove</button></form></li>"#,
            name = escape_html(&task.name),
            badge = badge(&task.category, color),
            value = escape_html(&composite(task)),
        );
    }
    body.push_str("</ul>");

    body.push_str(r#"<form method="post" action="/addtask"><input type="text" name="task" placeholder="New task" required> <select name="category">"#);
    for category in working_set.categories() {
        let name = escape_html(&category.name);
        let _ = write!(body, r#"<option value="{name}">{name}</option>"#);
    }
    body.push_str(r#"</select> <button type="submit">Add</button></form>"#);

    page("To-do list", &body)
}

/// Renders the category management page.
pub fn categories_page(owner: &str, working_set: &WorkingSet) -> String {
    let mut body = String::new();
    let _ = write!(body, "<h1>{}'s categories</h1>", escape_html(owner));
    body.push_str(r#"<p><a href="/to-do-list">Back to the list</a></p><ul>"#);

    for category in working_set.categories() {
        let count = working_set
            .outstanding()
            .iter()
            .filter(|task| task.category == category.name)
            .count();
        let _ = write!(
            body,
            r#"<li>{badge} {count} open <form class="inline" method="post" action="/removecategory"><button type="submit" name="categorytoRemove" value="{value}">Remove</button></form></li>"#,
            badge = badge(&category.name, Some(category.color.as_str())),
            value = escape_html(&format!("{}_{}", category.name, category.color)),
        );
    }
    body.push_str("</ul>");

    body.push_str(r##"<form method="post" action="/addcategory"><input type="text" name="new_category" placeholder="New category" required> <input type="color" name="color" value="#0f74cc"> <button type="submit">Add</button></form>"##);
    body.push_str(r#"<form method="post" action="/resetcategories"><button type="submit">Reset to defaults</button></form>"#);

    page("Categories", &body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><title>{title}</title><style>{STYLE}</style></head><body>{body}<script src="/static/app.js"></script></body></html>"#
    )
}

fn composite(task: &Task) -> String {
    format!("{}_{}", task.name, task.category)
}

fn category_color<'a>(categories: &'a [Category], name: &str) -> Option<&'a str> {
    categories
        .iter()
        .find(|category| category.name == name)
        .map(|category| category.color.as_str())
}

const FALLBACK_COLOR: &str = "#888888";

fn badge(name: &str, color: Option<&str>) -> String {
    let color = color.filter(|color| is_hex_color(color)).unwrap_or(FALLBACK_COLOR);
    format!(
        r#"<span class="badge" style="background:{color}">{}</span>"#,
        escape_html(name)
    )
}

/// `#rgb` or `#rrggbb`; anything else stays out of inline styles.
fn is_hex_color(value: &str) -> bool {
    value.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 6) && digits.chars().all(|ch| ch.is_ascii_hexdigit())
    })
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
