//! Plain-text serialization of render trees for the terminal.
//!
//! Form controls are dropped; links and buttons become `[label]`.

use super::{Element, Node};

const BLOCK_ELEMENTS: [&str; 10] = [
    "div", "p", "section", "nav", "form", "h1", "h2", "h3", "pre", "li",
];

const HIDDEN_ELEMENTS: [&str; 6] = ["input", "textarea", "select", "option", "style", "script"];

/// Render `node` as terminal text.
pub fn to_text(node: &Node) -> String {
    let mut raw = String::new();
    write_node(&mut raw, node);

    let mut out = String::new();
    let mut blank = true;
    for line in raw.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !blank {
                out.push('\n');
            }
            blank = true;
            continue;
        }
        out.push_str(line);
        out.push('\n');
        blank = false;
    }
    out.trim_end().to_string()
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => write_element(out, element),
    }
}

fn write_element(out: &mut String, element: &Element) {
    if HIDDEN_ELEMENTS.contains(&element.tag) {
        return;
    }
    let block = BLOCK_ELEMENTS.contains(&element.tag) && !element.has_class("inline");
    if block && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    if element.tag == "h1" || element.has_class("route-card") {
        out.push('\n');
    }

    let bracket = matches!(element.tag, "a" | "button");
    if bracket {
        out.push('[');
    }
    for child in &element.children {
        write_node(out, child);
    }
    if bracket {
        out.push(']');
    }

    if block {
        out.push('\n');
    } else if !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use crate::model::{Route, RouteDraft};
    use crate::render::{el, views};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn card_renders_as_lines() {
        let mut draft = RouteDraft::new("/api/users", json!([]));
        draft.description = Some("List users".to_string());
        let route = Route::from_draft(3, draft);

        let text = to_text(&views::route_card(&route, Locale::En));
        assert_eq!(
            text,
            "#3 GET ✅ Active\n/api/users\nList users\n[Edit] [Deactivate] [Delete]"
        );
    }

    #[test]
    fn form_controls_are_hidden() {
        let node: Node = el("form")
            .child(el("input").attr("name", "path"))
            .child(el("button").text("Save"))
            .into();
        assert_eq!(to_text(&node), "[Save]");
    }

    #[test]
    fn preformatted_text_keeps_lines() {
        let node: Node = el("div")
            .child(el("strong").text("Body:"))
            .child(el("pre").text("{\n  \"ok\": true\n}"))
            .into();
        assert_eq!(to_text(&node), "Body:\n{\n  \"ok\": true\n}");
    }
}
