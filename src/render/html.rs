//! HTML serialization of render trees.

use std::fmt::Write;

use crate::i18n::Locale;

use super::{Element, Node};

const VOID_ELEMENTS: [&str; 5] = ["br", "hr", "input", "link", "meta"];

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", sans-serif; background: #f5f6fa; margin: 0; }
.container { max-width: 960px; margin: 0 auto; padding: 24px; }
.tabs { display: flex; gap: 8px; margin: 16px 0; }
.tab { padding: 8px 16px; border-radius: 4px; text-decoration: none; color: #333; background: #e4e7ee; }
.tab.active { background: #3867d6; color: #fff; }
.route-card { background: #fff; border-radius: 6px; padding: 12px 16px; margin-bottom: 12px; box-shadow: 0 1px 2px rgba(0,0,0,.08); }
.route-card.inactive { opacity: .65; }
.route-header { display: flex; gap: 8px; align-items: center; }
.method-badge { font-size: 12px; font-weight: 600; padding: 2px 6px; border-radius: 3px; color: #fff; margin-right: 4px; }
.method-get { background: #20bf6b; } .method-post { background: #3867d6; }
.method-put { background: #f7b731; } .method-delete { background: #eb3b5a; }
.method-patch { background: #8854d0; }
.route-status { margin-left: auto; font-size: 13px; }
.route-path { font-family: monospace; font-size: 15px; margin: 8px 0; }
.route-description { color: #666; font-size: 13px; }
.route-actions { display: flex; gap: 6px; margin-top: 8px; }
.btn { display: inline-block; padding: 4px 10px; border: 1px solid #ccd; border-radius: 4px; background: #fff; color: #333; text-decoration: none; cursor: pointer; font-size: 13px; }
.btn.disabled { opacity: .4; cursor: default; }
.btn-primary { background: #3867d6; color: #fff; }
.btn-delete { color: #eb3b5a; }
form.inline { display: inline; }
.pagination { display: flex; gap: 12px; align-items: center; justify-content: center; margin: 16px 0; }
.filters { display: flex; gap: 12px; align-items: center; margin-bottom: 12px; }
.form-group { margin-bottom: 12px; display: flex; flex-direction: column; gap: 4px; }
textarea { font-family: monospace; }
.alert { padding: 10px 14px; border-radius: 4px; margin-bottom: 8px; }
.alert-success { background: #d4edda; color: #155724; }
.alert-error { background: #f8d7da; color: #721c24; }
.modal { position: fixed; inset: 0; background: rgba(0,0,0,.4); display: flex; align-items: center; justify-content: center; }
.modal-content { background: #fff; padding: 20px; border-radius: 6px; min-width: 480px; max-height: 90vh; overflow: auto; }
.loading, .empty, .error { text-align: center; padding: 24px; color: #888; }
.error { color: #eb3b5a; }
"#;

/// Serialize `node` as an HTML fragment.
pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

/// Full document with the panel stylesheet.
pub fn document(locale: Locale, title: &str, body: &Node) -> String {
    let lang = match locale {
        Locale::En => "en",
        Locale::Zh => "zh-CN",
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        to_html(body)
    )
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => out.push_str(&escape(text)),
        Node::Element(element) => write_element(out, element),
    }
}

fn write_element(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(element.tag);
    if !element.classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", escape(&element.classes.join(" ")));
    }
    for (name, value) in &element.attrs {
        if value.is_empty() {
            let _ = write!(out, " {name}");
        } else {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag) {
        return;
    }
    for child in &element.children {
        write_node(out, child);
    }
    let _ = write!(out, "</{}>", element.tag);
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::el;

    #[test]
    fn escapes_text_and_attributes() {
        let node: Node = el("div")
            .class("route-path")
            .attr("title", "a \"quoted\" <path>")
            .text("/search?q=<script>&x=1")
            .into();
        assert_eq!(
            to_html(&node),
            "<div class=\"route-path\" title=\"a &quot;quoted&quot; &lt;path&gt;\">\
             /search?q=&lt;script&gt;&amp;x=1</div>"
        );
    }

    #[test]
    fn void_and_flag_attributes() {
        let node: Node = el("input")
            .attr("type", "checkbox")
            .flag("checked", true)
            .into();
        assert_eq!(to_html(&node), "<input type=\"checkbox\" checked>");
    }

    #[test]
    fn document_wraps_body() {
        let page = document(Locale::Zh, "管理", &el("p").text("ok").into());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<html lang=\"zh-CN\">"));
        assert!(page.contains("<title>管理</title>"));
        assert!(page.contains("<p>ok</p>"));
    }
}
