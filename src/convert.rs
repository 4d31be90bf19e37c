// ABOUTME: Renders normalized entries into frontmatter-plus-body Markdown
// ABOUTME: Also derives the `{date}_{title}.md` file name

use crate::model::Entry;
use crate::util::sanitize_filename;

/// Quotes a label the way the frontmatter list syntax expects: single quotes
/// unless the text holds a `'` and no `"`.
fn quote_item(item: &str) -> String {
    let quote = if item.contains('\'') && !item.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(item.len() + 2);
    out.push(quote);
    for c in item.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

pub fn render_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| quote_item(i)).collect();
    format!("[{}]", quoted.join(", "))
}

fn escape_title(title: &str) -> String {
    title.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn render_frontmatter(entry: &Entry) -> String {
    let mut fm = String::from("---\n");
    fm.push_str(&format!("title: \"{}\"\n", escape_title(&entry.title)));
    fm.push_str(&format!("date: {}\n", entry.published));
    fm.push_str(&format!("categories: {}\n", render_list(&entry.categories)));
    fm.push_str(&format!("tags: {}\n", render_list(&entry.tags)));
    fm.push_str(&format!(
        "draft: {}\n",
        if entry.draft { "True" } else { "False" }
    ));
    fm.push_str("---\n\n");
    fm
}

/// Full file contents: frontmatter, blank line, body, trailing newline.
pub fn to_markdown(entry: &Entry, body: &str) -> String {
    format!("{}{}\n", render_frontmatter(entry), body)
}

pub fn file_name(entry: &Entry) -> String {
    format!("{}_{}.md", entry.published, sanitize_filename(&entry.title))
}
