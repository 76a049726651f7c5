use scraper::{ElementRef, Html, Node};

const SKIPPED: &[&str] = &["script", "style", "noscript", "template"];

const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table",
    "td", "th", "title", "tr", "ul",
];

/// Flattens an HTML document into trimmed, non-empty text lines in page order.
pub fn page_lines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut text = String::with_capacity(html.len() / 4);
    collect_text(document.root_element(), &mut text);

    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                let block = BLOCKS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
