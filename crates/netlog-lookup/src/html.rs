//! Structural helpers over `scraper` documents.
//!
//! Both registries render their data as nested layout tables with the label
//! in one cell and the value in the next, so these helpers navigate by cell
//! text and sibling position rather than by class names.

use scraper::{ElementRef, Html, Selector};

pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Text nodes that are direct children of the element, trimmed, blanks dropped.
pub(crate) fn own_text(element: ElementRef<'_>) -> Vec<String> {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// All descendant text with runs of whitespace collapsed.
pub(crate) fn full_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is(element: &ElementRef<'_>, name: &str) -> bool {
    element.value().name() == name
}

fn next_sibling_named<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| is(sibling, name))
}

/// Rows of a table, looking through the implicit `tbody`/`thead` wrappers.
pub(crate) fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "tbody" | "thead" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|row| is(row, "tr")),
            ),
            _ => {}
        }
    }
    rows
}

/// Cells (`td` and `th`) that are direct children of a row.
pub(crate) fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| is(cell, "td") || is(cell, "th"))
        .collect()
}

/// The body row of a titled section.
///
/// Sections are laid out as a row holding a small table whose bold cell is the
/// title, followed by a sibling row with the section content. Every word in
/// `title_words` must appear in the bold text.
pub(crate) fn section_body<'a>(document: &'a Html, title_words: &[&str]) -> Option<ElementRef<'a>> {
    let bold = selector("td b");
    document
        .select(&bold)
        .filter(|b| {
            let text = full_text(*b);
            title_words.iter().all(|word| text.contains(word))
        })
        .find_map(|b| heading_row(b).and_then(|row| next_sibling_named(row, "tr")))
}

/// Nearest ancestor `tr` that holds the title through a `td > table` pair.
fn heading_row(title: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let ancestors: Vec<ElementRef<'_>> = title.ancestors().filter_map(ElementRef::wrap).collect();
    ancestors.iter().enumerate().skip(2).find_map(|(i, element)| {
        (is(element, "tr") && is(&ancestors[i - 1], "td") && is(&ancestors[i - 2], "table"))
            .then_some(*element)
    })
}

/// The value cell following the first `label_cell` element whose own text
/// contains `label`.
///
/// Only `label_cell` elements are considered labels, and a candidate without a
/// following `td` is skipped.
pub(crate) fn cell_after_label<'a>(
    scope: ElementRef<'a>,
    label_cell: &'static str,
    label: &str,
) -> Option<ElementRef<'a>> {
    let cells = selector(label_cell);
    scope
        .select(&cells)
        .filter(|cell| own_text(*cell).iter().any(|text| text.contains(label)))
        .find_map(|cell| next_sibling_named(cell, "td"))
}

/// The trimmed own text of the cell following `label`, `None` when absent or blank.
pub(crate) fn value_after_label(
    scope: ElementRef<'_>,
    label_cell: &'static str,
    label: &str,
) -> Option<String> {
    cell_after_label(scope, label_cell, label)
        .map(|cell| own_text(cell).join(" "))
        .filter(|value| !value.is_empty())
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `href` of the first link whose text is exactly `text`.
pub(crate) fn link_with_text<'a>(document: &'a Html, text: &str) -> Option<&'a str> {
    let links = selector("a[href]");
    document
        .select(&links)
        .find(|link| full_text(*link) == text)
        .and_then(|link| link.value().attr("href"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONED: &str = r#"
        <table>
          <tr><td><table><tr><td><b>Licensee Information</b></td></tr></table></td></tr>
          <tr><td><table>
            <tr><td>Licensee</td></tr>
            <tr><td>Name</td><td>DOE, JANE</td></tr>
            <tr><td>DOE, JANE<br/>1 ELM ST<br/>SPRINGFIELD, IL<br/>62701</td></tr>
          </table></td></tr>
        </table>
    "#;

    #[test]
    fn test_section_body_follows_heading() {
        let document = Html::parse_document(SECTIONED);
        let body = section_body(&document, &["Licensee", "Information"]).expect("section body");
        let table = body.select(&selector("table")).next().expect("inner table");
        let rows = table_rows(table);
        assert_eq!(rows.len(), 3);

        let cell = row_cells(rows[2])[0];
        assert_eq!(
            own_text(cell),
            vec!["DOE, JANE", "1 ELM ST", "SPRINGFIELD, IL", "62701"]
        );
    }

    #[test]
    fn test_section_body_missing_heading() {
        let document = Html::parse_document(SECTIONED);
        assert!(section_body(&document, &["Amateur", "Data"]).is_none());
    }

    #[test]
    fn test_value_after_label() {
        let document = Html::parse_document(
            "<table><tr><th>Call Sign</th><td> VE7ABC </td></tr>\
             <tr><th>Name</th><td></td></tr></table>",
        );
        let root = document.root_element();
        assert_eq!(
            value_after_label(root, "th", "Call Sign").as_deref(),
            Some("VE7ABC")
        );
        assert_eq!(value_after_label(root, "th", "Name"), None);
        assert_eq!(value_after_label(root, "th", "City"), None);
    }

    #[test]
    fn test_value_containing_label_word_is_not_a_label() {
        let document = Html::parse_document(
            "<table><tr><th>Address</th><td>12 City View Dr</td></tr>\
             <tr><th>City</th><td>Vancouver</td></tr></table>",
        );
        let root = document.root_element();
        assert_eq!(
            value_after_label(root, "th", "City").as_deref(),
            Some("Vancouver")
        );
        assert_eq!(
            value_after_label(root, "th", "Address").as_deref(),
            Some("12 City View Dr")
        );
    }

    #[test]
    fn test_label_without_value_cell_is_skipped() {
        let document = Html::parse_document(
            "<table><tr><td>Group</td></tr>\
             <tr><td>Group</td><td>A</td></tr></table>",
        );
        let root = document.root_element();
        assert_eq!(value_after_label(root, "td", "Group").as_deref(), Some("A"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  DOE,  JOHN\tQ "), "DOE, JOHN Q");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_link_with_text() {
        let document = Html::parse_document(
            r#"<a href="other">VE7AB</a><a href="detail?a=1&amp;b=2"> VE7ABC </a>"#,
        );
        assert_eq!(link_with_text(&document, "VE7ABC"), Some("detail?a=1&b=2"));
        assert_eq!(link_with_text(&document, "VE7XYZ"), None);
    }
}
