use std::io::Write;

use crossterm::{queue, style};

/// How a piece of menu text is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Key,
    Label,
}

/// Split a menu item into key spans (text inside `[...]`, brackets kept)
/// and label spans. An unclosed bracket runs to the end as a label.
pub fn menu_spans(item: &str) -> Vec<(Emphasis, &str)> {
    let mut spans = Vec::new();
    let mut rest = item;
    while !rest.is_empty() {
        let Some(open) = rest.find('[') else {
            spans.push((Emphasis::Label, rest));
            break;
        };
        if open > 0 {
            spans.push((Emphasis::Label, &rest[..open]));
        }
        rest = &rest[open..];
        match rest.find(']') {
            Some(close) => {
                spans.push((Emphasis::Key, &rest[..=close]));
                rest = &rest[close + 1..];
            }
            None => {
                spans.push((Emphasis::Label, rest));
                break;
            }
        }
    }
    spans
}

/// Print a menu item, bolding keys and dimming labels.
pub fn print_menu_item(out: &mut impl Write, item: &str) -> anyhow::Result<()> {
    for (emphasis, text) in menu_spans(item) {
        let attribute = match emphasis {
            Emphasis::Key => style::Attribute::Bold,
            Emphasis::Label => style::Attribute::Dim,
        };
        queue!(
            out,
            style::SetAttribute(attribute),
            style::Print(text),
            style::SetAttribute(style::Attribute::Reset),
        )?;
    }
    Ok(())
}

/// Print a row of items separated by two spaces.
pub fn print_menu(out: &mut impl Write, items: &[&str]) -> anyhow::Result<()> {
    queue!(out, style::Print(" "))?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            queue!(out, style::Print("  "))?;
        }
        print_menu_item(out, item)?;
    }
    Ok(())
}
