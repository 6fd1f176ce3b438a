//! Source code pane rendering with syntax highlighting
//!
//! Shows the program text with line numbers. When the run failed, the line
//! the error points at is drawn in the error colour.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Simple syntax highlighting for one line of C++ source
fn highlight_source_code(line: &str) -> Line<'_> {
    if line.trim_start().starts_with('#') {
        return Line::from(Span::styled(
            line,
            Style::default().fg(DEFAULT_THEME.directive),
        ));
    }

    let mut spans = Vec::new();
    let mut current_word = String::new();
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (byte, c) = chars[i];

        if c == '/' && matches!(chars.get(i + 1), Some((_, '/'))) {
            flush_word(&mut spans, &mut current_word, false);
            spans.push(Span::styled(
                &line[byte..],
                Style::default().fg(DEFAULT_THEME.dim),
            ));
            break;
        }

        if c == '"' || c == '\'' {
            flush_word(&mut spans, &mut current_word, false);
            let mut end = i + 1;
            while end < chars.len() && chars[end].1 != c {
                end += if chars[end].1 == '\\' { 2 } else { 1 };
            }
            end = (end + 1).min(chars.len());
            let end_byte = chars.get(end).map_or(line.len(), |(b, _)| *b);
            spans.push(Span::styled(
                &line[byte..end_byte],
                Style::default().fg(DEFAULT_THEME.literal),
            ));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' {
            flush_word(&mut spans, &mut current_word, c == '(');

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.bracket),
                _ => Style::default().fg(DEFAULT_THEME.text),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut spans, &mut current_word, false);
    Line::from(spans)
}

fn flush_word(spans: &mut Vec<Span<'_>>, word: &mut String, is_function: bool) {
    if !word.is_empty() {
        let style = get_keyword_style(word, is_function);
        spans.push(Span::styled(std::mem::take(word), style));
    }
}

fn get_keyword_style(word: &str, is_function: bool) -> Style {
    match word {
        "int" | "char" | "void" | "bool" | "float" | "double" | "auto" | "string" | "const" => {
            Style::default().fg(DEFAULT_THEME.type_name)
        }
        "namespace" | "class" | "struct" | "public" | "private" | "protected" | "using"
        | "this" | "return" | "if" | "else" | "while" | "for" | "do" | "break" | "continue" => {
            Style::default()
                .fg(DEFAULT_THEME.keyword)
                .add_modifier(Modifier::BOLD)
        }
        "true" | "false" => Style::default().fg(DEFAULT_THEME.literal),
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.literal)
        }
        _ if is_function => Style::default().fg(DEFAULT_THEME.call),
        _ => Style::default().fg(DEFAULT_THEME.text),
    }
}

/// Render the source code pane
///
/// `error_line` is 1-based; `scroll` is clamped so the last page stays full.
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    error_line: Option<usize>,
    is_focused: bool,
    scroll: &mut usize,
) {
    let block = Block::default()
        .title(" Source Code ")
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused));

    let lines: Vec<&str> = source_code.lines().collect();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll = super::clamp_scroll(*scroll, lines.len(), visible_height);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let line_num_str = format!("{:4} ", line_num);
            let mut content_line = highlight_source_code(line);

            if error_line == Some(line_num) {
                let error_style = Style::default()
                    .bg(DEFAULT_THEME.failure)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD);
                for span in &mut content_line.spans {
                    span.style = error_style;
                }
                let mut spans = vec![Span::styled(
                    line_num_str,
                    Style::default()
                        .fg(DEFAULT_THEME.failure)
                        .add_modifier(Modifier::BOLD),
                )];
                spans.extend(content_line.spans);
                return Line::from(spans);
            }

            let mut spans = vec![Span::styled(
                line_num_str,
                Style::default().fg(DEFAULT_THEME.dim),
            )];
            spans.extend(content_line.spans);
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_keeps_text() {
        let source = r#"  cout << "a;b" << f(1); // done"#;
        let line = highlight_source_code(source);
        assert_eq!(texts(&line).concat(), source);
        assert!(texts(&line).contains(&"\"a;b\"".to_string()));
        assert!(texts(&line).contains(&"// done".to_string()));
    }

    #[test]
    fn test_function_and_keyword_styles() {
        let line = highlight_source_code("int square(int x)");
        let square = line
            .spans
            .iter()
            .find(|s| s.content == "square")
            .map(|s| s.style);
        assert_eq!(square, Some(Style::default().fg(DEFAULT_THEME.call)));
        assert_eq!(line.spans[0].style, Style::default().fg(DEFAULT_THEME.type_name));
    }

    #[test]
    fn test_directive_line_is_one_span() {
        let line = highlight_source_code("#ifdef DEBUG");
        assert_eq!(line.spans.len(), 1);
    }
}
