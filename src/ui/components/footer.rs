use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::api::Pagination;

/// Draw the footer bar with view breadcrumb and paging info
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  breadcrumb: &[String],
  pagination: Option<Pagination>,
) {
  let mut spans = Vec::new();

  spans.push(Span::raw(" "));

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      // Current view - highlighted
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let line = Line::from(spans);
  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);

  // Paging indicator, right-aligned; the numbers come straight from the
  // server envelope.
  if let Some(paging) = pagination {
    let mut right_spans = Vec::new();
    if paging.has_prev() {
      right_spans.push(Span::styled("<p> ", Style::default().fg(Color::Cyan)));
    }
    right_spans.push(Span::styled(
      format!(
        "page {}/{} ({} items)",
        paging.page, paging.total_pages, paging.total_items
      ),
      Style::default().fg(Color::White),
    ));
    if paging.has_next() {
      right_spans.push(Span::styled(" <n>", Style::default().fg(Color::Cyan)));
    }
    right_spans.push(Span::raw(" "));

    let right = Paragraph::new(Line::from(right_spans))
      .alignment(Alignment::Right)
      .style(Style::default().bg(Color::Black));
    frame.render_widget(right, area);
  }
}
