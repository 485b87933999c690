//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem, Wrap},
    style::{Color, Style, Modifier},
};
use crate::cpu::memory::MEMORY_SIZE;
use crate::cpu::registers::{IM, IS, SP};
use super::app::{DebuggerApp, MEMORY_ROW};

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(frame.area());

    // Left side: code, registers and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_disassembly(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: memory, output and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_output(frame, right_chunks[1], app);
    draw_help(frame, right_chunks[2]);
}

/// Draw disassembly starting at the PC.
fn draw_disassembly(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let disasm = app.get_disassembly((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = disasm
        .iter()
        .map(|(addr, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };
            let text = format!("{}{:02X}: {}", prefix, addr, instr);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}", bp, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Disassembly ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw the register file and flags.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = app.cpu.regs.as_array();
    let reg_span = |i: usize| {
        let name = match i as u8 {
            IM => "IM",
            IS => "IS",
            SP => "SP",
            _ => "  ",
        };
        Span::raw(format!("R{} {} {:02X} ({:>3})   ", i, name, regs[i], regs[i]))
    };

    let flags = app.cpu.regs.flags;
    let flag_span = |set: bool, label: &'static str| {
        if set {
            Span::styled(label, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::styled(label, Style::default().fg(Color::DarkGray))
        }
    };

    let mut content: Vec<Line> = (0..4)
        .map(|i| Line::from(vec![reg_span(i), reg_span(i + 4)]))
        .collect();

    content.push(Line::from(vec![
        Span::raw("PC: "),
        Span::styled(format!("{:02X}", app.cpu.pc), Style::default().fg(Color::Yellow)),
        Span::raw("   FL: "),
        flag_span(flags.is_less(), "L"),
        flag_span(flags.is_greater(), "G"),
        flag_span(flags.is_equal(), "E"),
    ]));
    content.push(Line::from(vec![
        Span::raw("Cycles: "),
        Span::styled(format!("{}", app.cpu.cycles), Style::default().fg(Color::Cyan)),
        Span::raw("   State: "),
        Span::styled(format!("{:?}", app.cpu.state),
            if app.cpu.is_running() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            }),
    ]));

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw memory view, eight bytes per row.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let start = app.mem_scroll * MEMORY_ROW;
    let end = (start + visible_rows * MEMORY_ROW).min(MEMORY_SIZE);
    let sp = app.cpu.regs.sp() as usize;

    let items: Vec<ListItem> = app.cpu.mem
        .dump(start, end.saturating_sub(start))
        .chunks(MEMORY_ROW)
        .map(|row| {
            let mut spans = vec![Span::raw(format!("{:02X}:", row[0].0))];
            for &(addr, value) in row {
                let style = if addr == app.cpu.pc {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else if addr == sp {
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
                } else if value != 0 {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                spans.push(Span::styled(format!(" {:02X}", value), style));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Draw program output.
fn draw_output(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    // Keep the tail visible
    let visible = (area.height as usize).saturating_sub(2);
    let lines: Vec<&str> = app.output.lines().collect();
    let tail = lines[lines.len().saturating_sub(visible)..].join("\n");

    let output = Paragraph::new(tail)
        .wrap(Wrap { trim: false })
        .block(Block::default()
            .title(" Output ")
            .borders(Borders::ALL));

    frame.render_widget(output, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
