// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal output for the roster CLI.
//!
//! OneDark on dark terminals, One Light on light ones. `ROSTER_THEME` wins,
//! then `COLORFGBG`, then dark. `NO_COLOR` and non-TTY stdout turn colors off
//! entirely so piped output stays clean.
//!
//! Profiles are mostly Hangul and kana, which terminals draw two cells wide,
//! so every width computation here counts display cells, not chars.

use std::sync::OnceLock;

/// Cells between the two vertical borders.
pub const BOX_WIDTH: usize = 84;

// ═══════════════════════════════════════════════════════════════════════════
// THEME
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

static THEME: OnceLock<Theme> = OnceLock::new();

fn detect_theme() -> Theme {
    if let Ok(theme) = std::env::var("ROSTER_THEME") {
        match theme.to_lowercase().as_str() {
            "light" | "l" => return Theme::Light,
            "dark" | "d" => return Theme::Dark,
            _ => {}
        }
    }

    // "fg;bg": background 7 and 9..=15 are light
    if let Ok(colorfgbg) = std::env::var("COLORFGBG") {
        if let Some(Ok(bg)) = colorfgbg.split(';').next_back().map(str::parse::<u8>) {
            if bg >= 7 && bg != 8 {
                return Theme::Light;
            }
        }
    }

    Theme::Dark
}

pub fn theme() -> Theme {
    *THEME.get_or_init(detect_theme)
}

fn rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

mod onedark {
    pub const RED: (u8, u8, u8) = (224, 108, 117);
    pub const GREEN: (u8, u8, u8) = (152, 195, 121);
    pub const YELLOW: (u8, u8, u8) = (229, 192, 123);
    pub const BLUE: (u8, u8, u8) = (97, 175, 239);
    pub const MAGENTA: (u8, u8, u8) = (198, 120, 221);
    pub const CYAN: (u8, u8, u8) = (86, 182, 194);
    pub const GRAY: (u8, u8, u8) = (92, 99, 112);
    pub const BRIGHT_GREEN: (u8, u8, u8) = (166, 226, 46);
    pub const BRIGHT_CYAN: (u8, u8, u8) = (102, 217, 239);
}

mod onelight {
    pub const RED: (u8, u8, u8) = (228, 86, 73);
    pub const GREEN: (u8, u8, u8) = (80, 161, 79);
    pub const YELLOW: (u8, u8, u8) = (193, 132, 1);
    pub const BLUE: (u8, u8, u8) = (64, 120, 242);
    pub const MAGENTA: (u8, u8, u8) = (166, 38, 164);
    pub const CYAN: (u8, u8, u8) = (1, 132, 188);
    pub const GRAY: (u8, u8, u8) = (160, 161, 167);
    pub const BRIGHT_GREEN: (u8, u8, u8) = (68, 140, 39);
    pub const BRIGHT_CYAN: (u8, u8, u8) = (1, 112, 158);
}

macro_rules! theme_color {
    ($($name:ident),+ $(,)?) => {
        $(
            #[allow(non_snake_case)]
            pub fn $name() -> String {
                rgb(match theme() {
                    Theme::Dark => onedark::$name,
                    Theme::Light => onelight::$name,
                })
            }
        )+
    };
}

theme_color!(RED, GREEN, YELLOW, BLUE, MAGENTA, CYAN, GRAY, BRIGHT_GREEN, BRIGHT_CYAN);

// ═══════════════════════════════════════════════════════════════════════════
// CORE UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

pub fn use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    atty::is(atty::Stream::Stdout)
}

/// Theme color plus modifiers, or plain text when colors are off.
pub fn themed(color_fn: fn() -> String, modifiers: &[&str], text: &str) -> String {
    if use_colors() {
        format!("{}{}{}{}", modifiers.join(""), color_fn(), text, RESET)
    } else {
        text.to_string()
    }
}

/// Terminal cells a char occupies.
fn cell_width(c: char) -> usize {
    match c as u32 {
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA960..=0xA97F
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6 => 2,
        _ => 1,
    }
}

/// Display width, skipping ANSI escapes.
pub fn visible_len(s: &str) -> usize {
    let mut in_escape = false;
    let mut len = 0;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else {
            len += cell_width(c);
        }
    }
    len
}

/// Cut plain text to at most `max` cells, marking the cut with `…`.
pub fn truncate_cells(s: &str, max: usize) -> String {
    if visible_len(s) <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = cell_width(c);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

pub fn pad_right(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(visible)))
}

pub fn pad_left(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    format!("{}{}", " ".repeat(width.saturating_sub(visible)), s)
}

pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BOX DRAWING
// ═══════════════════════════════════════════════════════════════════════════

/// │ content          │
pub fn row(content: &str) {
    let border = GRAY();
    let pad = BOX_WIDTH.saturating_sub(visible_len(content));
    println!("{}│{}{}{}{}│{}", border, RESET, content, " ".repeat(pad), border, RESET);
}

fn labelled_rule(left: char, right: char, label: &str) {
    let border = GRAY();
    let label_part = format!("─ {} ", themed(CYAN, &[BOLD], label));
    let remaining = BOX_WIDTH.saturating_sub(visible_len(&label_part));
    println!(
        "{}{}{}{}{}{}{}{}",
        border,
        left,
        RESET,
        label_part,
        border,
        "─".repeat(remaining),
        right,
        RESET
    );
}

/// ┌─ LABEL ──────────┐
pub fn section_top(label: &str) {
    labelled_rule('┌', '┐', label);
}

/// ├─ LABEL ──────────┤
pub fn section_mid(label: &str) {
    labelled_rule('├', '┤', label);
}

/// └──────────────────┘
pub fn section_bot() {
    println!("{}└{}┘{}", GRAY(), "─".repeat(BOX_WIDTH), RESET);
}

/// ╔═╗ banner with a centered title.
pub fn banner(text: &str) {
    let border = BLUE();
    let colored = themed(BRIGHT_CYAN, &[BOLD], text);
    let total_pad = BOX_WIDTH.saturating_sub(visible_len(&colored));
    let left = total_pad / 2;
    println!("{}╔{}╗{}", border, "═".repeat(BOX_WIDTH), RESET);
    println!(
        "{}║{}{}{}{}{}║{}",
        border,
        RESET,
        " ".repeat(left),
        colored,
        " ".repeat(total_pad - left),
        border,
        RESET
    );
    println!("{}╚{}╝{}", border, "═".repeat(BOX_WIDTH), RESET);
}

// ═══════════════════════════════════════════════════════════════════════════
// SEMANTIC FORMATTERS
// ═══════════════════════════════════════════════════════════════════════════

/// Final score, colored by band. Default-preset scores sit roughly in 0..1.
pub fn score_value(score: f64) -> String {
    let text = format!("{:>7.4}", score);
    if !use_colors() {
        return text;
    }
    let color = if score >= 0.5 {
        BRIGHT_GREEN()
    } else if score >= 0.3 {
        GREEN()
    } else if score >= 0.15 {
        YELLOW()
    } else {
        GRAY()
    };
    format!("{}{}{}", color, text, RESET)
}

/// `L3 S1`: which rankings a hit came from, and where.
pub fn rank_badge(lexical: Option<usize>, semantic: Option<usize>) -> String {
    let part = |tag: &str, rank: Option<usize>, color: fn() -> String| match rank {
        Some(r) => themed(color, &[], &format!("{}{:<3}", tag, r)),
        None => themed(GRAY, &[DIM], &format!("{}{:<3}", tag, "-")),
    };
    format!("{} {}", part("L", lexical, BLUE), part("S", semantic, MAGENTA))
}

/// Rating badge; NSFW stands out.
pub fn rating_badge(rating: &str) -> String {
    match rating {
        "nsfw" => themed(RED, &[BOLD], "nsfw"),
        "sfw" => themed(GREEN, &[], " sfw"),
        other => themed(GRAY, &[], &format!("{:>4}", truncate_cells(other, 4))),
    }
}
