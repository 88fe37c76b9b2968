//! Log formatting and output with ANSI colors and text wrapping
//!
//! Handles:
//! - Colorized console output with tag and level columns
//! - Text wrapping at word boundaries
//! - Mirroring every line to the file sink
//! - Broken pipe handling for piped commands

use super::config::get_logger_config;
use super::file::write_to_file;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Column widths for alignment
const TAG_WIDTH: usize = 9;
const LEVEL_WIDTH: usize = 7;
const PREFIX_WIDTH: usize = 9 + TAG_WIDTH + LEVEL_WIDTH + 6;

/// Maximum line length before wrapping
const MAX_LINE_LENGTH: usize = 145;

pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let now = Local::now();
    let colors = get_logger_config().colors;

    let time = now.format("%H:%M:%S").to_string();
    let tag_label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    let level_label = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);

    let base_line = if colors {
        format!(
            "{} [{}] [{}] ",
            time.dimmed(),
            colorize_tag(&tag, &tag_label),
            colorize_level(level, &level_label)
        )
    } else {
        format!("{} [{}] [{}] ", time, tag_label, level_label)
    };

    let available = MAX_LINE_LENGTH.saturating_sub(PREFIX_WIDTH).max(50);
    let chunks = wrap_text(message, available);

    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let continuation = " ".repeat(PREFIX_WIDTH);

    for (index, chunk) in chunks.iter().enumerate() {
        if index == 0 {
            print_stdout_safe(&format!("{}{}", base_line, chunk));
        } else {
            print_stdout_safe(&format!("{}{}", continuation, chunk));
        }
        write_to_file(&format!(
            "{} [{}] [{}] {}",
            timestamp,
            tag.to_plain_string(),
            level.as_str(),
            chunk
        ));
    }
}

fn colorize_tag(tag: &LogTag, label: &str) -> ColoredString {
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Config => label.bright_white().bold(),
        LogTag::Api => label.bright_blue().bold(),
        LogTag::Ranks => label.bright_magenta().bold(),
        LogTag::Pairs => label.bright_green().bold(),
        LogTag::Candles => label.bright_cyan().bold(),
        LogTag::Snapshot => label.cyan().bold(),
    }
}

fn colorize_level(level: LogLevel, label: &str) -> ColoredString {
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.yellow().bold(),
        LogLevel::Info => label.white().bold(),
        LogLevel::Debug => label.dimmed(),
        LogLevel::Verbose => label.dimmed().italic(),
    }
}

/// Print to stdout but ignore broken pipe errors
fn print_stdout_safe(message: &str) {
    let mut out = stdout();
    if let Err(e) = writeln!(out, "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            return;
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
    let _ = out.flush();
}

/// Wrap text at word boundaries, respecting existing newlines
pub(crate) fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for line in text.split('\n') {
        if line.chars().count() <= max_width {
            result.push(line.to_string());
            continue;
        }

        let mut current = String::new();
        for word in line.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current.chars().count();

            if word_len > max_width {
                if !current.is_empty() {
                    result.push(std::mem::take(&mut current));
                }
                let chars: Vec<char> = word.chars().collect();
                for piece in chars.chunks(max_width) {
                    result.push(piece.iter().collect());
                }
            } else if current.is_empty() {
                current = word.to_string();
            } else if current_len + word_len + 1 <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                result.push(std::mem::replace(&mut current, word.to_string()));
            }
        }

        if !current.is_empty() {
            result.push(current);
        }
    }

    if result.is_empty() {
        result.push(String::new());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_keeps_short_lines() {
        assert_eq!(wrap_text("short line", 50), vec!["short line".to_string()]);
    }

    #[test]
    fn test_wrap_splits_on_words() {
        let wrapped = wrap_text("aaaa bbbb cccc", 9);
        assert_eq!(wrapped, vec!["aaaa bbbb".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let wrapped = wrap_text("abcdefghij", 4);
        assert_eq!(wrapped, vec!["abcd", "efgh", "ij"]);
    }
}
