//! Presentational widgets. Each is a pure function of its inputs: none of them hold
//! state between frames.

pub mod message;
pub mod sources;
pub mod spinner;
pub mod toggle;

pub use message::MessageBubble;
pub use sources::SourceTags;
pub use spinner::Spinner;
pub use toggle::ModeToggle;

const TAB_WIDTH: usize = 4;

/// Wrap text to fit within `width` columns. Explicit newlines and whitespace inside a
/// line are kept, so indented code stays indented. Whitespace at a wrap point is dropped
/// and words longer than the width are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.lines().map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line: Vec<char> = Vec::new();

        for (run, is_space) in whitespace_runs(paragraph) {
            if is_space {
                if current_line.len() + run.len() <= width {
                    current_line.extend(run);
                } else if current_line.iter().any(|c| !c.is_whitespace()) {
                    push_line(&mut lines, &mut current_line);
                } else {
                    current_line.clear();
                }
                continue;
            }

            if current_line.len() + run.len() <= width {
                current_line.extend(run);
                continue;
            }

            if current_line.iter().any(|c| !c.is_whitespace()) {
                push_line(&mut lines, &mut current_line);
            }
            current_line.clear();

            let mut word = run;
            while word.len() > width {
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            current_line = word;
        }

        lines.push(current_line.into_iter().collect());
    }

    lines
}

fn push_line(lines: &mut Vec<String>, current_line: &mut Vec<char>) {
    let line: String = std::mem::take(current_line).into_iter().collect();
    lines.push(line.trim_end().to_string());
}

/// Split a line into alternating runs of whitespace and non-whitespace, tabs expanded.
fn whitespace_runs(line: &str) -> Vec<(Vec<char>, bool)> {
    let mut runs: Vec<(Vec<char>, bool)> = Vec::new();
    for c in line.chars() {
        let is_space = c.is_whitespace();
        let chars = if c == '\t' { vec![' '; TAB_WIDTH] } else { vec![c] };
        match runs.last_mut() {
            Some((run, space)) if *space == is_space => run.extend(chars),
            _ => runs.push((chars, is_space)),
        }
    }
    runs
}
