//! Line-based driver for [`RangePicker`].
//!
//! Each step prints the numbered candidates. A line may be a number, the
//! candidate text itself, `back`, `reset` or `quit`. Once all four picks are
//! made, `y` confirms.

use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::debug;

use crate::catalog::Catalog;
use crate::picker::{PickerStep, RangePicker};
use crate::range::RangeSelection;
use crate::types::Task;

enum Command<'a> {
    Back,
    Reset,
    Quit,
    Confirm,
    Pick(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    match line {
        "back" | "b" => Command::Back,
        "reset" => Command::Reset,
        "quit" | "q" => Command::Quit,
        "y" | "yes" => Command::Confirm,
        other => Command::Pick(other),
    }
}

/// Run the picker until the user confirms a range or leaves.
/// Returns `None` when the user quits, backs out of the first step, or
/// input ends.
pub fn run_picker<R: BufRead, W: Write>(
    catalog: &Catalog,
    mut input: R,
    mut out: W,
) -> Result<Option<(RangeSelection, Vec<Task>)>> {
    let mut picker = RangePicker::new(catalog);
    let mut line = String::new();

    loop {
        let step = picker.step();
        let candidates = picker.candidates();

        if step == PickerStep::Ready {
            match picker.finish() {
                Ok((selection, tasks)) => {
                    writeln!(out, "選択した範囲: {}（{}問）", selection, tasks.len())?;
                    writeln!(out, "{} [y / back / reset / quit]", step.prompt())?;
                }
                Err(e) => {
                    // Not reachable through the filtered candidates
                    writeln!(out, "{}", e)?;
                    picker.back();
                    continue;
                }
            }
        } else {
            writeln!(out, "{}", step.prompt())?;
            for (i, c) in candidates.iter().enumerate() {
                writeln!(out, "  {}. {}", i + 1, c.label)?;
            }
        }
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("Picker input closed");
            return Ok(None);
        }

        match parse_command(line.trim()) {
            Command::Quit => return Ok(None),
            Command::Back => {
                if !picker.back() {
                    return Ok(None);
                }
            }
            Command::Reset => picker.reset(),
            Command::Confirm if step == PickerStep::Ready => {
                let (selection, tasks) = picker.finish()?;
                return Ok(Some((selection, tasks)));
            }
            Command::Confirm => writeln!(out, "まだ選択が終わっていません")?,
            Command::Pick(text) => {
                let value = match text.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= candidates.len() => candidates[n - 1].value,
                    _ => text,
                };
                if let Err(e) = picker.choose(value) {
                    writeln!(out, "{}", e)?;
                }
            }
        }
    }
}
