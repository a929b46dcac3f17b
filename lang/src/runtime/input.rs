//! Implicit input: cyclic argument sources with an interactive fallback

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::VecDeque;
use tracing::{debug, warn};

use super::context::Context;
use super::value::Value;
use crate::parser::{Grammar, read_literal};

/// Source of interactive input lines
pub trait LineReader {
    /// Next line without its terminator; `None` once no more input can be read
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Reads from the terminal; the editor is created on first use
#[derive(Default)]
pub struct TerminalReader {
    editor: Option<DefaultEditor>,
}

impl LineReader for TerminalReader {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if self.editor.is_none() {
            match DefaultEditor::new() {
                Ok(editor) => self.editor = Some(editor),
                Err(err) => {
                    warn!(error = %err, "terminal unavailable");
                    return None;
                }
            }
        }
        let editor = self.editor.as_mut()?;

        match editor.readline(prompt) {
            Ok(line) => Some(line),
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => None,
            Err(err) => {
                warn!(error = %err, "failed to read input line");
                None
            }
        }
    }
}

/// Pre-queued lines
#[derive(Debug, Default, Clone)]
pub struct ScriptedReader {
    lines: VecDeque<String>,
}

impl ScriptedReader {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.lines.pop_front()
    }
}

/// Never yields a line
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl LineReader for NoInput {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        None
    }
}

/// Next implicit input from the active source, falling back to one
/// interactively read and evaluated line when the source is empty.
pub fn next_input(ctx: &mut Context) -> Value {
    if let Some(value) = ctx.active_input_mut().next() {
        return value;
    }

    let prompt = "> ".repeat(ctx.flags.prompt_depth);
    let sandboxed = ctx.flags.sandboxed;
    let line = ctx.reader_mut().read_line(&prompt);
    match line {
        Some(line) => evaluate_input(&line, sandboxed),
        None => {
            warn!(in_function = ctx.in_function(), "no input available, using 0");
            Value::int(0)
        }
    }
}

/// Evaluate one line of interactive input; unparseable lines are kept as text
pub fn evaluate_input(line: &str, sandboxed: bool) -> Value {
    let grammar = if sandboxed {
        Grammar::Literal
    } else {
        Grammar::Arithmetic
    };
    let source = line.trim();
    match read_literal(source, grammar) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err.render_line(source), "input is not a literal, keeping it as text");
            Value::text(line)
        }
    }
}

/// Remove `count` values from the top of `stack`, topmost first.
///
/// Missing values are taken from [`next_input`]. A single value is returned
/// bare; any other count returns a list.
pub fn pop(stack: &mut Vec<Value>, count: usize, ctx: &mut Context) -> Value {
    let mut popped = Vec::with_capacity(count);
    for _ in 0..count {
        match stack.pop() {
            Some(value) => popped.push(value),
            None => popped.push(next_input(ctx)),
        }
    }

    if ctx.flags.retain_popped {
        stack.extend(popped.iter().rev().cloned());
    }

    if ctx.flags.reverse_flag {
        popped.reverse();
    }

    if count == 1 {
        if let Some(value) = popped.pop() {
            return value;
        }
    }
    Value::list(popped)
}
