use im_rc::Vector;
use std::fmt;
use tracing::debug;

use super::input::{LineReader, TerminalReader};
use super::value::Value;

/// Behaviour switches read by coercion and the input manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flags {
    /// Numbers coerce to ranges instead of digit lists
    pub number_as_range: bool,
    /// First element of a number-as-range
    pub range_start: i64,
    /// Added to the number to form the exclusive range end (1 makes it inclusive)
    pub range_end_offset: i64,
    /// `pop` leaves the popped values on the stack
    pub retain_popped: bool,
    /// `pop` returns values in reverse order
    pub reverse_flag: bool,
    /// Interactive input accepts literals only
    pub sandboxed: bool,
    /// Nesting level shown in the interactive prompt
    pub prompt_depth: usize,
    /// Read from the top-level input instead of the current function's arguments
    pub use_top_input: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            number_as_range: false,
            range_start: 1,
            range_end_offset: 1,
            retain_popped: false,
            reverse_flag: false,
            sandboxed: false,
            prompt_depth: 1,
            use_top_input: false,
        }
    }
}

impl Flags {
    /// Build flags from interpreter flag letters, e.g. `"RM"`
    pub fn from_flag_chars(letters: &str) -> Self {
        let mut flags = Flags::default();
        for letter in letters.chars() {
            match letter {
                'R' => flags.number_as_range = true,
                'r' => flags.reverse_flag = true,
                'M' => flags.range_start = 0,
                'm' => flags.range_end_offset = 0,
                'Ṁ' => {
                    flags.range_start = 0;
                    flags.range_end_offset = 0;
                }
                other => debug!(flag = %other, "ignoring unknown flag"),
            }
        }
        flags
    }
}

/// A list of input values read cyclically
#[derive(Debug, Clone, Default)]
pub struct InputSource {
    values: Vector<Value>,
    position: usize,
}

impl InputSource {
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
            position: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Number of values read so far
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn values(&self) -> &Vector<Value> {
        &self.values
    }

    /// Value at `position mod len`, advancing the cursor; `None` when empty
    pub fn next(&mut self) -> Option<Value> {
        if self.values.is_empty() {
            return None;
        }
        let value = self.values.get(self.position % self.values.len()).cloned();
        self.position += 1;
        value
    }
}

/// Per-evaluation state: input sources, flags and the interactive reader
pub struct Context {
    pub flags: Flags,
    top: InputSource,
    /// Arguments of the function being evaluated; at top level this is `top`
    current: Option<InputSource>,
    reader: Box<dyn LineReader>,
}

impl Context {
    pub fn new(inputs: impl IntoIterator<Item = Value>) -> Self {
        Self {
            flags: Flags::default(),
            top: InputSource::new(inputs),
            current: None,
            reader: Box::new(TerminalReader::default()),
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_reader(mut self, reader: impl LineReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    pub fn with_sandbox(mut self, sandboxed: bool) -> Self {
        self.flags.sandboxed = sandboxed;
        self
    }

    pub fn top_input(&self) -> &InputSource {
        &self.top
    }

    pub fn current_input(&self) -> &InputSource {
        self.current.as_ref().unwrap_or(&self.top)
    }

    /// Source selected by `flags.use_top_input`
    pub fn active_input_mut(&mut self) -> &mut InputSource {
        if self.flags.use_top_input {
            return &mut self.top;
        }
        match self.current.as_mut() {
            Some(current) => current,
            None => &mut self.top,
        }
    }

    pub fn reader_mut(&mut self) -> &mut dyn LineReader {
        self.reader.as_mut()
    }

    /// Install `args` as the current input; hand the result back to [`Context::restore_input`]
    pub fn enter_function(&mut self, args: impl IntoIterator<Item = Value>) -> Option<InputSource> {
        self.current.replace(InputSource::new(args))
    }

    pub fn restore_input(&mut self, previous: Option<InputSource>) {
        self.current = previous;
    }

    pub fn in_function(&self) -> bool {
        self.current.is_some()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("flags", &self.flags)
            .field("top", &self.top)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
