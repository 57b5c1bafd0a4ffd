//! Lexical modes and the mode stack.
//!
//! The active mode decides how the next characters are tokenized. Region-opening lexemes push a mode and the
//! matching closer pops it, so the stack mirrors how regions nest: a `#hole#` inside a string inside a tag attribute
//! inside an `output` body is `[Template, Output, TagHead, DoubleQuote, Hash]`.
//!
//! ## Notes
//! - The bottom frame is the resting mode and is never popped.
//! - `Hash` and `TagExpression` frames count the brackets opened inside them so only an unnested closer ends them.

use std::fmt;

/// A named lexical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Resting: script statements and expressions.
    Script,
    /// Resting: markup text and tags.
    Template,
    /// Resting: query text.
    Query,
    /// Inside an opening or closing tag, between the name and `>`.
    TagHead,
    /// Inside a `set`/`if`/`elseif`/`return` tag: script tokens up to an unnested `>`.
    TagExpression,
    /// Inside an `output` tag body, where `#expr#` is interpolated.
    Output,
    /// Inside `<!--- ... --->`.
    TagComment,
    /// Inside `/* ... */`.
    BlockComment,
    /// Inside a double-quoted string.
    DoubleQuote,
    /// Inside a single-quoted string.
    SingleQuote,
    /// Inside a `#...#` interpolation hole.
    Hash,
    /// Raw body of a `script` tag.
    ScriptIsland,
    /// Raw body between triple backticks in script.
    TemplateIsland,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Script => "Script",
            Mode::Template => "Template",
            Mode::Query => "Query",
            Mode::TagHead => "TagHead",
            Mode::TagExpression => "TagExpression",
            Mode::Output => "Output",
            Mode::TagComment => "TagComment",
            Mode::BlockComment => "BlockComment",
            Mode::DoubleQuote => "DoubleQuote",
            Mode::SingleQuote => "SingleQuote",
            Mode::Hash => "Hash",
            Mode::ScriptIsland => "ScriptIsland",
            Mode::TemplateIsland => "TemplateIsland",
        }
    }

    /// Whether this mode may sit at the bottom of the stack.
    pub fn is_resting(self) -> bool {
        matches!(self, Mode::Script | Mode::Template | Mode::Query)
    }

    /// Whether brackets opened in this mode are counted.
    fn tracks_depth(self) -> bool {
        matches!(self, Mode::Hash | Mode::TagExpression)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    mode: Mode,
    depth: u32,
}

/// Stack of active modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStack {
    frames: Vec<Frame>,
}

impl ModeStack {
    pub fn new(resting: Mode) -> Self {
        Self {
            frames: vec![Frame { mode: resting, depth: 0 }],
        }
    }

    pub fn push(&mut self, mode: Mode) {
        tracing::trace!(mode = mode.name(), depth = self.frames.len(), "push mode");
        self.frames.push(Frame { mode, depth: 0 });
    }

    /// Pop the top mode. The resting frame is never removed.
    pub fn pop(&mut self) -> Option<Mode> {
        if self.frames.len() > 1 {
            let frame = self.frames.pop()?;
            tracing::trace!(mode = frame.mode.name(), depth = self.frames.len(), "pop mode");
            Some(frame.mode)
        } else {
            None
        }
    }

    pub fn top(&self) -> Mode {
        self.frames.last().map_or(Mode::Script, |f| f.mode)
    }

    pub fn resting(&self) -> Mode {
        self.frames.first().map_or(Mode::Script, |f| f.mode)
    }

    /// Bracket depth of the top frame.
    pub fn depth(&self) -> u32 {
        self.frames.last().map_or(0, |f| f.depth)
    }

    pub fn open_bracket(&mut self) {
        if let Some(frame) = self.frames.last_mut().filter(|f| f.mode.tracks_depth()) {
            frame.depth += 1;
        }
    }

    pub fn close_bracket(&mut self) {
        if let Some(frame) = self.frames.last_mut().filter(|f| f.mode.tracks_depth()) {
            frame.depth = frame.depth.saturating_sub(1);
        }
    }

    pub fn contains(&self, mode: Mode) -> bool {
        self.frames.iter().any(|f| f.mode == mode)
    }

    /// Whether anything sits above the resting mode.
    pub fn is_unpopped(&self) -> bool {
        self.frames.len() > 1
    }

    /// Every active mode, innermost first, ending with the resting mode.
    pub fn unpopped(&self) -> Vec<Mode> {
        self.frames.iter().rev().map(|f| f.mode).collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resting_frame_is_never_popped() {
        let mut stack = ModeStack::new(Mode::Template);
        assert_eq!(stack.pop(), None);
        stack.push(Mode::Output);
        assert!(stack.is_unpopped());
        assert_eq!(stack.pop(), Some(Mode::Output));
        assert!(!stack.is_unpopped());
        assert_eq!(stack.top(), Mode::Template);
    }

    #[test]
    fn unpopped_lists_innermost_first() {
        let mut stack = ModeStack::new(Mode::Script);
        stack.push(Mode::DoubleQuote);
        stack.push(Mode::Hash);
        assert_eq!(stack.unpopped(), vec![Mode::Hash, Mode::DoubleQuote, Mode::Script]);
    }

    #[test]
    fn only_hash_and_tag_expression_count_brackets() {
        let mut stack = ModeStack::new(Mode::Script);
        stack.open_bracket();
        assert_eq!(stack.depth(), 0);
        stack.push(Mode::Hash);
        stack.open_bracket();
        stack.open_bracket();
        stack.close_bracket();
        assert_eq!(stack.depth(), 1);
    }
}
