//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Reading the operator's answers

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    confirmation_question, display_dirty_paths, display_error, display_manual_push_instruction,
    display_proposed_version, display_status, display_success, display_warning, short_hash,
};

/// Source of the operator's answer at the confirmation step
pub trait Prompter {
    /// Show `question` and return one line of input without its line terminator.
    fn ask(&self, question: &str) -> io::Result<String>;
}

/// Writes the question to stdout and reads the answer from stdin
///
/// Both streams may be pipes; nothing here requires a terminal.
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        TerminalPrompter
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&self, question: &str) -> io::Result<String> {
        print!("{}", question);
        io::stdout().flush()?;

        read_answer(&mut io::stdin().lock())
    }
}

/// Read one line and drop its line terminator. End of input reads as an
/// empty answer.
pub fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut input = String::new();
    reader.read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Answers prompts from a fixed script, for tests and non-interactive runs
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    questions: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            questions: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far
    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &str) -> io::Result<String> {
        self.questions.borrow_mut().push(question.to_string());
        self.answers.borrow_mut().pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left")
        })
    }
}

/// Exact, case-sensitive comparison against the affirmation token.
pub fn is_affirmative(answer: &str, token: &str) -> bool {
    answer.trim_end_matches(['\r', '\n']) == token
}
