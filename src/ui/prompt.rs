use std::collections::VecDeque;
use std::sync::Mutex;

use inquire::{Confirm, Select, Text};

use crate::error::{BumpError, Result};

/// Synchronous operator interaction used by the interactive release.
///
/// Any I/O failure (closed stdin, Ctrl-C, Esc) comes back as
/// [`BumpError::PromptAborted`].
pub trait Prompter {
    /// Choose one of `options`; returns its index
    fn select(&self, label: &str, options: &[String]) -> Result<usize>;

    /// Free text, `default` when the operator just presses Enter
    fn input(&self, label: &str, default: &str) -> Result<String>;

    /// Yes/no question
    fn confirm(&self, label: &str, default: bool) -> Result<bool>;
}

/// Terminal prompts backed by `inquire`
#[derive(Debug, Default, Clone, Copy)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn select(&self, label: &str, options: &[String]) -> Result<usize> {
        let choice = Select::new(label, options.to_vec()).raw_prompt()?;
        Ok(choice.index)
    }

    fn input(&self, label: &str, default: &str) -> Result<String> {
        let value = Text::new(label).with_default(default).prompt()?;
        Ok(value)
    }

    fn confirm(&self, label: &str, default: bool) -> Result<bool> {
        let value = Confirm::new(label).with_default(default).prompt()?;
        Ok(value)
    }
}

/// A queued answer for [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Select(usize),
    /// `None` accepts the default
    Input(Option<String>),
    Confirm(bool),
    /// Simulate the operator killing the prompt
    Abort,
}

/// Replays a fixed script of answers; used where no terminal is available.
///
/// A question with no answer left, or with an answer of the wrong kind,
/// aborts the prompt. Every label asked is recorded.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        ScriptedPrompter {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Labels of every question asked so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or(0)
    }

    fn next(&self, label: &str) -> Result<Answer> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(label.to_string());
        }

        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .ok_or_else(|| BumpError::PromptAborted(format!("no scripted answer for '{}'", label)))
    }
}

fn unexpected(label: &str, answer: Answer) -> BumpError {
    BumpError::PromptAborted(format!("unexpected answer {:?} for '{}'", answer, label))
}

impl Prompter for ScriptedPrompter {
    fn select(&self, label: &str, options: &[String]) -> Result<usize> {
        match self.next(label)? {
            Answer::Select(index) if index < options.len() => Ok(index),
            other => Err(unexpected(label, other)),
        }
    }

    fn input(&self, label: &str, default: &str) -> Result<String> {
        match self.next(label)? {
            Answer::Input(value) => Ok(value.unwrap_or_else(|| default.to_string())),
            other => Err(unexpected(label, other)),
        }
    }

    fn confirm(&self, label: &str, _default: bool) -> Result<bool> {
        match self.next(label)? {
            Answer::Confirm(value) => Ok(value),
            other => Err(unexpected(label, other)),
        }
    }
}
