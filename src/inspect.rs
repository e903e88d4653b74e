//! Derived views of a single task description.
//!
//! Every function here is pure: the views are printed as feedback after a
//! task is added and never touch the ledger.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const RAW_PREFIX: &str = "Raw string: ";

static TASK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("valid task pattern regex"));

static ACTION_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<action>\w+) (?P<item>\w+)$").expect("valid action/item regex")
});

/// Split on runs of whitespace. Leading/trailing whitespace yields no empty words.
pub fn split_words(task: &str) -> Vec<&str> {
    task.split_whitespace().collect()
}

/// Replace every `'` with `\'`.
pub fn escape_quotes(task: &str) -> String {
    task.replace('\'', "\\'")
}

pub fn raw_prefix(task: &str) -> String {
    format!("{RAW_PREFIX}{task}")
}

/// True iff the task is non-empty and made only of ASCII letters and whitespace.
pub fn matches_task_pattern(task: &str) -> bool {
    TASK_PATTERN.is_match(task)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionItem {
    pub action: String,
    pub item: String,
}

/// Decompose `"<action> <item>"` (exactly two word tokens separated by a
/// single space). Anything else is rejected whole.
pub fn extract_action_item(task: &str) -> Option<ActionItem> {
    let caps = ACTION_ITEM.captures(task)?;
    Some(ActionItem {
        action: caps["action"].to_string(),
        item: caps["item"].to_string(),
    })
}

/// All views of one task, rendered as the console feedback block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub words: Vec<String>,
    pub escaped: String,
    pub raw: String,
    pub pattern_valid: bool,
    pub action_item: Option<ActionItem>,
}

pub fn inspect(task: &str) -> Inspection {
    Inspection {
        words: split_words(task).into_iter().map(str::to_string).collect(),
        escaped: escape_quotes(task),
        raw: raw_prefix(task),
        pattern_valid: matches_task_pattern(task),
        action_item: extract_action_item(task),
    }
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Task words: {:?}", self.words)?;
        writeln!(f, "Escaped task: {}", self.escaped)?;
        writeln!(f, "{}", self.raw)?;
        if self.pattern_valid {
            writeln!(f, "Task format is valid.")?;
        } else {
            writeln!(f, "Task format is invalid.")?;
        }
        match &self.action_item {
            Some(ai) => write!(f, "Action: {}, Item: {}", ai.action, ai.item),
            None => write!(f, "Invalid task format."),
        }
    }
}
