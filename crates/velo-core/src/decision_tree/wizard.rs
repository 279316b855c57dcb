use std::sync::Arc;

use super::graph::{DecisionNode, DecisionTree, NodeId, Transition};
use super::prompt::compose_prompt;
use crate::error::WizardError;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub node: NodeId,
    pub question: String,
    pub value: String,
    pub label: String,
}

/// Result of a finished walk through the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub selections: Vec<Selection>,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Advanced(NodeId),
    Completed(Completion),
}

/// Advisory progress for display only. `percent` is capped at 100 and does
/// not reach it on paths shorter than the longest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub estimated_total: usize,
    pub percent: u8,
}

/// A single walk through a [`DecisionTree`].
///
/// `history[i]` is the node on which `selections[i]` was made, so both always
/// have the same length. A terminal selection is never recorded here: it
/// produces a [`Completion`] and leaves the wizard untouched, and the owner
/// drops the wizard once the completion has been handed on.
#[derive(Debug, Clone)]
pub struct Wizard {
    tree: Arc<DecisionTree>,
    current: NodeId,
    selections: Vec<Selection>,
    history: Vec<NodeId>,
}

impl Wizard {
    pub fn new(tree: Arc<DecisionTree>) -> Self {
        let current = tree.start();
        Self {
            tree,
            current,
            selections: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn current_node(&self) -> &DecisionNode {
        self.tree.node(self.current)
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Choose `value` on the current node.
    pub fn select(&mut self, value: &str) -> Result<Step, WizardError> {
        let node = self.tree.node(self.current);
        let option = node.option(value).ok_or_else(|| WizardError::UnknownOption {
            node: node.key.clone(),
            value: value.to_string(),
        })?;

        let selection = Selection {
            node: self.current,
            question: node.title.clone(),
            value: option.value.clone(),
            label: option.label.clone(),
        };

        match option.transition {
            Transition::Next(next) => {
                tracing::debug!(from = %node.key, to = %self.tree.node(next).key, "wizard advanced");
                self.selections.push(selection);
                self.history.push(self.current);
                self.current = next;
                Ok(Step::Advanced(next))
            }
            Transition::Terminal => {
                let mut selections = self.selections.clone();
                selections.push(selection);
                let prompt =
                    compose_prompt(self.tree.preamble(), &selections, self.tree.closing());
                tracing::info!(steps = selections.len(), "wizard completed");
                Ok(Step::Completed(Completion { selections, prompt }))
            }
        }
    }

    /// Choose the option at `index` on the current node.
    pub fn select_index(&mut self, index: usize) -> Result<Step, WizardError> {
        let node = self.current_node();
        let value = node
            .options
            .get(index)
            .map(|o| o.value.clone())
            .ok_or_else(|| WizardError::UnknownOption {
                node: node.key.clone(),
                value: format!("#{}", index),
            })?;
        self.select(&value)
    }

    /// Undo the last selection. Returns false when already at the start.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.selections.pop();
                self.current = previous;
                true
            }
            None => false,
        }
    }

    pub fn progress(&self) -> Progress {
        let answered = self.selections.len();
        let estimated_total = self.tree.max_depth().max(1);
        let percent = (answered * 100 / estimated_total).min(100) as u8;
        Progress {
            answered,
            estimated_total,
            percent,
        }
    }
}
