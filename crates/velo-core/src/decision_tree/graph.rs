use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::prompt::{DEFAULT_CLOSING, DEFAULT_PREAMBLE};
use crate::error::{ConfigError, ConfigurationError};

const BUILTIN_TREE: &str = include_str!("../../data/bike_tree.json");

/// Raw tree as written in JSON, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDefinition {
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing: Option<String>,
    pub nodes: Vec<NodeDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: String,
    pub title: String,
    pub options: Vec<OptionDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDefinition {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default)]
    pub terminal: bool,
}

/// Index of a node inside a validated [`DecisionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Where an option leads. Every validated option has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next(NodeId),
    Terminal,
}

#[derive(Debug, Clone)]
pub struct DecisionOption {
    pub value: String,
    pub label: String,
    pub transition: Transition,
}

#[derive(Debug, Clone)]
pub struct DecisionNode {
    /// Identifier from the definition file.
    pub key: String,
    pub title: String,
    pub options: Vec<DecisionOption>,
}

impl DecisionNode {
    pub fn option(&self, value: &str) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// A directed acyclic graph of question nodes. Construction is the only
/// place definitions are checked; a `DecisionTree` value is always valid.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<DecisionNode>,
    start: NodeId,
    preamble: String,
    closing: String,
    max_depth: usize,
}

impl DecisionTree {
    /// The bike advisor questionnaire shipped with the crate.
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_json(BUILTIN_TREE)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let definition: TreeDefinition =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        Self::from_definition(definition)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    pub fn from_definition(definition: TreeDefinition) -> Result<Self, ConfigurationError> {
        let mut index: HashMap<String, NodeId> = HashMap::new();
        for (i, node) in definition.nodes.iter().enumerate() {
            if index.insert(node.id.clone(), NodeId(i)).is_some() {
                return Err(ConfigurationError::DuplicateNode(node.id.clone()));
            }
        }

        let start = *index
            .get(&definition.start)
            .ok_or_else(|| ConfigurationError::UnknownStart(definition.start.clone()))?;

        let mut nodes = Vec::with_capacity(definition.nodes.len());
        for node in definition.nodes {
            if node.options.is_empty() {
                return Err(ConfigurationError::EmptyNode(node.id));
            }

            let mut options = Vec::with_capacity(node.options.len());
            for option in node.options {
                let transition = match (option.next.as_deref(), option.terminal) {
                    (None, true) => Transition::Terminal,
                    (Some(target), false) => match index.get(target) {
                        Some(id) => Transition::Next(*id),
                        None => {
                            return Err(ConfigurationError::UnknownTarget {
                                node: node.id,
                                option: option.value,
                                target: target.to_string(),
                            })
                        }
                    },
                    (Some(_), true) => {
                        return Err(ConfigurationError::AmbiguousOption {
                            node: node.id,
                            option: option.value,
                        })
                    }
                    (None, false) => {
                        return Err(ConfigurationError::DanglingOption {
                            node: node.id,
                            option: option.value,
                        })
                    }
                };
                options.push(DecisionOption {
                    value: option.value,
                    label: option.label,
                    transition,
                });
            }

            nodes.push(DecisionNode {
                key: node.id,
                title: node.title,
                options,
            });
        }

        let depths = longest_paths(&nodes)?;
        let max_depth = depths[start.0];

        tracing::debug!(nodes = nodes.len(), max_depth, "decision tree validated");

        Ok(Self {
            nodes,
            start,
            preamble: definition
                .preamble
                .unwrap_or_else(|| DEFAULT_PREAMBLE.to_string()),
            closing: definition
                .closing
                .unwrap_or_else(|| DEFAULT_CLOSING.to_string()),
            max_depth,
        })
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn node(&self, id: NodeId) -> &DecisionNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Most selections any path from the start needs to reach a terminal option.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn closing(&self) -> &str {
        &self.closing
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unseen,
    Active,
    Done,
}

/// Longest number of selections from each node to a terminal option.
/// Fails on the first cycle found.
///
/// Walks with an explicit stack of `(node, next option to follow)` so a long
/// chain in a configured tree cannot exhaust the thread stack. While a node is
/// `Active`, `depth` holds the longest path found below it so far.
fn longest_paths(nodes: &[DecisionNode]) -> Result<Vec<usize>, ConfigurationError> {
    let mut state = vec![Visit::Unseen; nodes.len()];
    let mut depth = vec![0; nodes.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..nodes.len() {
        if state[root] != Visit::Unseen {
            continue;
        }
        state[root] = Visit::Active;
        stack.push((root, 0));

        while let Some(&(id, next_option)) = stack.last() {
            let Some(option) = nodes[id].options.get(next_option) else {
                stack.pop();
                state[id] = Visit::Done;
                depth[id] += 1;
                if let Some(&(parent, _)) = stack.last() {
                    depth[parent] = depth[parent].max(depth[id]);
                }
                continue;
            };

            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            let Transition::Next(next) = option.transition else {
                continue;
            };
            match state[next.0] {
                Visit::Done => depth[id] = depth[id].max(depth[next.0]),
                Visit::Active => return Err(ConfigurationError::Cycle(nodes[next.0].key.clone())),
                Visit::Unseen => {
                    state[next.0] = Visit::Active;
                    stack.push((next.0, 0));
                }
            }
        }
    }
    Ok(depth)
}
