//! Guided questionnaire that ends by composing one chat prompt.
//!
//! A [`DecisionTree`] is validated once when it is built. A [`Wizard`] walks
//! it one selection at a time and is thrown away when it completes or closes.

pub mod graph;
pub mod prompt;
pub mod wizard;

pub use graph::{
    DecisionNode, DecisionOption, DecisionTree, NodeDefinition, NodeId, OptionDefinition,
    Transition, TreeDefinition,
};
pub use prompt::compose_prompt;
pub use wizard::{Completion, Progress, Selection, Step, Wizard};
