//! Prompt building for the context chat engine.

use crate::rag::RetrievedNode;

/// Persona instructions given to the model for every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional job candidate who will answer \
the recruiter question using the context information. If the question is out of scope, \
kindly apologize and refuse to answer.";

const CONTEXT_SEPARATOR: &str = "--------------------";

/// Builder for the system message of a context-augmented conversation.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
    context_nodes: Vec<RetrievedNode>,
}

impl PromptBuilder {
    /// Creates a new prompt builder with the default system prompt.
    pub fn new() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            context_nodes: Vec::new(),
        }
    }

    /// Sets a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Adds retrieved context nodes.
    pub fn with_context(mut self, nodes: Vec<RetrievedNode>) -> Self {
        self.context_nodes = nodes;
        self
    }

    /// Builds the context block from the retrieved nodes.
    pub fn build_context(&self) -> String {
        let texts = self
            .context_nodes
            .iter()
            .map(|node| node.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("Context information is below.\n{CONTEXT_SEPARATOR}\n{texts}\n{CONTEXT_SEPARATOR}\n")
    }

    /// Builds the system prompt followed by the context block.
    pub fn build_system_prompt(&self) -> String {
        if self.system_prompt.is_empty() {
            return self.build_context();
        }

        format!("{}\n\n{}", self.system_prompt, self.build_context())
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, text: &str) -> RetrievedNode {
        RetrievedNode::new(id, text, 0.9)
    }

    #[test]
    fn system_prompt_contains_persona_and_context() {
        let prompt = PromptBuilder::new()
            .with_context(vec![
                node("a", "Five years of Rust."),
                node("b", "Led a platform team."),
            ])
            .build_system_prompt();

        assert!(prompt.starts_with(DEFAULT_SYSTEM_PROMPT));
        assert!(prompt.contains("Context information is below."));
        assert!(prompt.contains("Five years of Rust.\n\nLed a platform team."));
    }

    #[test]
    fn empty_context_still_has_block() {
        let prompt = PromptBuilder::new()
            .with_system_prompt("")
            .build_system_prompt();

        assert_eq!(
            prompt,
            "Context information is below.\n--------------------\n\n--------------------\n"
        );
    }
}
