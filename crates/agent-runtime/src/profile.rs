//! Agent persona: role, description and instructions

use serde::{Deserialize, Serialize};

/// Who an agent is and how it should answer
///
/// The profile is rendered into the system prompt sent with every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Display name, also used to derive delegation tool names
    pub name: String,

    /// One-line role, e.g. "Search the web for the information"
    pub role: Option<String>,

    /// Longer description of what the agent does
    pub description: Option<String>,

    /// Instructions appended as a bullet list
    pub instructions: Vec<String>,

    /// Ask for markdown formatted output
    pub markdown: bool,
}

impl AgentProfile {
    /// Create a profile with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the role
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add one instruction
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Add several instructions
    pub fn instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions
            .extend(instructions.into_iter().map(Into::into));
        self
    }

    /// Toggle markdown output
    pub fn markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    /// Render the system prompt
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!("You are {}.", self.name);

        if let Some(role) = &self.role {
            prompt.push_str(&format!("\nYour role: {role}"));
        }
        if let Some(description) = &self.description {
            prompt.push_str(&format!("\n\n{description}"));
        }
        if !self.instructions.is_empty() {
            prompt.push_str("\n\n## Instructions");
            for instruction in &self.instructions {
                prompt.push_str(&format!("\n- {instruction}"));
            }
        }
        if self.markdown {
            prompt.push_str("\n\nUse markdown to format your answers.");
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_rendering() {
        let profile = AgentProfile::new("Finance AI Agent")
            .role("Get financial data")
            .instructions(["Use tables to display the data", "Always include sources"])
            .markdown(true);

        let prompt = profile.system_prompt();
        assert!(prompt.starts_with("You are Finance AI Agent."));
        assert!(prompt.contains("Your role: Get financial data"));
        assert!(prompt.contains("- Use tables to display the data\n- Always include sources"));
        assert!(prompt.ends_with("Use markdown to format your answers."));
    }

    #[test]
    fn test_minimal_profile() {
        let prompt = AgentProfile::new("Analyst").system_prompt();
        assert_eq!(prompt, "You are Analyst.");
    }
}
