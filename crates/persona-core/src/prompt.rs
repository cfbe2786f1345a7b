//! System prompt assembly and fingerprinting.

use sha2::{Digest, Sha256};

/// Header line for the memory fact section.
pub const FACTS_HEADER: &str = "=== Key Facts About You ===";

/// Header line for the instruction section.
pub const INSTRUCTIONS_HEADER: &str = "=== Strict Instructions ===";

/// Header line for the identity clarification block.
pub const IDENTITY_HEADER: &str = "=== IMPORTANT Identity Clarifications ===";

/// Who the persona is, and who it must not be confused with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaIdentity {
    /// Full name of the persona.
    pub name: String,
    /// Descriptions of well-known people sharing the name, e.g.
    /// "former professional baseball pitcher".
    pub namesakes: Vec<String>,
}

impl Default for PersonaIdentity {
    fn default() -> Self {
        Self {
            name: "Luis García".to_string(),
            namesakes: vec![
                "former professional baseball pitcher".to_string(),
                "ESPN commentator or former Liverpool footballer".to_string(),
            ],
        }
    }
}

impl PersonaIdentity {
    /// Create an identity with no namesakes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namesakes: Vec::new(),
        }
    }
}

/// Renders memory facts and training instructions into a system prompt.
///
/// The output is a pure function of the identity and the two input lists:
/// identical lists in identical order always give byte-identical prompts.
/// Hidden instructions are expected to be passed in alongside visible ones;
/// visibility only matters for listing endpoints.
#[derive(Debug, Clone, Default)]
pub struct PersonaPromptBuilder {
    identity: PersonaIdentity,
}

impl PersonaPromptBuilder {
    /// Create a builder for the given persona.
    pub fn new(identity: PersonaIdentity) -> Self {
        Self { identity }
    }

    /// Get the persona identity.
    pub fn identity(&self) -> &PersonaIdentity {
        &self.identity
    }

    /// Build the system prompt.
    pub fn build<F, I>(&self, facts: &[F], instructions: &[I]) -> String
    where
        F: AsRef<str>,
        I: AsRef<str>,
    {
        let name = &self.identity.name;
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!(
            "You are {}, a specific individual defined by the following facts and instructions. Adhere strictly to this persona.\n",
            name
        ));

        if !facts.is_empty() {
            lines.push(FACTS_HEADER.to_string());
            lines.extend(facts.iter().map(|f| format!("- {}", f.as_ref().trim())));
            lines.push(String::new());
        }

        if !instructions.is_empty() {
            lines.push(INSTRUCTIONS_HEADER.to_string());
            lines.extend(
                instructions
                    .iter()
                    .map(|i| format!("- {}", i.as_ref().trim())),
            );
            lines.push(String::new());
        }

        lines.push(IDENTITY_HEADER.to_string());
        for namesake in &self.identity.namesakes {
            lines.push(format!("- You are NOT the {} {}.", namesake, name));
        }
        lines.push(format!(
            "- You are ONLY the specific {} described in the 'Key Facts About You' section.",
            name
        ));
        lines.push(
            "- Do NOT mention being an AI or language model. Respond naturally within the defined persona."
                .to_string(),
        );

        lines.join("\n")
    }
}

/// Compute a stable SHA-256 fingerprint for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}
