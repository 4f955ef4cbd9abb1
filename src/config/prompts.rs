//! Prompt templates for Nimbus.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub geocode: GeocodePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}


/// Prompts for answering with a retrieved video as grounding context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a weather assistant. Answer questions about the weather using only the provided video context.

Guidelines:
- Use only facts stated in the context; never guess or use outside knowledge
- Be concise and include units for temperatures and other measurements
- If the context does not contain the information needed to answer, reply with exactly: NO DATA"#.to_string(),

            user: r#"Question: {{question}}

Video: {{title}} ({{uri}})

Context:
{{context}}

Answer the question based on the above context."#.to_string(),
        }
    }
}

/// Prompt for resolving a place name to coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodePrompts {
    pub user: String,
}

impl Default for GeocodePrompts {
    fn default() -> Self {
        Self {
            user: r#"What is the latitude and longitude of {{city}}? Output in JSON as {"latitude": <number>, "longitude": <number>}. If {{city}} is not a valid city, output {"error": "<reason>"} instead. Do not format."#.to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            let geocode_path = custom_path.join("geocode.toml");
            if geocode_path.exists() {
                let content = std::fs::read_to_string(&geocode_path)?;
                prompts.geocode = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
