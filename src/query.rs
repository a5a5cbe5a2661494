use serde::{Deserialize, Serialize};

use crate::embed::Embedder;
use crate::error::Result;

/// The reader the digest is written for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,
    pub expertise: Vec<String>,
    pub focus_areas: Vec<String>,
}

pub fn query_text(persona: &Persona, job_to_be_done: &str) -> String {
    format!(
        "Role: {}. Expertise: {}. Focus: {} {}",
        persona.role,
        persona.expertise.join(", "),
        persona.focus_areas.join(", "),
        job_to_be_done
    )
}

/// Embedded persona + job, computed once per collection and only ever borrowed after.
#[derive(Debug, Clone)]
pub struct Query {
    text: String,
    vector: Vec<f32>,
}

impl Query {
    pub fn build(embedder: &dyn Embedder, persona: &Persona, job_to_be_done: &str) -> Result<Self> {
        let text = query_text(persona, job_to_be_done);
        let vector = embedder.embed(&text)?;
        Ok(Query { text, vector })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }
}
