//! Offline provider used when no credential is configured.
//!
//! Every title, summary and suggestion is prefixed with `Mock` so placeholder
//! data is never mistaken for generated content.

use super::{Distillation, GeneratedPrompt, GenerationProvider, GenerationResult};
use log::debug;

/// Deterministic placeholder generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGenerationProvider;

impl MockGenerationProvider {
    pub fn new() -> Self {
        Self
    }
}

impl GenerationProvider for MockGenerationProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_mock(&self) -> bool {
        true
    }

    fn compose_from_idea(&self, idea: &str) -> GenerationResult<Vec<GeneratedPrompt>> {
        debug!("event=generation_call module=generation provider=mock op=compose");
        Ok(vec![
            GeneratedPrompt::new(
                "Mock: Social Media Post",
                format!("Create a social media post about {idea} for {{{{platform}}}}."),
                ["mock", "social-media"],
            ),
            GeneratedPrompt::new(
                "Mock: Blog Post Idea",
                format!(
                    "Write a blog post outline about the benefits of {idea}. Target audience is {{{{audience}}}}."
                ),
                ["mock", "blogging"],
            ),
        ])
    }

    fn distill_bookmark(&self, _url: &str) -> GenerationResult<Distillation> {
        debug!("event=generation_call module=generation provider=mock op=distill");
        Ok(Distillation {
            summary: "Mock: This is a mock summary of the URL. The generation API key is not configured."
                .to_string(),
            prompts: vec![
                GeneratedPrompt::new(
                    "Mock: Explain this to a 5-year-old",
                    "Explain the main concept of the page at the provided URL to a 5-year-old.",
                    ["mock", "explain"],
                ),
                GeneratedPrompt::new(
                    "Mock: Create a tweet thread",
                    "Summarize the key takeaways from the URL in a 3-part tweet thread.",
                    ["mock", "social-media"],
                ),
            ],
            tags: vec!["mock".to_string(), "distilled".to_string()],
        })
    }

    fn refine_prompt(&self, body: &str, framework: &str) -> GenerationResult<String> {
        debug!("event=generation_call module=generation provider=mock op=refine");
        Ok(format!(
            "{body}\n\n---\n*Mock Refinement Applied: {framework}*"
        ))
    }

    fn suggest_variable_values(
        &self,
        _body: &str,
        variable_name: &str,
    ) -> GenerationResult<Vec<String>> {
        debug!("event=generation_call module=generation provider=mock op=suggest");
        Ok((1..=3)
            .map(|index| format!("Mock suggestion {index} for {variable_name}"))
            .collect())
    }
}
