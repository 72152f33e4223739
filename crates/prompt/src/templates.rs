//! Built-in prompts.

use crate::types::PromptDefinition;

pub const GROUNDED_QA_ID: &str = "docqa.grounded_qa";

const GROUNDED_QA_TEMPLATE: &str = "Use the following pieces of retrieved context to answer the question at the end.
You are an helpful assistant, so if you don't know the answer, just say that you don't know.
Do not hallucinate. Do not make up information. Do not guess. Do not lie.
Use factual information to answer the question. Verify the information you provide.
Always cite the source of your answer in the format [Source: source_name]\".

Context: {{context}}

Question: {{question}}

Answer:";

/// Question answering constrained to retrieved context, with citations.
///
/// Variables: `context`, `question`.
pub fn grounded_qa() -> PromptDefinition {
    PromptDefinition {
        id: GROUNDED_QA_ID.to_string(),
        title: "Grounded document QA".to_string(),
        required_variables: vec!["context".to_string(), "question".to_string()],
        template: GROUNDED_QA_TEMPLATE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_prompt;
    use std::collections::BTreeMap;

    #[test]
    fn test_grounded_qa_renders_instructions_verbatim() {
        let mut vars = BTreeMap::new();
        vars.insert("context".to_string(), "[Source: doc1]\nThe capital of Freedonia is Sylvania City.".to_string());
        vars.insert("question".to_string(), "What is the capital of Freedonia?".to_string());

        let built = build_prompt(&grounded_qa(), vars).unwrap();

        assert!(built.user.starts_with(
            "Use the following pieces of retrieved context to answer the question at the end.\n"
        ));
        assert!(built
            .user
            .contains("Always cite the source of your answer in the format [Source: source_name]\"."));
        assert!(built.user.contains(
            "Context: [Source: doc1]\nThe capital of Freedonia is Sylvania City.\n\nQuestion: What is the capital of Freedonia?\n\nAnswer:"
        ));
    }
}
