//! UseCase: 問題の検索

use std::sync::Arc;

use crate::domain::{Question, QuestionLookup};

use super::error::SearchQuestionError;

pub struct SearchQuestionUseCase {
    lookup: Arc<dyn QuestionLookup>,
}

impl SearchQuestionUseCase {
    pub fn new(lookup: Arc<dyn QuestionLookup>) -> Self {
        Self { lookup }
    }

    pub async fn execute(&self, keyword: &str) -> Result<Question, SearchQuestionError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SearchQuestionError::EmptyKeyword);
        }
        let question = self.lookup.find(keyword).await?;
        tracing::info!("Question '{}' found for '{}'", question.title_slug, keyword);
        Ok(question)
    }
}
