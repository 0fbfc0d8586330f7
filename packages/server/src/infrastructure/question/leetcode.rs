//! `QuestionLookup` backed by the LeetCode GraphQL API.
//!
//! A keyword is first resolved with a one-result problem-list search; the
//! best match's slug is then used to fetch full details. When the search
//! fails or finds nothing, the keyword itself is tried as a slug.

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;

use crate::domain::{Question, QuestionLookup, QuestionLookupError};

const SEARCH_QUERY: &str = r#"query problemsetQuestionList($filters: QuestionListFilterInput) {
  problemsetQuestionList: questionList(categorySlug: "", limit: 1, skip: 0, filters: $filters) {
    questions: data {
      title
      titleSlug
      difficulty
    }
  }
}"#;

const DETAIL_QUERY: &str = r#"query questionTitle($titleSlug: String!) {
  question(titleSlug: $titleSlug) {
    title
    titleSlug
    content
    codeSnippets {
      lang
      langSlug
      code
    }
    difficulty
    likes
    hints
  }
}"#;

pub struct LeetCodeQuestionLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl LeetCodeQuestionLookup {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        body: serde_json::Value,
    ) -> Result<T, QuestionLookupError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(upstream_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuestionLookupError::Upstream(format!(
                "question service responded with {status}"
            )));
        }

        let text = response.text().await.map_err(upstream_error)?;
        parse_graphql(&text)
    }

    /// Slug of the best match for `keyword`, if any.
    async fn search(&self, keyword: &str) -> Result<Option<String>, QuestionLookupError> {
        let data: SearchData = self
            .post(json!({
                "query": SEARCH_QUERY,
                "variables": { "filters": { "searchKeywords": keyword } },
            }))
            .await?;
        Ok(first_slug(data))
    }

    async fn details(&self, slug: &str) -> Result<Question, QuestionLookupError> {
        let data: DetailData = self
            .post(json!({
                "query": DETAIL_QUERY,
                "variables": { "titleSlug": slug },
            }))
            .await?;
        data.question
            .map(Question::from)
            .ok_or_else(|| QuestionLookupError::NotFound(slug.to_string()))
    }
}

#[async_trait]
impl QuestionLookup for LeetCodeQuestionLookup {
    async fn find(&self, keyword: &str) -> Result<Question, QuestionLookupError> {
        let slug = match self.search(keyword).await {
            Ok(Some(slug)) => {
                tracing::debug!("search for '{}' matched slug '{}'", keyword, slug);
                slug
            }
            Ok(None) => {
                tracing::debug!("search for '{}' found nothing, trying it as a slug", keyword);
                slugify(keyword)
            }
            Err(QuestionLookupError::Timeout) => return Err(QuestionLookupError::Timeout),
            Err(e) => {
                tracing::warn!("search for '{}' failed: {}, trying it as a slug", keyword, e);
                slugify(keyword)
            }
        };
        self.details(&slug).await
    }
}

fn upstream_error(e: reqwest::Error) -> QuestionLookupError {
    if e.is_timeout() {
        QuestionLookupError::Timeout
    } else {
        QuestionLookupError::Upstream(e.to_string())
    }
}

// ========================================
// GraphQL response shapes
// ========================================

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    problemset_question_list: Option<SearchList>,
}

#[derive(Debug, Deserialize)]
struct SearchList {
    #[serde(default)]
    questions: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    title_slug: String,
}

#[derive(Debug, Deserialize)]
struct DetailData {
    question: Option<QuestionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionNode {
    title: String,
    title_slug: String,
    content: Option<String>,
    difficulty: Option<String>,
    likes: Option<i64>,
    #[serde(default)]
    hints: Vec<String>,
    code_snippets: Option<Vec<CodeSnippet>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeSnippet {
    lang_slug: String,
    code: String,
}

impl From<QuestionNode> for Question {
    fn from(node: QuestionNode) -> Self {
        let snippets: BTreeMap<String, String> = node
            .code_snippets
            .unwrap_or_default()
            .into_iter()
            .map(|s| (s.lang_slug, s.code))
            .collect();
        Self {
            title: node.title,
            title_slug: node.title_slug,
            description: node.content.unwrap_or_default(),
            difficulty: node.difficulty.unwrap_or_default(),
            likes: node.likes.unwrap_or_default(),
            hints: node.hints,
            snippets,
        }
    }
}

fn parse_graphql<T: DeserializeOwned>(text: &str) -> Result<T, QuestionLookupError> {
    let response: GraphQlResponse<T> = serde_json::from_str(text)
        .map_err(|e| QuestionLookupError::Upstream(format!("invalid response: {e}")))?;
    if let Some(first) = response.errors.first() {
        return Err(QuestionLookupError::Upstream(first.message.clone()));
    }
    response
        .data
        .ok_or_else(|| QuestionLookupError::Upstream("response without data".to_string()))
}

fn first_slug(data: SearchData) -> Option<String> {
    data.problemset_question_list
        .and_then(|list| list.questions.into_iter().next())
        .map(|hit| hit.title_slug)
}

/// "Two Sum" -> "two-sum"
fn slugify(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
