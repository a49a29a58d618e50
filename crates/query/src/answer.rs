use tracing::info;

use index::{IndexRecord, VectorIndex};

use crate::error::QueryError;
use crate::llm::ChatClient;
use crate::retry::RetryPolicy;

/// Verbatim sentence the model must return when the context cannot support
/// an answer.
pub const REFUSAL_ANSWER: &str = "I couldn't find a clear answer in the provided documents.";

/// Separator between passages in the context block.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Default number of passages retrieved per question.
pub const DEFAULT_TOP_K: usize = 5;

/// Answer plus the passages it was grounded in, in retrieval order.
///
/// `sources` is exactly what was handed to the model as context, not
/// re-filtered by what it cited. Display-level deduplication by
/// `(source, page)` is the caller's job.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<IndexRecord>,
}

/// Retrieves relevant passages and asks the model for a grounded answer.
pub struct AnswerComposer {
    chat: ChatClient,
    retry: RetryPolicy,
}

impl AnswerComposer {
    pub fn new(chat: ChatClient) -> Self {
        Self {
            chat,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(chat: ChatClient, retry: RetryPolicy) -> Self {
        Self { chat, retry }
    }

    /// Answer `question` using only passages retrieved from `index`.
    pub async fn answer(
        &self,
        index: &VectorIndex,
        question: &str,
        k: usize,
    ) -> Result<QueryResult, QueryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::InvalidArgument(
                "question must not be empty".to_string(),
            ));
        }

        // Step 1: retrieve candidate passages.
        let sources = index.search(question, k).await?;
        info!(retrieved = sources.len(), "retrieved context passages");

        // Step 2: build the labeled context block.
        let context = format_context(&sources);

        // Step 3+4: constrained prompt, generation retried independently of
        // retrieval.
        let user_prompt = build_user_prompt(question, &context);
        let system = system_prompt();
        let answer = self
            .retry
            .run("generate answer", || {
                self.chat.generate(&system, &user_prompt)
            })
            .await?;

        Ok(QueryResult { answer, sources })
    }
}

/// Format retrieved passages as a readable context block with source and
/// page labels, preserving retrieval order.
pub fn format_context(records: &[IndexRecord]) -> String {
    records
        .iter()
        .map(|record| match record.page_number {
            Some(page) => format!("[{}, page {}]\n{}", record.source, page, record.text),
            None => format!("[{}]\n{}", record.source, record.text),
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

fn system_prompt() -> String {
    format!(
        "You are an assistant for graduate students in the Advanced Data Analytics program.\n\
         \n\
         Use ONLY the information in the context to answer the question.\n\
         If the answer is not clearly stated in the context, say:\n\
         \"{REFUSAL_ANSWER}\"\n\
         \n\
         When possible:\n\
         - mention whether the rule comes from the graduate handbook or the academic integrity policy.\n\
         - include short citations like (source: filename, page X)."
    )
}

fn build_user_prompt(question: &str, context: &str) -> String {
    format!("Question:\n{question}\n\nContext:\n{context}")
}
