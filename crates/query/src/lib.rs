pub mod answer;
pub mod error;
pub mod llm;
pub mod retry;

pub use answer::{AnswerComposer, DEFAULT_TOP_K, QueryResult, REFUSAL_ANSWER, format_context};
pub use error::QueryError;
pub use llm::ChatClient;
pub use retry::RetryPolicy;
