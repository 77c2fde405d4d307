pub mod emotion;
pub mod io;
pub mod llm;
pub mod models;
pub mod sentiment;
pub mod stages;

pub use emotion::{EmotionEngine, EmotionTables, merge_labels, render_label};
pub use io::{SchemaError, extract_presentation, extract_qa};
pub use llm::{Summarizer, SummarizerConfig};
pub use models::{PresentationStatement, QaTurn, SentimentLabel, SentimentScores};
pub use sentiment::{HttpSentimentClassifier, SentimentApiConfig, SentimentClassifier};
pub use stages::{
    EmotionPassResult, SentimentPassConfig, SentimentPassResult, execute_emotion_pass,
    execute_sentiment_pass,
};
