pub mod client;

pub use client::{Summarizer, SummarizerConfig};
