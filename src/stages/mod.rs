pub mod emotion_pass;
pub mod sentiment_pass;

pub use emotion_pass::*;
pub use sentiment_pass::*;
