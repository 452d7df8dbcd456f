//! quizline-report: self-contained HTML pages for graded attempts and
//! result history.

pub mod html;

pub use html::{generate_history_html, generate_review_html, write_html};
