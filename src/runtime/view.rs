//! Display model published after every transition

use crate::state_machine::{FeedbackState, SessionPhase, SessionState};
use pulldown_cmark::{html, CowStr, Event as MdEvent, Options, Parser, Tag};
use serde::Serialize;

/// Model text plus its rendered HTML
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedText {
    pub text: String,
    pub html: String,
}

impl RenderedText {
    fn from_markdown(text: &str) -> Self {
        Self {
            text: text.to_string(),
            html: render_markdown(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    /// 1-based, for display
    pub number: usize,
    pub total: usize,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerView {
    pub question: String,
    pub selected: String,
    pub correct: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreView {
    pub correct: usize,
    pub total: usize,
}

/// Everything the UI needs to draw one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub phase: SessionPhase,
    /// A generation call is in flight
    pub working: bool,
    pub topic: Option<String>,
    pub explanation: Option<RenderedText>,
    pub question: Option<QuestionView>,
    pub answers: Vec<AnswerView>,
    pub score: Option<ScoreView>,
    pub feedback: Option<RenderedText>,
    pub feedback_error: Option<String>,
    pub quiz_fallback: Option<String>,
}

impl SessionView {
    pub fn from_state(session_id: &str, state: &SessionState) -> Self {
        let question = state.current_question().map(|item| QuestionView {
            number: state.current_index + 1,
            total: state.quiz.len(),
            question: item.question.clone(),
            options: item.options.clone(),
        });

        let answers = state
            .answers
            .iter()
            .map(|a| AnswerView {
                question: a.question.clone(),
                selected: a.selected.clone(),
                correct: a.correct.clone(),
                is_correct: a.is_correct(),
            })
            .collect();

        let score = (state.phase == SessionPhase::Completed).then(|| ScoreView {
            correct: state.score(),
            total: state.quiz.len(),
        });

        let (feedback, feedback_error) = match &state.feedback {
            FeedbackState::Ready { text } => (Some(RenderedText::from_markdown(text)), None),
            FeedbackState::Failed { message } => (None, Some(message.clone())),
            FeedbackState::NotRequested | FeedbackState::Pending => (None, None),
        };

        Self {
            session_id: session_id.to_string(),
            phase: state.phase,
            working: state.phase.is_loading() || state.feedback == FeedbackState::Pending,
            topic: state.topic.as_ref().map(ToString::to_string),
            explanation: (!state.explanation.is_empty())
                .then(|| RenderedText::from_markdown(&state.explanation)),
            question,
            answers,
            score,
            feedback,
            feedback_error,
            quiz_fallback: state.quiz_fallback.clone(),
        }
    }
}

/// Render model-written Markdown; raw HTML in the input is shown as text and
/// link targets with a script-capable scheme are neutralised
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            MdEvent::Html(raw) | MdEvent::InlineHtml(raw) => MdEvent::Text(raw),
            MdEvent::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => MdEvent::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            MdEvent::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => MdEvent::Start(Tag::Image {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            other => other,
        });

    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, parser);
    out
}

/// Keep relative targets and http(s)/mailto; anything else becomes `#`
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    // Browsers ignore embedded whitespace and control characters in schemes
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let allowed = match cleaned.split_once(':') {
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            matches!(scheme, "http" | "https" | "mailto")
        }
        _ => true,
    };

    if allowed {
        url
    } else {
        tracing::warn!(url = %url, "Dropped unsafe link target from model output");
        CowStr::Borrowed("#")
    }
}
