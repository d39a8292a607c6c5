//! Guided, step-by-step walk through one program's application.
//!
//! Each user answer moves the flow one step forward until the last step is
//! reached; after that the flow only confirms completion.

use serde::Serialize;

use crate::i18n::TranslationResolver;
use crate::session::ChatMessage;

use super::catalog::{ProgramCatalog, ProgramSteps};
use super::model::progress_percent;

/// A step as displayed next to the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    pub id: String,
    pub label: String,
    pub completed: bool,
    pub current: bool,
}

pub struct ApplicationFlow {
    program: ProgramSteps,
    current: usize,
    messages: Vec<ChatMessage>,
}

impl ApplicationFlow {
    /// Open the flow with its two greeting messages. Unknown programs give `None`.
    pub fn start(program_id: &str, catalog: &ProgramCatalog, t: &TranslationResolver) -> Option<Self> {
        let program = catalog.get(program_id)?.clone();
        let title = t.t(&program.title_key);
        let messages = vec![
            ChatMessage::assistant(t.t_with("application.welcomeMessage", &[("program", title.as_str())])),
            ChatMessage::assistant(t.t("application.firstQuestion")),
        ];
        Some(Self {
            program,
            current: 0,
            messages,
        })
    }

    /// Resume at a previously reached step.
    pub fn resume_at(mut self, step: u32) -> Self {
        let last = self.program.steps.len().saturating_sub(1);
        self.current = (step as usize).min(last);
        self
    }

    pub fn program(&self) -> &ProgramSteps {
        &self.program
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Zero-based index of the step being worked on.
    pub fn current_step(&self) -> u32 {
        self.current as u32
    }

    pub fn total_steps(&self) -> u32 {
        self.program.steps.len() as u32
    }

    pub fn progress(&self) -> u32 {
        progress_percent(self.current_step(), self.total_steps())
    }

    pub fn is_on_last_step(&self) -> bool {
        self.current + 1 >= self.program.steps.len()
    }

    pub fn steps(&self, t: &TranslationResolver) -> Vec<StepStatus> {
        self.program
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepStatus {
                id: step.id.clone(),
                label: t.t(&step.label_key),
                completed: index < self.current,
                current: index == self.current,
            })
            .collect()
    }

    /// Record a user answer and append the assistant's follow-up.
    ///
    /// Returns the assistant message. Blank answers are ignored.
    pub fn respond(&mut self, text: &str, t: &TranslationResolver) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(text));

        let follow_up = if self.is_on_last_step() {
            t.t("application.allStepsComplete")
        } else {
            self.current += 1;
            tracing::debug!(
                program_id = %self.program.program_id,
                step = self.current,
                "Application flow advanced"
            );
            t.t("application.stepConfirmation")
        };
        self.messages.push(ChatMessage::assistant(follow_up));
        self.messages.last()
    }
}
