use exprscope_core::EvaluationMode;
use nu_ansi_term::Color;
use reedline::{Prompt, PromptEditMode, PromptHistorySearch};
use std::borrow::Cow;

pub struct ModePrompt {
    mode: EvaluationMode,
}

impl ModePrompt {
    pub fn new(mode: EvaluationMode) -> Self {
        Self { mode }
    }
}

impl Prompt for ModePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let prefix = Color::LightBlue.bold().paint("exprscope");
        let mode = match self.mode {
            EvaluationMode::StaticTyping => Color::Yellow.paint("static"),
            EvaluationMode::Mixed => Color::LightCyan.paint("mixed"),
            EvaluationMode::DynamicTyping => Color::LightGreen.paint("dynamic"),
        };
        Cow::Owned(format!("{} [{}] > ", prefix, mode))
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(".. ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("(search) ")
    }
}
