//! Guided flows — quick-reply buttons mapped to scripted exchanges or FAQ questions.
//!
//! Two labels open scripted exchanges that never hit the question-answering
//! path; every other label is looked up in the FAQ catalog and, if found,
//! becomes an ordinary question.

use ragchat_core::locale::{Locale, LocaleText, ScriptText};
use ragchat_core::types::Message;

/// A scripted two-message exchange: a user echo followed by a bot prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptedExchange {
    pub user_echo: String,
    pub bot_prompt: String,
    pub bot_buttons: Vec<String>,
}

impl ScriptedExchange {
    fn from_script(script: &ScriptText, bot_buttons: Vec<String>) -> Self {
        ScriptedExchange {
            user_echo: script.user_echo.to_string(),
            bot_prompt: script.bot_prompt.to_string(),
            bot_buttons,
        }
    }

    /// The two transcript messages, in display order.
    pub fn messages(&self) -> [Message; 2] {
        [
            Message::user(&self.user_echo),
            Message::bot_with_buttons(&self.bot_prompt, self.bot_buttons.clone()),
        ]
    }
}

/// What pressing a button should do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuidedAction {
    /// Offer the FAQ categories as buttons.
    TaskLookup(ScriptedExchange),
    /// Ask for merchant details as free text.
    MerchantLookup(ScriptedExchange),
    /// Submit a canned question as if the user typed it.
    FaqQuestion(String),
    /// Unknown label; pressing it does nothing.
    Unrecognized,
}

/// Resolves button labels for one locale.
#[derive(Clone, Debug)]
pub struct GuidedFlows {
    text: &'static LocaleText,
}

impl GuidedFlows {
    pub fn new(locale: Locale) -> Self {
        GuidedFlows {
            text: locale.text(),
        }
    }

    /// The greeting that opens every new session, offering both guided flows.
    pub fn greeting(&self) -> Message {
        Message::bot_with_buttons(self.text.greeting, self.text.greeting_buttons())
    }

    pub fn resolve(&self, label: &str) -> GuidedAction {
        if label == self.text.task_lookup.label {
            GuidedAction::TaskLookup(ScriptedExchange::from_script(
                &self.text.task_lookup,
                self.text.faq_labels(),
            ))
        } else if label == self.text.merchant_lookup.label {
            GuidedAction::MerchantLookup(ScriptedExchange::from_script(
                &self.text.merchant_lookup,
                Vec::new(),
            ))
        } else if let Some(question) = self.text.faq_question(label) {
            GuidedAction::FaqQuestion(question.to_string())
        } else {
            GuidedAction::Unrecognized
        }
    }
}
