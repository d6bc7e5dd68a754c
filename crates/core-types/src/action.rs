//! Action payloads applied to resolved elements

use serde::{Deserialize, Serialize};

/// What to do with a resolved element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionPayload {
    /// Click the element
    Click,

    /// Replace the element's value with the given text
    SetText {
        text: String,
        /// Submit the enclosing form after typing
        submit: bool,
    },

    /// Choose an option from a select-like element by visible label
    ChooseOption { option: String },
}

impl ActionPayload {
    /// Convenience constructor for plain text entry
    pub fn set_text(text: impl Into<String>) -> Self {
        ActionPayload::SetText {
            text: text.into(),
            submit: false,
        }
    }

    /// String form for logs and evidence
    pub fn describe(&self) -> String {
        match self {
            ActionPayload::Click => "click".to_string(),
            ActionPayload::SetText { text, submit } => {
                if *submit {
                    format!("set-text '{}' + submit", text)
                } else {
                    format!("set-text '{}'", text)
                }
            }
            ActionPayload::ChooseOption { option } => format!("choose-option '{}'", option),
        }
    }
}
