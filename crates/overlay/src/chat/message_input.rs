/// Which button sits next to the draft field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAffordance {
    Send,
    Microphone,
}

/// Draft text owned by the session.
///
/// Editing is always allowed; whether a draft may be sent is decided by the
/// session, which also knows about pending requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftInput {
    text: String,
}

impl DraftInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn affordance(&self) -> InputAffordance {
        if self.is_blank() {
            InputAffordance::Microphone
        } else {
            InputAffordance::Send
        }
    }

    /// Returns the trimmed draft, or `None` when there is nothing to send.
    pub fn submittable(&self) -> Option<String> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn blank_drafts_offer_the_microphone() {
        let mut draft = DraftInput::new();
        assert_eq!(draft.affordance(), InputAffordance::Microphone);

        draft.set(" \n\t");
        assert!(draft.is_blank());
        assert_eq!(draft.submittable(), None);
        assert_eq!(draft.affordance(), InputAffordance::Microphone);
    }

    #[::core::prelude::v1::test]
    fn non_blank_drafts_are_trimmed_for_sending() {
        let mut draft = DraftInput::new();
        draft.set("  What is my balance?\n");
        assert_eq!(draft.affordance(), InputAffordance::Send);
        assert_eq!(draft.submittable().as_deref(), Some("What is my balance?"));

        draft.clear();
        assert_eq!(draft.text(), "");
    }
}
