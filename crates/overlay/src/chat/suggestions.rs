/// Canned questions offered as one-tap alternatives to typing.
pub static PRECONFIGURED_QUERIES: [&str; 6] = [
    "What is my total account balance?",
    "When will my fixed deposit mature?",
    "What is the status of my debit/credit cards?",
    "Give me summary of my overall relationship with bank.",
    "When is my next loan EMI due?",
    "what is the outstanding amount on my loan account?",
];

/// How many times the strip repeats the base list to feel endless when scrolled.
pub const SUGGESTION_STRIP_REPEAT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    /// Position in [`PRECONFIGURED_QUERIES`], stable across repeats.
    pub index: usize,
    pub text: &'static str,
}

pub fn preconfigured_query(index: usize) -> Option<&'static str> {
    PRECONFIGURED_QUERIES.get(index).copied()
}

/// Entries of the horizontal suggestion strip in display order.
pub fn suggestion_strip(repeat: usize) -> impl Iterator<Item = Suggestion> {
    (0..repeat).flat_map(|_| {
        PRECONFIGURED_QUERIES
            .iter()
            .enumerate()
            .map(|(index, text)| Suggestion { index, text: *text })
    })
}
