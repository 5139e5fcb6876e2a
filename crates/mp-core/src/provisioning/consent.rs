/// Result delivered by the consent collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentDecision {
    /// The user answered the consent prompt.
    Answered { consented: bool },
    /// The prompt was dismissed without an answer.
    Cancelled,
}

impl ConsentDecision {
    pub fn is_granted(self) -> bool {
        matches!(self, ConsentDecision::Answered { consented: true })
    }
}
