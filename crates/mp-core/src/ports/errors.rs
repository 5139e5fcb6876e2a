use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputMethodError {
    /// No default input method is configured for the user.
    #[error("no default input method available")]
    NoDefault,

    #[error("input method service error: {0}")]
    Service(String),
}
