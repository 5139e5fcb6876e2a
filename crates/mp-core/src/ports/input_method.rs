use async_trait::async_trait;

use crate::package::InputMethodInfo;
use crate::ports::errors::InputMethodError;

#[async_trait]
pub trait InputMethodPort: Send + Sync {
    async fn input_methods(&self) -> Result<Vec<InputMethodInfo>, InputMethodError>;

    /// Whether `method` is the user's current default input method.
    ///
    /// Returns [`InputMethodError::NoDefault`] when no default is configured.
    async fn is_default(&self, method: &InputMethodInfo) -> Result<bool, InputMethodError>;
}
