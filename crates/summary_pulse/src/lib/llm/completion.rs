use std::{fmt::Display, future::Future};

/// A chat-style large language model endpoint
pub trait CompletionService {
    type Error: Display;

    /// Sends one system + user prompt pair and returns the model's text
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

impl<T: CompletionService + Send + Sync> CompletionService for &T {
    type Error = T::Error;

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, Self::Error> {
        (**self).complete(system_prompt, user_prompt).await
    }
}
