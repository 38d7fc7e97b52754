//! Core Agent trait definition

use crate::{Context, Result, TextStream};
use async_trait::async_trait;

/// Capability implemented by every analyzer in the system
///
/// An agent receives a natural-language prompt plus an execution [`Context`]
/// (session id, prior conversation) and produces free-form text. Concrete
/// implementations decide which model backend and which tools are involved;
/// callers only see text.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return the complete output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Process input and return the output as an incremental stream
    ///
    /// The default implementation runs [`Agent::process`] and yields the
    /// whole answer as a single fragment.
    async fn process_stream(&self, input: String, context: &mut Context) -> Result<TextStream> {
        let text = self.process(input, context).await?;
        Ok(crate::stream::once(text))
    }

    /// Get the agent's name
    fn name(&self) -> &str;

    /// Short description of the agent's role
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect_text;

    struct Echo;

    #[async_trait]
    impl Agent for Echo {
        async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
            Ok(format!("echo: {input}"))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_default_stream_yields_whole_answer() {
        let mut ctx = Context::new();
        let stream = Echo.process_stream("hi".to_string(), &mut ctx).await.unwrap();
        assert_eq!(collect_text(stream).await.unwrap(), "echo: hi");
        assert_eq!(Echo.description(), "");
    }
}
