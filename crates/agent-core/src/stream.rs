//! Incremental text streams produced by agents

use crate::Result;
use futures::stream::{self, BoxStream, StreamExt};

/// A single generated response delivered as ordered text fragments
pub type TextStream = BoxStream<'static, Result<String>>;

/// Wrap a complete text in a one-chunk stream
pub fn once(text: String) -> TextStream {
    stream::once(async move { Ok(text) }).boxed()
}

/// Drain a stream, concatenating every fragment in arrival order
///
/// Stops at the first error and returns it.
pub async fn collect_text(mut stream: TextStream) -> Result<String> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        text.push_str(&chunk?);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn test_collect_preserves_order() {
        let chunks = vec![Ok("Hel".to_string()), Ok("lo".to_string()), Ok("!".to_string())];
        let text = collect_text(stream::iter(chunks).boxed()).await.unwrap();
        assert_eq!(text, "Hello!");
    }

    #[tokio::test]
    async fn test_collect_stops_at_error() {
        let chunks = vec![
            Ok("partial".to_string()),
            Err(Error::Backend("quota".to_string())),
            Ok("never".to_string()),
        ];
        let result = collect_text(stream::iter(chunks).boxed()).await;
        assert!(matches!(result, Err(Error::Backend(_))));
    }

    #[tokio::test]
    async fn test_once() {
        let text = collect_text(once("whole".to_string())).await.unwrap();
        assert_eq!(text, "whole");
    }
}
