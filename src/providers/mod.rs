pub mod gemini;
pub mod openai;
pub mod traits;

use anyhow::Result;
use traits::CompletionProvider;

/// Rate-limit-class errors get exactly one retry against the cheaper
/// model variant; every other error surfaces unchanged.
pub fn is_rate_limited(err: &anyhow::Error) -> bool {
    let text = format!("{:#}", err);
    text.contains("429") || text.contains("RESOURCE_EXHAUSTED")
}

pub async fn complete_with_fallback(
    primary: &dyn CompletionProvider,
    fallback: Option<&(dyn CompletionProvider + Send + Sync)>,
    prompt: &str,
) -> Result<String> {
    match primary.complete(prompt).await {
        Ok(text) => Ok(text),
        Err(err) if is_rate_limited(&err) => {
            if let Some(fallback) = fallback {
                log::warn!(
                    "{} rate limited, retrying once with {}",
                    primary.model(),
                    fallback.model()
                );
                fallback.complete(prompt).await
            } else {
                Err(err)
            }
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn rate_limit_detection() {
        assert!(is_rate_limited(&anyhow!(
            "API request failed: Status 429, Body: slow down"
        )));
        assert!(is_rate_limited(&anyhow!("RESOURCE_EXHAUSTED: quota")));
        assert!(!is_rate_limited(&anyhow!("Invalid response format")));
    }
}
