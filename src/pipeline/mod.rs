// Message routing pipeline
//
// One incoming chat message makes one pass through an ordered cascade of
// stages. Each stage either resolves the message with a reply or passes it
// to the next stage; the upstream stage always resolves, one way or another.

mod conversational;
mod emergency;
mod fallback;

pub use conversational::ConversationalMatcher;
pub use emergency::{EmergencyDetector, EmergencyKeywords};
pub use fallback::{FallbackResponder, DISCLAIMER};

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::chat::ChatMessage;
use crate::upstream::{ChatError, UpstreamChat};

/// Which stage produced the reply. Serialized values are the wire contract
/// the portal frontend matches on.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ReplySource {
    #[serde(rename = "conversational-handler")]
    Conversational,
    #[serde(rename = "emergency-detection")]
    Emergency,
    #[serde(rename = "health-education")]
    HealthEducation,
    #[serde(rename = "openai")]
    Upstream,
    #[serde(rename = "fallback")]
    Fallback,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Conversational => "conversational-handler",
            ReplySource::Emergency => "emergency-detection",
            ReplySource::HealthEducation => "health-education",
            ReplySource::Upstream => "openai",
            ReplySource::Fallback => "fallback",
        }
    }
}

/// Terminal result of one routing pass
#[derive(Debug, Clone, Serialize)]
pub struct RouterReply {
    pub reply: String,
    pub source: ReplySource,
    /// Cause of the absorbed upstream failure, when the reply came from the
    /// fallback tables because of one
    #[serde(rename = "errorDetail", skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl RouterReply {
    fn new(reply: impl Into<String>, source: ReplySource) -> Self {
        Self {
            reply: reply.into(),
            source,
            error_detail: None,
        }
    }
}

/// Failures the router cannot absorb into a scripted reply
///
/// Everything else that goes wrong upstream becomes a fallback reply; a
/// malformed response from a 2xx upstream call is operator-visible instead.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("upstream returned an unusable response: {0}")]
    MalformedUpstream(String),
}

enum StageOutcome {
    Resolved(RouterReply),
    Pass,
}

#[async_trait]
trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<StageOutcome, RouterError>;
}

/// The per-request orchestrator
///
/// Stateless across calls: stages share nothing but their immutable tables,
/// so one router instance serves concurrent requests.
pub struct MessageRouter {
    stages: Vec<Box<dyn Stage>>,
    safety_net: FallbackResponder,
}

impl MessageRouter {
    /// Assemble the cascade from its stages, in the fixed order: small
    /// talk, emergency screen, upstream with scripted fallback
    pub fn new(
        matcher: ConversationalMatcher,
        detector: EmergencyDetector,
        upstream: Arc<dyn UpstreamChat>,
    ) -> Self {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(ConversationalStage { matcher }),
            Box::new(EmergencyStage { detector }),
            Box::new(UpstreamStage {
                upstream,
                fallback: FallbackResponder::new(),
            }),
        ];

        Self {
            stages,
            safety_net: FallbackResponder::new(),
        }
    }

    /// Route one message through the cascade
    pub async fn route(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<RouterReply, RouterError> {
        for stage in &self.stages {
            match stage.evaluate(message, history).await? {
                StageOutcome::Resolved(reply) => {
                    tracing::info!(
                        stage = stage.name(),
                        source = reply.source.as_str(),
                        "Message resolved"
                    );
                    return Ok(reply);
                }
                StageOutcome::Pass => continue,
            }
        }

        // Unreachable with the standard cascade, whose last stage always
        // resolves. Answer anyway rather than erroring.
        tracing::warn!("Every stage passed; serving general fallback reply");
        Ok(RouterReply::new(
            self.safety_net.build(message),
            ReplySource::Fallback,
        ))
    }

    /// Stage names in evaluation order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }
}

struct ConversationalStage {
    matcher: ConversationalMatcher,
}

#[async_trait]
impl Stage for ConversationalStage {
    fn name(&self) -> &'static str {
        "conversational"
    }

    async fn evaluate(
        &self,
        message: &str,
        _history: &[ChatMessage],
    ) -> Result<StageOutcome, RouterError> {
        match self.matcher.reply(message) {
            Some(reply) => Ok(StageOutcome::Resolved(RouterReply::new(
                reply,
                ReplySource::Conversational,
            ))),
            None => Ok(StageOutcome::Pass),
        }
    }
}

struct EmergencyStage {
    detector: EmergencyDetector,
}

#[async_trait]
impl Stage for EmergencyStage {
    fn name(&self) -> &'static str {
        "emergency"
    }

    async fn evaluate(
        &self,
        message: &str,
        _history: &[ChatMessage],
    ) -> Result<StageOutcome, RouterError> {
        if self.detector.is_emergency(message) {
            return Ok(StageOutcome::Resolved(RouterReply::new(
                self.detector.warning(),
                ReplySource::Emergency,
            )));
        }

        Ok(StageOutcome::Pass)
    }
}

struct UpstreamStage {
    upstream: Arc<dyn UpstreamChat>,
    fallback: FallbackResponder,
}

#[async_trait]
impl Stage for UpstreamStage {
    fn name(&self) -> &'static str {
        "upstream"
    }

    async fn evaluate(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<StageOutcome, RouterError> {
        match self.upstream.send(history, message).await {
            Ok(reply) => Ok(StageOutcome::Resolved(RouterReply::new(
                reply,
                ReplySource::Upstream,
            ))),
            // An unconfigured credential is an expected deployment state,
            // not a failure: serve topical education without error detail.
            Err(ChatError::MissingCredentials) => {
                tracing::info!("No upstream credentials configured, serving education reply");
                Ok(StageOutcome::Resolved(RouterReply::new(
                    self.fallback.build(message),
                    ReplySource::HealthEducation,
                )))
            }
            Err(ChatError::BadResponse(detail)) => {
                tracing::error!(detail = %detail, "Upstream response was unusable");
                Err(RouterError::MalformedUpstream(detail))
            }
            Err(
                err @ (ChatError::RateLimited(_)
                | ChatError::Network(_)
                | ChatError::Http { .. }),
            ) => {
                tracing::warn!(error = %err, "Upstream call failed, serving fallback reply");
                Ok(StageOutcome::Resolved(RouterReply {
                    reply: self.fallback.build(message),
                    source: ReplySource::Fallback,
                    error_detail: Some(err.to_string()),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverCalled;

    #[async_trait]
    impl UpstreamChat for NeverCalled {
        async fn send(&self, _history: &[ChatMessage], _message: &str) -> Result<String, ChatError> {
            panic!("upstream must not be called in this test");
        }
    }

    fn seeded_router(upstream: Arc<dyn UpstreamChat>) -> MessageRouter {
        MessageRouter::new(
            ConversationalMatcher::with_seed(1),
            EmergencyDetector::new(),
            upstream,
        )
    }

    #[test]
    fn test_stage_order() {
        let router = seeded_router(Arc::new(NeverCalled));
        assert_eq!(
            router.stage_names(),
            vec!["conversational", "emergency", "upstream"]
        );
    }

    #[test]
    fn test_source_tag_wire_names() {
        assert_eq!(ReplySource::Conversational.as_str(), "conversational-handler");
        assert_eq!(ReplySource::Emergency.as_str(), "emergency-detection");
        assert_eq!(ReplySource::HealthEducation.as_str(), "health-education");
        assert_eq!(ReplySource::Upstream.as_str(), "openai");
        assert_eq!(ReplySource::Fallback.as_str(), "fallback");
    }

    #[test]
    fn test_reply_serialization_omits_empty_error_detail() {
        let reply = RouterReply::new("hi", ReplySource::Conversational);
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["source"], "conversational-handler");
        assert!(json.get("errorDetail").is_none());

        let with_detail = RouterReply {
            error_detail: Some("status 429".to_string()),
            ..reply
        };
        let json = serde_json::to_value(&with_detail).unwrap();
        assert_eq!(json["errorDetail"], "status 429");
    }

    #[tokio::test]
    async fn test_greeting_resolves_without_touching_upstream() {
        let router = seeded_router(Arc::new(NeverCalled));

        let result = router.route("hello", &[]).await.unwrap();
        assert_eq!(result.source, ReplySource::Conversational);
        assert!(!result.reply.is_empty());
    }

    #[tokio::test]
    async fn test_emergency_resolves_without_touching_upstream() {
        let router = seeded_router(Arc::new(NeverCalled));

        let result = router.route("I have chest pain", &[]).await.unwrap();
        assert_eq!(result.source, ReplySource::Emergency);
        assert!(result.reply.contains("911"));
    }
}
