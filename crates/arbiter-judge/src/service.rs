use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use arbiter_core::error::{ModelError, Result};
use arbiter_core::model::{CallOptions, ChatModel, ResponseFormat};

use crate::coerce::coerce;
use crate::policy::{OutputKind, Policy};
use crate::prompt::render;
use crate::types::{Verdict, VerifyRequest};

/// Orchestrates one evaluation: render the prompt, call the model under a
/// timeout, coerce the output.
///
/// Holds no mutable state; one instance is built at startup and shared
/// across request handlers. Evaluations are independent and stateless, so
/// two identical requests issue two model calls and may legitimately return
/// different verdicts at nonzero temperature.
pub struct EvaluationService {
    model: Arc<dyn ChatModel>,
    policy: Policy,
    timeout: Duration,
}

impl EvaluationService {
    pub fn new(model: Arc<dyn ChatModel>, policy: Policy, timeout: Duration) -> Self {
        Self {
            model,
            policy,
            timeout,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Render the policy templates against a probe request.
    ///
    /// A placeholder mistake in a rule template is a deploy-time defect;
    /// calling this at startup surfaces it before traffic arrives.
    pub fn validate(&self) -> Result<()> {
        let probe = VerifyRequest {
            question: String::new(),
            expected: String::new(),
            answer: String::new(),
        };
        render(&self.policy, &probe)?;
        Ok(())
    }

    pub async fn evaluate(&self, request: &VerifyRequest) -> Result<Verdict> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("evaluate", %run_id, policy = %self.policy.kind());
        self.evaluate_inner(request).instrument(span).await
    }

    async fn evaluate_inner(&self, request: &VerifyRequest) -> Result<Verdict> {
        let messages = render(&self.policy, request)?;

        let response_format = match self.policy.output_kind() {
            OutputKind::Json { .. } => Some(ResponseFormat::JsonObject),
            OutputKind::RawScalar => None,
        };
        let options = CallOptions {
            temperature: Some(self.policy.temperature()),
            response_format,
            ..Default::default()
        };

        let result = tokio::time::timeout(self.timeout, self.model.generate(&messages, &options))
            .await
            .map_err(|_| ModelError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        let raw = result.message.content();
        match coerce(raw, &self.policy) {
            Ok(verdict) => {
                tracing::debug!(?verdict, "evaluation complete");
                Ok(verdict)
            }
            Err(err) => {
                // The raw text goes to the log only; response bodies must
                // not echo prompt content.
                tracing::error!(raw = err.raw(), error = %err, "model output failed coercion");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::sync::Mutex;

    use arbiter_core::error::{ArbiterError, CoerceError};
    use arbiter_core::message::Message;
    use arbiter_core::model::ChatResult;

    use crate::policy::PolicyKind;

    /// Stub model that records the call and returns a canned response.
    struct StubModel {
        response: String,
        received: Mutex<Vec<(Vec<Message>, CallOptions)>>,
    }

    impl StubModel {
        fn new(response: impl Into<String>) -> Self {
            Self {
                response: response.into(),
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for StubModel {
        async fn generate(
            &self,
            messages: &[Message],
            options: &CallOptions,
        ) -> Result<ChatResult> {
            self.received
                .lock()
                .unwrap()
                .push((messages.to_vec(), options.clone()));
            Ok(ChatResult {
                message: Message::ai(self.response.clone()),
            })
        }

        fn model_name(&self) -> &str {
            "stub-model"
        }
    }

    fn request() -> VerifyRequest {
        VerifyRequest {
            question: "What is 2+2?".into(),
            expected: "4".into(),
            answer: "four".into(),
        }
    }

    fn service(kind: PolicyKind, response: &str) -> (EvaluationService, Arc<StubModel>) {
        let model = Arc::new(StubModel::new(response));
        let service = EvaluationService::new(
            model.clone(),
            Policy::new(kind),
            Duration::from_secs(5),
        );
        (service, model)
    }

    #[tokio::test]
    async fn binary_evaluation_succeeds() {
        let (service, _) = service(PolicyKind::Binary, r#"{"verdict": 1}"#);
        let verdict = service.evaluate(&request()).await.unwrap();
        assert_eq!(verdict, Verdict::Binary(1));
    }

    #[tokio::test]
    async fn model_receives_policy_temperature_and_format() {
        let (service, model) = service(PolicyKind::Binary, r#"{"verdict": 0}"#);
        service.evaluate(&request()).await.unwrap();

        let calls = model.received.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (messages, options) = &calls[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(options.temperature, Some(0.0));
        assert_eq!(options.response_format, Some(ResponseFormat::JsonObject));
    }

    #[tokio::test]
    async fn continuous_policy_asks_for_plain_text() {
        let (service, model) = service(PolicyKind::Continuous, "0.9");
        let verdict = service.evaluate(&request()).await.unwrap();
        assert_eq!(verdict, Verdict::Continuous(0.9));

        let calls = model.received.lock().unwrap();
        let (_, options) = &calls[0];
        assert_eq!(options.temperature, Some(0.8));
        assert!(options.response_format.is_none());
    }

    #[tokio::test]
    async fn malformed_output_is_a_typed_failure() {
        let (service, _) = service(PolicyKind::Continuous, "abc");
        let err = service.evaluate(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            ArbiterError::Coerce(CoerceError::NotANumber { .. })
        ));
    }

    /// Every policy coerces cleanly when the model follows its own format
    /// instruction to the letter.
    #[tokio::test]
    async fn compliant_output_round_trips_for_every_policy() {
        for (kind, compliant, expected) in [
            (PolicyKind::Binary, r#"{"verdict": 1}"#, Verdict::Binary(1)),
            (PolicyKind::TenScale, r#"{"score": 8}"#, Verdict::Score(8)),
            (PolicyKind::Continuous, "0.75", Verdict::Continuous(0.75)),
        ] {
            let (service, _) = service(kind, compliant);
            assert_eq!(service.evaluate(&request()).await.unwrap(), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_model_call_times_out() {
        struct SlowModel;

        #[async_trait]
        impl ChatModel for SlowModel {
            async fn generate(
                &self,
                _messages: &[Message],
                _options: &CallOptions,
            ) -> Result<ChatResult> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ChatResult {
                    message: Message::ai("too late"),
                })
            }

            fn model_name(&self) -> &str {
                "slow-model"
            }
        }

        let service = EvaluationService::new(
            Arc::new(SlowModel),
            Policy::new(PolicyKind::Binary),
            Duration::from_secs(30),
        );
        let err = service.evaluate(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            ArbiterError::Model(ModelError::Timeout { secs: 30 })
        ));
    }

    #[test]
    fn validate_passes_for_every_policy() {
        for kind in [
            PolicyKind::Binary,
            PolicyKind::TenScale,
            PolicyKind::Continuous,
        ] {
            let service = EvaluationService::new(
                Arc::new(StubModel::new("")),
                Policy::new(kind),
                Duration::from_secs(1),
            );
            assert!(service.validate().is_ok());
        }
    }
}
