use crate::headers::{COMBINED_MESSAGE_TYPE, MESSAGE_TYPE};
use crate::model::{CombinedModel, Headers, QueueMessage};
use crate::result::{ForwardError, ForwardResult};
use crate::{Forwarder, MessageProducer, PolicyEvaluator};
use error_stack::{Report, ResultExt};
use serde_json::Value;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Which view of a combined message is submitted to the policy agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolicySubject {
    #[default]
    Combined,
    Content,
}

impl FromStr for PolicySubject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(Self::Combined),
            "content" => Ok(Self::Content),
            other => Err(format!("unknown policy subject {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilteringForwarder<P, E> {
    producer: P,
    policy: E,
    supported_types: HashSet<String>,
    subject: PolicySubject,
}

impl<P, E> FilteringForwarder<P, E> {
    pub fn new<T>(producer: P, policy: E, supported_types: T, subject: PolicySubject) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            producer,
            policy,
            supported_types: supported_types.into_iter().map(Into::into).collect(),
            subject,
        }
    }

    fn admit(&self, message: &CombinedModel) -> ForwardResult<()> {
        let Some(content) = &message.content else {
            return Ok(());
        };

        let content_type = content.content_type();
        if self.supported_types.contains(content_type) {
            Ok(())
        } else {
            Err(Report::new(ForwardError::InvalidContentType(
                content_type.to_string(),
            )))
        }
    }

    fn policy_input(&self, message: &CombinedModel) -> ForwardResult<Value> {
        match self.subject {
            PolicySubject::Combined => {
                serde_json::to_value(message).change_context(ForwardError::Serialize)
            }
            PolicySubject::Content => Ok(message
                .content
                .clone()
                .map(|c| c.into_value())
                .unwrap_or_else(|| Value::Object(Default::default()))),
        }
    }
}

impl<P, E> Forwarder for FilteringForwarder<P, E>
where
    P: MessageProducer,
    E: PolicyEvaluator,
{
    #[instrument(skip_all, name = "forwarder#filter_and_forward", fields(uuid = %message.uuid))]
    async fn filter_and_forward(
        &self,
        headers: &mut Headers,
        message: &CombinedModel,
    ) -> ForwardResult<()> {
        self.admit(message)?;

        let input = self.policy_input(message)?;
        let decision = self
            .policy
            .evaluate(input)
            .await
            .change_context(ForwardError::PolicyEvaluation)?;
        if decision.skip {
            return Err(Report::new(ForwardError::PolicySkip(
                decision.joined_reasons(),
            )));
        }

        let body = serde_json::to_string(message).change_context(ForwardError::Serialize)?;
        headers.insert(MESSAGE_TYPE.to_string(), COMBINED_MESSAGE_TYPE.to_string());

        debug!("sending combined message");
        self.producer
            .send(QueueMessage::new(headers.clone(), body))
            .await
            .change_context(ForwardError::Send)
    }
}
