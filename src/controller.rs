//! Exchange controller: one request/response cycle per submitted question
//!
//! A cycle is split in two halves so the host can overlap them:
//!
//! - [`ExchangeController::begin`] runs synchronously: echo the question,
//!   clear the input, show the typing indicator.
//! - [`ExchangeController::settle`] runs when the request finishes: hide
//!   the indicator and render the answer (or the unreachable message).
//!
//! [`ExchangeController::submit`] chains both around the request for hosts
//! that simply await each cycle.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use crate::config::{ExchangeConfig, OverlapPolicy};
use crate::error::ExchangeError;
use crate::message::Message;
use crate::render::{Handle, Renderer};
use crate::service::AnswerService;

/// The text entry the user types questions into
pub trait InputField {
    fn set_value(&mut self, value: &str);
    fn clear(&mut self);
    fn focus(&mut self);
}

/// A begun cycle, waiting for its request to settle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    generation: u64,
    question: String,
}

impl Cycle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn question(&self) -> &str {
        &self.question
    }
}

/// How a settled cycle ended up in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Answered,
    Failed,
    /// Superseded by a newer cycle and dropped under `OverlapPolicy::LatestOnly`
    Discarded,
    /// The cycle was not in flight (already settled or never begun)
    Unknown,
}

/// Orchestrates cycles between the input field, renderer and answer service
pub struct ExchangeController<S, R, I> {
    service: Arc<S>,
    renderer: R,
    input: I,
    config: ExchangeConfig,
    typing: Option<Handle>,
    latest_generation: u64,
    in_flight: BTreeSet<u64>,
}

impl<S, R, I> ExchangeController<S, R, I>
where
    S: AnswerService + 'static,
    R: Renderer,
    I: InputField,
{
    pub fn new(service: Arc<S>, renderer: R, input: I, config: ExchangeConfig) -> Self {
        Self {
            service,
            renderer,
            input,
            config,
            typing: None,
            latest_generation: 0,
            in_flight: BTreeSet::new(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Whether any cycle is awaiting its response
    pub fn is_awaiting(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Submit a question and wait for its cycle to settle.
    ///
    /// Whitespace-only input is ignored without rendering or requesting.
    pub async fn submit(&mut self, raw_input: &str) -> Option<Settled> {
        let cycle = self.begin(raw_input)?;
        let outcome = self.request(&cycle).await;
        Some(self.settle(cycle, outcome))
    }

    /// Synchronous half of a cycle. Returns `None` for empty input.
    pub fn begin(&mut self, raw_input: &str) -> Option<Cycle> {
        let question = raw_input.trim();
        if question.is_empty() {
            return None;
        }

        self.renderer.render(Message::user(question));
        self.input.clear();
        self.typing = Some(self.renderer.show_typing());

        self.latest_generation += 1;
        let generation = self.latest_generation;
        self.in_flight.insert(generation);
        tracing::info!(generation, in_flight = self.in_flight.len(), "cycle started");

        Some(Cycle {
            generation,
            question: question.to_string(),
        })
    }

    /// The request for a begun cycle, detached from the controller so the
    /// host can spawn it
    pub fn request(
        &self,
        cycle: &Cycle,
    ) -> impl Future<Output = Result<String, ExchangeError>> + Send + 'static {
        let service = Arc::clone(&self.service);
        let question = cycle.question.clone();
        async move { service.ask(&question).await }
    }

    /// Completion half of a cycle
    pub fn settle(&mut self, cycle: Cycle, outcome: Result<String, ExchangeError>) -> Settled {
        let generation = cycle.generation;
        if !self.in_flight.remove(&generation) {
            tracing::warn!(generation, "settle for a cycle that is not in flight");
            return Settled::Unknown;
        }

        let stale = generation < self.latest_generation;
        if stale && self.config.overlap_policy == OverlapPolicy::LatestOnly {
            tracing::debug!(
                generation,
                latest = self.latest_generation,
                "discarding superseded answer"
            );
            if self.in_flight.is_empty() {
                self.hide_typing();
            }
            return Settled::Discarded;
        }

        let (text, settled) = match outcome {
            Ok(answer) => {
                tracing::info!(generation, "cycle answered");
                (answer, Settled::Answered)
            }
            Err(e) => {
                tracing::warn!(generation, kind = e.kind(), "cycle failed: {}", e);
                (self.config.unreachable_message.clone(), Settled::Failed)
            }
        };

        // The indicator goes before the answer; other pending cycles get it back below
        self.hide_typing();
        self.renderer.render(Message::bot(text));
        if !self.in_flight.is_empty() {
            self.typing = Some(self.renderer.show_typing());
        }

        settled
    }

    fn hide_typing(&mut self) {
        if let Some(handle) = self.typing.take() {
            self.renderer.hide_typing(handle);
        }
    }

    /// Put a suggested question into the input field
    pub fn suggest(&mut self, text: &str) {
        self.input.set_value(text);
        self.input.focus();
    }

    /// Probe the service root once; render a warning if it is unreachable
    pub async fn check_liveness(&mut self) -> bool {
        let outcome = self.liveness_probe().await;
        self.on_liveness(outcome)
    }

    /// The liveness request, detached so the host can spawn it
    pub fn liveness_probe(
        &self,
    ) -> impl Future<Output = Result<String, ExchangeError>> + Send + 'static {
        let service = Arc::clone(&self.service);
        async move { service.ping().await }
    }

    /// Apply a liveness result. Returns whether the service is up.
    pub fn on_liveness(&mut self, outcome: Result<String, ExchangeError>) -> bool {
        match outcome {
            Ok(body) => {
                tracing::info!(body = %body.trim(), "backend is running");
                true
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), "backend is NOT running: {}", e);
                self.renderer
                    .render(Message::bot(self.config.offline_message.clone()));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;
    use crate::render::{Conversation, Entry};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Everything observable, in the order it happened
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Render(Sender, String),
        ShowTyping,
        HideTyping,
        Call(String),
        ClearInput,
    }

    type Log = Arc<Mutex<Vec<Op>>>;

    struct ScriptedService {
        log: Log,
        replies: Mutex<VecDeque<Result<String, ExchangeError>>>,
        ping: Mutex<Option<Result<String, ExchangeError>>>,
    }

    impl ScriptedService {
        fn new(log: Log, replies: Vec<Result<String, ExchangeError>>) -> Self {
            Self {
                log,
                replies: Mutex::new(replies.into()),
                ping: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|op| matches!(op, Op::Call(_)))
                .count()
        }
    }

    #[async_trait]
    impl AnswerService for ScriptedService {
        async fn ask(&self, question: &str) -> Result<String, ExchangeError> {
            self.log.lock().unwrap().push(Op::Call(question.to_string()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ExchangeError::Status(599)))
        }

        async fn ping(&self) -> Result<String, ExchangeError> {
            self.ping
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok("running".to_string()))
        }
    }

    /// Conversation that also records each call into the shared log
    struct RecordingRenderer {
        log: Log,
        inner: Conversation,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, message: Message) -> Handle {
            self.log
                .lock()
                .unwrap()
                .push(Op::Render(message.sender(), message.text().to_string()));
            self.inner.render(message)
        }

        fn show_typing(&mut self) -> Handle {
            self.log.lock().unwrap().push(Op::ShowTyping);
            self.inner.show_typing()
        }

        fn hide_typing(&mut self, handle: Handle) {
            self.log.lock().unwrap().push(Op::HideTyping);
            self.inner.hide_typing(handle)
        }
    }

    #[derive(Default)]
    struct TestInput {
        log: Option<Log>,
        value: String,
        focused: bool,
    }

    impl InputField for TestInput {
        fn set_value(&mut self, value: &str) {
            self.value = value.to_string();
        }

        fn clear(&mut self) {
            self.value.clear();
            if let Some(ref log) = self.log {
                log.lock().unwrap().push(Op::ClearInput);
            }
        }

        fn focus(&mut self) {
            self.focused = true;
        }
    }

    type TestController = ExchangeController<ScriptedService, RecordingRenderer, TestInput>;

    fn controller(
        replies: Vec<Result<String, ExchangeError>>,
        policy: OverlapPolicy,
    ) -> (TestController, Arc<ScriptedService>, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let service = Arc::new(ScriptedService::new(log.clone(), replies));
        let renderer = RecordingRenderer {
            log: log.clone(),
            inner: Conversation::new(),
        };
        let input = TestInput {
            log: Some(log.clone()),
            ..Default::default()
        };
        let config = ExchangeConfig {
            unreachable_message: "backend unreachable".to_string(),
            offline_message: "backend offline".to_string(),
            overlap_policy: policy,
        };
        (
            ExchangeController::new(service.clone(), renderer, input, config),
            service,
            log,
        )
    }

    fn transcript(ctrl: &TestController) -> Vec<(Sender, String)> {
        ctrl.renderer()
            .inner
            .messages()
            .map(|m| (m.sender(), m.text().to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_whitespace_submit_is_silent() {
        for input in ["", " ", "\t\n  "] {
            let (mut ctrl, service, log) = controller(vec![], OverlapPolicy::KeepAll);
            assert_eq!(ctrl.submit(input).await, None);
            assert!(ctrl.renderer().inner.is_empty());
            assert_eq!(service.calls(), 0);
            assert!(log.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_successful_cycle_order() {
        let (mut ctrl, _service, log) =
            controller(vec![Ok("4".to_string())], OverlapPolicy::KeepAll);

        let settled = ctrl.submit("  2+2?  ").await;
        assert_eq!(settled, Some(Settled::Answered));

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Op::Render(Sender::User, "2+2?".to_string()),
                Op::ClearInput,
                Op::ShowTyping,
                Op::Call("2+2?".to_string()),
                Op::HideTyping,
                Op::Render(Sender::Bot, "4".to_string()),
            ]
        );
        assert_eq!(
            transcript(&ctrl),
            vec![
                (Sender::User, "2+2?".to_string()),
                (Sender::Bot, "4".to_string()),
            ]
        );
        assert!(!ctrl.renderer().inner.is_typing());
        assert!(!ctrl.is_awaiting());
    }

    #[tokio::test]
    async fn test_http_failure_renders_unreachable_message() {
        let (mut ctrl, _service, _log) =
            controller(vec![Err(ExchangeError::Status(500))], OverlapPolicy::KeepAll);

        assert_eq!(ctrl.submit("ping").await, Some(Settled::Failed));
        assert_eq!(
            transcript(&ctrl),
            vec![
                (Sender::User, "ping".to_string()),
                (Sender::Bot, "backend unreachable".to_string()),
            ]
        );
        assert!(!ctrl.renderer().inner.is_typing());
    }

    #[tokio::test]
    async fn test_decode_failure_renders_unreachable_message() {
        let (mut ctrl, _service, _log) = controller(
            vec![Err(ExchangeError::Decode("bad body".to_string()))],
            OverlapPolicy::KeepAll,
        );

        ctrl.submit("why?").await;
        assert_eq!(ctrl.renderer().inner.last().unwrap().text(), "backend unreachable");
    }

    #[tokio::test]
    async fn test_can_submit_again_after_failure() {
        let (mut ctrl, service, _log) = controller(
            vec![Err(ExchangeError::Status(502)), Ok("fine now".to_string())],
            OverlapPolicy::KeepAll,
        );

        ctrl.submit("first").await;
        ctrl.submit("second").await;

        assert_eq!(service.calls(), 2);
        assert_eq!(ctrl.renderer().inner.last().unwrap().text(), "fine now");
    }

    #[test]
    fn test_suggest_fills_and_focuses_input() {
        let (mut ctrl, service, _log) = controller(vec![], OverlapPolicy::KeepAll);
        ctrl.suggest("hello");

        assert_eq!(ctrl.input().value, "hello");
        assert!(ctrl.input().focused);
        assert!(ctrl.renderer().inner.is_empty());
        assert_eq!(service.calls(), 0);
    }

    #[test]
    fn test_overlapping_cycles_keep_all() {
        let (mut ctrl, _service, _log) = controller(vec![], OverlapPolicy::KeepAll);

        let a = ctrl.begin("first").unwrap();
        let b = ctrl.begin("second").unwrap();
        assert!(a.generation() < b.generation());
        assert_eq!(ctrl.in_flight(), 2);

        // Only one indicator while both are pending
        let typing = ctrl
            .renderer()
            .inner
            .entries()
            .iter()
            .filter(|e| matches!(e, Entry::Typing { .. }))
            .count();
        assert_eq!(typing, 1);

        // A settles first: its answer renders, the indicator stays for B
        assert_eq!(ctrl.settle(a, Ok("answer a".to_string())), Settled::Answered);
        assert!(ctrl.renderer().inner.is_typing());
        assert!(matches!(
            ctrl.renderer().inner.entries().last(),
            Some(Entry::Typing { .. })
        ));

        assert_eq!(ctrl.settle(b, Ok("answer b".to_string())), Settled::Answered);
        assert!(!ctrl.renderer().inner.is_typing());
        assert_eq!(
            transcript(&ctrl),
            vec![
                (Sender::User, "first".to_string()),
                (Sender::User, "second".to_string()),
                (Sender::Bot, "answer a".to_string()),
                (Sender::Bot, "answer b".to_string()),
            ]
        );
    }

    #[test]
    fn test_overlapping_cycles_latest_only_discards_stale() {
        let (mut ctrl, _service, _log) = controller(vec![], OverlapPolicy::LatestOnly);

        let a = ctrl.begin("first").unwrap();
        let b = ctrl.begin("second").unwrap();

        // Newer cycle settles first, then the stale one arrives late
        assert_eq!(ctrl.settle(b, Ok("answer b".to_string())), Settled::Answered);
        assert!(ctrl.renderer().inner.is_typing());
        assert_eq!(ctrl.settle(a, Ok("answer a".to_string())), Settled::Discarded);

        assert!(!ctrl.renderer().inner.is_typing());
        assert_eq!(ctrl.renderer().inner.last().unwrap().text(), "answer b");
        assert_eq!(ctrl.renderer().inner.len(), 3);
    }

    #[test]
    fn test_settle_twice_is_ignored() {
        let (mut ctrl, _service, _log) = controller(vec![], OverlapPolicy::KeepAll);

        let cycle = ctrl.begin("once").unwrap();
        assert_eq!(ctrl.settle(cycle.clone(), Ok("a".to_string())), Settled::Answered);
        assert_eq!(ctrl.settle(cycle, Ok("b".to_string())), Settled::Unknown);
        assert_eq!(ctrl.renderer().inner.len(), 2);
    }

    #[tokio::test]
    async fn test_liveness_failure_renders_warning() {
        let (mut ctrl, service, _log) = controller(vec![], OverlapPolicy::KeepAll);
        *service.ping.lock().unwrap() = Some(Err(ExchangeError::Status(503)));

        assert!(!ctrl.check_liveness().await);
        assert_eq!(
            transcript(&ctrl),
            vec![(Sender::Bot, "backend offline".to_string())]
        );

        // A failed probe doesn't block sending
        assert!(ctrl.begin("still works").is_some());
    }

    #[tokio::test]
    async fn test_liveness_success_renders_nothing() {
        let (mut ctrl, _service, _log) = controller(vec![], OverlapPolicy::KeepAll);
        assert!(ctrl.check_liveness().await);
        assert!(ctrl.renderer().inner.is_empty());
    }
}
