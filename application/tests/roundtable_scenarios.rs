//! End-to-end round scenarios driven through the session registry with a
//! scripted completion client.

use async_trait::async_trait;
use roundtable_application::{
    CompletionClient, CompletionError, CompletionOptions, ObservationFeed, RoundtableConfig,
    RunRoundtableUseCase, SessionRegistry,
};
use roundtable_domain::{
    FailureReason, Participant, PersonaRegistry, Personality, SessionId, SessionState, Turn,
    TurnBuilder,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Behaviour of the scripted provider for one participant
#[derive(Clone)]
enum Reply {
    Text(&'static str),
    Fail(CompletionError),
    Stall,
}

/// Answers by participant, recognised from the `Respond as {agent}` line
struct PanelClient {
    replies: HashMap<&'static str, Reply>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl PanelClient {
    fn new(replies: &[(&'static str, Reply)]) -> Self {
        Self {
            replies: replies.iter().cloned().collect(),
            delay: Duration::from_millis(10),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for PanelClient {
    async fn complete(
        &self,
        prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let agent = prompt
            .lines()
            .find_map(|l| l.strip_prefix("Respond as "))
            .and_then(|l| l.strip_suffix('.'))
            .and_then(|name| name.split('-').next())
            .unwrap_or_default()
            .to_string();
        self.calls.lock().unwrap().push(agent.clone());

        tokio::time::sleep(self.delay).await;
        match self.replies.get(agent.as_str()).cloned() {
            Some(Reply::Text(text)) => Ok(text.to_string()),
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::Stall) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Ok(format!("{} agrees.", agent)),
        }
    }
}

fn panel(ids: &[&str]) -> Arc<PersonaRegistry> {
    let defaults = PersonaRegistry::default_panel();
    Arc::new(
        PersonaRegistry::new(
            ids.iter()
                .map(|id| match defaults.get(id) {
                    Some(p) => p.clone(),
                    None => Participant::new(*id, *id, Personality::Neutral, "advisor"),
                })
                .collect(),
        )
        .unwrap(),
    )
}

fn registry(
    client: Arc<PanelClient>,
    personas: Arc<PersonaRegistry>,
    config: RoundtableConfig,
) -> SessionRegistry<PanelClient> {
    SessionRegistry::new(RunRoundtableUseCase::new(
        client,
        personas,
        Arc::new(ObservationFeed::new()),
        config,
    ))
}

fn assert_contiguous(turns: &[Turn]) {
    for (i, turn) in turns.iter().enumerate() {
        assert_eq!(turn.sequence_number(), i as u64);
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_cto_fails_round_after_two_turns() {
    let client = Arc::new(PanelClient::new(&[
        ("PM", Reply::Text("Focus on reliability.")),
        ("CTO", Reply::Stall),
    ]));
    let reg = registry(
        client.clone(),
        panel(&["PM", "CTO", "Investor"]),
        RoundtableConfig::default().with_timeout_seconds(30),
    );

    let id = reg.create_text("build a scheduling app").unwrap();
    let session = reg.wait(&id).await.unwrap();

    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.failure(), Some(&FailureReason::Timeout));

    let turns = reg.feed().read_all(Some(&id));
    assert_eq!(turns.len(), 2);
    assert_contiguous(&turns);
    assert_eq!(turns[0].speaker_id(), "User");
    assert_eq!(turns[0].output_text(), "Focus on reliability.");
    assert_eq!(turns[1].speaker_id(), "PM");
    assert_eq!(turns[1].input_text(), "Focus on reliability.");
    assert_eq!(turns[1].outcome().failure(), Some(&FailureReason::Timeout));

    // The investor is never asked
    assert_eq!(client.calls(), vec!["PM", "CTO"]);
}

#[tokio::test(start_paused = true)]
async fn single_participant_completes_after_one_turn() {
    let client = Arc::new(PanelClient::new(&[("PM", Reply::Text("Ship it."))]));
    let reg = registry(client, panel(&["PM"]), RoundtableConfig::default());

    let id = reg.create_text("build a scheduling app").unwrap();
    let session = reg.wait(&id).await.unwrap();

    assert_eq!(session.state(), SessionState::Completed);
    let turns = reg.feed().read_all(Some(&id));
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].output_text(), "Ship it.");
}

#[tokio::test(start_paused = true)]
async fn completed_round_has_one_turn_per_participant() {
    let client = Arc::new(PanelClient::new(&[]));
    let personas = Arc::new(PersonaRegistry::default_panel());
    let reg = registry(client, personas.clone(), RoundtableConfig::default());

    let id = reg.create_text("launch in Europe first?").unwrap();
    let session = reg.wait(&id).await.unwrap();

    assert_eq!(session.state(), SessionState::Completed);
    let turns = reg.feed().read_all(Some(&id));
    assert_eq!(turns.len(), session.participant_order().len());
    assert_eq!(turns.len(), personas.len());
    assert_contiguous(&turns);
    assert!(turns.iter().all(|t| t.is_ok()));
}

#[tokio::test(start_paused = true)]
async fn failure_at_step_k_leaves_k_ok_turns() {
    let ids = ["PM", "CTO", "Investor", "Marketer", "CEO"];
    for k in 0..ids.len() {
        let client = Arc::new(PanelClient::new(&[(
            ids[k],
            Reply::Fail(CompletionError::Upstream {
                status: 503,
                body: "unavailable".to_string(),
            }),
        )]));
        let reg = registry(client, panel(&ids), RoundtableConfig::default());

        let id = reg.create_text("topic").unwrap();
        let session = reg.wait(&id).await.unwrap();
        assert_eq!(session.state(), SessionState::Failed, "k = {}", k);

        let turns = reg.feed().read_all(Some(&id));
        assert_eq!(turns.len(), k + 1, "k = {}", k);
        assert_contiguous(&turns);
        assert!(turns[..k].iter().all(|t| t.is_ok()));
        assert!(!turns[k].is_ok());
    }
}

#[tokio::test(start_paused = true)]
async fn cancel_before_step_k_appends_nothing_from_k() {
    let client = Arc::new(PanelClient::new(&[]));
    let reg = registry(
        client,
        panel(&["PM", "CTO", "Investor", "Marketer"]),
        RoundtableConfig::default(),
    );

    let id = reg.create_text("topic").unwrap();
    // Each call takes 10ms; cancel during the third call
    tokio::time::sleep(Duration::from_millis(25)).await;
    reg.cancel(&id).unwrap();
    let k = reg.feed().read_all(Some(&id)).len();

    let session = reg.wait(&id).await.unwrap();
    assert_eq!(session.state(), SessionState::Cancelled);

    tokio::time::sleep(Duration::from_secs(5)).await;
    let turns = reg.feed().read_all(Some(&id));
    assert_eq!(turns.len(), k);
    assert!(turns.iter().all(|t| t.sequence_number() < k as u64));
    assert_contiguous(&turns);
}

#[tokio::test(start_paused = true)]
async fn concurrent_sessions_keep_independent_sequences() {
    let client = Arc::new(PanelClient::new(&[]));
    let reg = Arc::new(registry(
        client,
        panel(&["PM", "CTO", "Investor"]),
        RoundtableConfig::default().with_max_concurrent_sessions(3),
    ));

    let ids: Vec<SessionId> = (0..8)
        .map(|i| reg.create_text(&format!("topic {}", i)).unwrap())
        .collect();
    let sessions = futures::future::join_all(ids.iter().map(|id| reg.wait(id))).await;

    for (id, session) in ids.iter().zip(sessions) {
        assert_eq!(session.unwrap().state(), SessionState::Completed);
        let turns = reg.feed().read_all(Some(id));
        assert_eq!(turns.len(), 3);
        assert_contiguous(&turns);
        assert!(turns.iter().all(|t| t.session_id() == id));
    }
    assert_eq!(reg.feed().len(), 24);
    assert_eq!(reg.list().len(), 8);
}

#[test]
fn prompt_is_deterministic() {
    let personas = PersonaRegistry::default_panel();
    let cto = personas.get("CTO").unwrap();
    let constraints = RoundtableConfig::default().constraints;

    let a = TurnBuilder::build_prompt(cto, "PM", "Focus on reliability.", &constraints);
    let b = TurnBuilder::build_prompt(cto, "PM", "Focus on reliability.", &constraints);
    assert_eq!(a, b);
    assert!(a.contains("PM says: Focus on reliability."));
    assert!(a.contains("Respond as CTO-cautious."));
}
