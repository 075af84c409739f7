//! Question/answer state for the ask views.
//!
//! A [`Conversation`] is a small state machine: `begin_submit` moves it from
//! idle to submitting and hands back an [`AskTicket`]; the caller sends the
//! ticket to an [`AskBackend`](crate::api::AskBackend) and feeds the result to
//! `settle`. While a ticket is outstanding further submits are refused, so the
//! transcript always pairs each user turn with the turn that answers it.

use crate::answer::AnswerPayload;
use crate::error::ClientError;
use crate::team::Team;
use serde::{Deserialize, Serialize};

pub const DASHBOARD_FAILURE: &str = "Failed to fetch answer.";
pub const PANEL_FAILURE: &str = "Failed to fetch answer from server";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Answer to the newest question. `None` while it is pending or if it
    /// failed; older answers never stand in for it.
    pub fn latest_answer(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .take_while(|t| t.role != Role::User)
            .find(|t| t.role == Role::Assistant)
            .map(|t| t.content.as_str())
    }

    fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    fn clear(&mut self) {
        self.turns.clear();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Variant {
    /// One panel scoped to the caller's own team (if known). Failures show a banner.
    SingleTeam { team: Option<String> },
    /// Tabbed view; failures become system turns.
    Dashboard { active: Team },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Submitting,
}

/// One outstanding `/ask` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AskTicket {
    pub question: String,
    pub team_id: Option<String>,
    epoch: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    variant: Variant,
    transcript: Transcript,
    draft: String,
    state: RequestState,
    error: Option<String>,
    epoch: u64,
}

impl Conversation {
    pub fn single_team(team: Option<String>) -> Self {
        Self::new(Variant::SingleTeam { team })
    }

    pub fn dashboard() -> Self {
        Self::new(Variant::Dashboard {
            active: Team::ALL[0],
        })
    }

    fn new(variant: Variant) -> Self {
        Self {
            variant,
            transcript: Transcript::default(),
            draft: String::new(),
            state: RequestState::Idle,
            error: None,
            epoch: 0,
        }
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == RequestState::Submitting
    }

    /// Banner text for the single-team panel.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn active_team(&self) -> Option<Team> {
        match self.variant {
            Variant::Dashboard { active } => Some(active),
            Variant::SingleTeam { .. } => None,
        }
    }

    pub fn team_id(&self) -> Option<&str> {
        match &self.variant {
            Variant::SingleTeam { team } => team.as_deref(),
            Variant::Dashboard { active } => Some(active.id()),
        }
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Sets the team a single-team panel asks on behalf of, once the
    /// profile has resolved. Ignored by the dashboard.
    pub fn set_own_team(&mut self, team: Option<String>) {
        if let Variant::SingleTeam { team: current } = &mut self.variant {
            *current = team;
        }
    }

    /// Switches the dashboard tab. The transcript belongs to the old tab and
    /// is dropped, as is the answer to any request still in flight.
    pub fn select_team(&mut self, team: Team) {
        if let Variant::Dashboard { active } = &mut self.variant {
            *active = team;
            self.transcript.clear();
            self.epoch += 1;
        }
    }

    pub fn can_submit(&self) -> bool {
        self.state == RequestState::Idle && !self.draft.trim().is_empty()
    }

    pub fn begin_submit(&mut self) -> Option<AskTicket> {
        if !self.can_submit() {
            return None;
        }

        let question = std::mem::take(&mut self.draft);
        self.transcript.push(Turn::new(Role::User, question.clone()));
        self.state = RequestState::Submitting;
        self.error = None;

        Some(AskTicket {
            question,
            team_id: self.team_id().map(ToString::to_string),
            epoch: self.epoch,
        })
    }

    pub fn settle(&mut self, ticket: AskTicket, result: Result<AnswerPayload, ClientError>) {
        self.state = RequestState::Idle;
        if ticket.epoch != self.epoch {
            tracing::debug!("dropping answer for a cleared transcript");
            return;
        }

        match result {
            Ok(payload) => self
                .transcript
                .push(Turn::new(Role::Assistant, payload.into_text())),
            Err(err) => {
                tracing::warn!(error = %err, "ask failed");
                match self.variant {
                    Variant::Dashboard { .. } => {
                        self.transcript.push(Turn::new(Role::System, DASHBOARD_FAILURE))
                    }
                    Variant::SingleTeam { .. } => self.error = Some(PANEL_FAILURE.into()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AskBackend;
    use async_trait::async_trait;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::FutureExt;
    use serde_json::json;
    use std::cell::RefCell;

    fn asked(conv: &mut Conversation, text: &str) -> AskTicket {
        conv.set_draft(text);
        conv.begin_submit().expect("ticket")
    }

    #[test]
    fn submit_appends_user_turn_and_blocks_until_settled() {
        let mut conv = Conversation::dashboard();
        let ticket = asked(&mut conv, "status of db-01?");

        assert!(conv.is_submitting());
        assert_eq!(conv.draft(), "");
        assert_eq!(conv.transcript().turns(), &[Turn::new(Role::User, "status of db-01?")]);

        conv.set_draft("another one");
        assert!(conv.begin_submit().is_none());
        assert_eq!(conv.transcript().len(), 1);

        conv.settle(ticket, Ok(AnswerPayload::from_value(json!({"answer": "healthy"}))));
        assert_eq!(conv.state(), RequestState::Idle);
        assert_eq!(conv.transcript().latest_answer(), Some("healthy"));
        assert!(conv.begin_submit().is_some());
    }

    #[test]
    fn blank_drafts_are_ignored() {
        let mut conv = Conversation::single_team(None);
        conv.set_draft("   \n");
        assert!(!conv.can_submit());
        assert!(conv.begin_submit().is_none());
        assert_eq!(conv.state(), RequestState::Idle);
        assert!(conv.transcript().is_empty());
    }

    #[test]
    fn answer_shapes_flow_into_the_transcript() {
        let mut conv = Conversation::dashboard();
        for (body, expected) in [
            (json!({"answer": "X"}), "X"),
            (json!("Y"), "Y"),
            (json!({"output": "Z"}), "Z"),
            (json!({}), "{}"),
        ] {
            let ticket = asked(&mut conv, "q");
            conv.settle(ticket, Ok(AnswerPayload::from_value(body)));
            assert_eq!(conv.transcript().last().map(|t| t.content.as_str()), Some(expected));
        }
    }

    #[test]
    fn dashboard_failure_appends_system_turn() {
        let mut conv = Conversation::dashboard();
        let ticket = asked(&mut conv, "q");
        conv.settle(ticket, Err(ClientError::server(500, "Server error")));

        assert_eq!(conv.transcript().last(), Some(&Turn::new(Role::System, DASHBOARD_FAILURE)));
        assert_eq!(conv.error(), None);
        assert!(!conv.is_submitting());
    }

    #[test]
    fn panel_failure_sets_banner_and_next_submit_clears_it() {
        let mut conv = Conversation::single_team(Some("ops".into()));
        let ticket = asked(&mut conv, "q");
        conv.settle(ticket, Err(ClientError::Transport("connection refused".into())));

        assert_eq!(conv.error(), Some(PANEL_FAILURE));
        assert_eq!(conv.transcript().len(), 1);

        asked(&mut conv, "again");
        assert_eq!(conv.error(), None);
    }

    #[test]
    fn panel_failure_hides_previous_answer() {
        let mut conv = Conversation::single_team(Some("ops".into()));
        let first = asked(&mut conv, "q1");
        conv.settle(first, Ok(AnswerPayload::Text("old answer".into())));
        assert_eq!(conv.transcript().latest_answer(), Some("old answer"));

        let second = asked(&mut conv, "q2");
        assert_eq!(conv.transcript().latest_answer(), None);
        conv.settle(second, Err(ClientError::Transport("connection refused".into())));

        assert_eq!(conv.error(), Some(PANEL_FAILURE));
        assert_eq!(conv.transcript().latest_answer(), None);
    }

    #[test]
    fn switching_team_clears_transcript_mid_conversation() {
        let mut conv = Conversation::dashboard();
        let first = asked(&mut conv, "q1");
        conv.settle(first, Ok(AnswerPayload::Text("a1".into())));
        let pending = asked(&mut conv, "q2");
        assert_eq!(pending.team_id.as_deref(), Some("operations"));

        conv.select_team(Team::Security);
        assert!(conv.transcript().is_empty());
        assert_eq!(conv.active_team(), Some(Team::Security));

        conv.settle(pending, Ok(AnswerPayload::Text("late".into())));
        assert!(conv.transcript().is_empty());
        assert_eq!(conv.state(), RequestState::Idle);

        let next = asked(&mut conv, "q3");
        assert_eq!(next.team_id.as_deref(), Some("security"));
    }

    #[test]
    fn single_team_panel_asks_for_own_team() {
        let mut conv = Conversation::single_team(None);
        assert_eq!(asked(&mut conv, "q").team_id, None);

        let mut conv = Conversation::single_team(None);
        conv.set_own_team(Some("devops".into()));
        conv.select_team(Team::Support);
        assert_eq!(asked(&mut conv, "q").team_id.as_deref(), Some("devops"));
    }

    struct GatedBackend {
        calls: RefCell<Vec<(String, Option<String>)>>,
        reply: RefCell<Option<oneshot::Receiver<serde_json::Value>>>,
    }

    #[async_trait(?Send)]
    impl AskBackend for GatedBackend {
        async fn ask(
            &self,
            question: &str,
            team_id: Option<&str>,
        ) -> Result<AnswerPayload, ClientError> {
            self.calls
                .borrow_mut()
                .push((question.to_string(), team_id.map(ToString::to_string)));
            let rx = self.reply.borrow_mut().take().expect("one call");
            let body = rx.await.map_err(|e| ClientError::Transport(e.to_string()))?;
            Ok(AnswerPayload::from_value(body))
        }
    }

    #[test]
    fn devops_user_asks_whats_down() {
        let (tx, rx) = oneshot::channel();
        let backend = GatedBackend {
            calls: RefCell::new(Vec::new()),
            reply: RefCell::new(Some(rx)),
        };
        let mut conv = Conversation::single_team(Some("devops".into()));

        conv.set_draft("What's down?");
        assert!(conv.can_submit());
        let ticket = conv.begin_submit().expect("ticket");
        assert_eq!(conv.transcript().turns(), &[Turn::new(Role::User, "What's down?")]);

        let mut in_flight = Box::pin(backend.ask(&ticket.question, ticket.team_id.as_deref()));
        assert!(in_flight.as_mut().now_or_never().is_none());
        assert!(conv.is_submitting());
        conv.set_draft("still there?");
        assert!(!conv.can_submit());

        tx.send(json!({"answer": "nothing"})).expect("send");
        let result = block_on(in_flight);
        conv.settle(ticket, result);

        assert!(!conv.is_submitting());
        assert_eq!(
            conv.transcript().turns(),
            &[
                Turn::new(Role::User, "What's down?"),
                Turn::new(Role::Assistant, "nothing"),
            ]
        );
        assert_eq!(
            backend.calls.borrow().as_slice(),
            &[("What's down?".to_string(), Some("devops".to_string()))]
        );
    }
}
