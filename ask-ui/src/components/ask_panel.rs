use crate::bridge::{Services, SessionSignals};
use ask_core::api::AskBackend;
use ask_core::conversation::Conversation;
use leptos::*;
use wasm_bindgen_futures::spawn_local;

/// Single question box scoped to the caller's own team.
#[component]
pub fn AskPanel() -> impl IntoView {
    let services = expect_context::<Services>();
    let signals = expect_context::<SessionSignals>();

    let conversation = create_rw_signal(Conversation::single_team(
        signals.team.with_untracked(|t| t.team_id().map(ToString::to_string)),
    ));
    create_effect(move |_| {
        let team = signals.team.with(|t| t.team_id().map(ToString::to_string));
        conversation.update(|c| c.set_own_team(team));
    });

    let backend = store_value(services.backend);
    let ask = move |_| {
        let Some(ticket) = conversation.try_update(Conversation::begin_submit).flatten() else {
            return;
        };
        let client = backend.get_value();
        spawn_local(async move {
            let result = client.ask(&ticket.question, ticket.team_id.as_deref()).await;
            let _ = conversation.try_update(|c| c.settle(ticket, result));
        });
    };

    view! {
      <div class="ask-panel">
        <textarea
          placeholder="Ask about live issues, delays, alerts..."
          prop:value=move || conversation.with(|c| c.draft().to_string())
          on:input=move |ev| conversation.update(|c| c.set_draft(event_target_value(&ev)))
        />
        <button on:click=ask disabled=move || conversation.with(Conversation::is_submitting)>
          {move || if conversation.with(Conversation::is_submitting) { "Thinking..." } else { "Ask" }}
        </button>
        {move || conversation.with(|c| c.error().map(|e| view! { <div class="error">{e.to_string()}</div> }))}
        {move || {
            conversation.with(|c| {
                if c.is_submitting() {
                    return None;
                }
                c.transcript().latest_answer().map(|answer| {
                    view! {
                      <div class="answer-box">
                        <strong>"Answer"</strong>
                        <p>{answer.to_string()}</p>
                      </div>
                    }
                })
            })
        }}
      </div>
    }
}
