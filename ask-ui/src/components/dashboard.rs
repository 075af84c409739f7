use crate::bridge::Services;
use ask_core::api::AskBackend;
use ask_core::conversation::{Conversation, Role};
use ask_core::team::Team;
use leptos::*;
use wasm_bindgen_futures::spawn_local;

fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "message user",
        Role::Assistant => "message assistant",
        Role::System => "message system",
    }
}

/// Tabbed chat, one transcript at a time; switching tabs starts over.
#[component]
pub fn TeamDashboard() -> impl IntoView {
    let services = expect_context::<Services>();
    let conversation = create_rw_signal(Conversation::dashboard());
    let active = Signal::derive(move || conversation.with(|c| c.active_team().unwrap_or(Team::Operations)));
    let submitting = Signal::derive(move || conversation.with(Conversation::is_submitting));

    let backend = store_value(services.backend);
    let ask = move || {
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
      <div class="team-dashboard">
        <div class="tabs">
          {Team::ALL
              .into_iter()
              .map(|team| {
                  view! {
                    <button
                      class=move || if active.get() == team { "tab active" } else { "tab" }
                      on:click=move |_| conversation.update(|c| c.select_team(team))
                    >
                      {team.label()}
                    </button>
                  }
              })
              .collect_view()}
        </div>
        <div class="tab-content chat-container">
          <h2>{move || format!("{} Chatbot", active.get().label())}</h2>
          <div class="chat-history">
            <Show when=move || conversation.with(|c| c.transcript().is_empty()) fallback=|| ()>
              <div class="empty-state">"Ask a question to start the conversation..."</div>
            </Show>
            <For
              each=move || conversation.with(|c| c.transcript().turns().iter().cloned().enumerate().collect::<Vec<_>>())
              key=|(idx, turn)| (*idx, turn.content.clone())
              children=move |(_, turn)| view! {
                <div class=role_class(turn.role)>
                  <div class="message-content">{turn.content}</div>
                </div>
              }
            />
            <Show when=move || submitting.get() fallback=|| ()>
              <div class="message assistant"><div class="message-content">"Thinking..."</div></div>
            </Show>
          </div>
          <div class="chat-input-area">
            <textarea
              placeholder=move || format!("Ask the {} chatbot...", active.get().id())
              prop:value=move || conversation.with(|c| c.draft().to_string())
              on:input=move |ev| conversation.update(|c| c.set_draft(event_target_value(&ev)))
              on:keydown=move |ev: ev::KeyboardEvent| {
                  if ev.key() == "Enter" && !ev.shift_key() {
                      ev.prevent_default();
                      ask();
                  }
              }
            />
            <button on:click=move |_| ask() disabled=move || submitting.get()>"Send"</button>
          </div>
        </div>
      </div>
    }
}
