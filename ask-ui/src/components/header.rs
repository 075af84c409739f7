use crate::bridge::{Navigator, Services, SessionSignals};
use ask_core::routes::Route;
use leptos::*;
use wasm_bindgen_futures::spawn_local;

#[component]
pub fn Header() -> impl IntoView {
    let services = expect_context::<Services>();
    let signals = expect_context::<SessionSignals>();
    let nav = expect_context::<Navigator>();

    let sessions = store_value(services.sessions);
    let logout = move |_| {
        let store = sessions.get_value();
        spawn_local(async move {
            let next = store.logout().await;
            signals.sync(&store);
            nav.go(next);
        });
    };

    view! {
      <header class="header">
        <div class="header-title">"⚡ Real-Time RAG"</div>
        <Show when=move || signals.session.with(Option::is_some) fallback=|| ()>
          <div class="header-user">
            <button class="btn-nav" on:click=move |_| nav.go(Route::Simulation)>"🛠️ Simulate"</button>
            <span>
              {move || {
                  signals
                      .session
                      .with(|s| s.as_ref().and_then(|s| s.email.clone()))
                      .unwrap_or_default()
              }}
              {move || {
                  signals.team.with(|team| {
                      team.team_id().map(|name| view! { <strong class="team-name">{format!(" ({name})")}</strong> })
                  })
              }}
            </span>
            <button class="btn-logout" on:click=logout>"Logout"</button>
          </div>
        </Show>
      </header>
    }
}
