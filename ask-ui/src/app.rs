use crate::bridge::{self, Navigator, Services, SessionSignals};
use crate::components::{AskPanel, Header, Login, Signup, SimulationView, TeamDashboard};
use ask_core::routes::{resolve, GateDecision, Route};
use futures::future::{AbortHandle, Abortable};
use leptos::*;
use wasm_bindgen_futures::spawn_local;

#[component]
pub fn App() -> impl IntoView {
    match bridge::build_services() {
        Ok(services) => view! { <Shell services=services/> }.into_view(),
        Err(err) => {
            tracing::error!(error = %err, "cannot start");
            view! {
              <div class="config-error">
                <h2>"Configuration error"</h2>
                <pre>{err.to_string()}</pre>
              </div>
            }
            .into_view()
        }
    }
}

#[component]
fn Shell(services: Services) -> impl IntoView {
    let signals = SessionSignals::new();
    let nav = Navigator::new();
    provide_context(services.clone());
    provide_context(signals);
    provide_context(nav);

    // Subscribe before the first read so no transition slips between them.
    let store = services.sessions.clone();
    let events = store.subscribe();
    let (abort, registration) = AbortHandle::new_pair();
    let listener = async move {
        match store.initialize().await {
            Ok(change) => tracing::debug!(?change, "initial session"),
            Err(err) => tracing::warn!(error = %err, "could not read initial session"),
        }
        signals.sync(&store);
        signals.ready.set(true);
        store.run(events, |_| signals.sync(&store)).await;
    };
    spawn_local(async move {
        if Abortable::new(listener, registration).await.is_err() {
            tracing::debug!("session listener stopped");
        }
    });
    on_cleanup(move || abort.abort());

    let popstate = window_event_listener(ev::popstate, move |_| {
        nav.path.set(bridge::current_path());
    });
    on_cleanup(move || popstate.remove());

    let decision = create_memo(move |_| {
        nav.path
            .with(|path| signals.session.with(|session| resolve(path, session.as_ref())))
    });

    create_effect(move |_| {
        if !signals.ready.get() {
            return;
        }
        if let GateDecision::Redirect(route) = decision.get() {
            tracing::debug!(to = route.path(), "redirecting");
            nav.replace(route);
        }
    });

    view! {
      <Show when=move || signals.ready.get() fallback=|| ()>
        <Header/>
        <main class="content">
          {move || match decision.get() {
              GateDecision::Render(route) => page(route),
              GateDecision::Redirect(_) => ().into_view(),
          }}
        </main>
      </Show>
    }
}

fn page(route: Route) -> View {
    match route {
        Route::Login => view! { <Login/> }.into_view(),
        Route::Signup => view! { <Signup/> }.into_view(),
        Route::Simulation => view! { <SimulationView/> }.into_view(),
        Route::Ask => view! { <TeamDashboard/> }.into_view(),
        Route::Backend => view! { <AskPanel/> }.into_view(),
    }
}
