use crate::bridge::{Navigator, Services, SessionSignals};
use ask_core::auth_flow::log_in;
use ask_core::routes::Route;
use leptos::*;
use wasm_bindgen_futures::spawn_local;

#[component]
pub fn Login() -> impl IntoView {
    let services = expect_context::<Services>();
    let signals = expect_context::<SessionSignals>();
    let nav = expect_context::<Navigator>();

    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let loading = create_rw_signal(false);
    let error = create_rw_signal(None::<String>);

    let sessions = store_value(services.sessions);
    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        loading.set(true);
        error.set(None);

        let store = sessions.get_value();
        let (address, secret) = (email.get_untracked(), password.get_untracked());
        spawn_local(async move {
            match log_in(store.identity().as_ref(), &address, &secret).await {
                Ok(next) => {
                    if let Err(err) = store.initialize().await {
                        tracing::warn!(error = %err, "session read after login failed");
                    }
                    signals.sync(&store);
                    loading.set(false);
                    nav.go(next);
                }
                Err(err) => {
                    error.set(Some(err.to_string()));
                    loading.set(false);
                }
            }
        });
    };

    view! {
      <div class="login-container">
        <div class="login-card">
          <div class="login-header">
            <h2>"Welcome Back"</h2>
            <p>"Sign in to Real-Time RAG"</p>
          </div>
          <Show when=move || error.with(Option::is_some) fallback=|| ()>
            <div class="error-message">{move || error.get().unwrap_or_default()}</div>
          </Show>
          <form on:submit=submit>
            <div class="form-group">
              <label for="email">"Email Address"</label>
              <input
                id="email"
                type="email"
                class="input-field"
                placeholder="you@example.com"
                required
                prop:value=move || email.get()
                on:input=move |ev| email.set(event_target_value(&ev))
              />
            </div>
            <div class="form-group">
              <label for="password">"Password"</label>
              <input
                id="password"
                type="password"
                class="input-field"
                required
                prop:value=move || password.get()
                on:input=move |ev| password.set(event_target_value(&ev))
              />
            </div>
            <button type="submit" class="btn-primary" disabled=move || loading.get()>
              {move || if loading.get() { "Signing in..." } else { "Sign In" }}
            </button>
          </form>
          <p class="login-footer">
            "Don't have an account? "
            <a href=Route::Signup.path() on:click=move |ev| {
                ev.prevent_default();
                nav.go(Route::Signup);
            }>"Sign up"</a>
          </p>
        </div>
      </div>
    }
}
