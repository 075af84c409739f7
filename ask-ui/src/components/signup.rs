use crate::bridge::{Navigator, Services, SessionSignals};
use ask_core::auth_flow::{sign_up, SignupForm, SignupOutcome, ACCOUNT_CREATED};
use ask_core::routes::Route;
use ask_core::team::SignupTeam;
use leptos::*;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;

const LOGGED_IN_REDIRECT: Duration = Duration::from_millis(1000);
const NEEDS_LOGIN_REDIRECT: Duration = Duration::from_millis(2000);

#[component]
pub fn Signup() -> impl IntoView {
    let services = expect_context::<Services>();
    let signals = expect_context::<SessionSignals>();
    let nav = expect_context::<Navigator>();

    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let team = create_rw_signal(SignupTeam::default());
    let loading = create_rw_signal(false);
    let error = create_rw_signal(None::<String>);
    let success = create_rw_signal(None::<String>);

    let services = store_value(services);
    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        loading.set(true);
        error.set(None);
        success.set(None);

        let Services {
            sessions, backend, ..
        } = services.get_value();
        let form = SignupForm {
            email: email.get_untracked(),
            password: password.get_untracked(),
            team: team.get_untracked(),
        };
        spawn_local(async move {
            match sign_up(&backend, sessions.identity().as_ref(), &form).await {
                Ok(SignupOutcome::LoggedIn { next }) => {
                    success.set(Some(ACCOUNT_CREATED.into()));
                    if let Err(err) = sessions.initialize().await {
                        tracing::warn!(error = %err, "session read after signup failed");
                    }
                    signals.sync(&sessions);
                    set_timeout(move || nav.go(next), LOGGED_IN_REDIRECT);
                }
                Ok(SignupOutcome::NeedsLogin { message, next }) => {
                    success.set(Some(ACCOUNT_CREATED.into()));
                    error.set(Some(message));
                    set_timeout(move || nav.go(next), NEEDS_LOGIN_REDIRECT);
                }
                Err(err) => error.set(Some(err.to_string())),
            }
            loading.set(false);
        });
    };

    view! {
      <div class="login-container">
        <div class="login-card">
          <div class="login-header">
            <h2>"Create Account"</h2>
            <p>"Join Real-Time RAG"</p>
          </div>
          <Show when=move || error.with(Option::is_some) fallback=|| ()>
            <div class="error-message">{move || error.get().unwrap_or_default()}</div>
          </Show>
          <Show when=move || success.with(Option::is_some) fallback=|| ()>
            <div class="success-message">{move || success.get().unwrap_or_default()}</div>
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
                placeholder="At least 6 characters"
                required
                prop:value=move || password.get()
                on:input=move |ev| password.set(event_target_value(&ev))
              />
            </div>
            <div class="form-group">
              <label for="team">"Select Team"</label>
              <select
                id="team"
                class="input-field"
                on:change=move |ev| {
                    if let Some(choice) = SignupTeam::from_id(&event_target_value(&ev)) {
                        team.set(choice);
                    }
                }
              >
                {SignupTeam::ALL
                    .into_iter()
                    .map(|choice| {
                        view! {
                          <option value=choice.id() selected=move || team.get() == choice>
                            {choice.label()}
                          </option>
                        }
                    })
                    .collect_view()}
              </select>
            </div>
            <button type="submit" class="btn-primary" disabled=move || loading.get()>
              {move || if loading.get() { "Creating Account..." } else { "Sign Up" }}
            </button>
          </form>
          <p class="login-footer">
            "Already have an account? "
            <a href=Route::Login.path() on:click=move |ev| {
                ev.prevent_default();
                nav.go(Route::Login);
            }>"Log in"</a>
          </p>
        </div>
      </div>
    }
}
