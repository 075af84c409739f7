use crate::bridge::{self, Services, SessionSignals};
use ask_core::api::IssueBackend;
use ask_core::simulation::{catalog, CustomIssueForm, IssueKind, Scenario, Severity, SimulationLog};
use leptos::*;
use wasm_bindgen_futures::spawn_local;

#[component]
pub fn SimulationView() -> impl IntoView {
    let services = expect_context::<Services>();
    let signals = expect_context::<SessionSignals>();

    let log = create_rw_signal(SimulationLog::default());
    let form = create_rw_signal(CustomIssueForm::default());
    let form_error = create_rw_signal(None::<String>);
    let busy = Signal::derive(move || log.with(SimulationLog::is_busy));

    let Services {
        sessions, backend, ..
    } = services;
    let sessions = store_value(sessions);
    let backend = store_value(backend);

    let trigger = move |scenario: Scenario| {
        let session = sessions.with_value(|s| s.session());
        let Some(pending) = log
            .try_update(|l| l.begin(&scenario, session.as_ref()))
            .flatten()
        else {
            return;
        };
        let client = backend.get_value();
        spawn_local(async move {
            let result = client.log_issue(&pending.payload).await;
            let _ = log.try_update(|l| l.complete(pending, result));
        });
    };

    let submit_custom = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        match form.with_untracked(CustomIssueForm::to_scenario) {
            Ok(scenario) => {
                form_error.set(None);
                form.set(CustomIssueForm::default());
                trigger(scenario);
            }
            Err(err) => form_error.set(Some(err.to_string())),
        }
    };

    view! {
      <div class="simulation">
        <div class="simulation-header">
          <h2>"🛠️ Incident Simulation"</h2>
          <p>
            "Simulate automated events from external tools. These incidents will be "
            "ingested by the RAG system and tagged with your current team."
          </p>
          <div class="team-badge">"Current Team: " <strong>{move || signals.team.get().to_string()}</strong></div>
        </div>

        <div class="scenario-grid">
          {catalog()
              .into_iter()
              .map(|scenario| {
                  let style = format!("background-color: {}", scenario.color);
                  let label = scenario.label.clone();
                  view! {
                    <button
                      class="scenario"
                      class:busy=move || busy.get()
                      style=style
                      on:click=move |_| trigger(scenario.clone())
                    >
                      <span>{label}</span>
                    </button>
                  }
              })
              .collect_view()}
        </div>

        <div class="custom-issue">
          <h3>"✍️ Log Custom Issue"</h3>
          <p>
            "Type a human-readable description. The system will automatically format it "
            "as a structured JSON incident for your team."
          </p>
          <form on:submit=submit_custom>
            <textarea
              required
              placeholder="e.g., 'The payment API is returning 500 errors intermittently.'"
              prop:value=move || form.with(|f| f.text.clone())
              on:input=move |ev| form.update(|f| f.text = event_target_value(&ev))
            />
            <div class="row">
              <select on:change=move |ev| {
                  if let Some(kind) = IssueKind::from_id(&event_target_value(&ev)) {
                      form.update(|f| f.kind = kind);
                  }
              }>
                {IssueKind::ALL
                    .into_iter()
                    .map(|kind| view! {
                      <option value=kind.id() selected=move || form.with(|f| f.kind == kind)>{kind.label()}</option>
                    })
                    .collect_view()}
              </select>
              <select on:change=move |ev| {
                  if let Some(severity) = Severity::from_id(&event_target_value(&ev)) {
                      form.update(|f| f.severity = severity);
                  }
              }>
                {Severity::ALL
                    .into_iter()
                    .map(|severity| view! {
                      <option value=severity.id() selected=move || form.with(|f| f.severity == severity)>
                        {severity.label()}
                      </option>
                    })
                    .collect_view()}
              </select>
            </div>
            <Show when=move || form_error.with(Option::is_some) fallback=|| ()>
              <div class="error">{move || form_error.get().unwrap_or_default()}</div>
            </Show>
            <button type="submit" class="btn-primary">
              {move || if busy.get() { "Logging Issue..." } else { "Log Issue" }}
            </button>
          </form>
        </div>

        <div class="event-log">
          <h3>"Live Event Log"</h3>
          {move || {
              log.with(|l| {
                  if l.entries().is_empty() {
                      return view! { <p class="empty-state">"No events triggered yet."</p> }.into_view();
                  }
                  view! {
                    <ul>
                      {l.entries()
                          .iter()
                          .map(|entry| {
                              let time = bridge::local_time(entry.timestamp.timestamp_millis());
                              view! {
                                <li class:error=entry.is_error() class:ok=!entry.is_error()>
                                  <span class="meta">{format!("[{time}] ")}</span>
                                  <strong>{entry.message.clone()}</strong>
                                  {entry.detail().map(|d| view! { <div class="meta">{d.to_string()}</div> })}
                                </li>
                              }
                          })
                          .collect_view()}
                    </ul>
                  }
                  .into_view()
              })
          }}
        </div>
      </div>
    }
}
