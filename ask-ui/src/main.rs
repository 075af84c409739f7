mod app;
mod bridge;
mod components;
mod logging;

fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    leptos::mount_to_body(app::App);
}
