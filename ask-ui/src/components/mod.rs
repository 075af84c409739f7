mod ask_panel;
mod dashboard;
mod header;
mod login;
mod signup;
mod simulation;

pub use ask_panel::AskPanel;
pub use dashboard::TeamDashboard;
pub use header::Header;
pub use login::Login;
pub use signup::Signup;
pub use simulation::SimulationView;
