use crate::api::RegistrationBackend;
use crate::dto::RegisterRequest;
use crate::error::ClientError;
use crate::routes::Route;
use crate::session::IdentityProvider;
use crate::team::SignupTeam;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const AUTO_LOGIN_FAILED: &str =
    "Account created, but auto-login failed. Please log in manually.";
pub const ACCOUNT_CREATED: &str = "Account created successfully! Logging you in...";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub team: SignupTeam,
}

impl SignupForm {
    pub fn validate(&self) -> Result<RegisterRequest, ClientError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ClientError::Validation("Email is required".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(RegisterRequest {
            email: email.to_string(),
            password: self.password.clone(),
            team: self.team.id().to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Registered and signed in.
    LoggedIn { next: Route },
    /// Registered, but the follow-up sign-in failed.
    NeedsLogin { message: String, next: Route },
}

/// Registers through the backend, then signs in with the same credentials.
pub async fn sign_up(
    backend: &impl RegistrationBackend,
    identity: &dyn IdentityProvider,
    form: &SignupForm,
) -> Result<SignupOutcome, ClientError> {
    let request = form.validate()?;
    backend.register(&request).await?;
    tracing::info!(email = %request.email, "account registered");

    match identity
        .sign_in_with_password(&request.email, &request.password)
        .await
    {
        Ok(_) => Ok(SignupOutcome::LoggedIn { next: Route::Ask }),
        Err(err) => {
            tracing::warn!(error = %err, "auto-login after signup failed");
            Ok(SignupOutcome::NeedsLogin {
                message: AUTO_LOGIN_FAILED.into(),
                next: Route::Login,
            })
        }
    }
}

pub async fn log_in(
    identity: &dyn IdentityProvider,
    email: &str,
    password: &str,
) -> Result<Route, ClientError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ClientError::Validation("Email and password are required".into()));
    }
    identity.sign_in_with_password(email, password).await?;
    Ok(Route::Ask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::FakeIdentity;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeRegistry {
        requests: RefCell<Vec<RegisterRequest>>,
        reject_with: Option<String>,
    }

    #[async_trait(?Send)]
    impl RegistrationBackend for FakeRegistry {
        async fn register(&self, request: &RegisterRequest) -> Result<Value, ClientError> {
            self.requests.borrow_mut().push(request.clone());
            match &self.reject_with {
                Some(detail) => Err(ClientError::server(400, detail.clone())),
                None => Ok(json!({"status": "ok"})),
            }
        }
    }

    fn form(password: &str) -> SignupForm {
        SignupForm {
            email: " ana@example.com ".into(),
            password: password.into(),
            team: SignupTeam::DevOps,
        }
    }

    #[test]
    fn signup_registers_then_logs_in() {
        let backend = FakeRegistry::default();
        let identity = FakeIdentity::default();

        let outcome = block_on(sign_up(&backend, &identity, &form("hunter22"))).expect("signup");

        assert_eq!(outcome, SignupOutcome::LoggedIn { next: Route::Ask });
        assert_eq!(
            backend.requests.borrow().as_slice(),
            &[RegisterRequest {
                email: "ana@example.com".into(),
                password: "hunter22".into(),
                team: "devops".into(),
            }]
        );
        assert!(identity.session.borrow().is_some());
    }

    #[test]
    fn signup_reports_failed_auto_login() {
        let backend = FakeRegistry::default();
        let identity = FakeIdentity::default();

        let outcome = block_on(sign_up(&backend, &identity, &form("different"))).expect("signup");

        assert_eq!(
            outcome,
            SignupOutcome::NeedsLogin {
                message: AUTO_LOGIN_FAILED.into(),
                next: Route::Login,
            }
        );
    }

    #[test]
    fn signup_surfaces_backend_detail() {
        let backend = FakeRegistry {
            reject_with: Some("User already registered".into()),
            ..FakeRegistry::default()
        };
        let identity = FakeIdentity::default();

        let err = block_on(sign_up(&backend, &identity, &form("hunter22"))).expect_err("rejected");

        assert_eq!(err.to_string(), "User already registered");
        assert!(identity.session.borrow().is_none());
    }

    #[test]
    fn short_password_never_reaches_backend() {
        let backend = FakeRegistry::default();
        let identity = FakeIdentity::default();

        let err = block_on(sign_up(&backend, &identity, &form("abc"))).expect_err("short");

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(backend.requests.borrow().is_empty());
    }

    #[test]
    fn login_goes_to_ask_or_reports_provider_message() {
        let identity = FakeIdentity::default();
        assert_eq!(
            block_on(log_in(&identity, "ana@example.com", "hunter22")).expect("login"),
            Route::Ask
        );

        let err = block_on(log_in(&identity, "ana@example.com", "nope")).expect_err("bad password");
        assert_eq!(err.to_string(), "Invalid login credentials");

        let err = block_on(log_in(&identity, "  ", "x")).expect_err("blank");
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
