//! Integration tests for porter-auth

use porter_auth::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
struct InvalidCredentials;

impl fmt::Display for InvalidCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid credentials")
    }
}

impl std::error::Error for InvalidCredentials {}

struct User {
    name: &'static str,
    active: bool,
    multi: bool,
}

impl Principal for User {
    fn id(&self) -> String {
        self.name.to_string()
    }
    fn can_login(&self) -> bool {
        self.active
    }
    fn allow_multi_login(&self) -> bool {
        self.multi
    }
    fn save_session(&self) -> bool {
        false
    }
}

/// Stand-in for an HTTP request/response pair.
#[derive(Default)]
struct Request {
    form: HashMap<&'static str, &'static str>,
    peer: &'static str,
    cookie: Option<String>,
}

impl Request {
    fn login(user: &'static str, password: &'static str, peer: &'static str) -> Self {
        let mut form = HashMap::new();
        form.insert("user", user);
        form.insert("password", password);
        Self {
            form,
            peer,
            cookie: None,
        }
    }
}

fn check_credentials(req: &Request) -> Result<LoginGrant, BoxError> {
    let user = match (req.form.get("user"), req.form.get("password")) {
        (Some(&"alice"), Some(&"wonderland")) => User {
            name: "alice",
            active: true,
            multi: false,
        },
        (Some(&"bob"), Some(&"builder")) => User {
            name: "bob",
            active: true,
            multi: true,
        },
        (Some(&"mallory"), Some(_)) => User {
            name: "mallory",
            active: false,
            multi: false,
        },
        _ => return Err(Box::new(InvalidCredentials)),
    };
    Ok(LoginGrant::new(Arc::new(user), req.peer))
}

fn read_cookie(req: &Request) -> Option<SessionIdentifier> {
    req.cookie
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
}

fn write_cookie(req: &mut Request, session: &Session) {
    req.cookie = serde_json::to_string(session.id()).ok();
}

fn security(multi_login: MultiLogin) -> Security<Request> {
    let session = SessionConfig::new(Duration::from_secs(3600), Duration::from_secs(600))
        .with_multi_login(multi_login);
    Security::new(
        SecurityConfig::new(session)
            .with_login_filter(check_credentials)
            .with_authentication_filter(read_cookie)
            .with_success_handler(write_cookie),
    )
}

#[test]
fn test_login_then_authenticate() {
    let security = security(MultiLogin::FailNew);
    let mut req = Request::login("alice", "wonderland", "10.0.0.1");

    let session = security.login(&mut req).unwrap();
    assert!(req.cookie.is_some());
    assert_eq!(session.principal_id(), "alice");
    assert_eq!(session.remote_address(), "10.0.0.1");

    let next = Request {
        cookie: req.cookie.clone(),
        ..Default::default()
    };
    let current = security.authenticate(&next).unwrap();
    assert!(Arc::ptr_eq(&current, &session));
}

#[test]
fn test_bad_credentials_pass_through() {
    let security = security(MultiLogin::FailNew);
    let mut req = Request::login("alice", "guess", "10.0.0.1");

    let err = security.login(&mut req).unwrap_err();
    match err {
        AuthError::Delegate(inner) => assert!(inner.downcast_ref::<InvalidCredentials>().is_some()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(req.cookie.is_none());
    assert!(security.pool().is_empty());
}

#[test]
fn test_disabled_principal_cannot_login() {
    let security = security(MultiLogin::AllowNew);
    let mut req = Request::login("mallory", "anything", "10.0.0.9");

    let err = security.login(&mut req).unwrap_err();
    assert!(matches!(err, AuthError::CannotLoginPrincipal));
    assert_eq!(err.kind(), "CannotLoginPrincipal");
    assert!(security.pool().is_empty());
}

#[test]
fn test_missing_filters() {
    let security: Security<Request> = Security::new(SecurityConfig::default());

    let err = security
        .login(&mut Request::login("alice", "wonderland", ""))
        .unwrap_err();
    assert!(matches!(err, AuthError::LoginFilterNotImplemented));

    let err = security.authenticate(&Request::default()).unwrap_err();
    assert!(matches!(err, AuthError::AuthenticationFilterNotImplemented));
}

#[test]
fn test_success_handler_is_optional() {
    let session = SessionConfig::default();
    let security = Security::new(
        SecurityConfig::new(session)
            .with_login_filter(check_credentials)
            .with_authentication_filter(read_cookie),
    );
    let mut req = Request::login("alice", "wonderland", "10.0.0.1");

    let session = security.login(&mut req).unwrap();
    assert!(req.cookie.is_none());
    assert!(security.pool().get_session(session.id()).is_ok());
}

#[test]
fn test_unknown_cookie_is_not_found() {
    let security = security(MultiLogin::FailNew);
    let forged = SessionIdentifier::generate("10.0.0.1");
    let req = Request {
        cookie: serde_json::to_string(&forged).ok(),
        ..Default::default()
    };

    let err = security.authenticate(&req).unwrap_err();
    assert_eq!(err.session_error(), Some(&SessionError::NotFound));
}

#[test]
fn test_end_current_session() {
    let security = security(MultiLogin::FailNew);
    let mut req = Request::login("alice", "wonderland", "10.0.0.1");
    security.login(&mut req).unwrap();

    security.end_current_session(&req).unwrap();
    assert!(security.pool().is_empty());

    let err = security.end_current_session(&req).unwrap_err();
    assert_eq!(err.kind(), "SessionNotFound");

    // logging in again is allowed once the old session is gone
    let mut again = Request::login("alice", "wonderland", "10.0.0.1");
    assert!(security.login(&mut again).is_ok());
}

#[test]
fn test_fail_new_through_facade() {
    let security = security(MultiLogin::FailNew);

    let mut first = Request::login("alice", "wonderland", "10.0.0.1");
    security.login(&mut first).unwrap();

    let mut second = Request::login("alice", "wonderland", "10.0.0.2");
    let err = security.login(&mut second).unwrap_err();
    assert_eq!(err.session_error(), Some(&SessionError::AlreadyStarted));
    assert!(second.cookie.is_none());
}

#[test]
fn test_allow_new_with_multi_login_principal() {
    let security = security(MultiLogin::AllowNew);

    let mut first = Request::login("bob", "builder", "10.0.0.1");
    let mut second = Request::login("bob", "builder", "10.0.0.2");
    security.login(&mut first).unwrap();
    security.login(&mut second).unwrap();

    let bob = User {
        name: "bob",
        active: true,
        multi: true,
    };
    assert_eq!(security.sessions(&bob).len(), 2);
    assert!(security.authenticate(&first).is_ok());
    assert!(security.authenticate(&second).is_ok());

    assert_eq!(security.end_all_sessions(&bob), 2);
    assert!(security.sessions(&bob).is_empty());
}

#[test]
fn test_rejections_reach_log_sink() {
    let lines = Arc::new(Mutex::new(Vec::<String>::new()));
    let captured = lines.clone();
    let session = SessionConfig::default()
        .with_log_sink(move |line: &str| captured.lock().unwrap().push(line.to_string()));
    let security = Security::new(
        SecurityConfig::new(session)
            .with_login_filter(check_credentials)
            .with_authentication_filter(read_cookie),
    );

    let mut req = Request::login("mallory", "x", "10.0.0.9");
    assert!(security.login(&mut req).is_err());

    let lines = lines.lock().unwrap();
    assert!(lines.iter().any(|l| l.contains("mallory")));
}

#[test]
fn test_error_display() {
    assert_eq!(AuthError::CannotLoginPrincipal.to_string(), "Cannot login principal");
    let err: AuthError = SessionError::Expired.into();
    assert_eq!(err.kind(), "SessionExpired");
}
