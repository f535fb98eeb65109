//! Integration tests for the session pool.

use porter_session::*;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

struct TestPrincipal {
    save: bool,
    login: bool,
    multi_login: bool,
}

impl Principal for TestPrincipal {
    fn id(&self) -> String {
        format!(
            "CanLogin:{}; AllowMultiLogin:{}; SaveSession:{}",
            self.login, self.multi_login, self.save
        )
    }

    fn can_login(&self) -> bool {
        self.login
    }

    fn allow_multi_login(&self) -> bool {
        self.multi_login
    }

    fn save_session(&self) -> bool {
        self.save
    }
}

fn principal(save: bool, multi_login: bool) -> Arc<TestPrincipal> {
    Arc::new(TestPrincipal {
        save,
        login: true,
        multi_login,
    })
}

fn pool(multi_login: MultiLogin) -> SessionPool {
    SessionPool::new(
        SessionConfig::new(Duration::from_secs(10), Duration::from_secs(5))
            .with_multi_login(multi_login),
    )
}

fn ids(sessions: &[Arc<Session>]) -> HashSet<SessionIdentifier> {
    sessions.iter().map(|s| s.id().clone()).collect()
}

#[test]
fn test_token_uniqueness() {
    let tokens: HashSet<String> = (0..20_000).map(|_| new_token()).collect();
    assert_eq!(tokens.len(), 20_000);
}

#[test]
fn test_remove_twice() {
    let pool = pool(MultiLogin::FailNew);
    let session = pool.start_session(principal(true, true), "remote1").unwrap();

    assert_eq!(pool.remove_session_by_id(session.id()), Ok(()));
    assert_eq!(
        pool.remove_session_by_id(session.id()),
        Err(SessionError::NotFound)
    );
    assert!(pool.is_empty());
}

#[test]
fn test_unknown_identifier() {
    let pool = pool(MultiLogin::FailNew);
    let id = SessionIdentifier::new("sid", "ssid", "remote1");

    assert_eq!(pool.get_session(&id).unwrap_err(), SessionError::NotFound);
    assert_eq!(pool.stop_session(&id), Err(SessionError::NotFound));
}

#[test]
fn test_identifier_must_match_address() {
    let pool = pool(MultiLogin::FailNew);
    let session = pool.start_session(principal(true, true), "remote1").unwrap();
    let forged = SessionIdentifier::new(session.id().sid(), session.id().ssid(), "remote2");

    assert_eq!(pool.get_session(&forged).unwrap_err(), SessionError::NotFound);
    assert!(pool.get_session(session.id()).is_ok());
}

#[test]
fn test_fail_new() {
    let pool = pool(MultiLogin::FailNew);
    let p = principal(true, true);

    let first = pool.start_session(p.clone(), "remote1").unwrap();
    let second = pool.start_session(p.clone(), "remote2");

    assert_eq!(second.unwrap_err(), SessionError::AlreadyStarted);
    let sessions = pool.get_all_sessions(p.as_ref());
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id(), first.id());
}

#[test]
fn test_expire_current() {
    let pool = pool(MultiLogin::ExpireCurrent);
    let p = principal(true, false);

    let first = pool.start_session(p.clone(), "remote1").unwrap();
    let second = pool.start_session(p.clone(), "remote2").unwrap();

    let sessions = pool.get_all_sessions(p.as_ref());
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id(), second.id());
    assert_eq!(
        pool.get_session(first.id()).unwrap_err(),
        SessionError::NotFound
    );
}

#[test]
fn test_allow_new() {
    let pool = pool(MultiLogin::AllowNew);
    let p = principal(true, true);

    pool.start_session(p.clone(), "remote1").unwrap();
    pool.start_session(p.clone(), "remote2").unwrap();

    assert_eq!(pool.get_all_sessions(p.as_ref()).len(), 2);
}

#[test]
fn test_allow_new_requires_multi_login() {
    let pool = pool(MultiLogin::AllowNew);
    let p = principal(true, false);

    pool.start_session(p.clone(), "remote1").unwrap();
    assert_eq!(
        pool.start_session(p.clone(), "remote1").unwrap_err(),
        SessionError::AlreadyStarted
    );
    assert_eq!(pool.get_all_sessions(p.as_ref()).len(), 1);
}

#[test]
fn test_allow_new_from_same_address() {
    let pool = pool(MultiLogin::AllowNewFromSameAddress);
    let p = principal(true, true);

    let a = pool.start_session(p.clone(), "addr1").unwrap();
    let b = pool.start_session(p.clone(), "addr2").unwrap();
    let c = pool.start_session(p.clone(), "addr2").unwrap();

    let sessions = pool.get_all_sessions(p.as_ref());
    assert_eq!(sessions.len(), 2);
    assert_eq!(
        ids(&sessions),
        [b.id().clone(), c.id().clone()].into_iter().collect()
    );
    assert!(a.is_closed());
    assert!(sessions.iter().all(|s| s.remote_address() == "addr2"));
}

#[test]
fn test_allow_new_from_same_address_requires_multi_login() {
    let pool = pool(MultiLogin::AllowNewFromSameAddress);
    let p = principal(true, false);

    pool.start_session(p.clone(), "remote1").unwrap();
    assert_eq!(
        pool.start_session(p.clone(), "remote2").unwrap_err(),
        SessionError::AlreadyStarted
    );
}

#[test]
fn test_principals_are_isolated() {
    let pool = pool(MultiLogin::FailNew);
    let saving = principal(true, true);
    let idle = principal(false, true);

    pool.start_session(saving.clone(), "remote1").unwrap();
    pool.start_session(idle.clone(), "remote1").unwrap();

    assert_eq!(pool.get_all_sessions(saving.as_ref()).len(), 1);
    assert_eq!(pool.get_all_sessions(idle.as_ref()).len(), 1);
    assert_eq!(pool.principal_count(), 2);
}

#[test]
fn test_timeout_without_activity() {
    let pool = SessionPool::new(
        SessionConfig::new(Duration::from_millis(2000), Duration::from_millis(400))
            .with_multi_login(MultiLogin::AllowNew),
    );
    let session = pool.start_session(principal(false, true), "remote1").unwrap();

    assert!(pool.get_session(session.id()).is_ok());
    thread::sleep(Duration::from_millis(600));
    assert_eq!(
        pool.get_session(session.id()).unwrap_err(),
        SessionError::Expired
    );
}

#[test]
fn test_activity_cannot_outlive_expiration() {
    let pool = SessionPool::new(
        SessionConfig::new(Duration::from_millis(2000), Duration::from_millis(500))
            .with_multi_login(MultiLogin::AllowNew),
    );
    let started = Instant::now();
    let session = pool.start_session(principal(false, true), "remote1").unwrap();

    // Well past three timeout windows, kept alive by lookups.
    while started.elapsed() < Duration::from_millis(1700) {
        thread::sleep(Duration::from_millis(150));
        assert!(pool.get_session(session.id()).is_ok());
    }

    while started.elapsed() < Duration::from_millis(2100) {
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(session.state(pool.config()), SessionState::HardExpired);
    assert_eq!(
        pool.get_session(session.id()).unwrap_err(),
        SessionError::Expired
    );
}

#[test]
fn test_saved_session_survives_idle_period() {
    let pool = SessionPool::new(
        SessionConfig::new(Duration::from_millis(2000), Duration::from_millis(200))
            .with_multi_login(MultiLogin::AllowNew),
    );
    let session = pool.start_session(principal(true, true), "remote1").unwrap();

    thread::sleep(Duration::from_millis(400));
    assert!(pool.get_session(session.id()).is_ok());
}

#[test]
fn test_force_expire_applies_timeout_to_saved_session() {
    let pool = SessionPool::new(
        SessionConfig::new(Duration::from_millis(2000), Duration::from_millis(200))
            .with_multi_login(MultiLogin::AllowNew)
            .with_force_expire(true),
    );
    let session = pool.start_session(principal(true, true), "remote1").unwrap();

    thread::sleep(Duration::from_millis(400));
    assert_eq!(
        pool.get_session(session.id()).unwrap_err(),
        SessionError::Expired
    );
}

#[test]
fn test_concurrent_logins_fail_new() {
    let pool = pool(MultiLogin::FailNew);
    let p = principal(true, true);
    let barrier = Barrier::new(100);

    let results: Vec<SessionResult<Arc<Session>>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..100)
            .map(|_| {
                let p = p.clone();
                let pool = &pool;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    pool.start_session(p, "remote1")
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let started = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(SessionError::AlreadyStarted)))
        .count();

    assert_eq!(started, 1);
    assert_eq!(rejected, 99);
    assert_eq!(pool.get_all_sessions(p.as_ref()).len(), 1);
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_concurrent_lookups_and_removals() {
    let pool = pool(MultiLogin::AllowNew);
    let p = principal(true, true);
    let sessions: Vec<Arc<Session>> = (0..64)
        .map(|i| pool.start_session(p.clone(), &format!("remote{i}")).unwrap())
        .collect();

    thread::scope(|scope| {
        for chunk in sessions.chunks(8) {
            let pool = &pool;
            scope.spawn(move || {
                for session in chunk {
                    assert!(pool.get_session(session.id()).is_ok());
                    pool.remove_session(session);
                    pool.remove_session(session);
                    assert_eq!(
                        pool.get_session(session.id()).unwrap_err(),
                        SessionError::NotFound
                    );
                }
            });
        }
    });

    assert!(pool.is_empty());
    assert_eq!(pool.principal_count(), 0);
    assert!(pool.get_all_sessions(p.as_ref()).is_empty());
}

#[test]
fn test_identifier_survives_serialization() {
    let pool = pool(MultiLogin::FailNew);
    let session = pool.start_session(principal(true, true), "remote1").unwrap();

    let cookie = serde_json::to_string(session.id()).unwrap();
    let restored: SessionIdentifier = serde_json::from_str(&cookie).unwrap();

    assert_eq!(pool.get_session(&restored).unwrap().id(), session.id());
}
