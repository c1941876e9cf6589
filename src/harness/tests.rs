use crate::{
    harness::{
        config::HarnessConfig,
        report::{HarnessReport, Termination},
        spawner::StubHarness,
    },
    stub::error::StubError,
};

#[test]
fn validation() {
    let config = HarnessConfig::new("stub-delay").args(["--quiet"]);
    assert!(config.validate().is_ok());

    let config = HarnessConfig::new("");
    match config.validate() {
        Err(StubError::InvalidConfiguration(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    let config = HarnessConfig::new(" stub-delay");
    match config.validate() {
        Err(StubError::InvalidConfiguration(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    let config = HarnessConfig::new("stub-delay").args([""]);
    match config.validate() {
        Err(StubError::InvalidConfiguration(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    let config = HarnessConfig::new("stub-delay").env([("BAD=KEY", "v")]);
    match config.validate() {
        Err(StubError::InvalidConfiguration(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    let config = HarnessConfig::new("stub-delay").working_dir("/definitely/not/here");
    match config.validate() {
        Err(StubError::InvalidConfiguration(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    let config = HarnessConfig::new("stub-delay").timeout_ms(0);
    match config.validate() {
        Err(StubError::InvalidConfiguration(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    let config = HarnessConfig::new("stub-delay").timeout_ms(100);
    assert!(config.validate().is_ok());
}

#[test]
fn config_builder() {
    let config = HarnessConfig::new("php receive.php")
        .args(["--verbose"])
        .working_dir(env!("CARGO_MANIFEST_DIR"))
        .env([("APP_ENV", "test")])
        .timeout_ms(250);

    assert_eq!(config.command, "php receive.php");
    assert_eq!(config.args, Some(vec!["--verbose".to_string()]));
    assert_eq!(config.timeout_ms, Some(250));
    assert!(config.validate().is_ok());

    let (program, args) = config.program_and_args();
    assert_eq!(program, Some("php"));
    assert_eq!(args, vec!["receive.php", "--verbose"]);
}

#[test]
fn termination_classification() {
    assert!(!Termination::Exited(0).is_abnormal());
    assert!(!Termination::Exited(255).is_abnormal());
    assert!(Termination::Exited(-1073740791).is_abnormal());
    assert!(Termination::Signaled(6).is_abnormal());
    assert!(Termination::TimedOut.is_abnormal());

    assert_eq!(Termination::Exited(7).exit_code(), Some(7));
    assert_eq!(Termination::TimedOut.exit_code(), None);

    assert_eq!(Termination::Exited(3).legacy_status(), 3);
    assert_eq!(Termination::Signaled(9).legacy_status(), -1);
    assert_eq!(Termination::TimedOut.legacy_status(), -1);
}

#[cfg(unix)]
#[test]
fn signal_names() {
    assert_eq!(Termination::Signaled(6).signal_name(), Some("SIGABRT"));
    assert_eq!(Termination::Exited(6).signal_name(), None);
}

#[test]
fn report_lossy_text() {
    let report = HarnessReport {
        stdout: b"hello".to_vec(),
        stderr: vec![0x80],
        termination: Termination::Exited(0),
        elapsed: std::time::Duration::ZERO,
    };
    assert_eq!(report.stdout_str(), "hello");
    assert_eq!(report.stderr_str(), "\u{FFFD}");
}

#[tokio::test]
async fn missing_program_fails_to_spawn() {
    let harness = StubHarness::new(HarnessConfig::new("echo-fault-stub-no-such-binary"));
    let result = harness.run(b"{}").await;
    assert!(matches!(result, Err(StubError::Spawn(_))));
}

#[tokio::test]
async fn invalid_config_is_rejected_before_spawn() {
    let harness = StubHarness::new(HarnessConfig::new(""));
    let result = harness.run(b"{}").await;
    assert!(matches!(result, Err(StubError::InvalidConfiguration(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn captures_streams_and_exit_code() {
    let harness = StubHarness::new(
        HarnessConfig::new("sh").args(["-c", "cat; printf err >&2; exit 5"]),
    );
    let report = harness.run(b"ping").await.unwrap();
    assert_eq!(report.stdout_str(), "ping");
    assert_eq!(report.stderr_str(), "err");
    assert_eq!(report.termination, Termination::Exited(5));
}

#[cfg(unix)]
#[tokio::test]
async fn child_ignoring_stdin_is_not_an_error() {
    let harness = StubHarness::new(HarnessConfig::new("true"));
    let report = harness.run(&vec![b'x'; 1 << 20]).await.unwrap();
    assert_eq!(report.termination, Termination::Exited(0));
}

#[cfg(unix)]
#[tokio::test]
async fn timeout_kills_child() {
    let harness = StubHarness::new(
        HarnessConfig::new("sh")
            .args(["-c", "printf started; exec sleep 5"])
            .timeout_ms(200),
    );
    let report = harness.run(b"").await.unwrap();
    assert_eq!(report.termination, Termination::TimedOut);
    assert_eq!(report.termination.legacy_status(), -1);
    assert_eq!(report.stdout_str(), "started");
    assert!(report.elapsed < std::time::Duration::from_secs(4));
}

#[cfg(unix)]
#[tokio::test]
async fn timeout_is_not_held_up_by_descendants() {
    // the background sleep inherits the pipes and outlives its parent
    let harness = StubHarness::new(
        HarnessConfig::new("sh")
            .args(["-c", "printf started; sleep 5 & exec sleep 5"])
            .timeout_ms(200),
    );
    let wall = std::time::Instant::now();
    let report = harness.run(b"").await.unwrap();
    let wall = wall.elapsed();

    assert_eq!(report.termination, Termination::TimedOut);
    assert_eq!(report.stdout_str(), "started");
    assert!(
        wall < std::time::Duration::from_secs(3),
        "run took {:?} with a 200ms timeout",
        wall
    );
}

#[cfg(unix)]
#[tokio::test]
async fn drain_is_bounded_when_pipes_escape_the_group() {
    // a descendant in its own group survives the kill and keeps stdout open
    let harness = StubHarness::new(
        HarnessConfig::new("sh")
            .args([
                "-c",
                "printf started; perl -e 'setpgrp(0, 0); sleep 5' & exec sleep 5",
            ])
            .timeout_ms(200),
    );
    if std::process::Command::new("perl").arg("-v").output().is_err() {
        return;
    }
    let wall = std::time::Instant::now();
    let report = harness.run(b"").await.unwrap();
    let wall = wall.elapsed();

    assert_eq!(report.termination, Termination::TimedOut);
    assert_eq!(report.stdout_str(), "started");
    assert!(
        wall < std::time::Duration::from_secs(3),
        "run took {:?} with a 200ms timeout",
        wall
    );
}
