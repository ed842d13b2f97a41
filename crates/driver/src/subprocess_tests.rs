use super::*;
use crate::request::AgentRequest;
use crate::result::AgentCapabilities;
use agentgate_core::test_support::{sample_run, sample_work_order};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn shell_driver(script: &'static str) -> SubprocessAgentDriver {
    let build_argv: ArgvBuilder = Arc::new(move |_req: &AgentRequest| vec!["-c".to_string(), script.to_string()]);
    SubprocessAgentDriver::new("test-shell", "sh", build_argv, vec![], AgentCapabilities::default())
}

#[tokio::test]
async fn executes_successfully_and_parses_final_json_line() {
    let dir = tempfile::tempdir().unwrap();
    let driver = shell_driver(r#"echo '{"sessionId":"abc123","tokensUsed":42}'"#);
    let request = AgentRequest::new(dir.path().to_path_buf(), "do the thing", Duration::from_secs(5));
    let result = driver.execute(request, ExecuteOptions::default()).await.unwrap();
    assert!(result.success);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.session_id.as_deref(), Some("abc123"));
    assert_eq!(result.tokens_used, Some(42));
    assert!(!result.timed_out);
    assert!(!result.cancelled);
}

#[tokio::test]
async fn times_out_and_kills_the_child() {
    let dir = tempfile::tempdir().unwrap();
    let driver = shell_driver("sleep 5");
    let request = AgentRequest::new(dir.path().to_path_buf(), "slow task", Duration::from_millis(100));
    let result = driver.execute(request, ExecuteOptions::default()).await.unwrap();
    assert!(result.timed_out);
    assert_eq!(result.exit_code, Some(124));
    assert!(!result.success);
}

#[tokio::test]
async fn cancellation_token_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let driver = shell_driver("sleep 5");
    let request = AgentRequest::new(dir.path().to_path_buf(), "slow task", Duration::from_secs(30));
    let token = CancellationToken::new();
    let opts = ExecuteOptions::default().with_cancellation(token.clone());

    let cancel_token = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel_token.cancel();
    });

    let result = driver.execute(request, opts).await.unwrap();
    assert!(result.cancelled);
    assert!(!result.timed_out);
    assert!(!result.success);
}

#[tokio::test]
async fn streaming_mode_emits_events_through_the_sink() {
    let dir = tempfile::tempdir().unwrap();
    let script = r#"echo '{"type":"assistant","message":{"type":"text","text":"working on it"}}'; echo '{"result":"done"}'"#;
    let driver = shell_driver(script);
    let request = AgentRequest::new(dir.path().to_path_buf(), "stream me", Duration::from_secs(5));

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let work_order = sample_work_order();
    let run = sample_run(work_order.id, work_order.workspace_id);
    let ctx = StreamContext { work_order_id: work_order.id, run_id: run.id };
    let opts = ExecuteOptions::default().with_streaming(tx, ctx);

    let result = driver.execute(request, opts).await.unwrap();
    assert!(result.success);

    let mut saw_output = false;
    while let Ok(event) = rx.try_recv() {
        if matches!(event.payload, agentgate_core::EventPayload::AgentOutput { .. }) {
            saw_output = true;
        }
    }
    assert!(saw_output, "expected at least one AgentOutput event on the stream");
}

#[tokio::test]
async fn is_available_reflects_whether_the_binary_resolves() {
    let build_argv: ArgvBuilder = Arc::new(|_: &AgentRequest| vec![]);
    let present = SubprocessAgentDriver::new("sh-driver", "sh", build_argv.clone(), vec![], AgentCapabilities::default());
    assert!(present.is_available().await);

    let missing =
        SubprocessAgentDriver::new("missing-driver", "definitely-not-a-real-binary-xyz", build_argv, vec![], AgentCapabilities::default());
    assert!(!missing.is_available().await);
}
