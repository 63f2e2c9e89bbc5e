use serde_json::json;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::error::CecError;
use crate::logger::Logger;
use crate::metrics::{CEC_COMMANDS_TOTAL, CEC_FAILURES_TOTAL, CEC_LATENCY};
use crate::models::CecJob;

// fixed cec-client flags: single-shot mode, log level 1
const CEC_ARGS: [&str; 3] = ["-s", "-d", "1"];

// Spawns cec-client and feeds it one command over stdin, reproducing
// `echo "pow 0" | cec-client -s -d 1`. Stdout and stderr come back merged
// into a single blob; interleaving order is whatever the pipes deliver.
pub struct CecRunner {
    client_path: Option<PathBuf>,
    timeout: Duration,
    logger: Arc<Logger>,
}

impl CecRunner {
    pub fn new(client_path: Option<PathBuf>, timeout: Duration, logger: Arc<Logger>) -> Self {
        Self {
            client_path,
            timeout,
            logger,
        }
    }

    pub async fn run(&self, command: &str) -> Result<String, CecError> {
        let path = self
            .client_path
            .as_ref()
            .ok_or(CecError::MissingClientPath)?;
        if !path.exists() {
            return Err(CecError::ClientNotFound(path.clone()));
        }

        self.logger
            .info("running CEC command", Some(json!({"command": command})));

        let mut cmd = Command::new(path);
        cmd.args(CEC_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // own process group, so the kill on timeout cannot hit the server
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn()?;

        // write the command and close stdin; if the child already died the
        // failure surfaces through its exit status, not this pipe
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(command.as_bytes()).await;
            let _ = stdin.write_all(b"\n").await;
        }

        // drain both pipes concurrently so a chatty child cannot stall on a
        // full pipe while we wait for it to exit
        let stdout_task = tokio::spawn(drain(child.stdout.take()));
        let stderr_task = tokio::spawn(drain(child.stderr.take()));

        let status = match timeout(self.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                // the child is its own group leader, so this also takes out
                // anything it forked
                #[cfg(unix)]
                if let Some(pid) = child.id() {
                    unsafe { libc::killpg(pid as i32, libc::SIGKILL) };
                }
                let _ = child.start_kill();
                let _ = child.wait().await;
                self.logger.error(
                    "CEC command timed out",
                    Some(json!({"command": command, "timeout_secs": self.timeout.as_secs()})),
                );
                return Err(CecError::Timeout(self.timeout));
            }
        };

        let mut output = stdout_task.await.unwrap_or_default();
        output.push_str(&stderr_task.await.unwrap_or_default());

        if !status.success() {
            self.logger.error(
                "CEC command failed",
                Some(json!({"command": command, "code": status.code(), "output": output})),
            );
            return Err(CecError::CommandFailed {
                code: status.code(),
                output,
            });
        }

        self.logger.info(
            "CEC command succeeded",
            Some(json!({"command": command, "output": output})),
        );
        Ok(output)
    }
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> String {
    let mut buf = String::new();
    if let Some(mut reader) = reader {
        let _ = reader.read_to_string(&mut buf).await;
    }
    buf
}

// Background worker - runs queued CEC commands one by one, so at most one
// cec-client talks to the adapter at any time.
pub async fn cec_worker(mut rx: mpsc::Receiver<CecJob>, runner: CecRunner) {
    while let Some(job) = rx.recv().await {
        CEC_COMMANDS_TOTAL.inc();
        let started = Instant::now();

        let result = runner.run(&job.command).await;

        CEC_LATENCY.observe(started.elapsed().as_secs_f64());
        if result.is_err() {
            CEC_FAILURES_TOTAL.inc();
        }

        // receiver may have hung up (client disconnect) - nothing to do
        let _ = job.response_tx.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[cfg(unix)]
    use crate::testutil::fake_cec;

    fn runner(path: Option<PathBuf>, timeout: Duration) -> CecRunner {
        CecRunner::new(path, timeout, Arc::new(Logger::disabled()))
    }

    #[tokio::test]
    async fn missing_path_fails_without_spawning() {
        let err = runner(None, Duration::from_secs(1))
            .run("pow 0")
            .await
            .unwrap_err();
        assert!(matches!(err, CecError::MissingClientPath));
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn nonexistent_path_fails_without_spawning() {
        let err = runner(
            Some(PathBuf::from("/no/such/cec-client")),
            Duration::from_secs(1),
        )
        .run("pow 0")
        .await
        .unwrap_err();
        assert!(matches!(err, CecError::ClientNotFound(_)));
        assert!(err.is_configuration());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn merges_stdout_and_stderr_and_pipes_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_cec(
            &dir,
            "read cmd\necho \"got $cmd\"\necho \"power status: on\"\necho \"adapter warning\" >&2",
        );

        let output = runner(Some(path), Duration::from_secs(5))
            .run("pow 0")
            .await
            .unwrap();

        assert!(output.contains("got pow 0"));
        assert!(output.contains("power status: on"));
        assert!(output.contains("adapter warning"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_reports_code_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_cec(&dir, "echo \"no adapter found\"\nexit 3");

        let err = runner(Some(path), Duration::from_secs(5))
            .run("pow 0")
            .await
            .unwrap_err();

        match err {
            CecError::CommandFailed { code, output } => {
                assert_eq!(code, Some(3));
                assert!(output.contains("no adapter found"));
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_child_is_killed_at_the_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_cec(&dir, "sleep 30");

        let started = Instant::now();
        let err = runner(Some(path), Duration::from_millis(200))
            .run("pow 0")
            .await
            .unwrap_err();

        assert!(matches!(err, CecError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kill_takes_down_forked_children() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        // a background subshell keeps appending while the script itself hangs
        let body = format!(
            "(while true; do echo x >> {}; sleep 0.05; done) &\nsleep 30",
            marker.display()
        );
        let path = fake_cec(&dir, &body);

        let err = runner(Some(path), Duration::from_millis(300))
            .run("pow 0")
            .await
            .unwrap_err();
        assert!(matches!(err, CecError::Timeout(_)));

        // once the group is killed the marker stops growing
        tokio::time::sleep(Duration::from_millis(300)).await;
        let size_before = std::fs::metadata(&marker).map(|m| m.len()).unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(400)).await;
        let size_after = std::fs::metadata(&marker).map(|m| m.len()).unwrap_or(0);
        assert_eq!(size_before, size_after);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn worker_answers_jobs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_cec(&dir, "read cmd\necho \"ran $cmd\"");

        let (tx, rx) = mpsc::channel::<CecJob>(8);
        tokio::spawn(cec_worker(
            rx,
            runner(Some(path), Duration::from_secs(5)),
        ));

        for cmd in ["pow 0", "on 0", "standby 0"] {
            let (response_tx, response_rx) = oneshot::channel();
            tx.send(CecJob {
                command: cmd.to_string(),
                response_tx,
            })
            .await
            .unwrap();

            let output = response_rx.await.unwrap().unwrap();
            assert!(output.contains(&format!("ran {}", cmd)));
        }
    }
}
