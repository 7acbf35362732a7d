//! Docker-backed sandbox

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bollard::{
    Docker,
    container::LogOutput,
    errors::Error as DockerError,
    models::{ContainerCreateBody, HostConfig},
    query_parameters::{
        AttachContainerOptionsBuilder, CreateContainerOptionsBuilder, CreateImageOptionsBuilder,
        KillContainerOptionsBuilder, RemoveContainerOptionsBuilder, StartContainerOptions,
        WaitContainerOptions,
    },
};
use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::{
    config::SandboxConfig,
    constants::{MAX_CAPTURED_OUTPUT, SANDBOX_LABEL, SANDBOX_WORKDIR},
    error::{AppError, AppResult},
    judge::languages::{LanguageRegistry, LanguageRuntime, source_file_name},
    judge::sandbox::{ExecutionResult, Sandbox, Workspace},
    models::Language,
};

type LiveContainers = Arc<Mutex<HashSet<String>>>;

fn lock(live: &LiveContainers) -> MutexGuard<'_, HashSet<String>> {
    live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs each execution in a fresh, network-less container
#[derive(Clone)]
pub struct ContainerSandbox {
    docker: Docker,
    config: SandboxConfig,
    languages: LanguageRegistry,
    permits: Arc<Semaphore>,
    live: LiveContainers,
}

impl ContainerSandbox {
    pub fn new(docker: Docker, config: SandboxConfig, languages: LanguageRegistry) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            docker,
            config,
            languages,
            permits,
            live: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Pull every configured runtime image
    pub async fn prepare_images(&self) -> AppResult<()> {
        for image in self.languages.images() {
            tracing::info!(image = %image, "Pulling sandbox image");

            let options = CreateImageOptionsBuilder::default().from_image(&image).build();
            let mut progress = self.docker.create_image(Some(options), None, None);
            while let Some(step) = progress.next().await {
                step?;
            }
        }
        Ok(())
    }

    /// Stop admitting runs and force-remove every live container
    pub async fn kill_all(&self) {
        self.permits.close();

        let ids: Vec<String> = lock(&self.live).drain().collect();
        if ids.is_empty() {
            return;
        }

        tracing::warn!(count = ids.len(), "Killing live sandbox containers");
        for id in ids {
            if let Err(e) = remove_container(&self.docker, &id).await {
                tracing::error!(container_id = %id, error = %e, "Failed to remove container");
            }
        }
    }

    async fn run(&self, language: Language, source: &str, stdin: &str) -> AppResult<ExecutionResult> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AppError::Docker("sandbox is shutting down".to_string()))?;

        let runtime = self.languages.runtime(language);
        let file_name = source_file_name(language, runtime);
        let workspace = Workspace::create(&self.config.work_dir, &file_name, source)
            .await
            .map_err(|e| AppError::Docker(format!("failed to prepare workspace: {e}")))?;

        let guard = self.create_container(runtime, &workspace).await?;
        let id = guard.id().to_string();
        tracing::debug!(container_id = %id, %language, "Sandbox container created");

        let outcome = self.attach_and_wait(&id, stdin).await;
        guard.release().await;
        drop(workspace);

        outcome
    }

    async fn create_container(
        &self,
        runtime: &LanguageRuntime,
        workspace: &Workspace,
    ) -> AppResult<ContainerGuard> {
        let name = format!("codegrade-{}", Uuid::new_v4());
        let options = CreateContainerOptionsBuilder::default().name(&name).build();

        let config = ContainerCreateBody {
            image: Some(runtime.image.clone()),
            cmd: Some(vec![
                "sh".to_string(),
                "-c".to_string(),
                runtime.command_for(workspace.file_name()),
            ]),
            attach_stdin: Some(true),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            open_stdin: Some(true),
            stdin_once: Some(true),
            tty: Some(false),
            network_disabled: Some(true),
            working_dir: Some(SANDBOX_WORKDIR.to_string()),
            host_config: Some(host_config(&self.config, workspace)),
            labels: Some(HashMap::from([(SANDBOX_LABEL.to_string(), name.clone())])),
            ..Default::default()
        };

        let container = self.docker.create_container(Some(options), config).await?;
        lock(&self.live).insert(container.id.clone());

        Ok(ContainerGuard {
            docker: self.docker.clone(),
            live: self.live.clone(),
            id: Some(container.id),
        })
    }

    async fn attach_and_wait(&self, id: &str, stdin: &str) -> AppResult<ExecutionResult> {
        let options = AttachContainerOptionsBuilder::default()
            .stdin(true)
            .stdout(true)
            .stderr(true)
            .stream(true)
            .build();
        let attached = self.docker.attach_container(id, Some(options)).await?;

        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await?;

        let started = Instant::now();
        let payload = format!("{stdin}\n");
        let exchange = exchange(
            attached.input,
            attached.output,
            payload.as_bytes(),
            Duration::from_millis(self.config.timeout_ms),
            wait_exit_code(&self.docker, id),
        )
        .await?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match exchange {
            Exchange::Finished { output, exit_code } => {
                tracing::debug!(container_id = %id, exit_code, elapsed_ms, "Sandbox run finished");
                let (stdout, stderr) = output.into_strings();
                Ok(ExecutionResult::completed(stdout, stderr, exit_code))
            }
            Exchange::TimedOut(output) => {
                tracing::warn!(container_id = %id, elapsed_ms, "Sandbox run timed out");
                let options = KillContainerOptionsBuilder::default().signal("SIGKILL").build();
                if let Err(e) = self.docker.kill_container(id, Some(options)).await {
                    tracing::debug!(container_id = %id, error = %e, "Kill after timeout failed");
                }
                let (stdout, stderr) = output.into_strings();
                Ok(ExecutionResult::timed_out(stdout, stderr, self.config.timeout_ms))
            }
        }
    }
}

#[async_trait]
impl Sandbox for ContainerSandbox {
    async fn execute(&self, language: Language, source: &str, stdin: &str) -> ExecutionResult {
        match self.run(language, source, stdin).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(%language, error = %e, "Sandbox fault");
                ExecutionResult::fault(e.to_string())
            }
        }
    }
}

fn host_config(config: &SandboxConfig, workspace: &Workspace) -> HostConfig {
    let memory = (config.memory_limit_mb * 1024 * 1024) as i64;
    let mount = format!(
        "{}:{}/{}:ro",
        workspace.source_path().display(),
        SANDBOX_WORKDIR,
        workspace.file_name()
    );

    HostConfig {
        binds: Some(vec![mount]),
        memory: Some(memory),
        memory_swap: Some(memory),
        nano_cpus: Some(nano_cpus(config.cpu_limit)),
        network_mode: Some("none".to_string()),
        pids_limit: Some(config.pids_limit),
        ..Default::default()
    }
}

fn nano_cpus(cpus: f64) -> i64 {
    (cpus * 1_000_000_000.0).round() as i64
}

async fn wait_exit_code(docker: &Docker, id: &str) -> AppResult<i64> {
    let mut wait = docker.wait_container(id, None::<WaitContainerOptions>);
    match wait.next().await {
        Some(Ok(response)) => Ok(response.status_code),
        // non-zero exits surface as an error on the wait stream
        Some(Err(DockerError::DockerContainerWaitError { code, .. })) => Ok(code),
        Some(Err(e)) => Err(e.into()),
        None => Err(AppError::Docker(format!("no exit status for container {id}"))),
    }
}

/// How an attached run ended
#[derive(Debug)]
enum Exchange {
    Finished {
        output: CapturedOutput,
        exit_code: i64,
    },
    TimedOut(CapturedOutput),
}

/// Feed stdin, drain the output stream and wait for the exit code, all under `limit`
///
/// The writer runs alongside the reader, so a program that never reads its
/// input, or fills stdout first, still ends at the deadline.
async fn exchange<W, S, F>(
    input: W,
    mut output: S,
    stdin: &[u8],
    limit: Duration,
    exit_code: F,
) -> AppResult<Exchange>
where
    W: AsyncWrite + Unpin,
    S: Stream<Item = Result<LogOutput, DockerError>> + Unpin,
    F: Future<Output = AppResult<i64>>,
{
    let mut captured = CapturedOutput::default();

    let finished = tokio::time::timeout(limit, async {
        let feed = feed_stdin(input, stdin);
        let drain = async {
            while let Some(frame) = output.next().await {
                captured.push(frame?);
            }
            Ok::<_, AppError>(())
        };
        tokio::pin!(feed, drain);

        // once the output ends the program is gone; unsent stdin is dropped
        let mut fed = false;
        let drained = loop {
            tokio::select! {
                _ = &mut feed, if !fed => fed = true,
                drained = &mut drain => break drained,
            }
        };
        drained?;

        exit_code.await
    })
    .await;

    Ok(match finished {
        Ok(exit_code) => Exchange::Finished {
            output: captured,
            exit_code: exit_code?,
        },
        Err(_) => Exchange::TimedOut(captured),
    })
}

async fn feed_stdin<W: AsyncWrite + Unpin>(mut input: W, stdin: &[u8]) {
    // a closed pipe only means the program exited without reading
    if let Err(e) = input.write_all(stdin).await {
        tracing::debug!(error = %e, "Stdin not fully delivered");
        return;
    }
    if let Err(e) = input.shutdown().await {
        tracing::debug!(error = %e, "Failed to close stdin");
    }
}

async fn remove_container(docker: &Docker, id: &str) -> Result<(), DockerError> {
    let options = RemoveContainerOptionsBuilder::default().force(true).build();
    docker.remove_container(id, Some(options)).await
}

/// Raw stdout/stderr bytes from the attach stream, each capped
///
/// Frames split characters at arbitrary byte offsets, so decoding waits
/// until the run is over.
#[derive(Debug, Default)]
struct CapturedOutput {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl CapturedOutput {
    fn push(&mut self, frame: LogOutput) {
        match frame {
            LogOutput::StdOut { message } | LogOutput::Console { message } => {
                append_capped(&mut self.stdout, &message)
            }
            LogOutput::StdErr { message } => append_capped(&mut self.stderr, &message),
            LogOutput::StdIn { .. } => {}
        }
    }

    fn into_strings(self) -> (String, String) {
        (decode(self.stdout), decode(self.stderr))
    }
}

fn append_capped(buffer: &mut Vec<u8>, bytes: &[u8]) {
    let room = MAX_CAPTURED_OUTPUT.saturating_sub(buffer.len());
    buffer.extend_from_slice(&bytes[..bytes.len().min(room)]);
}

/// Lossy UTF-8 decode that drops a character cut off at the end
fn decode(mut bytes: Vec<u8>) -> String {
    if let Err(e) = std::str::from_utf8(&bytes) {
        if e.error_len().is_none() {
            bytes.truncate(e.valid_up_to());
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Removes its container when dropped
///
/// `release` removes it on the normal path; if the owning future is
/// cancelled first, `Drop` hands the removal to the runtime.
struct ContainerGuard {
    docker: Docker,
    live: LiveContainers,
    id: Option<String>,
}

impl ContainerGuard {
    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    async fn release(mut self) {
        if let Some(id) = self.id.take() {
            lock(&self.live).remove(&id);
            if let Err(e) = remove_container(&self.docker, &id).await {
                tracing::warn!(container_id = %id, error = %e, "Failed to remove container");
            }
        }
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        lock(&self.live).remove(&id);

        let docker = self.docker.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = remove_container(&docker, &id).await {
                    tracing::warn!(container_id = %id, error = %e, "Failed to remove abandoned container");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[test]
    fn test_nano_cpus() {
        assert_eq!(nano_cpus(0.5), 500_000_000);
        assert_eq!(nano_cpus(2.0), 2_000_000_000);
    }

    #[test]
    fn test_output_frames_are_split_by_stream() {
        let mut output = CapturedOutput::default();
        output.push(LogOutput::StdOut { message: "30\n".into() });
        output.push(LogOutput::StdErr { message: "warning\n".into() });
        output.push(LogOutput::StdOut { message: "done".into() });

        let (stdout, stderr) = output.into_strings();
        assert_eq!(stdout, "30\ndone");
        assert_eq!(stderr, "warning\n");
    }

    #[test]
    fn test_character_split_across_frames() {
        let mut output = CapturedOutput::default();
        output.push(LogOutput::StdOut { message: vec![0xC3].into() });
        output.push(LogOutput::StdOut { message: vec![0xA9, b'!'].into() });

        let (stdout, _) = output.into_strings();
        assert_eq!(stdout, "é!");
    }

    #[test]
    fn test_output_is_capped() {
        let mut buffer = vec![b'x'; MAX_CAPTURED_OUTPUT - 2];
        append_capped(&mut buffer, b"abcdef");
        assert_eq!(buffer.len(), MAX_CAPTURED_OUTPUT);
        assert!(buffer.ends_with(b"ab"));

        append_capped(&mut buffer, b"more");
        assert_eq!(buffer.len(), MAX_CAPTURED_OUTPUT);
    }

    #[test]
    fn test_cap_never_leaves_half_a_character() {
        let mut buffer = vec![b'x'; MAX_CAPTURED_OUTPUT - 1];
        append_capped(&mut buffer, "é".as_bytes());

        let text = decode(buffer);
        assert_eq!(text.len(), MAX_CAPTURED_OUTPUT - 1);
        assert!(!text.contains(char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn test_decode_keeps_invalid_bytes_visible() {
        assert_eq!(decode(vec![b'a', 0xFF, b'b']), "a\u{FFFD}b");
    }

    type Frames = futures::channel::mpsc::UnboundedReceiver<Result<LogOutput, DockerError>>;

    /// Program that reads all of stdin, then prints the sum of its integers
    fn adding_program() -> (tokio::io::DuplexStream, Frames) {
        let (input, mut program) = tokio::io::duplex(64);
        let (frames, output) = futures::channel::mpsc::unbounded();

        tokio::spawn(async move {
            let mut received = String::new();
            program.read_to_string(&mut received).await.unwrap();
            let sum: i64 = received
                .split_whitespace()
                .filter_map(|t| t.parse::<i64>().ok())
                .sum();
            frames
                .unbounded_send(Ok(LogOutput::StdOut { message: format!("{sum}\n").into() }))
                .unwrap();
        });

        (input, output)
    }

    #[tokio::test]
    async fn test_exchange_delivers_stdin_and_collects_output() {
        let (input, output) = adding_program();

        let exchange = exchange(
            input,
            output,
            b"10 20\n",
            Duration::from_secs(5),
            async { Ok(0) },
        )
        .await
        .unwrap();

        match exchange {
            Exchange::Finished { output, exit_code } => {
                assert_eq!(exit_code, 0);
                assert_eq!(output.into_strings().0, "30\n");
            }
            other => panic!("unexpected exchange: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_times_out_when_program_ignores_stdin() {
        // the program side of the pipe is never read, so writing stalls
        let (input, _program) = tokio::io::duplex(8);
        let output = futures::stream::pending::<Result<LogOutput, DockerError>>();
        let stdin = vec![b'1'; 1024 * 1024];

        let started = Instant::now();
        let exchange = exchange(
            input,
            output,
            &stdin,
            Duration::from_millis(50),
            async { Ok(0) },
        )
        .await
        .unwrap();

        assert!(matches!(exchange, Exchange::TimedOut(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_exchange_finishes_while_stdin_is_stalled() {
        let (input, _program) = tokio::io::duplex(8);
        let output = futures::stream::iter(vec![Ok(LogOutput::StdOut {
            message: "early exit\n".into(),
        })]);
        let stdin = vec![b'1'; 1024 * 1024];

        let exchange = exchange(
            input,
            output,
            &stdin,
            Duration::from_secs(5),
            async { Ok(3) },
        )
        .await
        .unwrap();

        match exchange {
            Exchange::Finished { output, exit_code } => {
                assert_eq!(exit_code, 3);
                assert_eq!(output.into_strings().0, "early exit\n");
            }
            other => panic!("unexpected exchange: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_keeps_partial_output_on_timeout() {
        let output = futures::stream::iter(vec![Ok(LogOutput::StdOut {
            message: "partial".into(),
        })])
        .chain(futures::stream::pending());

        let exchange = exchange(
            tokio::io::sink(),
            output,
            b"\n",
            Duration::from_millis(50),
            async { Ok(0) },
        )
        .await
        .unwrap();

        match exchange {
            Exchange::TimedOut(output) => assert_eq!(output.into_strings().0, "partial"),
            other => panic!("unexpected exchange: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_runs_are_refused_after_kill_all() {
        let docker =
            Docker::connect_with_http("http://127.0.0.1:9", 1, bollard::API_DEFAULT_VERSION)
                .unwrap();
        let sandbox =
            ContainerSandbox::new(docker, SandboxConfig::default(), LanguageRegistry::defaults());

        sandbox.kill_all().await;

        let result = sandbox.execute(Language::Python, "print(1)", "").await;
        assert!(result.sandbox_fault);
        assert!(result.stderr.contains("shutting down"));
    }

    #[tokio::test]
    async fn test_host_config_limits_and_mount() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(root.path(), "Main.java", "class Main {}")
            .await
            .unwrap();
        let config = SandboxConfig::default();

        let host = host_config(&config, &workspace);
        assert_eq!(host.memory, Some(256 * 1024 * 1024));
        assert_eq!(host.memory_swap, host.memory);
        assert_eq!(host.nano_cpus, Some(500_000_000));
        assert_eq!(host.network_mode.as_deref(), Some("none"));
        assert_eq!(host.pids_limit, Some(64));

        let binds = host.binds.unwrap();
        assert_eq!(binds.len(), 1);
        assert!(binds[0].ends_with("/Main.java:/app/Main.java:ro"));
        assert!(binds[0].starts_with(&workspace.path().display().to_string()));
    }
}
