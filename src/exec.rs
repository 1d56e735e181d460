use std::fmt;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use crate::error::{AppError, AppResult};

/// A program invocation with placeholders already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub filename: String,
    pub args: Vec<String>,
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filename)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Callbacks through which a running process reports back. They are invoked
/// from reader tasks, so they must confine themselves to channel sends.
pub struct ProcessHandlers {
    pub stdout: Box<dyn FnMut(String) + Send>,
    pub stderr: Box<dyn FnMut(String) + Send>,
    /// Fired once after both streams are drained; carries the failure
    /// description on abnormal exit.
    pub exit: Box<dyn FnOnce(Option<String>) + Send>,
}

/// Handle to the single live process. `cancel` stops the stream readers
/// before the kill, so no output callback fires for a cancelled command.
pub struct RunningCommand {
    stdin_tx: UnboundedSender<String>,
    cancel_tx: Option<oneshot::Sender<()>>,
    reader_aborts: Vec<AbortHandle>,
}

impl RunningCommand {
    pub(crate) fn new(
        stdin_tx: UnboundedSender<String>,
        cancel_tx: oneshot::Sender<()>,
        reader_aborts: Vec<AbortHandle>,
    ) -> Self {
        Self {
            stdin_tx,
            cancel_tx: Some(cancel_tx),
            reader_aborts,
        }
    }

    /// Queue `text` for the process stdin. Returns `false` when the writer
    /// is already gone.
    pub fn write_input(&self, text: String) -> bool {
        self.stdin_tx.send(text).is_ok()
    }

    pub fn cancel(&mut self) {
        for abort in &self.reader_aborts {
            abort.abort();
        }
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(());
        }
    }
}

/// The sole I/O surface the pipeline depends on; swapped for a fake in
/// middleware tests.
pub trait CommandRunner {
    fn start(&self, command: &CommandSpec, handlers: ProcessHandlers)
    -> AppResult<RunningCommand>;
}

/// Spawns real child processes on the tokio runtime.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn start(
        &self,
        command: &CommandSpec,
        handlers: ProcessHandlers,
    ) -> AppResult<RunningCommand> {
        let ProcessHandlers {
            stdout: on_stdout,
            stderr: on_stderr,
            exit: on_exit,
        } = handlers;

        let mut child = Command::new(&command.filename)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AppError::command_start(&command.filename, source))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::invalid_argument("child stdin was not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::invalid_argument("child stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AppError::invalid_argument("child stderr was not piped"))?;

        let (stdin_tx, stdin_rx) = unbounded_channel::<String>();
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let stdin_task = tokio::spawn(feed_stdin(stdin, stdin_rx));
        let mut stdout_task = tokio::spawn(pump_stream(stdout, on_stdout));
        let mut stderr_task = tokio::spawn(pump_stream(stderr, on_stderr));
        let reader_aborts = vec![
            stdout_task.abort_handle(),
            stderr_task.abort_handle(),
            stdin_task.abort_handle(),
        ];
        let stdout_abort = stdout_task.abort_handle();
        let stderr_abort = stderr_task.abort_handle();

        tokio::spawn(async move {
            tokio::select! {
                _ = &mut cancel_rx => {
                    stdout_abort.abort();
                    stderr_abort.abort();
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                }
                _ = async {
                    let _ = (&mut stdout_task).await;
                    let _ = (&mut stderr_task).await;
                } => {
                    let error = match child.wait().await {
                        Ok(status) if status.success() => None,
                        Ok(status) => Some(format!("command exited with {status}")),
                        Err(err) => Some(format!("failed to await command: {err}")),
                    };
                    on_exit(error);
                }
            }
        });

        Ok(RunningCommand::new(stdin_tx, cancel_tx, reader_aborts))
    }
}

async fn pump_stream<R>(mut reader: R, mut on_chunk: Box<dyn FnMut(String) + Send>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(read) => on_chunk(String::from_utf8_lossy(&buf[..read]).into_owned()),
        }
    }
}

async fn feed_stdin(mut stdin: ChildStdin, mut input_rx: UnboundedReceiver<String>) {
    while let Some(text) = input_rx.recv().await {
        if stdin.write_all(text.as_bytes()).await.is_err() {
            break;
        }
        if stdin.flush().await.is_err() {
            break;
        }
    }
}
