use super::machine::{AutosaveConfig, AutosaveMachine, AutosaveStatus, SaveError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Future returned by a save function.
pub type SaveFuture = Pin<Box<dyn Future<Output = Result<(), SaveError>> + Send>>;

/// Persists one payload. Supplied by the host.
pub type SaveFn<P> = Arc<dyn Fn(P) -> SaveFuture + Send + Sync>;

enum Command<P> {
    Change(P),
    Retry,
}

/// Autosave running on a tokio task.
///
/// Changes and retries are queued to the task; status updates are
/// published on a `watch` channel. Saves are never cancelled: dropping the
/// handle lets an in-flight or pending save finish before the task exits.
pub struct Autosave<P> {
    commands: mpsc::UnboundedSender<Command<P>>,
    status: watch::Receiver<AutosaveStatus>,
    task: JoinHandle<()>,
}

impl<P> Autosave<P>
where
    P: Clone + Send + 'static,
{
    /// Spawn the autosave task on the current tokio runtime.
    pub fn spawn(config: AutosaveConfig, save: SaveFn<P>) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(AutosaveStatus::Idle);
        let task = tokio::spawn(run(AutosaveMachine::new(config), rx, status_tx, save));
        Self {
            commands,
            status,
            task,
        }
    }

    /// Report a committed change.
    pub fn notify(&self, payload: P) {
        if self.commands.send(Command::Change(payload)).is_err() {
            log::warn!("autosave: task has stopped; change dropped");
        }
    }

    /// Re-attempt a failed save. Ignored unless the status is `Error`.
    pub fn retry(&self) {
        if self.commands.send(Command::Retry).is_err() {
            log::warn!("autosave: task has stopped; retry dropped");
        }
    }

    pub fn status(&self) -> AutosaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutosaveStatus> {
        self.status.clone()
    }

    /// Stop accepting changes and wait for outstanding saves.
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            log::warn!("autosave: task ended abnormally: {e}");
        }
    }
}

async fn run<P: Clone>(
    mut machine: AutosaveMachine<P>,
    mut commands: mpsc::UnboundedReceiver<Command<P>>,
    status: watch::Sender<AutosaveStatus>,
    save: SaveFn<P>,
) {
    let origin = Instant::now();
    let mut open = true;
    let mut retried: Option<P> = None;

    loop {
        let job = retried.take().or_else(|| machine.poll(origin.elapsed()));
        publish(&status, machine.status());

        if let Some(payload) = job {
            match save(payload).await {
                Ok(()) => machine.on_saved(origin.elapsed()),
                Err(e) => machine.on_failed(&e),
            }
            publish(&status, machine.status());
            continue;
        }

        let wake = machine.next_wakeup().map(|t| origin + t);
        if !open && wake.is_none() {
            break;
        }

        tokio::select! {
            cmd = commands.recv(), if open => match cmd {
                Some(Command::Change(payload)) => machine.on_change(payload, origin.elapsed()),
                Some(Command::Retry) => retried = machine.retry(),
                None => open = false,
            },
            _ = sleep_until(wake.unwrap_or_else(Instant::now)), if wake.is_some() => {}
            else => break,
        }
    }
}

fn publish(tx: &watch::Sender<AutosaveStatus>, current: &AutosaveStatus) {
    tx.send_if_modified(|shown| {
        if shown == current {
            return false;
        }
        *shown = current.clone();
        true
    });
}
