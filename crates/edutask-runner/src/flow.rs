/*
[INPUT]:  RemoteTask requests, EdutaskClient, PollPolicy
[OUTPUT]: Published TaskView updates for the latest submission
[POS]:    Consumer runtime - drives submit + poll and owns the loop's token
[UPDATE]: When flow lifecycle or cancellation rules change
*/

use crate::consumer::{TaskView, ViewEvent};
use edutask_adapter::{CancellationToken, EdutaskClient, PollPolicy, RemoteTask};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// Drives task flows of one kind on behalf of a single consumer.
///
/// Each `run` is a new flow: it cancels the previous flow's poll loop, resets
/// the view and publishes its own transitions. A flow that has been
/// superseded keeps running to its next cancellation point but never
/// publishes again, so a late result cannot overwrite the newer view.
pub struct TaskFlow<T: RemoteTask> {
    client: EdutaskClient,
    policy: PollPolicy,
    view: watch::Sender<TaskView<T::Output>>,
    generation: AtomicU64,
    current: Mutex<Option<CancellationToken>>,
    shutdown: CancellationToken,
}

impl<T> TaskFlow<T>
where
    T: RemoteTask,
    T::Output: Clone + Sync,
{
    pub fn new(client: EdutaskClient, policy: PollPolicy) -> Self {
        Self::with_shutdown(client, policy, CancellationToken::new())
    }

    /// Flows also cancel when `parent` fires
    pub fn with_shutdown(
        client: EdutaskClient,
        policy: PollPolicy,
        parent: CancellationToken,
    ) -> Self {
        let (view, _) = watch::channel(TaskView::Idle);
        Self {
            client,
            policy,
            view,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
            shutdown: parent.child_token(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskView<T::Output>> {
        self.view.subscribe()
    }

    /// Snapshot of the published view
    pub fn view(&self) -> TaskView<T::Output> {
        self.view.borrow().clone()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Submit `request` and poll it to a terminal state.
    ///
    /// Returns this flow's own final view, which is also the published view
    /// unless a newer `run` started in the meantime.
    pub async fn run(&self, request: &T) -> TaskView<T::Output> {
        let token = self.shutdown.child_token();
        let generation = {
            // Generation and token change together so the newest flow owns `current`
            let mut current = self.current.lock().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(previous) = current.replace(token.clone()) {
                debug!(task = T::NAME, generation, "superseding previous flow");
                previous.cancel();
            }
            generation
        };

        let mut local = TaskView::Idle;
        self.publish(&mut local, generation, ViewEvent::Reset);

        let ack = match self.client.submit(request).await {
            Ok(ack) => ack,
            Err(err) => {
                warn!(task = T::NAME, generation, error = %err, "submission failed");
                self.publish(&mut local, generation, ViewEvent::Failed(err.user_message()));
                return local;
            }
        };

        self.publish(
            &mut local,
            generation,
            ViewEvent::Submitted {
                task_id: ack.task_id.clone(),
            },
        );

        let event = match self
            .client
            .wait_for::<T>(&ack.task_id, &self.policy, &token)
            .await
        {
            Ok(output) => ViewEvent::Resolved(output),
            Err(err) => ViewEvent::Failed(err.user_message()),
        };
        self.publish(&mut local, generation, event);

        info!(task = T::NAME, generation, task_id = %ack.task_id, phase = ?local.phase(), "flow finished");
        local
    }

    /// Stop the in-flight poll loop; its view ends in `Error`
    pub async fn cancel(&self) {
        if let Some(token) = self.current.lock().await.as_ref() {
            token.cancel();
        }
    }

    /// Stop every current and future flow
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn publish(&self, local: &mut TaskView<T::Output>, generation: u64, event: ViewEvent<T::Output>) {
        if let Err(err) = local.apply(event.clone()) {
            warn!(task = T::NAME, generation, error = %err, "rejected view transition");
            return;
        }

        let published = self.view.send_if_modified(|view| {
            // Checked under the channel lock so a newer flow's reset always lands last
            if !self.is_current(generation) {
                return false;
            }
            match view.apply(event) {
                Ok(()) => true,
                Err(err) => {
                    warn!(task = T::NAME, generation, error = %err, "rejected view transition");
                    false
                }
            }
        });

        if !published {
            debug!(task = T::NAME, generation, "discarded update from superseded flow");
        }
    }
}

impl<T: RemoteTask> Drop for TaskFlow<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
