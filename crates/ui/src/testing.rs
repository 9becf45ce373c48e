//! Scripted gateway double shared by the controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use advisor_gateway::{
    BackendAvailability, DeleteAllOutcome, GatewayError, GatewayResult, HistoryEntry,
    RemoteDataGateway, User,
};
use futures::future::BoxFuture;
use tokio::sync::oneshot;

enum Reply<T> {
    Ready(GatewayResult<T>),
    Gated(oneshot::Receiver<GatewayResult<T>>),
}

pub(crate) struct Script<T> {
    operation: &'static str,
    replies: Mutex<VecDeque<Reply<T>>>,
    calls: AtomicUsize,
}

impl<T: Send> Script<T> {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn reply(&self, result: GatewayResult<T>) {
        self.replies
            .lock()
            .expect("script lock")
            .push_back(Reply::Ready(result));
    }

    /// Queues a reply that stays in flight until the returned sender fires.
    pub(crate) fn hold(&self) -> oneshot::Sender<GatewayResult<T>> {
        let (sender, receiver) = oneshot::channel();
        self.replies
            .lock()
            .expect("script lock")
            .push_back(Reply::Gated(receiver));
        sender
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> GatewayResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().expect("script lock").pop_front();
        let unscripted = || GatewayError::Status {
            stage: "scripted-gateway",
            path: self.operation,
            status: 503,
            body: "no scripted reply".to_string(),
        };

        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(receiver)) => receiver.await.unwrap_or_else(|_| Err(unscripted())),
            None => Err(unscripted()),
        }
    }
}

pub(crate) struct ScriptedGateway {
    pub(crate) users: Script<Vec<User>>,
    pub(crate) history: Script<Vec<HistoryEntry>>,
    pub(crate) delete_all: Script<DeleteAllOutcome>,
    pub(crate) ensure: Script<BackendAvailability>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self {
            users: Script::new("list_users"),
            history: Script::new("fetch_history"),
            delete_all: Script::new("delete_all_history"),
            ensure: Script::new("ensure_history"),
        }
    }
}

impl RemoteDataGateway for ScriptedGateway {
    fn list_users<'a>(&'a self) -> BoxFuture<'a, GatewayResult<Vec<User>>> {
        Box::pin(self.users.next())
    }

    fn fetch_history<'a>(
        &'a self,
        _offset: usize,
    ) -> BoxFuture<'a, GatewayResult<Vec<HistoryEntry>>> {
        Box::pin(self.history.next())
    }

    fn delete_all_history<'a>(&'a self) -> BoxFuture<'a, GatewayResult<DeleteAllOutcome>> {
        Box::pin(self.delete_all.next())
    }

    fn ensure_history<'a>(&'a self) -> BoxFuture<'a, GatewayResult<BackendAvailability>> {
        Box::pin(self.ensure.next())
    }
}

pub(crate) fn backend_down(path: &'static str) -> GatewayError {
    GatewayError::Status {
        stage: "scripted-gateway",
        path,
        status: 503,
        body: "service unavailable".to_string(),
    }
}

/// Lets spawned tasks run until they block on something the test controls.
pub(crate) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
