//! Async list session.
//!
//! One actor task owns the [`ListCoordinator`]. Handle calls are sent to it as
//! commands, fetches it dispatches run as separate tasks and report back
//! through the same channel, and every change is published on a `watch`
//! channel.

use std::sync::Arc;
use std::time::Duration;

use candidates_core::{
    Completion, CoordinatorError, FetchError, FetchRequest, ListCoordinator, ListViewState,
    NameFilter, Page, RequestId,
};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

use crate::config::ListConfig;
use crate::debounce::Debouncer;
use crate::gateway::CandidateGateway;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
    #[error("list session has stopped")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub page_size: usize,
    pub search_debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&ListConfig::default())
    }
}

impl From<&ListConfig> for SessionOptions {
    fn from(config: &ListConfig) -> Self {
        Self {
            page_size: config.default_page_size,
            search_debounce: config.search_debounce(),
        }
    }
}

type Reply = oneshot::Sender<Result<(), SessionError>>;

enum Command {
    Load(Reply),
    SetPage(usize, Reply),
    NextPage(Reply),
    PreviousPage(Reply),
    SetPageSize(usize, Reply),
    SetSearch(String, Reply),
    TypeSearch(String, Reply),
    SetStatuses(Vec<String>, Reply),
    SetNames(NameFilter, Reply),
    Retry(Reply),
    ApplySearch { generation: u64, term: String },
    Completed { id: RequestId, result: Result<Page, FetchError> },
}

/// Handle to a running list session. Dropping it stops the session.
#[derive(Debug)]
pub struct ListSession {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<ListViewState>,
    task: JoinHandle<()>,
}

impl ListSession {
    /// Starts the actor on the current tokio runtime. Nothing is fetched
    /// until [`ListSession::load`].
    pub fn spawn<G: CandidateGateway>(
        gateway: Arc<G>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let coordinator = ListCoordinator::new(options.page_size)?;
        let (commands, inbox) = mpsc::unbounded_channel();
        let (publisher, view) = watch::channel(coordinator.view().clone());
        let actor = Actor {
            coordinator,
            gateway,
            commands: commands.clone(),
            publisher,
            debouncer: Debouncer::new(options.search_debounce),
            search_generation: 0,
            fetches: Vec::new(),
        };
        info!(page_size = options.page_size, "list session started");
        let task = tokio::spawn(actor.run(inbox));
        Ok(Self {
            commands,
            view,
            task,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<ListViewState> {
        self.view.clone()
    }

    /// Latest published state.
    pub fn view(&self) -> ListViewState {
        self.view.borrow().clone()
    }

    /// Waits until nothing is loading and returns that state.
    pub async fn settled(&self) -> Result<ListViewState, SessionError> {
        let mut view = self.view.clone();
        let state = view
            .wait_for(|state| !state.loading)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(state.clone())
    }

    pub async fn load(&self) -> Result<(), SessionError> {
        self.send(Command::Load).await
    }

    pub async fn set_page(&self, page: usize) -> Result<(), SessionError> {
        self.send(|reply| Command::SetPage(page, reply)).await
    }

    pub async fn next_page(&self) -> Result<(), SessionError> {
        self.send(Command::NextPage).await
    }

    pub async fn previous_page(&self) -> Result<(), SessionError> {
        self.send(Command::PreviousPage).await
    }

    pub async fn set_page_size(&self, page_size: usize) -> Result<(), SessionError> {
        self.send(|reply| Command::SetPageSize(page_size, reply)).await
    }

    /// Applies a search term immediately, cancelling pending keystrokes.
    pub async fn set_search_term(&self, term: impl Into<String>) -> Result<(), SessionError> {
        let term = term.into();
        self.send(|reply| Command::SetSearch(term, reply)).await
    }

    /// Debounced search input: only the last term typed within the debounce
    /// window is applied.
    pub async fn type_search(&self, term: impl Into<String>) -> Result<(), SessionError> {
        let term = term.into();
        self.send(|reply| Command::TypeSearch(term, reply)).await
    }

    pub async fn set_status_filters<I, S>(&self, statuses: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let statuses = statuses.into_iter().map(Into::into).collect();
        self.send(|reply| Command::SetStatuses(statuses, reply)).await
    }

    pub async fn set_name_filter(&self, names: NameFilter) -> Result<(), SessionError> {
        self.send(|reply| Command::SetNames(names, reply)).await
    }

    pub async fn retry(&self) -> Result<(), SessionError> {
        self.send(Command::Retry).await
    }

    async fn send(&self, command: impl FnOnce(Reply) -> Command) -> Result<(), SessionError> {
        let (reply, ack) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| SessionError::Closed)?;
        ack.await.map_err(|_| SessionError::Closed)?
    }
}

impl Drop for ListSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Actor<G> {
    coordinator: ListCoordinator,
    gateway: Arc<G>,
    commands: mpsc::UnboundedSender<Command>,
    publisher: watch::Sender<ListViewState>,
    debouncer: Debouncer,
    search_generation: u64,
    fetches: Vec<AbortHandle>,
}

impl<G: CandidateGateway> Actor<G> {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = inbox.recv().await {
            self.handle(command);
        }
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Load(reply) => {
                let result = self.coordinator.load().map(Some);
                self.finish(result, reply);
            }
            Command::SetPage(page, reply) => {
                let result = self.coordinator.set_page(page);
                self.finish(result, reply);
            }
            Command::NextPage(reply) => {
                let result = self.coordinator.next_page().map(Some);
                self.finish(result, reply);
            }
            Command::PreviousPage(reply) => {
                let result = self.coordinator.previous_page().map(Some);
                self.finish(result, reply);
            }
            Command::SetPageSize(page_size, reply) => {
                let result = self.coordinator.set_page_size(page_size).map(Some);
                self.finish(result, reply);
            }
            Command::SetSearch(term, reply) => {
                self.search_generation += 1;
                self.debouncer.cancel();
                let request = self.coordinator.set_search_term(term);
                self.finish(Ok(request), reply);
            }
            Command::TypeSearch(term, reply) => {
                self.search_generation += 1;
                let generation = self.search_generation;
                let commands = self.commands.clone();
                self.debouncer.schedule(async move {
                    let _ = commands.send(Command::ApplySearch { generation, term });
                });
                let _ = reply.send(Ok(()));
            }
            Command::ApplySearch { generation, term } => {
                if generation != self.search_generation {
                    debug!(generation, latest = self.search_generation, "dropping superseded search input");
                    return;
                }
                if let Some(request) = self.coordinator.set_search_term(term) {
                    self.dispatch(request);
                }
                self.publish();
            }
            Command::SetStatuses(statuses, reply) => {
                let request = self.coordinator.set_status_filters(statuses);
                self.finish(Ok(request), reply);
            }
            Command::SetNames(names, reply) => {
                let request = self.coordinator.set_name_filter(names);
                self.finish(Ok(request), reply);
            }
            Command::Retry(reply) => {
                let result = self.coordinator.retry().map(Some);
                self.finish(result, reply);
            }
            Command::Completed { id, result } => match self.coordinator.complete(id, result) {
                Completion::Applied => self.publish(),
                Completion::Stale => debug!(id = id.get(), "stale completion ignored"),
            },
        }
    }

    fn finish(&mut self, result: Result<Option<FetchRequest>, CoordinatorError>, reply: Reply) {
        let outcome = match result {
            Ok(request) => {
                if let Some(request) = request {
                    self.dispatch(request);
                }
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "command rejected");
                Err(e.into())
            }
        };
        self.publish();
        let _ = reply.send(outcome);
    }

    fn dispatch(&mut self, request: FetchRequest) {
        debug!(id = request.id.get(), page = request.page, limit = request.limit, "dispatching fetch");
        let gateway = Arc::clone(&self.gateway);
        let commands = self.commands.clone();
        let handle = tokio::spawn(async move {
            let id = request.id;
            let result = gateway.list_candidates(&request).await;
            let _ = commands.send(Command::Completed { id, result });
        });
        self.fetches.retain(|fetch| !fetch.is_finished());
        self.fetches.push(handle.abort_handle());
    }

    fn publish(&self) {
        self.publisher.send_replace(self.coordinator.view().clone());
    }
}

impl<G> Drop for Actor<G> {
    fn drop(&mut self) {
        for fetch in &self.fetches {
            fetch.abort();
        }
    }
}
