//! Best-effort repository listing fetch.
//!
//! The request runs on a plain background thread; the result comes back over
//! a channel that `poll_enrichment` checks once per frame. Nothing here ever
//! blocks the frame loop.

use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

use bevy::prelude::*;
use orrery_logic::enrichment::{parse_listing, ContentSource, FetchError, RepoItem, RepoQuery};

use crate::state::Session;

type FetchResult = Result<Vec<RepoItem>, FetchError>;

/// Overall deadline for one listing request, connect through body.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking HTTP source backed by a `ureq` agent with a request deadline.
pub struct UreqSource {
    agent: ureq::Agent,
}

impl UreqSource {
    pub fn new() -> Self {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(timeout)
                .user_agent("orrery-viewer")
                .build(),
        }
    }

    fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .agent
            .get(url)
            .set("Accept", "application/vnd.github+json")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => FetchError::Status(code),
                // Timeouts surface here too.
                ureq::Error::Transport(t) => FetchError::Transport(t.to_string()),
            })?;
        response
            .into_string()
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

impl Default for UreqSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSource for UreqSource {
    fn fetch(&self, query: &RepoQuery) -> Result<Vec<RepoItem>, FetchError> {
        let body = self.get(&query.url())?;
        parse_listing(&body)
    }
}

/// Who to fetch for. `None` leaves enrichment off.
#[derive(Resource, Default)]
pub struct EnrichmentSettings {
    pub query: Option<RepoQuery>,
}

/// In-flight fetch.
#[derive(Resource, Default)]
pub struct EnrichmentTask {
    receiver: Option<Mutex<mpsc::Receiver<FetchResult>>>,
}

/// Kick off the fetch once the scene is running.
pub fn start_enrichment(
    settings: Res<EnrichmentSettings>,
    mut session: ResMut<Session>,
    mut task: ResMut<EnrichmentTask>,
) {
    let Some(query) = settings.query.clone() else {
        return;
    };
    if !session.0.startup().is_loaded() || !session.0.begin_enrichment() {
        return;
    }

    info!("Fetching repositories for {}", query.user);
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = UreqSource::new().fetch(&query);
        let _ = tx.send(result);
    });
    task.receiver = Some(Mutex::new(rx));
}

pub fn poll_enrichment(mut session: ResMut<Session>, mut task: ResMut<EnrichmentTask>) {
    let Some(receiver) = &task.receiver else {
        return;
    };
    let received = match receiver.lock() {
        Ok(rx) => match rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(FetchError::Transport(
                "fetch thread exited".to_string(),
            ))),
        },
        Err(_) => Some(Err(FetchError::Transport("fetch channel poisoned".to_string()))),
    };
    if let Some(result) = received {
        session.0.finish_enrichment(result);
        task.receiver = None;
    }
}
