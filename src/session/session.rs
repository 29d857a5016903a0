use super::config::SessionConfig;
use crate::error::{FetchError, StreamError};
use crate::playback::{PlaybackSignal, ScrollArbiter, ScrollCommand, ScrollInput};
use crate::source::{StreamHandle, StreamSlot, TranscriptInfo, TranscriptSource};
use crate::transcript::TokenId;
use crate::view::{Command, FetchPurpose, TranscriptViewModel, ViewSnapshot};
use anyhow::{anyhow, Context, Result};
use futures::stream::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Everything the session task reacts to
enum SessionEvent {
    // Host requests
    Load {
        content_id: u64,
        known_duration: Option<f64>,
    },
    Unload,
    Retry,
    Tick {
        signal: PlaybackSignal,
        reply: oneshot::Sender<Option<ScrollCommand>>,
    },
    Scroll(ScrollInput),
    Seek {
        time_seconds: f64,
        reply: oneshot::Sender<Option<f64>>,
    },
    SeekToken {
        token: TokenId,
        reply: oneshot::Sender<Option<f64>>,
    },
    MediaDuration(f64),
    Shutdown {
        done: oneshot::Sender<()>,
    },

    // Results of work the session started
    FetchDone {
        generation: u64,
        purpose: FetchPurpose,
        result: Result<TranscriptInfo, FetchError>,
    },
    StreamPayload {
        generation: u64,
        payload: Vec<u8>,
    },
    StreamClosed {
        generation: u64,
        error: Option<StreamError>,
    },
}

/// One read-along view, driven by a single task
///
/// The task owns the `TranscriptViewModel`, the open stream (at most one) and
/// the pending fetches. Every mutation happens on that task, in the order
/// events arrive on its channel. The task stops on `shutdown` or once every
/// handle has been dropped.
pub struct ReadAlongSession {
    view_id: Uuid,
    source: Arc<dyn TranscriptSource>,
    model: TranscriptViewModel,
    stream: StreamSlot,
    pending_fetches: Vec<JoinHandle<()>>,
    events_tx: mpsc::WeakSender<SessionEvent>,
    events_rx: mpsc::Receiver<SessionEvent>,
    snapshot_tx: watch::Sender<ViewSnapshot>,
    last_published_highlight: Option<TokenId>,
}

impl ReadAlongSession {
    /// Start a session task and return a handle to it
    pub fn spawn(source: Arc<dyn TranscriptSource>, config: SessionConfig) -> ReadAlongHandle {
        let view_id = Uuid::new_v4();
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer.max(1));
        let model = TranscriptViewModel::new(ScrollArbiter::new(config.suppression()));
        let (snapshot_tx, snapshot_rx) = watch::channel(model.snapshot());

        info!(
            "Creating read-along session {} (source: {})",
            view_id,
            source.name()
        );

        let session = Self {
            view_id,
            source,
            model,
            stream: StreamSlot::new(),
            pending_fetches: Vec::new(),
            events_tx: events_tx.downgrade(),
            events_rx,
            snapshot_tx,
            last_published_highlight: None,
        };
        tokio::spawn(session.run());

        ReadAlongHandle {
            view_id,
            tx: events_tx,
            snapshot_rx,
        }
    }

    async fn run(mut self) {
        debug!("Read-along session {} task started", self.view_id);

        while let Some(event) = self.events_rx.recv().await {
            if let SessionEvent::Shutdown { done } = event {
                // Refuse further requests before acknowledging
                self.events_rx.close();
                self.teardown();
                let _ = done.send(());
                break;
            }
            self.handle(event);
        }

        self.teardown();
        info!("Read-along session {} stopped", self.view_id);
    }

    fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Load {
                content_id,
                known_duration,
            } => {
                let commands = self.model.load(content_id, known_duration);
                self.execute(commands);
                self.publish();
            }
            SessionEvent::Unload => {
                let commands = self.model.unload();
                self.execute(commands);
                self.publish();
            }
            SessionEvent::Retry => {
                let commands = self.model.retry();
                self.execute(commands);
                self.publish();
            }
            SessionEvent::Tick { signal, reply } => {
                let command = self.model.tick(signal, now());
                if self.model.highlighted_id() != self.last_published_highlight {
                    self.publish();
                }
                let _ = reply.send(command);
            }
            SessionEvent::Scroll(input) => {
                self.model.on_scroll_input(input, now());
            }
            SessionEvent::Seek {
                time_seconds,
                reply,
            } => {
                let _ = reply.send(self.model.seek(time_seconds));
            }
            SessionEvent::SeekToken { token, reply } => {
                let _ = reply.send(self.model.seek_to_token(token));
            }
            SessionEvent::MediaDuration(seconds) => {
                self.model.set_media_duration(seconds);
                self.publish();
            }
            SessionEvent::FetchDone {
                generation,
                purpose,
                result,
            } => {
                let commands = self.model.on_fetch_result(generation, purpose, result);
                self.execute(commands);
                self.publish();
            }
            SessionEvent::StreamPayload {
                generation,
                payload,
            } => {
                let commands = self.model.on_stream_payload(generation, &payload);
                self.execute(commands);
                self.publish();
            }
            SessionEvent::StreamClosed { generation, error } => {
                let commands = self.model.on_stream_closed(generation, error);
                self.execute(commands);
                self.publish();
            }
            SessionEvent::Shutdown { .. } => {}
        }
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Teardown => self.teardown(),
                Command::CloseStream => self.stream.close(),
                Command::Fetch {
                    generation,
                    content_id,
                    purpose,
                } => self.spawn_fetch(generation, content_id, purpose),
                Command::OpenStream {
                    generation,
                    content_id,
                } => self.open_stream(generation, content_id),
            }
        }
    }

    /// Close the stream and cancel any fetch still in flight
    fn teardown(&mut self) {
        self.stream.close();
        for task in self.pending_fetches.drain(..) {
            task.abort();
        }
    }

    fn spawn_fetch(&mut self, generation: u64, content_id: u64, purpose: FetchPurpose) {
        let tx = self.events_tx.clone();
        let source = Arc::clone(&self.source);

        debug!(
            "Fetching transcript for testimony {} ({:?}, generation {})",
            content_id, purpose, generation
        );

        self.pending_fetches.retain(|task| !task.is_finished());
        self.pending_fetches.push(tokio::spawn(async move {
            let result = source.fetch_transcript(content_id).await;
            deliver(
                &tx,
                SessionEvent::FetchDone {
                    generation,
                    purpose,
                    result,
                },
            )
            .await;
        }));
    }

    fn open_stream(&mut self, generation: u64, content_id: u64) {
        let tx = self.events_tx.clone();
        let source = Arc::clone(&self.source);

        // The slot closes any previous stream before this task is spawned
        self.stream.open_with(move || {
            let task = tokio::spawn(async move {
                let mut stream = match source.open_stream(content_id).await {
                    Ok(stream) => stream,
                    Err(e) => {
                        let event = SessionEvent::StreamClosed {
                            generation,
                            error: Some(e),
                        };
                        deliver(&tx, event).await;
                        return;
                    }
                };

                info!("Transcript stream task started for testimony {}", content_id);

                while let Some(payload) = stream.next().await {
                    let event = SessionEvent::StreamPayload {
                        generation,
                        payload,
                    };
                    if !deliver(&tx, event).await {
                        debug!("Session gone; dropping stream for testimony {}", content_id);
                        return;
                    }
                }

                let event = SessionEvent::StreamClosed {
                    generation,
                    error: None,
                };
                deliver(&tx, event).await;
            });
            StreamHandle::new(content_id, task)
        });
    }

    fn publish(&mut self) {
        let snapshot = self.model.snapshot();
        self.last_published_highlight = snapshot.highlighted;
        self.snapshot_tx.send_replace(snapshot);
    }
}

/// Send from a worker task without keeping the session alive
///
/// Workers only hold weak senders, so the session ends once every
/// `ReadAlongHandle` is dropped. Returns `false` when it is gone.
async fn deliver(tx: &mpsc::WeakSender<SessionEvent>, event: SessionEvent) -> bool {
    match tx.upgrade() {
        Some(tx) => tx.send(event).await.is_ok(),
        None => false,
    }
}

/// Tokio's clock, so paused-time tests drive scroll suppression too
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Cloneable handle for talking to a `ReadAlongSession`
#[derive(Clone)]
pub struct ReadAlongHandle {
    view_id: Uuid,
    tx: mpsc::Sender<SessionEvent>,
    snapshot_rx: watch::Receiver<ViewSnapshot>,
}

impl ReadAlongHandle {
    pub fn view_id(&self) -> Uuid {
        self.view_id
    }

    /// Switch the view to a content identifier (tears down the previous one)
    pub async fn load(&self, content_id: u64, known_duration: Option<f64>) -> Result<()> {
        self.send(SessionEvent::Load {
            content_id,
            known_duration,
        })
        .await
    }

    pub async fn unload(&self) -> Result<()> {
        self.send(SessionEvent::Unload).await
    }

    pub async fn retry(&self) -> Result<()> {
        self.send(SessionEvent::Retry).await
    }

    /// Report a playback clock reading; returns a scroll command if one is due
    pub async fn tick(&self, signal: PlaybackSignal) -> Result<Option<ScrollCommand>> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionEvent::Tick { signal, reply }).await?;
        rx.await.context("Session dropped tick reply")
    }

    pub async fn scroll_input(&self, input: ScrollInput) -> Result<()> {
        self.send(SessionEvent::Scroll(input)).await
    }

    /// Validate a seek; the returned time is what the player should jump to
    pub async fn seek(&self, time_seconds: f64) -> Result<Option<f64>> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionEvent::Seek {
            time_seconds,
            reply,
        })
        .await?;
        rx.await.context("Session dropped seek reply")
    }

    /// Seek target for a clicked token
    pub async fn seek_to_token(&self, token: TokenId) -> Result<Option<f64>> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionEvent::SeekToken { token, reply }).await?;
        rx.await.context("Session dropped seek reply")
    }

    pub async fn set_media_duration(&self, seconds: f64) -> Result<()> {
        self.send(SessionEvent::MediaDuration(seconds)).await
    }

    /// Latest published view state
    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that changes whenever the view state does
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Stop the session: closes the stream and cancels pending fetches
    pub async fn shutdown(&self) -> Result<()> {
        let (done, rx) = oneshot::channel();
        self.send(SessionEvent::Shutdown { done }).await?;
        rx.await.context("Session stopped before acknowledging shutdown")
    }

    async fn send(&self, event: SessionEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| anyhow!("Read-along session {} is no longer running", self.view_id))
    }
}
