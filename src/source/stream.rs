use tokio::task::JoinHandle;
use tracing::info;

/// Owned handle to one open transcript channel
///
/// The channel is consumed by a forwarding task; closing (or dropping) the
/// handle aborts that task, which drops the underlying subscription.
#[derive(Debug)]
pub struct StreamHandle {
    content_id: u64,
    task: Option<JoinHandle<()>>,
}

impl StreamHandle {
    pub fn new(content_id: u64, task: JoinHandle<()>) -> Self {
        Self {
            content_id,
            task: Some(task),
        }
    }

    pub fn content_id(&self) -> u64 {
        self.content_id
    }

    pub fn close(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            info!("Closing transcript stream for testimony {}", self.content_id);
            task.abort();
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Holds at most one live stream; opening always closes the previous one first
#[derive(Debug, Default)]
pub struct StreamSlot {
    current: Option<StreamHandle>,
}

impl StreamSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly opened stream, closing any existing one beforehand
    ///
    /// `open` is only invoked once the previous handle has been closed.
    pub fn open_with<F>(&mut self, open: F)
    where
        F: FnOnce() -> StreamHandle,
    {
        self.close();
        self.current = Some(open());
    }

    pub fn close(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn content_id(&self) -> Option<u64> {
        self.current.as_ref().map(StreamHandle::content_id)
    }
}
