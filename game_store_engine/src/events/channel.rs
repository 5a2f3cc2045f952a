//! A small pub-sub channel for engine events.
//!
//! An [`EventHandler`] owns a handler function and the receiving end of a bounded channel. Any number of
//! [`EventProducer`]s can be subscribed to it. Each event is handled on its own task, so a slow handler never blocks
//! a publisher beyond the channel's buffer. The handler shuts down once every producer has been dropped and all
//! in-flight events have been handled.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    receiver: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        Self { receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer { sender: self.sender.clone() }
    }

    /// Runs until the last producer is dropped, then waits for in-flight events to finish.
    pub async fn start_handler(self) {
        let Self { mut receiver, sender, handler } = self;
        // Only producers may keep the channel open
        drop(sender);
        debug!("📬️ Event handler started");
        let mut jobs = JoinSet::new();
        loop {
            tokio::select! {
                event = receiver.recv() => match event {
                    Some(event) => {
                        let handler = Arc::clone(&handler);
                        jobs.spawn(async move { (handler)(event).await });
                    },
                    None => break,
                },
                Some(result) = jobs.join_next(), if !jobs.is_empty() => {
                    if let Err(e) = result {
                        warn!("📬️ An event handler job failed. {e}");
                    }
                },
            }
        }
        debug!("📬️ All producers are gone. Waiting for {} event jobs to complete", jobs.len());
        while let Some(result) = jobs.join_next().await {
            if let Err(e) = result {
                warn!("📬️ An event handler job failed. {e}");
            }
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to publish event. The handler has shut down. {e}");
        }
    }
}
