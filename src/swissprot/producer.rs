use std::panic;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::trace;

use crate::error::Result;
use crate::filter::Filter;
use crate::loader::{DbLoader, SwissProtLoader};

/// Reads raw entries from a loader on its own thread and publishes them to a channel.
/// A read error is published as well and ends the stream.
pub struct Producer {
    loader: Option<SwissProtLoader>,
    filter: Option<Box<dyn Filter<str>>>,
    handle: Option<JoinHandle<()>>,
}

impl Producer {
    pub fn new(loader: SwissProtLoader, filter: Option<Box<dyn Filter<str>>>) -> Self {
        Self {
            loader: Some(loader),
            filter,
            handle: None,
        }
    }

    pub fn start(&mut self, sender: Sender<Result<String>>) {
        let (mut loader, filter) = match self.loader.take() {
            Some(loader) => (loader, self.filter.take()),
            // Already started
            None => return,
        };

        self.handle = Some(thread::spawn(move || {
            loop {
                let next = match &filter {
                    Some(filter) => loader.next_filtered_raw_entry(&**filter),
                    None => loader.next_raw_entry(),
                };

                let raw = match next {
                    Ok(Some(raw)) => Ok(raw),
                    Ok(None) => break,
                    Err(e) => Err(e),
                };
                let failed = raw.is_err();

                // The receiving side hung up, nobody is interested in the rest
                if sender.send(raw).is_err() || failed {
                    break;
                }
            }

            trace!("Producer finished");
            loader.close();
        }));
    }

    pub fn join(&mut self) {
        if let Some(h) = self.handle.take() {
            if let Err(e) = h.join() {
                panic::resume_unwind(e);
            }
        }
    }
}
