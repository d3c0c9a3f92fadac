use std::panic;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::error::Result;
use crate::swissprot::fasta::render_fasta;
use crate::swissprot::parser::RecordParser;

/// A Consumer runs in a thread and constantly listens to a Receiver channel for raw entries,
/// publishing their FASTA rendering to a Sender channel
pub struct Consumer {
    handle: Option<JoinHandle<()>>,
}

impl Consumer {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn start(
        &mut self,
        parser: RecordParser,
        wrap: bool,
        receiver: Receiver<Result<String>>,
        sender: Sender<Result<String>>,
    ) {
        self.handle = Some(thread::spawn(move || {
            for raw in receiver {
                let fasta = raw.and_then(|raw| {
                    let record = parser.parse(&raw)?;
                    render_fasta(&record, wrap)
                });

                if sender.send(fasta).is_err() {
                    break;
                }
            }
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

impl Default for Consumer {
    fn default() -> Self {
        Self::new()
    }
}
