// Pipeline worker for running a conversion batch in a separate thread

use crossbeam_channel::Sender;
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::event::AppMsg;
use crate::pipeline::batch::{Stage, run_batch};

pub struct PipelineWorker {
    tx: Sender<AppMsg>,
}

impl PipelineWorker {
    pub fn new(tx: Sender<AppMsg>) -> Self {
        Self { tx }
    }

    /// Every event, including the final `PipelineCompleted` or `PipelineFailed`, is
    /// sent over the channel.
    pub fn start(&self, config: Config, stage: Stage) -> JoinHandle<()> {
        let tx = self.tx.clone();

        thread::spawn(move || {
            let result = run_batch(&config, stage, |msg| {
                let _ = tx.send(msg);
            });
            if let Err(e) = result {
                let _ = tx.send(AppMsg::PipelineFailed(format!("{:#}", e)));
            }
        })
    }
}
