//! Per-subscription serial queue.
//!
//! Jobs pushed to one [`SerialQueue`] run one at a time, in push order, on
//! the underlying worker. At most one drain job is scheduled at a time; a
//! push while draining only enqueues. A panicking job ends the drain and
//! the next push schedules a fresh one.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::worker::{Job, Worker};

#[derive(Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    draining: bool,
}

pub(crate) struct SerialQueue {
    worker: Arc<dyn Worker>,
    state: Mutex<QueueState>,
}

impl SerialQueue {
    pub(crate) fn new(worker: Arc<dyn Worker>) -> Arc<Self> {
        Arc::new(Self {
            worker,
            state: Mutex::new(QueueState::default()),
        })
    }

    pub(crate) fn push(self: &Arc<Self>, job: Job) {
        let schedule = {
            let mut state = self.state.lock();
            state.jobs.push_back(job);
            !std::mem::replace(&mut state.draining, true)
        };
        if schedule {
            let queue = Arc::clone(self);
            self.worker.execute(Box::new(move || queue.drain()));
        }
    }

    fn drain(&self) {
        let _unwind = ResetOnUnwind(&self.state);
        loop {
            let job = {
                let mut state = self.state.lock();
                match state.jobs.pop_front() {
                    Some(job) => job,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };
            job();
        }
    }
}

struct ResetOnUnwind<'a>(&'a Mutex<QueueState>);

impl Drop for ResetOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock().draining = false;
        }
    }
}
