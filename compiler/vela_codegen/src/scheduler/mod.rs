//! Task runners.
//!
//! Tasks are queued with [`Scheduler::submit`] and run by
//! [`Scheduler::execute`]. No order between tasks is promised.

use rayon::prelude::*;

/// A unit of work a scheduler can run on any thread.
pub trait Task: Send {
    fn description(&self) -> String;

    fn execute(self: Box<Self>);
}

pub trait Scheduler {
    fn submit(&mut self, task: Box<dyn Task>);

    /// Run every queued task and return once all have finished.
    fn execute(&mut self);

    fn pending(&self) -> usize;
}

/// Runs queued tasks on a rayon pool.
pub struct RayonScheduler {
    pool: Option<rayon::ThreadPool>,
    queue: Vec<Box<dyn Task>>,
}

impl RayonScheduler {
    /// `jobs == 0` uses rayon's global pool.
    pub fn new(jobs: usize) -> Self {
        let pool = if jobs == 0 {
            None
        } else {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .thread_name(|index| format!("velac-codegen-{index}"))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(err) => {
                    tracing::warn!(jobs, error = %err, "falling back to the global rayon pool");
                    None
                }
            }
        };
        RayonScheduler {
            pool,
            queue: Vec::new(),
        }
    }

    pub fn num_workers(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
    }
}

impl Scheduler for RayonScheduler {
    fn submit(&mut self, task: Box<dyn Task>) {
        self.queue.push(task);
    }

    fn execute(&mut self) {
        let tasks = std::mem::take(&mut self.queue);
        let _span = tracing::debug_span!("execute", tasks = tasks.len(), workers = self.num_workers()).entered();
        let run = move || tasks.into_par_iter().for_each(|task| task.execute());
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Runs queued tasks one after another on the calling thread, in
/// submission order.
#[derive(Default)]
pub struct SequentialScheduler {
    queue: Vec<Box<dyn Task>>,
}

impl SequentialScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for SequentialScheduler {
    fn submit(&mut self, task: Box<dyn Task>) {
        self.queue.push(task);
    }

    fn execute(&mut self) {
        for task in std::mem::take(&mut self.queue) {
            tracing::trace!(task = %task.description(), "running");
            task.execute();
        }
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// One worker runs inline; anything else goes to rayon.
pub fn scheduler_for_jobs(jobs: usize) -> Box<dyn Scheduler> {
    if jobs == 1 {
        Box::new(SequentialScheduler::new())
    } else {
        Box::new(RayonScheduler::new(jobs))
    }
}
