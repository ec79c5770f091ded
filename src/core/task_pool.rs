/*
 * A task queue with exactly one worker thread, used to run blocking
 * namespace queries off the interactive thread. Jobs execute strictly in
 * submission order, which bounds concurrent use of the wrapped service to
 * one call per pool at a time; the services being wrapped are not assumed
 * to be safely reentrant across threads.
 *
 * The pool accepts optional init/teardown hooks that run once on the worker
 * thread, bracketing its lifetime. That is where a platform adapter sets up
 * whatever thread-affine context its blocking calls require.
 *
 * Workers never mutate tree state. A job delivers its payload through
 * whatever channel it captured and then posts a message for the interactive
 * thread; everything else happens at message-consumption time.
 */
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::Arc;
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug)]
pub enum TaskPoolError {
    /// The worker thread could not be spawned.
    Spawn(io::Error),
    /// The pool has been shut down; the job was not enqueued.
    ShutDown,
}

impl std::fmt::Display for TaskPoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPoolError::Spawn(e) => write!(f, "Failed to spawn pool worker: {e}"),
            TaskPoolError::ShutDown => write!(f, "Task pool is shut down"),
        }
    }
}

impl std::error::Error for TaskPoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaskPoolError::Spawn(e) => Some(e),
            TaskPoolError::ShutDown => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskPoolError>;

pub struct TaskPool {
    name: &'static str,
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    draining: Arc<AtomicBool>,
}

impl TaskPool {
    pub fn new(name: &'static str) -> Result<Self> {
        Self::with_context(name, || {}, || {})
    }

    /*
     * Creates a pool whose worker runs `init` before its first job and
     * `teardown` after the queue closes. Both hooks run on the worker
     * thread itself.
     */
    pub fn with_context<I, T>(name: &'static str, init: I, teardown: T) -> Result<Self>
    where
        I: FnOnce() + Send + 'static,
        T: FnOnce() + Send + 'static,
    {
        let (sender, receiver): (Sender<Job>, Receiver<Job>) = channel();
        let draining = Arc::new(AtomicBool::new(false));
        let drain_flag = Arc::clone(&draining);

        let worker = std::thread::Builder::new()
            .name(format!("{name}-worker"))
            .spawn(move || {
                init();
                while let Ok(job) = receiver.recv() {
                    // Queued-but-unstarted work is discarded once a drain
                    // begins; the job's completion message is never posted.
                    if drain_flag.load(Ordering::Acquire) {
                        continue;
                    }
                    job();
                }
                teardown();
            })
            .map_err(TaskPoolError::Spawn)?;

        log::debug!("TaskPool '{name}': worker started.");
        Ok(TaskPool {
            name,
            sender: Some(sender),
            worker: Some(worker),
            draining,
        })
    }

    /// Enqueues a job for FIFO execution on the worker thread.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.sender {
            Some(sender) => sender
                .send(Box::new(job))
                .map_err(|_| TaskPoolError::ShutDown),
            None => Err(TaskPoolError::ShutDown),
        }
    }

    /// Marks the queue as draining: jobs not yet started will be skipped.
    /// The job currently executing, if any, runs to completion.
    pub fn begin_drain(&self) {
        self.draining.store(true, Ordering::Release);
    }

    /*
     * Drains and stops the pool: queued jobs are discarded, the in-flight
     * job (if any) finishes, and the worker thread is joined. Safe to call
     * more than once.
     */
    pub fn shutdown(&mut self) {
        self.begin_drain();
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("TaskPool '{}': worker panicked before shutdown.", self.name);
            } else {
                log::debug!("TaskPool '{}': worker joined.", self.name);
            }
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
