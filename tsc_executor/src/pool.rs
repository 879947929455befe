//! Bounded worker pool.
//!
//! Explicit thread ownership (spawn, communicate over a
//! `crossbeam_channel`, join on teardown) generalized from one
//! producer/consumer pair to an N-worker
//! pool reading a shared job queue. Workers are spawned lazily on first
//! use and torn down by an explicit, idempotent `shutdown`.

use std::sync::Mutex;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Inner {
    sender: Option<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

pub struct WorkerPool {
    threads: usize,
    inner: Mutex<Inner>,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    fn sender(&self) -> Sender<Job> {
        let mut inner = self.inner.lock().expect("pool mutex poisoned");
        if let Some(sender) = &inner.sender {
            return sender.clone();
        }
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        for idx in 0..self.threads {
            let rx = rx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("tsc-worker-{idx}"))
                .spawn(move || {
                    for job in rx.iter() {
                        job();
                    }
                    tracing::trace!(worker = idx, "worker thread exiting cleanly");
                })
                .expect("failed to spawn worker thread");
            inner.handles.push(handle);
        }
        tracing::debug!(threads = self.threads, "worker pool started");
        inner.sender = Some(tx.clone());
        tx
    }

    fn submit(&self, job: Job) {
        let sender = self.sender();
        let _ = sender.send(job);
    }

    /// Run `f(index, item)` for every item, at most `threads()`
    /// concurrently, and return the results in input order.
    pub fn map<I, T, F>(&self, items: Vec<I>, f: F) -> Vec<T>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(usize, I) -> T + Send + Sync + 'static,
    {
        let n = items.len();
        if n == 0 {
            return Vec::new();
        }
        if self.threads == 1 {
            return items.into_iter().enumerate().map(|(i, item)| f(i, item)).collect();
        }

        let f = std::sync::Arc::new(f);
        let results: std::sync::Arc<Vec<Mutex<Option<T>>>> =
            std::sync::Arc::new((0..n).map(|_| Mutex::new(None)).collect());
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(n);

        for (i, item) in items.into_iter().enumerate() {
            let f = std::sync::Arc::clone(&f);
            let results = std::sync::Arc::clone(&results);
            let done_tx = done_tx.clone();
            self.submit(Box::new(move || {
                let out = f(i, item);
                *results[i].lock().expect("result mutex poisoned") = Some(out);
                let _ = done_tx.send(());
            }));
        }
        drop(done_tx);
        for _ in 0..n {
            let _ = done_rx.recv();
        }

        (0..n)
            .map(|i| {
                results[i]
                    .lock()
                    .expect("result mutex poisoned")
                    .take()
                    .expect("every submitted job produced a result")
            })
            .collect()
    }

    /// Close the job queue and join every worker thread. Safe to call more
    /// than once (a pool that was never started joins nothing).
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock().expect("pool mutex poisoned");
        inner.sender = None;
        let handles = std::mem::take(&mut inner.handles);
        drop(inner);
        for handle in handles {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "worker thread panicked during shutdown");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
