//! Shared fixtures for the integration suites: an in-memory process host,
//! a scriptable application, and event-drain helpers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use procvisor::{
    AppFactory, AppFactoryFn, AppFault, AppRef, Application, Event, EventKind, ProcessHost, Role,
    RuntimeError, WorkerExit, WorkerHandle, WorkerSignal,
};

/// One live supervisor per process: suites in the same binary take this
/// lock so their runs do not contend for the process-wide guard.
static SERIAL: Mutex<()> = Mutex::new(());

pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// In-memory [`ProcessHost`]: records spawns and signals, lets tests crash
/// workers on demand, and optionally plays a compliant pool (workers exit
/// when terminated). Killed workers always exit.
pub struct TestHost {
    role: Role,
    cpus: usize,
    env: HashMap<String, String>,
    exit_on_terminate: bool,
    fail_spawns: AtomicUsize,
    next_pid: AtomicU32,
    attempts: AtomicUsize,
    forked: Mutex<Vec<u32>>,
    sent: Mutex<Vec<(u32, WorkerSignal)>>,
    alive: Mutex<HashMap<u32, mpsc::Sender<WorkerExit>>>,
}

impl TestHost {
    pub fn primary(cpus: usize) -> Self {
        Self {
            role: Role::Primary,
            cpus,
            env: HashMap::new(),
            exit_on_terminate: false,
            fail_spawns: AtomicUsize::new(0),
            next_pid: AtomicU32::new(100),
            attempts: AtomicUsize::new(0),
            forked: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            alive: Mutex::new(HashMap::new()),
        }
    }

    pub fn worker() -> Self {
        let mut host = Self::primary(1);
        host.role = Role::Worker;
        host
    }

    /// Sets an environment variable visible through the host.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Workers exit cooperatively when sent a terminate signal.
    pub fn exit_on_terminate(mut self) -> Self {
        self.exit_on_terminate = true;
        self
    }

    /// The first `n` spawn attempts fail.
    pub fn fail_first_spawns(self, n: usize) -> Self {
        self.fail_spawns.store(n, Ordering::SeqCst);
        self
    }

    /// Number of successfully spawned workers (cumulative).
    pub fn fork_count(&self) -> usize {
        self.forked.lock().unwrap().len()
    }

    /// Number of spawn attempts, including failed ones.
    pub fn spawn_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Signals sent to workers, in order.
    pub fn sent(&self) -> Vec<(u32, WorkerSignal)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn terminate_count(&self) -> usize {
        self.sent()
            .iter()
            .filter(|(_, s)| *s == WorkerSignal::Terminate)
            .count()
    }

    pub fn kill_count(&self) -> usize {
        self.sent()
            .iter()
            .filter(|(_, s)| *s == WorkerSignal::Kill)
            .count()
    }

    /// Workers currently alive in the simulated process table.
    pub fn alive_count(&self) -> usize {
        self.alive.lock().unwrap().len()
    }

    /// Crashes the lowest-pid live worker and returns its pid.
    pub fn crash_one(&self) -> u32 {
        let mut alive = self.alive.lock().unwrap();
        let pid = *alive.keys().min().expect("no live worker to crash");
        let tx = alive.remove(&pid).unwrap();
        let _ = tx.try_send(WorkerExit { pid });
        pid
    }

    fn exit(&self, pid: u32, alive: &mut HashMap<u32, mpsc::Sender<WorkerExit>>) {
        if let Some(tx) = alive.remove(&pid) {
            let _ = tx.try_send(WorkerExit { pid });
        }
    }
}

#[async_trait]
impl ProcessHost for TestHost {
    fn role(&self) -> Role {
        self.role
    }

    fn cpu_count(&self) -> usize {
        self.cpus
    }

    fn env_var(&self, key: &str) -> Option<String> {
        self.env.get(key).cloned()
    }

    async fn spawn_worker(
        &self,
        exits: mpsc::Sender<WorkerExit>,
    ) -> Result<WorkerHandle, RuntimeError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let remaining = self.fail_spawns.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_spawns.store(remaining - 1, Ordering::SeqCst);
            return Err(RuntimeError::SpawnFailed {
                reason: "simulated spawn failure".to_string(),
            });
        }

        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.forked.lock().unwrap().push(pid);
        self.alive.lock().unwrap().insert(pid, exits);
        Ok(WorkerHandle { pid })
    }

    fn signal_worker(&self, pid: u32, signal: WorkerSignal) {
        self.sent.lock().unwrap().push((pid, signal));

        let mut alive = self.alive.lock().unwrap();
        match signal {
            WorkerSignal::Kill => self.exit(pid, &mut alive),
            WorkerSignal::Terminate if self.exit_on_terminate => self.exit(pid, &mut alive),
            WorkerSignal::Terminate => {}
        }
    }
}

/// How the scripted application behaves when asked to shut down.
#[derive(Clone, Copy, Debug)]
pub enum ShutdownBehavior {
    Clean,
    Fault,
    Never,
    Slow(Duration),
}

/// Scriptable [`Application`] with call counters.
pub struct TestApp {
    init_fault: bool,
    behavior: ShutdownBehavior,
    pub init_calls: AtomicUsize,
    pub shutdown_calls: AtomicUsize,
    pub seen_env: Mutex<Option<String>>,
}

impl TestApp {
    pub fn new() -> Arc<Self> {
        Self::scripted(false, ShutdownBehavior::Clean)
    }

    pub fn scripted(init_fault: bool, behavior: ShutdownBehavior) -> Arc<Self> {
        Arc::new(Self {
            init_fault,
            behavior,
            init_calls: AtomicUsize::new(0),
            shutdown_calls: AtomicUsize::new(0),
            seen_env: Mutex::new(None),
        })
    }

    /// Factory whose construction itself faults.
    pub fn failing_factory() -> Arc<dyn AppFactory> {
        AppFactoryFn::arc(|_env: &str| Err(AppFault::new("constructor refused")))
    }
}

/// Factory handing out the given instance, recording the environment name
/// it was constructed with.
pub fn factory(app: &Arc<TestApp>) -> Arc<dyn AppFactory> {
    let app = Arc::clone(app);
    AppFactoryFn::arc(move |env: &str| {
        *app.seen_env.lock().unwrap() = Some(env.to_string());
        Ok(Arc::clone(&app) as AppRef)
    })
}

#[async_trait]
impl Application for TestApp {
    async fn initialize(&self) -> Result<(), AppFault> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.init_fault {
            Err(AppFault::new("init refused"))
        } else {
            Ok(())
        }
    }

    async fn shutdown(&self) -> Result<(), AppFault> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            ShutdownBehavior::Clean => Ok(()),
            ShutdownBehavior::Fault => Err(AppFault::new("shutdown refused")),
            ShutdownBehavior::Never => std::future::pending().await,
            ShutdownBehavior::Slow(d) => {
                tokio::time::sleep(d).await;
                Ok(())
            }
        }
    }
}

/// Drains every event buffered on a bus receiver into a kind list.
pub fn drain_kinds(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    kinds
}
