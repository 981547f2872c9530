//! The dispatcher: consumes the live queue one operation at a time, drives
//! the process state machine, prices work on the simulated devices and writes
//! the simulation log.
//!
//! Log lines are only ever written here, in queue order. Timed operations are
//! stamped with the instant the Timer or IO task reports completion.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, instrument, trace};

use procsim_core::devices::{DeviceRegistry, HardwareProfile};
use procsim_core::queue::OperationQueue;
use procsim_core::time::Timer;
use procsim_core::{DeviceClass, OpKind, OpLabel, Operation};
use procsim_scheduler::IdentityMap;
use procsim_telemetry::MetricsRecorder;

use crate::engine::{EngineError, IoSimulator, Pcb, ProcessState, SimLog};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub operations: usize,
    pub processes: usize,
}

pub struct Dispatcher {
    registry: DeviceRegistry,
    timer: Timer,
    io: IoSimulator,
    log: SimLog,
    metrics: Arc<MetricsRecorder>,
    identity: IdentityMap,
    started: usize,
    current: Option<Pcb>,
}

impl Dispatcher {
    /// Must be called inside a Tokio runtime: the Timer task starts here.
    pub fn new(
        profile: &HardwareProfile,
        identity: IdentityMap,
        log: SimLog,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        Self {
            registry: DeviceRegistry::new(profile),
            timer: Timer::start(),
            io: IoSimulator::new(),
            log,
            metrics,
            identity,
            started: 0,
            current: None,
        }
    }

    /// Runs until the queue is closed and drained, then stops the Timer.
    #[instrument(skip_all)]
    pub async fn run(mut self, queue: &OperationQueue) -> Result<RunSummary, EngineError> {
        let mut summary = RunSummary::default();
        let outcome = async {
            while let Some(op) = queue.next().await {
                trace!(%op, "Dispatching");
                self.dispatch(op).await?;
                self.metrics.inc_operation(op.kind().code());
                summary.operations += 1;
            }
            self.log.flush()?;
            Ok::<_, EngineError>(())
        }
        .await;

        summary.processes = self.started;
        let stopped = self.timer.stop().await;
        outcome?;
        stopped?;
        debug!(?summary, lines = self.log.lines(), "Dispatcher finished");
        Ok(summary)
    }

    async fn dispatch(&mut self, op: Operation) -> Result<(), EngineError> {
        match (op.kind(), op.label()) {
            (OpKind::System, OpLabel::Begin) => self.log.write("Simulator program starting")?,
            (OpKind::System, _) => self.log.write("Simulator program ending")?,
            (OpKind::Application, OpLabel::Begin) => self.begin_process()?,
            (OpKind::Application, _) => self.finish_process(op)?,
            (OpKind::Process, _) => self.run_processor(op).await?,
            (OpKind::Memory, OpLabel::Allocate) => self.allocate_memory(op).await?,
            (OpKind::Memory, _) => self.block_memory(op).await?,
            (OpKind::Input | OpKind::Output, _) => self.perform_io(op).await?,
        }
        Ok(())
    }

    fn begin_process(&mut self) -> Result<(), EngineError> {
        if let Some(pcb) = &self.current {
            return Err(EngineError::InvalidTransition {
                process: pcb.ordinal,
                from: pcb.state(),
                to: ProcessState::Start,
            });
        }
        let ordinal = self.identity.ordinal(self.started);
        self.started += 1;
        let mut pcb = Pcb::new(ordinal);

        pcb.transition(ProcessState::Ready)?;
        self.log.write(&format!("OS: preparing process {ordinal}"))?;
        pcb.transition(ProcessState::Running)?;
        self.log.write(&format!("OS: starting process {ordinal}"))?;
        self.current = Some(pcb);
        Ok(())
    }

    fn finish_process(&mut self, op: Operation) -> Result<(), EngineError> {
        let mut pcb = self
            .current
            .take()
            .ok_or(EngineError::OperationBeforeProcessStart(op))?;
        pcb.transition(ProcessState::Exit)?;
        self.log.write(&format!("OS: removing process {}", pcb.ordinal))?;
        Ok(())
    }

    /// Display number of the running process.
    fn running(&self, op: Operation) -> Result<usize, EngineError> {
        match &self.current {
            Some(pcb) if pcb.state() == ProcessState::Running => Ok(pcb.ordinal),
            _ => Err(EngineError::OperationBeforeProcessStart(op)),
        }
    }

    async fn countdown(&mut self, class: DeviceClass, cycles: u64) -> Result<Instant, EngineError> {
        let duration = self.registry.device_time(class, cycles);
        self.metrics.observe_device_time(duration.as_secs_f64() * 1_000.0);
        Ok(self.timer.countdown(duration).await?)
    }

    async fn run_processor(&mut self, op: Operation) -> Result<(), EngineError> {
        let n = self.running(op)?;
        self.log.write(&format!("Process {n}: start processing action"))?;
        let done = self.countdown(DeviceClass::Processor, op.cycles()).await?;
        self.log
            .write_at(done, &format!("Process {n}: end processing action"))?;
        Ok(())
    }

    async fn allocate_memory(&mut self, op: Operation) -> Result<(), EngineError> {
        let n = self.running(op)?;
        self.log.write(&format!("Process {n}: allocating memory"))?;
        let done = self.countdown(DeviceClass::Memory, op.cycles()).await?;
        let address = self.registry.allocate_memory();
        self.log.write_at(
            done,
            &format!("Process {n}: memory allocated at 0x{address:08x}"),
        )?;
        Ok(())
    }

    async fn block_memory(&mut self, op: Operation) -> Result<(), EngineError> {
        let n = self.running(op)?;
        self.log.write(&format!("Process {n}: start memory blocking"))?;
        let done = self.countdown(DeviceClass::Memory, op.cycles()).await?;
        self.log
            .write_at(done, &format!("Process {n}: end memory blocking"))?;
        Ok(())
    }

    async fn perform_io(&mut self, op: Operation) -> Result<(), EngineError> {
        let n = self.running(op)?;
        let class = io_device(op)?;
        let direction = if op.kind() == OpKind::Input {
            "input"
        } else {
            "output"
        };
        let unit = match (class, self.registry.assign_unit(class)) {
            (DeviceClass::HardDrive, Some(k)) => format!(" on HDD {k}"),
            (DeviceClass::Projector, Some(k)) => format!(" on PROJ {k}"),
            _ => String::new(),
        };

        self.transition_current(ProcessState::Waiting)?;
        self.log.write(&format!(
            "Process {n}: start {} {direction}{unit}",
            op.label()
        ))?;

        let device_time = self.registry.device_time(class, op.cycles());
        self.metrics
            .observe_device_time(device_time.as_secs_f64() * 1_000.0);
        let done = self.io.perform(device_time).await?;

        self.transition_current(ProcessState::Running)?;
        self.log
            .write_at(done, &format!("Process {n}: end {} {direction}", op.label()))?;
        Ok(())
    }

    fn transition_current(&mut self, next: ProcessState) -> Result<(), EngineError> {
        match self.current.as_mut() {
            Some(pcb) => pcb.transition(next),
            None => Err(EngineError::InvalidTransition {
                process: 0,
                from: ProcessState::Exit,
                to: next,
            }),
        }
    }
}

/// Device an Input/Output operation runs on.
fn io_device(op: Operation) -> Result<DeviceClass, EngineError> {
    match op.kind() {
        OpKind::Input | OpKind::Output => op.device_class().ok_or(EngineError::NoDevice(op)),
        _ => Err(EngineError::NoDevice(op)),
    }
}
