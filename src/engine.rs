// src/engine.rs
use crate::drivers::{
    available_ports, open_port, resolve_port, ByteSource, Channel, ChannelPipeline, PortSettings,
    SerialSource, SimulatedSource,
};
use crate::types::*;
use log::{debug, info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long a reader sleeps when its port had nothing buffered.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5);
/// Pace of the generated stream in simulation mode.
const SIM_INTERVAL: Duration = Duration::from_millis(120);
const COMMAND_WAIT: Duration = Duration::from_millis(50);

/// Reader thread for one connected port. It is the only producer for its channel.
pub struct PortWorker {
    channel: Channel,
    session: SessionId,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PortWorker {
    pub fn spawn<S: ByteSource + 'static>(
        channel: Channel,
        session: SessionId,
        source: S,
        tx: Sender<ScopeMessage>,
        poll_interval: Duration,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let mut pipeline = ChannelPipeline::new(channel, source);
            debug!("{channel}: reader started on {}", pipeline.source_name());
            while !stop_flag.load(Ordering::Acquire) {
                match pipeline.pump_once() {
                    Ok(Some(chunk)) => {
                        trace!("{channel}: {} bits in {:?}", chunk.bits.len(), chunk.text);
                        let msg = ScopeMessage::Chunk {
                            channel,
                            session,
                            chunk,
                        };
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => thread::sleep(poll_interval),
                    Err(err) => {
                        warn!("{channel}: read from {} failed: {err}", pipeline.source_name());
                        tx.send(ScopeMessage::Disconnected {
                            channel,
                            session,
                            reason: Some(err.to_string()),
                        })
                        .ok();
                        break;
                    }
                }
            }
            let (chunks, bits) = pipeline.totals();
            debug!("{channel}: reader stopped after {chunks} chunks / {bits} bits");
        });
        Self {
            channel,
            session,
            stop,
            handle: Some(handle),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// True once the thread has exited on its own (read error or GUI gone).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Blocks until the reader has exited; nothing is sent for this session afterwards.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("{}: reader thread panicked", self.channel);
            }
        }
    }
}

impl Drop for PortWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Command handler behind the GUI: owns one optional worker per channel.
pub struct Engine {
    tx: Sender<ScopeMessage>,
    workers: [Option<PortWorker>; 2],
    next_session: SessionId,
    poll_interval: Duration,
}

impl Engine {
    pub fn new(tx: Sender<ScopeMessage>) -> Self {
        Self {
            tx,
            workers: [None, None],
            next_session: 1,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn handle(&mut self, cmd: GuiCommand) {
        match cmd {
            GuiCommand::Connect {
                channel,
                mode,
                settings,
            } => self.connect(channel, mode, &settings),
            GuiCommand::Disconnect(channel) => self.disconnect(channel),
            GuiCommand::RefreshPorts => self.refresh_ports(),
        }
    }

    /// Starts a reader for `channel` on an already opened source.
    pub fn attach<S: ByteSource + 'static>(
        &mut self,
        channel: Channel,
        source: S,
    ) -> SessionId {
        self.disconnect(channel);
        let session = self.next_session;
        self.next_session += 1;
        let port = source.name().to_string();
        info!("{channel}: connected to {port} (session {session})");
        // Announce before the reader can produce anything.
        self.send(ScopeMessage::Connected {
            channel,
            session,
            port,
        });
        let worker = PortWorker::spawn(
            channel,
            session,
            source,
            self.tx.clone(),
            self.poll_interval,
        );
        self.workers[channel.index()] = Some(worker);
        session
    }

    /// Drops workers whose thread already exited; they reported why themselves.
    pub fn reap_finished(&mut self) {
        for slot in &mut self.workers {
            if slot.as_ref().is_some_and(PortWorker::is_finished) {
                slot.take();
            }
        }
    }

    fn connect(&mut self, channel: Channel, mode: ConnectionMode, settings: &PortSettings) {
        self.disconnect(channel);
        match mode {
            ConnectionMode::Simulation => {
                let name = format!("SIM-{}", channel.index() + 1);
                self.attach(channel, SimulatedSource::new(name, SIM_INTERVAL));
            }
            ConnectionMode::Hardware => {
                let opened = resolve_port(&settings.port_name, &available_ports())
                    .and_then(|_| open_port(settings));
                match opened {
                    Ok(port) => {
                        self.attach(channel, SerialSource::new(&settings.port_name, port));
                    }
                    Err(err) => {
                        warn!("{channel}: connect to {:?} failed: {err}", settings.port_name);
                        self.send(ScopeMessage::ConnectFailed {
                            channel,
                            error: err.to_string(),
                        });
                    }
                }
            }
        }
    }

    fn disconnect(&mut self, channel: Channel) {
        let Some(worker) = self.workers[channel.index()].take() else {
            return;
        };
        let session = worker.session();
        worker.stop();
        info!("{channel}: disconnected (session {session})");
        self.send(ScopeMessage::Disconnected {
            channel,
            session,
            reason: None,
        });
    }

    fn refresh_ports(&mut self) {
        let ports = available_ports();
        debug!("ports scanned: {ports:?}");
        self.send(ScopeMessage::Ports(ports));
    }

    fn send(&self, msg: ScopeMessage) {
        self.tx.send(msg).ok();
    }
}

pub fn spawn_thread(tx: Sender<ScopeMessage>, rx_cmd: Receiver<GuiCommand>) {
    thread::spawn(move || {
        tx.send(ScopeMessage::Log("Scope engine ready.".to_owned())).ok();
        let mut engine = Engine::new(tx);
        engine.refresh_ports();
        loop {
            match rx_cmd.recv_timeout(COMMAND_WAIT) {
                Ok(cmd) => engine.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            engine.reap_finished();
        }
        debug!("command channel closed, engine exiting");
    });
}
