use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use log::{info, warn};

use crate::publisher::EventPublisher;
use crate::recorder::AppendLog;
use crate::sensor::SensorDriver;
use crate::telemetry::TelemetryHub;
use crate::types::{Command, CommandRequest};
use crate::utils::MonotonicClock;

pub const REPLY_TIMEOUT: Duration = Duration::from_secs(1);

/// Cooperative control loop: drain pending commands, tick, idle, repeat.
/// Returns on a `Shutdown` command or once `shutdown_signal` is set.
pub fn run_control_loop<S, P, L>(
    hub: &mut TelemetryHub<S, P, L>,
    commands: &Receiver<Command>,
    clock: &MonotonicClock,
    idle_sleep: Duration,
    shutdown_signal: &AtomicBool,
) where
    S: SensorDriver,
    P: EventPublisher,
    L: AppendLog,
{
    info!("Control loop started");

    while !shutdown_signal.load(Ordering::Relaxed) {
        loop {
            match commands.try_recv() {
                Ok(command) => {
                    if !hub.handle_command(command) {
                        shutdown_signal.store(true, Ordering::Relaxed);
                        info!("Control loop stopped at {}", crate::utils::format_uptime(clock.now_ms()));
                        return;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        hub.tick(clock.now_ms());

        if !idle_sleep.is_zero() {
            thread::sleep(idle_sleep);
        }
    }

    info!("Control loop stopped at {}", crate::utils::format_uptime(clock.now_ms()));
}

#[derive(Debug, PartialEq, Eq)]
pub enum DispatchError {
    Disconnected,
    NoReply,
}

/// Hands a request to the control loop. Returns the reply topic leaf and
/// body for requests that produce one.
pub fn dispatch(
    request: CommandRequest,
    command_sender: &Sender<Command>,
    timeout: Duration,
) -> Result<Option<(&'static str, String)>, DispatchError> {
    let simple = match request {
        CommandRequest::Arm => Some(Command::ArmRecording),
        CommandRequest::Disarm => Some(Command::DisarmRecording),
        CommandRequest::Reset { axis } => Some(Command::ResetOrientation(axis)),
        CommandRequest::Shutdown => Some(Command::Shutdown),
        CommandRequest::FetchLog | CommandRequest::Status => None,
    };

    if let Some(command) = simple {
        command_sender.send(command).map_err(|_| DispatchError::Disconnected)?;
        return Ok(None);
    }

    if request == CommandRequest::FetchLog {
        let (response_sender, response_receiver) = bounded(1);
        command_sender
            .send(Command::FetchLog { response_sender })
            .map_err(|_| DispatchError::Disconnected)?;
        let body = match response_receiver.recv_timeout(timeout).map_err(|_| DispatchError::NoReply)? {
            Ok(contents) => contents,
            Err(message) => serde_json::json!({ "error": message }).to_string(),
        };
        return Ok(Some(("log", body)));
    }

    let (response_sender, response_receiver) = bounded(1);
    command_sender
        .send(Command::GetStatus { response_sender })
        .map_err(|_| DispatchError::Disconnected)?;
    let status = response_receiver.recv_timeout(timeout).map_err(|_| DispatchError::NoReply)?;
    let body = serde_json::to_string(&status).map_err(|_| DispatchError::NoReply)?;
    Ok(Some(("status", body)))
}

/// Line-oriented command console, one JSON command per line.
/// Replies are written to `output`; ends at EOF or when the loop is gone.
pub fn run_console<R: BufRead, W: Write>(input: R, mut output: W, command_sender: Sender<Command>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Console read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let request = match CommandRequest::parse(line.as_bytes()) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invalid console command: {}", e);
                continue;
            }
        };

        match dispatch(request, &command_sender, REPLY_TIMEOUT) {
            Ok(Some((_, body))) => {
                let written = if body.ends_with('\n') {
                    write!(output, "{}", body)
                } else {
                    writeln!(output, "{}", body)
                };
                if let Err(e) = written.and_then(|_| output.flush()) {
                    warn!("Console write failed: {}", e);
                }
            }
            Ok(None) => {}
            Err(DispatchError::Disconnected) => {
                info!("Command channel disconnected, console exiting");
                break;
            }
            Err(DispatchError::NoReply) => warn!("Control loop did not answer in time"),
        }
    }
}
