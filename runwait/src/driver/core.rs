use super::command::Command;
use super::timer::TimerEntry;

use std::collections::BinaryHeap;
use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SendError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::trace;

/// Cloneable handle used to send commands to the driver thread.
#[derive(Clone)]
pub(crate) struct DriverHandle {
    sender: Sender<Command>,
}

impl DriverHandle {
    /// Sends a command to the driver.
    ///
    /// Fails only once the driver thread has exited.
    pub(crate) fn send(&self, command: Command) -> Result<(), SendError<Command>> {
        self.sender.send(command)
    }
}

/// The timer driver.
///
/// Owns a min-heap of pending timers and blocks on its command channel
/// until either a new command arrives or the earliest timer is due.
pub(crate) struct Driver {
    receiver: Receiver<Command>,
    timers: BinaryHeap<TimerEntry>,
}

impl Driver {
    /// Spawns the driver thread.
    ///
    /// Returns the handle used to talk to it and the thread's join handle.
    pub(crate) fn start(name: &str) -> io::Result<(DriverHandle, JoinHandle<()>)> {
        let (sender, receiver) = channel();

        let mut driver = Self {
            receiver,
            timers: BinaryHeap::new(),
        };

        let thread = thread::Builder::new()
            .name(format!("{name}-driver"))
            .spawn(move || driver.run())?;

        Ok((DriverHandle { sender }, thread))
    }

    fn run(&mut self) {
        trace!("timer driver started");

        loop {
            let received = match self.timers.peek() {
                Some(next) => {
                    let wait = next.deadline.saturating_duration_since(Instant::now());
                    self.receiver.recv_timeout(wait)
                }
                None => self
                    .receiver
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(Command::SetTimer {
                    deadline,
                    waker,
                    cancelled,
                }) => self.timers.push(TimerEntry {
                    deadline,
                    waker,
                    cancelled,
                }),
                Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }

            self.fire_expired(Instant::now());
        }

        trace!(pending = self.timers.len(), "timer driver stopped");
    }

    /// Wakes every timer whose deadline is at or before `now`.
    fn fire_expired(&mut self, now: Instant) {
        while self.timers.peek().is_some_and(|t| t.deadline <= now) {
            if let Some(timer) = self.timers.pop() {
                timer.fire();
            }
        }
    }
}
