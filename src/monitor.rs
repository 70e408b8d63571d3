use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;

use log::{debug, info, warn};

use crate::midi_io::{is_present, MidiHost};
use crate::Config;

/// A change in whether the device is reachable
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum ConnectionChange {
    /// The device is gone (or was never there, on the first check)
    Lost,
    /// The device came back after having been lost
    Restored,
}

/// Polls a host for the device and reports when it disappears or comes back.
///
/// The monitor never touches an open connection. When the device is restored, reconnect and force
/// a full repaint: what the device shows after being replugged is unknown.
#[derive(Debug, Clone)]
pub struct ConnectionMonitor {
    keyword: String,
    present: Option<bool>,
}

impl ConnectionMonitor {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            present: None,
        }
    }

    /// The presence seen on the last check, or `None` if there was none yet
    pub fn is_present(&self) -> Option<bool> {
        self.present
    }

    /// Look for the device once. Reports `Lost` if it's absent on the very first check, so that
    /// the caller can show a not-connected state right away.
    pub fn check<H: MidiHost + ?Sized>(&mut self, host: &H) -> Option<ConnectionChange> {
        let present = is_present(host, &self.keyword);
        let previous = self.present.replace(present);

        match (previous, present) {
            (None, false) | (Some(true), false) => {
                warn!("{:?} is not connected", self.keyword);
                Some(ConnectionChange::Lost)
            }
            (Some(false), true) => {
                info!("{:?} is connected again", self.keyword);
                Some(ConnectionChange::Restored)
            }
            _ => None,
        }
    }

    /// Check `host` every `config.poll_interval` on a background thread and call `callback` on
    /// every change. The thread stops when the returned handle is dropped.
    pub fn spawn<H, F>(config: &Config, host: H, mut callback: F) -> MonitorHandle
    where
        H: MidiHost + Send + 'static,
        F: FnMut(ConnectionChange) + Send + 'static,
    {
        let mut monitor = Self::new(config.device_keyword.clone());
        let interval = config.poll_interval;
        let (stop_sender, stop_receiver) = mpsc::channel::<()>();

        let thread = std::thread::spawn(move || loop {
            if let Some(change) = monitor.check(&host) {
                (callback)(change);
            }

            match stop_receiver.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("connection monitor stopped");
                    return;
                }
            }
        });

        MonitorHandle {
            stop_sender: Some(stop_sender),
            thread: Some(thread),
        }
    }
}

/// Keeps a [`ConnectionMonitor::spawn`]ed thread running
#[must_use = "If not saved, the monitor thread will be immediately stopped"]
pub struct MonitorHandle {
    stop_sender: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        // dropping the sender wakes the thread up
        self.stop_sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("connection monitor callback panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockHost;
    use std::time::Duration;

    const NAME: &str = "APC mini mk2 Control";

    #[test]
    fn reports_transitions_only() {
        let host = MockHost::with_device(NAME);
        let mut monitor = ConnectionMonitor::new("APC mini mk2 Contr");
        assert_eq!(monitor.is_present(), None);

        assert_eq!(monitor.check(&host), None);
        assert_eq!(monitor.check(&host), None);
        assert_eq!(monitor.is_present(), Some(true));

        host.set_ports(vec![], vec![]);
        assert_eq!(monitor.check(&host), Some(ConnectionChange::Lost));
        assert_eq!(monitor.check(&host), None);

        host.set_ports(vec![NAME.to_owned()], vec![NAME.to_owned()]);
        assert_eq!(monitor.check(&host), Some(ConnectionChange::Restored));
        assert_eq!(monitor.check(&host), None);
    }

    #[test]
    fn absent_on_first_check_is_lost() {
        let host = MockHost::new(vec![], vec![]);
        let mut monitor = ConnectionMonitor::new("APC mini mk2 Contr");
        assert_eq!(monitor.check(&host), Some(ConnectionChange::Lost));
        assert_eq!(monitor.is_present(), Some(false));
    }

    #[test]
    fn spawned_monitor_reports_and_stops() {
        let host = MockHost::new(vec![], vec![]);
        let config = Config::default().with_poll_interval(Duration::from_millis(5));
        let (sender, receiver) = mpsc::channel();

        let handle = ConnectionMonitor::spawn(&config, host.clone(), move |change| {
            let _ = sender.send(change);
        });
        assert_eq!(
            receiver.recv_timeout(Duration::from_secs(5)),
            Ok(ConnectionChange::Lost)
        );

        host.set_ports(vec![NAME.to_owned()], vec![NAME.to_owned()]);
        assert_eq!(
            receiver.recv_timeout(Duration::from_secs(5)),
            Ok(ConnectionChange::Restored)
        );

        drop(handle);
        // the thread is joined, so the callback and its sender are gone
        assert_eq!(
            receiver.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Disconnected)
        );
    }
}
