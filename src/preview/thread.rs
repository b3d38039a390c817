//! The preview audio thread.
//!
//! Owns the output stream and the controller; processes commands, load
//! completions and faults strictly in arrival order, and runs the
//! controller's tick between messages.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use log::debug;
use rodio::OutputStreamBuilder;

use super::controller::{BackendEvent, Controller};
use super::sink::{LoadedSource, RodioBackend};
use super::types::{PreviewCmd, SnapshotHandle};

const TICK: Duration = Duration::from_millis(200);

pub(super) enum Msg {
    Cmd(PreviewCmd),
    Loaded {
        generation: u64,
        result: Result<LoadedSource, String>,
    },
    Fault {
        message: String,
    },
}

pub(super) fn spawn_preview_thread(
    rx: Receiver<Msg>,
    tx: Sender<Msg>,
    snapshot: SnapshotHandle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = OutputStreamBuilder::open_default_stream().expect("ERR: No audio output device");
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        let mut stream = stream;
        stream.log_on_drop(false);

        let backend = RodioBackend::new(&stream, tx);
        let mut controller = Controller::new(backend, snapshot);

        loop {
            match rx.recv_timeout(TICK) {
                Ok(Msg::Cmd(PreviewCmd::Quit { fade_out_ms })) => {
                    controller.quit(Duration::from_millis(fade_out_ms));
                    break;
                }
                Ok(Msg::Cmd(cmd)) => controller.handle_cmd(cmd),
                Ok(Msg::Loaded { generation, result }) => {
                    if !controller.is_current(generation) {
                        // A newer play superseded this load; its resource
                        // must not touch state.
                        debug!("dropping stale load result (generation {generation})");
                        continue;
                    }
                    match result {
                        Ok(loaded) => {
                            let duration = loaded.duration;
                            controller.backend_mut().attach(loaded);
                            controller.handle_event(BackendEvent::Loaded {
                                generation,
                                duration,
                            });
                        }
                        Err(message) => {
                            controller.handle_event(BackendEvent::LoadFailed {
                                generation,
                                message,
                            });
                        }
                    }
                }
                Ok(Msg::Fault { message }) => {
                    controller.handle_event(BackendEvent::Fault { message });
                }
                Err(RecvTimeoutError::Timeout) => controller.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
