use std::sync::mpsc::{self, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use super::thread::{Msg, spawn_preview_thread};
use super::types::{PlaybackState, PreviewCmd, SnapshotHandle};

/// Public handle to the preview engine: commands go in, the snapshot handle
/// comes out. Owns the audio thread for the lifetime of the application.
pub struct PreviewPlayer {
    tx: Sender<Msg>,
    snapshot: SnapshotHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl PreviewPlayer {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<Msg>();
        let snapshot: SnapshotHandle = Arc::new(Mutex::new(PlaybackState::default()));

        let join = spawn_preview_thread(rx, tx.clone(), snapshot.clone());

        Self {
            tx,
            snapshot,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn snapshot_handle(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }

    pub fn send(&self, cmd: PreviewCmd) -> Result<(), SendError<PreviewCmd>> {
        self.tx.send(Msg::Cmd(cmd)).map_err(|SendError(msg)| {
            let Msg::Cmd(cmd) = msg else {
                unreachable!("only Msg::Cmd values enter through this sender")
            };
            SendError(cmd)
        })
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(PreviewCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Default for PreviewPlayer {
    fn default() -> Self {
        Self::new()
    }
}
