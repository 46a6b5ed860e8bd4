//! Rodio-backed playback engine
//!
//! Output streams are not `Send`, so each handle runs a dedicated audio
//! thread owning the stream and sink. The session side talks to it over a
//! command channel and reads position/finish state from shared atomics.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, Sink};
use tracing::warn;

use super::playback::{PlaybackEngine, PlaybackHandle};

const POLL: Duration = Duration::from_millis(50);

enum Cmd {
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SetVolume(f32),
    SetRate(f32),
    Shutdown,
}

#[derive(Default)]
struct Shared {
    position_ms: AtomicU64,
    finished: AtomicBool,
}

#[derive(Default)]
pub struct RodioPlayback;

impl RodioPlayback {
    pub fn new() -> Self {
        Self
    }
}

impl PlaybackEngine for RodioPlayback {
    fn open(&self, path: &Path) -> Result<Box<dyn PlaybackHandle>> {
        let duration = crate::media::probe_duration(path)?;

        let shared = Arc::new(Shared::default());
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread_shared = Arc::clone(&shared);
        let thread_path = path.to_path_buf();
        let thread = thread::Builder::new()
            .name("wavebridge-playback".into())
            .spawn(move || audio_thread(thread_path, thread_shared, cmd_rx, ready_tx))
            .context("failed to spawn playback thread")?;

        // The thread reports whether the device and decoder came up.
        ready_rx
            .recv()
            .context("playback thread exited before initializing")??;

        Ok(Box::new(RodioHandle {
            cmd: cmd_tx,
            shared,
            duration,
            thread: Some(thread),
        }))
    }

    fn name(&self) -> &str {
        "rodio"
    }
}

struct RodioHandle {
    cmd: mpsc::Sender<Cmd>,
    shared: Arc<Shared>,
    duration: Duration,
    thread: Option<thread::JoinHandle<()>>,
}

impl PlaybackHandle for RodioHandle {
    fn play(&mut self) -> Result<()> {
        self.cmd.send(Cmd::Play).context("playback thread gone")?;
        Ok(())
    }

    fn pause(&mut self) {
        let _ = self.cmd.send(Cmd::Pause);
    }

    fn stop(&mut self) {
        let _ = self.cmd.send(Cmd::Stop);
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.cmd
            .send(Cmd::Seek(position))
            .context("playback thread gone")?;
        self.shared
            .position_ms
            .store(position.as_millis() as u64, Ordering::SeqCst);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        let _ = self.cmd.send(Cmd::SetVolume(volume));
    }

    fn set_rate(&mut self, rate: f32) {
        let _ = self.cmd.send(Cmd::SetRate(rate));
    }

    fn position(&self) -> Duration {
        Duration::from_millis(self.shared.position_ms.load(Ordering::SeqCst))
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::SeqCst)
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        let _ = self.cmd.send(Cmd::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open audio file: {}", path.display()))?;
    Decoder::new(BufReader::new(file))
        .with_context(|| format!("failed to decode audio file: {}", path.display()))
}

fn audio_thread(
    path: PathBuf,
    shared: Arc<Shared>,
    cmd_rx: mpsc::Receiver<Cmd>,
    ready_tx: mpsc::Sender<Result<()>>,
) {
    let init = (|| {
        let (stream, handle) =
            OutputStream::try_default().context("no audio output device available")?;
        let sink = Sink::try_new(&handle).context("failed to create output sink")?;
        sink.pause();
        sink.append(open_source(&path)?);
        Ok((stream, sink))
    })();

    let (_stream, sink) = match init {
        Ok(parts) => {
            let _ = ready_tx.send(Ok(()));
            parts
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    // After a natural end the sink queue is empty; Play and Seek re-append
    // a fresh decoder so loop mode can rewind and continue.
    let requeue = |sink: &Sink| {
        if sink.empty() {
            match open_source(&path) {
                Ok(source) => sink.append(source),
                Err(e) => warn!("failed to reopen source: {e:#}"),
            }
        }
    };

    let mut stopped = false;
    loop {
        match cmd_rx.recv_timeout(POLL) {
            Ok(Cmd::Play) => {
                requeue(&sink);
                sink.play();
                stopped = false;
            }
            Ok(Cmd::Pause) => sink.pause(),
            Ok(Cmd::Stop) => {
                sink.stop();
                stopped = true;
            }
            Ok(Cmd::Seek(position)) => {
                let was_empty = sink.empty();
                requeue(&sink);
                if was_empty {
                    sink.pause();
                }
                if let Err(e) = sink.try_seek(position) {
                    warn!("seek failed: {e}");
                }
            }
            Ok(Cmd::SetVolume(volume)) => sink.set_volume(volume),
            Ok(Cmd::SetRate(rate)) => sink.set_speed(rate),
            Ok(Cmd::Shutdown) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        shared
            .position_ms
            .store(sink.get_pos().as_millis() as u64, Ordering::SeqCst);
        shared
            .finished
            .store(!stopped && sink.empty(), Ordering::SeqCst);
    }
}
