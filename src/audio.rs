//! Audio seam and the shipped rodio backend.
//!
//! The core fires effect and music cues and never waits on them. Effects are
//! decoded from in-memory buffers so playback never touches the disk
//! mid-frame; music streams from file and loops until stopped.

use log::warn;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

/// Short one-shot cues fired by the movement machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Move,
    Turn,
    WallBump,
}

/// Looping background tracks, one per game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicTrack {
    Dungeon,
    Battle,
}

/// Fire-and-forget audio out. The core never consumes a completion signal.
pub trait AudioSink {
    fn play_effect(&mut self, effect: SoundEffect);
    fn play_music(&mut self, track: MusicTrack);
    fn stop_music(&mut self, track: MusicTrack);
}

/// Sink that swallows every cue. Used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_effect(&mut self, _effect: SoundEffect) {}
    fn play_music(&mut self, _track: MusicTrack) {}
    fn stop_music(&mut self, _track: MusicTrack) {}
}

/// rodio-backed sink. Missing output device degrades to silence with a
/// warning; cue playback itself never fails the caller.
pub struct RodioAudio {
    // The stream must outlive every sink created from its handle.
    _stream: Option<OutputStream>,
    handle: Option<OutputStreamHandle>,
    effects: HashMap<SoundEffect, (Vec<u8>, f32)>,
    music: HashMap<MusicTrack, (PathBuf, f32)>,
    playing: HashMap<MusicTrack, Sink>,
}

impl RodioAudio {
    pub fn new() -> Self {
        let (stream, handle) = match OutputStream::try_default() {
            Ok((stream, handle)) => (Some(stream), Some(handle)),
            Err(e) => {
                warn!("no audio output device ({e}), sound disabled");
                (None, None)
            }
        };
        Self {
            _stream: stream,
            handle,
            effects: HashMap::new(),
            music: HashMap::new(),
            playing: HashMap::new(),
        }
    }

    /// Buffer an effect file in memory. Volume 1.0 is unity gain.
    pub fn load_effect(
        &mut self,
        effect: SoundEffect,
        path: &Path,
        volume: f32,
    ) -> Result<(), String> {
        let bytes = std::fs::read(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        // Decode once up front so a bad file fails at load, not mid-play
        Decoder::new(Cursor::new(bytes.clone()))
            .map_err(|e| format!("Failed to decode {}: {}", path.display(), e))?;
        self.effects.insert(effect, (bytes, volume));
        Ok(())
    }

    /// Register a music file to stream on demand.
    pub fn load_music(
        &mut self,
        track: MusicTrack,
        path: &Path,
        volume: f32,
    ) -> Result<(), String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
        Decoder::new(BufReader::new(file))
            .map_err(|e| format!("Failed to decode {}: {}", path.display(), e))?;
        self.music.insert(track, (path.to_path_buf(), volume));
        Ok(())
    }
}

impl Default for RodioAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for RodioAudio {
    fn play_effect(&mut self, effect: SoundEffect) {
        let Some(handle) = &self.handle else { return };
        let Some((bytes, volume)) = self.effects.get(&effect) else {
            return;
        };
        let Ok(source) = Decoder::new(Cursor::new(bytes.clone())) else {
            return;
        };
        if let Ok(sink) = Sink::try_new(handle) {
            sink.set_volume(*volume);
            sink.append(source);
            sink.detach();
        }
    }

    fn play_music(&mut self, track: MusicTrack) {
        if self.playing.contains_key(&track) {
            return;
        }
        let Some(handle) = &self.handle else { return };
        let Some((path, volume)) = self.music.get(&track) else {
            return;
        };
        let Ok(file) = File::open(path) else {
            warn!("music file {} went missing", path.display());
            return;
        };
        let Ok(source) = Decoder::new(BufReader::new(file)) else {
            return;
        };
        if let Ok(sink) = Sink::try_new(handle) {
            sink.set_volume(*volume);
            sink.append(source.repeat_infinite());
            self.playing.insert(track, sink);
        }
    }

    fn stop_music(&mut self, track: MusicTrack) {
        if let Some(sink) = self.playing.remove(&track) {
            sink.stop();
        }
    }
}
