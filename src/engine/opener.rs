use std::collections::HashMap;
use std::path::{Path, PathBuf};

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::EngineError;

/// What the engine learns about a stream when it is opened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    /// `None` when the container does not report a duration
    pub length_ms: Option<u32>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
}

impl StreamInfo {
    pub fn with_length(length_ms: u32) -> Self {
        Self {
            length_ms: Some(length_ms),
            sample_rate: None,
            channels: None,
        }
    }
}

/// Resolves a path to a stream the engine can play
pub trait StreamOpener: Send {
    fn open(&self, path: &Path) -> Result<StreamInfo, EngineError>;
}

/// Opens files from disk and probes them with symphonia
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaOpener;

impl StreamOpener for SymphoniaOpener {
    fn open(&self, path: &Path) -> Result<StreamInfo, EngineError> {
        let file = std::fs::File::open(path).map_err(|_| EngineError::NotFound {
            path: path.to_path_buf(),
        })?;

        let media_source = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext_str) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext_str);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, media_source, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| EngineError::Unsupported {
                path: path.to_path_buf(),
                reason: format!("Probe failed: {}", e),
            })?;

        let track = probed
            .format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| EngineError::Unsupported {
                path: path.to_path_buf(),
                reason: "No audio track found".to_string(),
            })?;

        let params = &track.codec_params;
        let length_ms = match (params.n_frames, params.sample_rate) {
            (Some(n_frames), Some(rate)) if rate > 0 => {
                Some((n_frames.saturating_mul(1000) / rate as u64).min(u32::MAX as u64) as u32)
            }
            _ => None,
        };

        Ok(StreamInfo {
            length_ms,
            sample_rate: params.sample_rate,
            channels: params.channels.map(|c| c.count() as u16),
        })
    }
}

/// Serves registered in-memory tracks; anything else is not found
#[derive(Debug, Default, Clone)]
pub struct MemoryOpener {
    tracks: HashMap<PathBuf, StreamInfo>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, path: impl Into<PathBuf>, length_ms: u32) -> Self {
        self.insert(path, length_ms);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, length_ms: u32) {
        self.tracks.insert(path.into(), StreamInfo::with_length(length_ms));
    }

    /// Register a stream that reports no duration, like a live or headerless file
    pub fn with_unknown_length(mut self, path: impl Into<PathBuf>) -> Self {
        self.tracks.insert(
            path.into(),
            StreamInfo {
                length_ms: None,
                sample_rate: None,
                channels: None,
            },
        );
        self
    }
}

impl StreamOpener for MemoryOpener {
    fn open(&self, path: &Path) -> Result<StreamInfo, EngineError> {
        self.tracks.get(path).copied().ok_or_else(|| EngineError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Minimal 16-bit mono PCM WAV file
    fn write_wav(path: &Path, sample_rate: u32, frames: u32) {
        let data_len = frames * 2;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_symphonia_opener_missing_file() {
        let result = SymphoniaOpener.open(Path::new("/nonexistent/meooooow.mp3"));
        assert_eq!(
            result,
            Err(EngineError::NotFound { path: PathBuf::from("/nonexistent/meooooow.mp3") })
        );
    }

    #[test]
    fn test_symphonia_opener_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        match SymphoniaOpener.open(&path) {
            Err(EngineError::Unsupported { .. }) => {}
            other => panic!("Expected Unsupported, got {:?}", other),
        }
    }

    #[test]
    fn test_symphonia_opener_reads_wav_length() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tone.wav");
        write_wav(&path, 8000, 8000);

        let info = SymphoniaOpener.open(&path).unwrap();
        assert_eq!(info.length_ms, Some(1000));
        assert_eq!(info.sample_rate, Some(8000));
        assert_eq!(info.channels, Some(1));
    }

    #[test]
    fn test_memory_opener() {
        let opener = MemoryOpener::new().with_track("meow.mp3", 3000);
        assert_eq!(opener.open(Path::new("meow.mp3")).unwrap().length_ms, Some(3000));
        assert!(matches!(
            opener.open(Path::new("missing.mp3")),
            Err(EngineError::NotFound { .. })
        ));
    }
}
