//! Joining chunk audio into one file
//!
//! Chunks are synthesized as LINEAR16 WAV. Each one is decoded to PCM,
//! the samples are appended in sequence order under a single header, and
//! the joined WAV is encoded once into the requested container by
//! `ffmpeg`. WAV output skips the encoder.

use std::io::Cursor;
use std::path::Path;
use std::process::Stdio;

use polyvox_config::AudioFormat;
use tempfile::TempDir;
use tokio::process::Command;

use crate::{error::TtsError, types::AudioChunk};

/// Concatenate `chunks` into a single file in `format`
///
/// `workdir` receives intermediate files and is owned by the caller.
pub async fn join(
    chunks: &mut [AudioChunk],
    format: AudioFormat,
    encoder: &Path,
    workdir: &Path,
) -> crate::error::Result<Vec<u8>> {
    if chunks.is_empty() {
        return Err(TtsError::AudioError("no audio chunks to join".into()));
    }

    chunks.sort_by_key(|chunk| chunk.sequence_index);

    let mut parts = Vec::with_capacity(chunks.len());
    for chunk in chunks.iter() {
        let bytes = tokio::fs::read(&chunk.path).await.map_err(|e| {
            TtsError::AudioError(format!("failed to read chunk {}: {e}", chunk.sequence_index))
        })?;
        tracing::trace!(
            "Chunk {} holds {} bytes for {} characters",
            chunk.sequence_index,
            bytes.len(),
            chunk.source_text.chars().count()
        );
        parts.push(bytes);
    }

    tracing::debug!("Joining {} chunks into {format}", parts.len());

    encode(join_wav(&parts)?, format, encoder, workdir).await
}

fn join_wav(parts: &[Vec<u8>]) -> crate::error::Result<Vec<u8>> {
    let mut spec = None;
    let mut samples: Vec<i16> = Vec::new();

    for (index, part) in parts.iter().enumerate() {
        let mut reader = hound::WavReader::new(Cursor::new(part.as_slice()))
            .map_err(|e| TtsError::AudioError(format!("chunk {index} is not valid WAV: {e}")))?;

        let chunk_spec = reader.spec();
        match spec {
            None => spec = Some(chunk_spec),
            Some(first) if first != chunk_spec => {
                return Err(TtsError::AudioError(format!(
                    "chunk {index} has a different sample layout than chunk 0"
                )));
            }
            Some(_) => {}
        }

        for sample in reader.samples::<i16>() {
            samples.push(sample.map_err(|e| TtsError::AudioError(format!("chunk {index}: {e}")))?);
        }
    }

    let spec = spec.ok_or_else(|| TtsError::AudioError("no audio chunks to join".into()))?;

    let mut out = Vec::new();
    let mut writer = hound::WavWriter::new(Cursor::new(&mut out), spec)
        .map_err(|e| TtsError::AudioError(format!("failed to start WAV output: {e}")))?;
    for sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| TtsError::AudioError(format!("failed to write WAV output: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| TtsError::AudioError(format!("failed to finish WAV output: {e}")))?;

    Ok(out)
}

/// Encode LINEAR16 `wav` as `format` with the `encoder` binary
pub(crate) async fn encode(
    wav: Vec<u8>,
    format: AudioFormat,
    encoder: &Path,
    workdir: &Path,
) -> crate::error::Result<Vec<u8>> {
    let codec = match format {
        AudioFormat::Wav => return Ok(wav),
        AudioFormat::Mp3 => "libmp3lame",
        AudioFormat::Ogg => "libopus",
        AudioFormat::Flac => "flac",
    };

    let input = workdir.join("joined.wav");
    let output = workdir.join(format!("joined.{format}"));

    tokio::fs::write(&input, &wav)
        .await
        .map_err(|e| TtsError::AudioError(format!("failed to stage WAV for encoding: {e}")))?;

    let result = Command::new(encoder)
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(&input)
        .args(["-c:a", codec])
        .arg(&output)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| TtsError::AudioError(format!("failed to spawn {}: {e}", encoder.display())))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        tracing::error!("{format} encoding failed: {}", stderr.trim());
        return Err(TtsError::AudioError(format!(
            "encoder exited with status {:?}: {}",
            result.status.code(),
            stderr.trim()
        )));
    }

    tokio::fs::read(&output)
        .await
        .map_err(|e| TtsError::AudioError(format!("failed to read encoded {format}: {e}")))
}

/// Fresh per-request directory, removed when dropped
pub(crate) fn scratch_dir(prefix: &str, root: Option<&Path>) -> crate::error::Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix);

    match root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    }
    .map_err(|e| TtsError::AudioError(format!("failed to create scratch directory: {e}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use super::*;

    pub fn wav_bytes(samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 24_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut out = Vec::new();
        let mut writer = hound::WavWriter::new(Cursor::new(&mut out), spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
        out
    }

    fn samples_of(wav: &[u8]) -> Vec<i16> {
        hound::WavReader::new(Cursor::new(wav))
            .unwrap()
            .samples::<i16>()
            .map(Result::unwrap)
            .collect()
    }

    fn chunk(dir: &Path, index: usize, bytes: &[u8]) -> AudioChunk {
        let path = dir.join(format!("chunk-{index}"));
        std::fs::write(&path, bytes).unwrap();
        AudioChunk {
            sequence_index: index,
            source_text: format!("chunk {index}"),
            path,
        }
    }

    fn no_encoder() -> PathBuf {
        PathBuf::from("/nonexistent/polyvox/ffmpeg")
    }

    // Logs its arguments next to itself and copies the input to the output
    #[cfg(unix)]
    fn recording_encoder(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("ffmpeg");
        std::fs::write(
            &path,
            "#!/bin/sh\necho \"$@\" >> \"$(dirname \"$0\")/calls.log\"\nfor last; do :; done\ncp \"$6\" \"$last\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn wav_chunks_join_in_sequence_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut chunks = vec![
            chunk(dir.path(), 2, &wav_bytes(&[3, 3])),
            chunk(dir.path(), 0, &wav_bytes(&[1, 1])),
            chunk(dir.path(), 1, &wav_bytes(&[2, 2])),
        ];

        let joined = join(&mut chunks, AudioFormat::Wav, &no_encoder(), dir.path())
            .await
            .unwrap();

        assert_eq!(samples_of(&joined), vec![1, 1, 2, 2, 3, 3]);
    }

    #[tokio::test]
    async fn mismatched_wav_layout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let stereo = {
            let spec = hound::WavSpec {
                channels: 2,
                sample_rate: 24_000,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut out = Vec::new();
            let mut writer = hound::WavWriter::new(Cursor::new(&mut out), spec).unwrap();
            writer.write_sample(0i16).unwrap();
            writer.write_sample(0i16).unwrap();
            writer.finalize().unwrap();
            out
        };
        let mut chunks = vec![chunk(dir.path(), 0, &wav_bytes(&[1])), chunk(dir.path(), 1, &stereo)];

        let err = join(&mut chunks, AudioFormat::Wav, &no_encoder(), dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, TtsError::AudioError(_)));
    }

    #[tokio::test]
    async fn undecodable_chunk_is_rejected_before_encoding() {
        let dir = tempfile::tempdir().unwrap();

        for format in [AudioFormat::Mp3, AudioFormat::Ogg] {
            let mut chunks = vec![
                chunk(dir.path(), 0, b"\xff\xfbAAA"),
                chunk(dir.path(), 1, b"not-an-mp3-at-all"),
            ];

            let err = join(&mut chunks, format, &no_encoder(), dir.path()).await.unwrap_err();

            let TtsError::AudioError(message) = err else {
                panic!("expected an audio error for {format}");
            };
            assert!(message.contains("chunk 0 is not valid WAV"), "{message}");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn compressed_output_is_encoded_once_from_joined_pcm() {
        for (format, codec) in [(AudioFormat::Mp3, "libmp3lame"), (AudioFormat::Ogg, "libopus")] {
            let dir = tempfile::tempdir().unwrap();
            let bin = tempfile::tempdir().unwrap();
            let encoder = recording_encoder(bin.path());
            let mut chunks = vec![
                chunk(dir.path(), 1, &wav_bytes(&[2])),
                chunk(dir.path(), 0, &wav_bytes(&[1])),
                chunk(dir.path(), 2, &wav_bytes(&[3])),
            ];

            let encoded = join(&mut chunks, format, &encoder, dir.path()).await.unwrap();

            let log = std::fs::read_to_string(bin.path().join("calls.log")).unwrap();
            let calls: Vec<_> = log.lines().collect();
            assert_eq!(calls.len(), 1, "{format}");
            assert!(calls[0].contains(&format!("-c:a {codec}")));
            assert!(calls[0].ends_with(&format!("joined.{format}")));
            assert_eq!(samples_of(&encoded), vec![1, 2, 3]);
        }
    }

    #[tokio::test]
    async fn missing_encoder_is_an_audio_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = encode(wav_bytes(&[1]), AudioFormat::Flac, &no_encoder(), dir.path())
            .await
            .unwrap_err();

        let TtsError::AudioError(message) = err else {
            panic!("expected an audio error");
        };
        assert!(message.starts_with("failed to spawn"));
    }

    #[tokio::test]
    async fn wav_skips_the_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let wav = wav_bytes(&[4, 5]);

        let out = encode(wav.clone(), AudioFormat::Wav, &no_encoder(), dir.path())
            .await
            .unwrap();

        assert_eq!(out, wav);
    }

    #[test]
    fn scratch_dir_lives_under_root_until_dropped() {
        let root = tempfile::tempdir().unwrap();

        let scratch = scratch_dir("polyvox-test-", Some(root.path())).unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.starts_with(root.path()));
        assert!(path.is_dir());

        drop(scratch);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn nothing_to_join() {
        let dir = tempfile::tempdir().unwrap();
        assert!(join(&mut [], AudioFormat::Wav, &no_encoder(), dir.path()).await.is_err());
    }
}
