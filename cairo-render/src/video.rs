use std::ffi::OsString;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;

use drawing::error::{DrawError, Result};
use log::{debug, info};

/// Environment variable naming the ffmpeg executable.
pub const FFMPEG_ENV: &str = "DRAWING_FFMPEG";

pub const DEFAULT_CODEC: &str = "libx264";

// encoders taking a constant rate factor
const CRF_CODECS: [&str; 5] = ["libx264", "libx265", "libvpx-vp9", "libaom-av1", "libsvtav1"];

/// The ffmpeg executable: `$DRAWING_FFMPEG`, or `ffmpeg` on `PATH`.
pub fn ffmpeg_binary() -> PathBuf {
    std::env::var_os(FFMPEG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("ffmpeg"))
}

/// Whether ffmpeg runs and lists `encoder` among its encoders.
pub fn ffmpeg_has_encoder(encoder: &str) -> bool {
    let Ok(output) = Command::new(ffmpeg_binary())
        .args(["-hide_banner", "-encoders"])
        .stderr(Stdio::null())
        .output()
    else {
        return false;
    };
    output.status.success()
        && String::from_utf8_lossy(&output.stdout)
            .lines()
            .any(|line| line.split_whitespace().nth(1) == Some(encoder))
}

/// Encodes PNG frames into a video file with an ffmpeg subprocess.
#[derive(Debug, Clone)]
pub struct VideoEncoder {
    binary: PathBuf,
    codec: String,
    frame_rate: f64,
}

impl VideoEncoder {
    /// Every frame lasts `frame_duration` seconds.
    pub fn new(frame_duration: f64) -> Self {
        VideoEncoder {
            binary: ffmpeg_binary(),
            codec: DEFAULT_CODEC.to_string(),
            frame_rate: 1.0 / frame_duration,
        }
    }

    pub fn codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn args(&self, output: &Path) -> Vec<OsString> {
        let rate = self.frame_rate.to_string();
        let mut args: Vec<&str> = vec![
            "-y",
            "-loglevel",
            "error",
            "-r",
            rate.as_str(),
            "-f",
            "image2pipe",
            "-i",
            "-",
            "-c:v",
            self.codec.as_str(),
        ];
        if CRF_CODECS.contains(&self.codec.as_str()) {
            args.extend(["-crf", "20"]);
        }
        // yuv420p needs even dimensions
        args.extend(["-pix_fmt", "yuv420p", "-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"]);
        let mut args: Vec<OsString> = args.into_iter().map(OsString::from).collect();
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Pipes every frame into ffmpeg and waits for it to finish.
    pub fn encode<I>(&self, output: &Path, frames: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<Vec<u8>>>,
    {
        info!(
            "Encoding {} with {} at {} fps",
            output.display(),
            self.codec,
            self.frame_rate
        );
        let mut child = Command::new(&self.binary)
            .args(self.args(output))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                DrawError::Encoder(format!("failed to start {}: {}", self.binary.display(), err))
            })?;

        let stderr = child.stderr.take();
        let stderr_handle = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_end(&mut buf);
            }
            String::from_utf8_lossy(&buf).trim().to_string()
        });

        if let Err(err) = feed(&mut child, frames) {
            let _ = child.kill();
            let _ = child.wait();
            let _ = stderr_handle.join();
            return Err(err);
        }

        let status = child.wait()?;
        let stderr = stderr_handle.join().unwrap_or_default();
        if !status.success() {
            return Err(DrawError::Encoder(if stderr.is_empty() {
                format!("ffmpeg exited with {}", status)
            } else {
                stderr
            }));
        }
        debug!("ffmpeg finished {}", output.display());
        Ok(())
    }
}

fn feed<I>(child: &mut Child, frames: I) -> Result<()>
where
    I: IntoIterator<Item = Result<Vec<u8>>>,
{
    let Some(mut stdin) = child.stdin.take() else {
        return Err(DrawError::Encoder("ffmpeg stdin is not available".to_string()));
    };
    for frame in frames {
        let frame = frame?;
        match stdin.write_all(&frame) {
            Ok(()) => {}
            // ffmpeg quit early, its exit status tells why
            Err(err) if err.kind() == ErrorKind::BrokenPipe => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let encoder = VideoEncoder::new(0.1).codec("mpeg4").binary("/opt/ffmpeg");
        let args: Vec<String> = encoder
            .args(Path::new("out.mp4"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(&args[..5], &["-y", "-loglevel", "error", "-r", "10"]);
        let codec = args.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(args[codec + 1], "mpeg4");
        assert!(!args.iter().any(|a| a == "-crf"));
        assert_eq!(args.last().unwrap(), "out.mp4");

        let args = VideoEncoder::new(0.5).args(Path::new("out.mp4"));
        assert!(args.iter().any(|a| a == "-crf"));
        assert!(args.iter().any(|a| a == "2"));
    }

    #[test]
    fn test_missing_binary() {
        let encoder = VideoEncoder::new(0.1).binary("/definitely/not/ffmpeg");
        let err = encoder
            .encode(Path::new("out.mp4"), Vec::<Result<Vec<u8>>>::new())
            .unwrap_err();
        assert!(matches!(err, DrawError::Encoder(_)));
    }
}
