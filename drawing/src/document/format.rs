use std::path::{Path, PathBuf};

use strum::{AsRefStr, Display, EnumString};

use crate::error::{DrawError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RasterFormat {
    Png,
    #[strum(serialize = "jpg", serialize = "jpeg")]
    Jpeg,
    Bmp,
    Gif,
    #[strum(serialize = "tif", serialize = "tiff")]
    Tiff,
    Webp,
}

impl RasterFormat {
    /// Formats without an alpha channel.
    pub fn is_opaque(&self) -> bool {
        matches!(self, RasterFormat::Jpeg | RasterFormat::Bmp)
    }
}

/// Output kind chosen from a file extension at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One file per page.
    Raster(RasterFormat),
    /// One file per page.
    Svg,
    /// All pages in one file.
    Pdf,
    /// All pages as frames of one file.
    Video,
}

const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "m4v", "webm", "mkv", "avi"];

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .ok_or_else(|| DrawError::UnsupportedFormat(path.display().to_string()))?;
        if let Ok(raster) = ext.parse::<RasterFormat>() {
            return Ok(OutputFormat::Raster(raster));
        }
        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "pdf" => Ok(OutputFormat::Pdf),
            e if VIDEO_EXTENSIONS.contains(&e) => Ok(OutputFormat::Video),
            _ => Err(DrawError::UnsupportedFormat(ext)),
        }
    }

    /// Every page gets its own file.
    pub fn file_per_page(&self) -> bool {
        matches!(self, OutputFormat::Raster(_) | OutputFormat::Svg)
    }
}

/// Output files of a file-per-page format: `path` itself for a single
/// page, `stem_0.ext` .. `stem_{n-1}.ext` next to it otherwise.
pub fn indexed_paths(path: &Path, count: usize) -> Vec<PathBuf> {
    if count == 1 {
        return vec![path.to_path_buf()];
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    (0..count)
        .map(|i| {
            let name = match &ext {
                Some(ext) => format!("{}_{}.{}", stem, i, ext),
                None => format!("{}_{}", stem, i),
            };
            path.with_file_name(name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        let fmt = |p: &str| OutputFormat::from_path(Path::new(p));
        assert_eq!(fmt("a.png").unwrap(), OutputFormat::Raster(RasterFormat::Png));
        assert_eq!(fmt("a.JPEG").unwrap(), OutputFormat::Raster(RasterFormat::Jpeg));
        assert_eq!(fmt("a.tif").unwrap(), OutputFormat::Raster(RasterFormat::Tiff));
        assert_eq!(fmt("out/a.Svg").unwrap(), OutputFormat::Svg);
        assert_eq!(fmt("a.pdf").unwrap(), OutputFormat::Pdf);
        assert_eq!(fmt("a.mov").unwrap(), OutputFormat::Video);
        assert!(matches!(fmt("a.xyz"), Err(DrawError::UnsupportedFormat(_))));
        assert!(matches!(fmt("noext"), Err(DrawError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_indexed_paths() {
        let single = indexed_paths(Path::new("/tmp/out.png"), 1);
        assert_eq!(single, vec![PathBuf::from("/tmp/out.png")]);
        let many = indexed_paths(Path::new("/tmp/out.png"), 3);
        assert_eq!(
            many,
            vec![
                PathBuf::from("/tmp/out_0.png"),
                PathBuf::from("/tmp/out_1.png"),
                PathBuf::from("/tmp/out_2.png"),
            ]
        );
    }
}
