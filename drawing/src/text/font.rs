use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use fontdb::{Database, Family, Query};
use log::{debug, info, warn};

use crate::error::{DrawError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum FontOrigin {
    File(PathBuf),
    System(String),
}

/// A loaded font face: the raw font data plus the face index inside it.
#[derive(Clone)]
pub struct FontRef {
    name: String,
    origin: FontOrigin,
    data: Arc<Vec<u8>>,
    index: u32,
}

impl fmt::Debug for FontRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontRef")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("index", &self.index)
            .finish()
    }
}

impl PartialEq for FontRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.origin == other.origin && self.index == other.index
    }
}

fn system_fonts() -> &'static Database {
    static SYSTEM_FONTS: OnceLock<Database> = OnceLock::new();
    SYSTEM_FONTS.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        info!("Loaded {} system font faces", db.len());
        db
    })
}

fn regular<'a>(families: &'a [Family<'a>]) -> Query<'a> {
    Query {
        families,
        weight: fontdb::Weight::NORMAL,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    }
}

impl FontRef {
    /// Loads `name_or_path` as a font file when such a file exists, otherwise
    /// looks it up as a family or PostScript name among the system fonts.
    pub fn load(name_or_path: &str) -> Result<Self> {
        let path = Path::new(name_or_path);
        if path.is_file() {
            return Self::from_file(path);
        }
        let db = system_fonts();
        let families = [Family::Name(name_or_path)];
        let id = db
            .query(&regular(&families))
            .or_else(|| {
                db.faces()
                    .find(|face| face.post_script_name == name_or_path)
                    .map(|face| face.id)
            })
            .ok_or_else(|| DrawError::Font(format!("font '{}' not found", name_or_path)))?;
        Self::from_database(db, id, name_or_path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        if rustybuzz::Face::from_slice(&data, 0).is_none() {
            return Err(DrawError::Font(format!(
                "'{}' is not a usable font file",
                path.display()
            )));
        }
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!("Loaded font {} from {}", name, path.display());
        Ok(FontRef {
            name,
            origin: FontOrigin::File(path.to_path_buf()),
            data: Arc::new(data),
            index: 0,
        })
    }

    /// The system sans-serif face, if the system has any fonts at all.
    pub fn default_font() -> Option<FontRef> {
        static DEFAULT_FONT: OnceLock<Option<FontRef>> = OnceLock::new();
        DEFAULT_FONT
            .get_or_init(|| {
                let db = system_fonts();
                let families = [Family::SansSerif];
                let id = db
                    .query(&regular(&families))
                    .or_else(|| db.faces().next().map(|face| face.id));
                match id {
                    Some(id) => Self::from_database(db, id, "sans-serif").ok(),
                    None => {
                        warn!("No system fonts found, text will not be drawn");
                        None
                    }
                }
            })
            .clone()
    }

    fn from_database(db: &Database, id: fontdb::ID, requested: &str) -> Result<Self> {
        let name = db
            .face(id)
            .map(|face| face.post_script_name.clone())
            .unwrap_or_else(|| requested.to_string());
        let (data, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| DrawError::Font(format!("font '{}' data is unavailable", requested)))?;
        Ok(FontRef {
            name,
            origin: FontOrigin::System(requested.to_string()),
            data: Arc::new(data),
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn face(&self) -> Result<rustybuzz::Face<'_>> {
        rustybuzz::Face::from_slice(&self.data, self.index)
            .ok_or_else(|| DrawError::Font(format!("font '{}' can not be parsed", self.name)))
    }
}
