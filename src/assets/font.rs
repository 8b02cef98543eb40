use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::foundation::error::{LivecompError, LivecompResult};

/// Where an overlay's font comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FontSource {
    /// An installed font family; `sans-serif`, `serif` and `monospace` map to generic families.
    System {
        /// Family name.
        family: String,
    },
    /// A font file on disk.
    File {
        /// Path to a TrueType/OpenType file.
        path: PathBuf,
    },
    /// In-memory font bytes.
    #[serde(skip)]
    Bytes(Arc<[u8]>),
}

impl Default for FontSource {
    fn default() -> Self {
        Self::System {
            family: "sans-serif".to_owned(),
        }
    }
}

/// Font bytes plus the face index inside them.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedFont {
    pub(crate) bytes: Arc<Vec<u8>>,
    pub(crate) index: u32,
}

/// Resolves [`FontSource`]s to raw font data.
///
/// The system font database is scanned once, on the first system lookup.
#[derive(Default)]
pub(crate) struct FontResolver {
    system: OnceLock<usvg::fontdb::Database>,
}

impl FontResolver {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn resolve(&self, source: &FontSource) -> LivecompResult<ResolvedFont> {
        match source {
            FontSource::System { family } => self.resolve_system(family),
            FontSource::File { path } => {
                let bytes = std::fs::read(path).map_err(|e| {
                    LivecompError::render_resource(format!(
                        "failed to read font '{}': {e}",
                        path.display()
                    ))
                })?;
                Ok(ResolvedFont {
                    bytes: Arc::new(bytes),
                    index: 0,
                })
            }
            FontSource::Bytes(bytes) => Ok(ResolvedFont {
                bytes: Arc::new(bytes.to_vec()),
                index: 0,
            }),
        }
    }

    fn resolve_system(&self, family: &str) -> LivecompResult<ResolvedFont> {
        let db = self.system.get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system font database");
            db
        });
        resolve_in(db, family)
    }
}

/// Installed families tried when a generic family maps to a face that is not installed.
const SANS_FALLBACKS: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Helvetica",
    "Arial",
];
const SERIF_FALLBACKS: &[&str] = &[
    "DejaVu Serif",
    "Liberation Serif",
    "Noto Serif",
    "Times New Roman",
];
const MONO_FALLBACKS: &[&str] = &[
    "DejaVu Sans Mono",
    "Liberation Mono",
    "Noto Sans Mono",
    "Courier New",
];

fn resolve_in(db: &usvg::fontdb::Database, family: &str) -> LivecompResult<ResolvedFont> {
    let id = query_family(db, family).ok_or_else(|| {
        LivecompError::render_resource(format!("no installed font for family '{family}'"))
    })?;
    db.with_face_data(id, |data, index| ResolvedFont {
        bytes: Arc::new(data.to_vec()),
        index,
    })
    .ok_or_else(|| {
        LivecompError::render_resource(format!("font data for family '{family}' is unavailable"))
    })
}

/// Look up `family`; generic families fall back to a known installed family, then to any face.
fn query_family(db: &usvg::fontdb::Database, family: &str) -> Option<usvg::fontdb::ID> {
    use usvg::fontdb::Family;

    let lookup = |fam: Family<'_>| query_one(db, fam);

    let name = family.trim();
    let (generic, fallbacks) = match name.to_ascii_lowercase().as_str() {
        "sans-serif" | "sans" => (Family::SansSerif, SANS_FALLBACKS),
        "serif" => (Family::Serif, SERIF_FALLBACKS),
        "monospace" | "mono" => (Family::Monospace, MONO_FALLBACKS),
        _ => return lookup(Family::Name(name)),
    };

    lookup(generic)
        .or_else(|| fallbacks.iter().find_map(|f| lookup(Family::Name(*f))))
        .or_else(|| {
            let face = db.faces().next()?;
            tracing::debug!(
                requested = name,
                family = face.families.first().map(|(f, _)| f.as_str()).unwrap_or_default(),
                "generic font family not installed, using first available face"
            );
            Some(face.id)
        })
}

fn query_one(
    db: &usvg::fontdb::Database,
    family: usvg::fontdb::Family<'_>,
) -> Option<usvg::fontdb::ID> {
    let families = [family];
    db.query(&usvg::fontdb::Query {
        families: &families,
        ..usvg::fontdb::Query::default()
    })
}
