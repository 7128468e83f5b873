//! Conversion collaborator: turns a tracked document's markdown source into
//! an HTML artifact on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use docpub_core::DocumentMetadata;

use crate::context::PageContext;
use crate::engine::{markdown_to_html, TemplateEngine};
use crate::error::{io_err, ConversionError};

/// Produces a converted artifact for a document and returns its path.
pub trait Converter {
    fn convert(&self, document: &DocumentMetadata) -> Result<PathBuf, ConversionError>;
}

/// Markdown → standalone HTML page.
///
/// Sources are read from `base_dir/<sourcePath>`; artifacts are written to
/// `output_dir/<sourcePath>.html`.
pub struct HtmlConverter {
    base_dir: PathBuf,
    output_dir: PathBuf,
    engine: TemplateEngine,
}

impl HtmlConverter {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        user_template_dir: Option<&Path>,
    ) -> Result<Self, ConversionError> {
        Ok(Self {
            base_dir: base_dir.into(),
            output_dir: output_dir.into(),
            engine: TemplateEngine::new(user_template_dir)?,
        })
    }

    /// Where the artifact for `source_path` lands.
    pub fn artifact_path(&self, source_path: &Path) -> PathBuf {
        let mut name = source_path.as_os_str().to_os_string();
        name.push(".html");
        self.output_dir.join(name)
    }
}

impl Converter for HtmlConverter {
    fn convert(&self, document: &DocumentMetadata) -> Result<PathBuf, ConversionError> {
        let source = self.base_dir.join(&document.source_path);
        let markdown = match std::fs::read_to_string(&source) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConversionError::SourceMissing { path: source })
            }
            Err(e) => return Err(io_err(&source, e)),
        };

        let ctx = PageContext::for_document(document, markdown_to_html(&markdown));
        let page = self.engine.render_page(&ctx)?;

        let target = self.artifact_path(&document.source_path);
        write_atomic(&target, page.as_bytes())?;
        tracing::debug!(source = %source.display(), artifact = %target.display(), "converted");
        Ok(target)
    }
}

/// Write via a `.tmp` sibling and rename, creating parent directories.
fn write_atomic(target: &Path, contents: &[u8]) -> Result<(), ConversionError> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let mut tmp_name = target.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);
    std::fs::write(&tmp, contents).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, target).map_err(|e| io_err(target, e))
}
