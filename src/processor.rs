//! Rendering of file descriptors to disk.
//!
//! Every descriptor is rendered in two phases: first its path template, then
//! its content template. Nothing touches the filesystem until both succeed.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info};

use crate::config::FileDescriptor;
use crate::constants::OUTPUT_DIR_MODE;
use crate::context::DataMapping;
use crate::error::{Error, Result};
use crate::template::TemplateRenderer;

/// Joins `rendered` onto `root`, dropping root and prefix components so the
/// result cannot escape `root` through an absolute path.
///
/// # Errors
/// * `Error::RenderError` if `rendered` contains `..` or contributes no path components
pub fn resolve_target_path<P: AsRef<Path>>(root: P, rendered: &str) -> Result<PathBuf> {
    let render_error = |message: &str| Error::RenderError {
        template: rendered.to_string(),
        message: message.to_string(),
    };
    let mut relative = PathBuf::new();
    for component in Path::new(rendered).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::ParentDir => {
                return Err(render_error("path template must not contain '..' segments"))
            }
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
        }
    }
    if relative.as_os_str().is_empty() {
        return Err(render_error("path template resolved to an empty path"));
    }
    Ok(root.as_ref().join(relative))
}

fn create_dir_all(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(OUTPUT_DIR_MODE);
    }
    builder.create(path).map_err(Error::IoError)
}

/// Renders descriptors against one data mapping into one output root.
pub struct Processor<'a> {
    engine: &'a dyn TemplateRenderer,
    output_root: PathBuf,
    data: &'a DataMapping,
}

impl<'a> Processor<'a> {
    pub fn new<P: AsRef<Path>>(engine: &'a dyn TemplateRenderer, output_root: P, data: &'a DataMapping) -> Self {
        Self { engine, output_root: output_root.as_ref().to_path_buf(), data }
    }

    /// Renders the path template of `descriptor`.
    pub fn render_path(&self, descriptor: &FileDescriptor) -> Result<String> {
        self.engine.render(&descriptor.path, &descriptor.path, &descriptor.delimiters, self.data)
    }

    /// Renders the content template of `descriptor`, named after its resolved path.
    pub fn render_content(&self, descriptor: &FileDescriptor, name: &str) -> Result<String> {
        self.engine.render(name, &descriptor.contents, &descriptor.delimiters, self.data)
    }

    /// Renders `descriptor` and writes it, returning the destination.
    ///
    /// Existing files are overwritten.
    ///
    /// # Errors
    /// * `Error::ParseError`/`Error::RenderError` if either template fails; no file is written
    /// * `Error::IoError` if the directories or the file cannot be created
    pub fn process(&self, descriptor: &FileDescriptor) -> Result<PathBuf> {
        let rendered_path = self.render_path(descriptor)?;
        debug!("Resolved path '{}' to '{}'", descriptor.path, rendered_path);

        let target = resolve_target_path(&self.output_root, &rendered_path)?;
        let content = self.render_content(descriptor, &rendered_path)?;

        if let Some(parent) = target.parent() {
            create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
        Ok(target)
    }

    /// Processes `descriptors` in order and stops at the first failure.
    /// Files written before the failure are left in place.
    pub fn generate(&self, descriptors: &[FileDescriptor]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let target = self.process(descriptor)?;
            info!("Wrote {}", target.display());
            println!("create: '{}'", target.display());
            written.push(target);
        }
        Ok(written)
    }
}
