//! Materializes a project instance from a template tree.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use gantry_options::ResolvedOptions;
use tracing::{debug, info, instrument};

use crate::archive;
use crate::error::{GenerateError, Result};
use crate::layout;

/// Generates project instances from one template tree.
///
/// The template tree holds the build file, the runtime configuration header
/// and the target entry-point sources. Generation lays those down next to the
/// extracted model artifact and the vendored C runtime, in a fixed order, so
/// a partially generated tree is always a prefix of a complete one.
#[derive(Debug, Clone)]
pub struct ProjectGenerator {
    template_dir: PathBuf,
}

impl ProjectGenerator {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        ProjectGenerator {
            template_dir: template_dir.into(),
        }
    }

    /// Generates a project instance at `dest`.
    ///
    /// `artifact` is the model artifact archive, `runtime_dir` the C runtime
    /// source tree. `dest` must not exist yet; an existing destination is
    /// rejected before anything is touched.
    #[instrument(skip_all, fields(dest = %dest.display()))]
    pub fn generate(
        &self,
        artifact: &Path,
        runtime_dir: &Path,
        dest: &Path,
        _options: &ResolvedOptions,
    ) -> Result<()> {
        if dest.exists() {
            return Err(GenerateError::AlreadyExists {
                path: dest.to_path_buf(),
            });
        }
        make_dir(dest)?;

        self.copy_driver(dest)?;

        let archive_path = layout::artifact_archive_path(dest);
        copy_file(artifact, &archive_path)?;
        archive::extract_archive(&archive_path, &dest.join(layout::ARTIFACT_EXTRACT_DIR))?;

        self.vendor_runtime(runtime_dir, dest)?;

        copy_file(
            &self.template_dir.join(layout::BUILD_FILE),
            &dest.join(layout::BUILD_FILE),
        )?;

        let header_dir = dest.join(layout::CONFIG_HEADER_DIR);
        make_dir(&header_dir)?;
        copy_file(
            &self
                .template_dir
                .join(layout::CONFIG_HEADER_DIR)
                .join(layout::CONFIG_HEADER),
            &header_dir.join(layout::CONFIG_HEADER),
        )?;

        let source_dir = dest.join(layout::SOURCE_DIR);
        make_dir(&source_dir)?;
        for source in layout::TARGET_SOURCES {
            copy_file(
                &self.template_dir.join(layout::SOURCE_DIR).join(source),
                &source_dir.join(source),
            )?;
        }

        info!("project instance generated");
        Ok(())
    }

    /// Copies the running executable into the instance, so a generated tree
    /// can serve as its own harness.
    fn copy_driver(&self, dest: &Path) -> Result<()> {
        let exe = env::current_exe().map_err(|e| GenerateError::Io {
            path: dest.to_path_buf(),
            detail: format!("locating the running executable: {e}"),
        })?;
        let name = exe.file_name().ok_or_else(|| GenerateError::Io {
            path: exe.clone(),
            detail: "running executable has no file name".to_string(),
        })?;
        copy_file(&exe, &dest.join(name))
    }

    fn vendor_runtime(&self, runtime_dir: &Path, dest: &Path) -> Result<()> {
        let crt = dest.join(layout::RUNTIME_DIR);
        make_dir(&crt)?;
        for item in layout::RUNTIME_COPY_ITEMS {
            let from = runtime_dir.join(item);
            let to = crt.join(item);
            if from.is_dir() {
                copy_tree(&from, &to)?;
            } else {
                copy_file(&from, &to)?;
            }
        }
        debug!(runtime = %runtime_dir.display(), "vendored C runtime");
        Ok(())
    }
}

fn make_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| GenerateError::Io {
        path: path.to_path_buf(),
        detail: format!("creating directory: {e}"),
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map(|_| ()).map_err(|e| GenerateError::Io {
        path: from.to_path_buf(),
        detail: format!("copying to {}: {e}", to.display()),
    })
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    make_dir(dst)?;
    let entries = fs::read_dir(src).map_err(|e| GenerateError::Io {
        path: src.to_path_buf(),
        detail: format!("reading directory: {e}"),
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| GenerateError::Io {
            path: src.to_path_buf(),
            detail: format!("reading directory entry: {e}"),
        })?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| GenerateError::Io {
            path: from.clone(),
            detail: format!("reading file type: {e}"),
        })?;
        if file_type.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }
    Ok(())
}
