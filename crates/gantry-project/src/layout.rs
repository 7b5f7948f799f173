//! Fixed layout of a generated project tree.

use std::path::{Path, PathBuf};

/// Model artifact archive at the tree root. Its presence marks a generated
/// instance; its absence marks a template.
pub const ARTIFACT_ARCHIVE: &str = "model.tar";

/// Directory the artifact archive is extracted into.
pub const ARTIFACT_EXTRACT_DIR: &str = "model";

/// Directory the C runtime sources are vendored into.
pub const RUNTIME_DIR: &str = "crt";

/// Entries copied from the runtime source tree. Everything else is skipped.
pub const RUNTIME_COPY_ITEMS: [&str; 3] = ["include", "Makefile", "src"];

/// Build file copied from the template root.
pub const BUILD_FILE: &str = "Makefile";

/// Directory holding the runtime configuration header.
pub const CONFIG_HEADER_DIR: &str = "crt_config";

/// Runtime configuration header, copied under [`CONFIG_HEADER_DIR`].
pub const CONFIG_HEADER: &str = "crt_config.h";

/// Directory holding the target entry-point sources.
pub const SOURCE_DIR: &str = "src";

/// Target sources copied from the template into [`SOURCE_DIR`].
pub const TARGET_SOURCES: [&str; 2] = ["main.cc", "riscv_util.h"];

/// Path of the artifact archive inside a project tree.
pub fn artifact_archive_path(project_dir: &Path) -> PathBuf {
    project_dir.join(ARTIFACT_ARCHIVE)
}

/// Whether a tree is a generated instance rather than a template.
pub fn is_generated_tree(project_dir: &Path) -> bool {
    artifact_archive_path(project_dir).is_file()
}
