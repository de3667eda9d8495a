//! src/artifacts.rs
//! Copies built headers and libraries into the shared include/lib output
//! directories next to the extracted source trees.

use std::error::Error;
use std::fs;
use std::io;
use std::path::Path;

use crate::library::Library;

pub const INCLUDE_DIR: &str = "include";
pub const LIBRARY_DIR: &str = "lib";
const HEADER_SUBDIR: &str = "SDL2";

/// Installs one library's public headers and compiled artifacts under
/// `<root>/include/SDL2` and `<root>/lib`. Safe to run again after a
/// partial earlier pass.
pub fn copy_build_results(root: &Path, library: Library) -> Result<(), Box<dyn Error>> {
    let include_out = root.join(INCLUDE_DIR).join(HEADER_SUBDIR);
    let library_out = root.join(LIBRARY_DIR);
    fs::create_dir_all(&include_out)?;
    fs::create_dir_all(&library_out)?;

    let source_root = root.join(library.source_dir());

    // SDL2 keeps its public headers under include/; the add-on libraries
    // keep theirs at the top of the source tree.
    let header_dir = source_root.join("include");
    if header_dir.exists() {
        copy_matching(&header_dir, &include_out, |name| name.ends_with(".h"))?;
    } else {
        copy_matching(&source_root, &include_out, |name| {
            name.starts_with("SDL") && name.ends_with(".h")
        })?;
    }

    let build_dir = source_root.join("build");

    // Depending on the release, autotools leaves .libs either under a nested
    // build/ directory or at the top of the build tree.
    let nested = build_dir.join("build").join(".libs");
    let libs_dir = if nested.exists() { nested } else { build_dir.join(".libs") };

    if libs_dir.exists() {
        copy_matching(&libs_dir, &library_out, |name| {
            name.starts_with("libSDL2") && name.ends_with(".a")
        })?;
        copy_shared_objects(&libs_dir, &library_out)?;
    }

    // The generated configuration header lives in the build tree, not the
    // source tree.
    let config_header = build_dir.join("include").join("SDL_config.h");
    if config_header.exists() {
        fs::copy(&config_header, include_out.join("SDL_config.h"))?;
    }

    Ok(())
}

fn copy_matching(
    from: &Path,
    to: &Path,
    matches: impl Fn(&str) -> bool,
) -> Result<(), Box<dyn Error>> {
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name_str) = name.to_str() else { continue };
        if matches(name_str) && entry.path().is_file() {
            fs::copy(entry.path(), to.join(&name))?;
        }
    }
    Ok(())
}

/// Copies `libSDL2*.so*` without following symlinks. The versioned names are
/// symlinks onto one real object; they are recreated at the destination, and
/// one that already exists from an earlier pass is left in place.
fn copy_shared_objects(from: &Path, to: &Path) -> Result<(), Box<dyn Error>> {
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name_str) = name.to_str() else { continue };
        if !name_str.starts_with("libSDL2") || !name_str.contains(".so") {
            continue;
        }

        let dest = to.join(&name);
        if entry.file_type()?.is_symlink() {
            let target = fs::read_link(entry.path())?;
            match std::os::unix::fs::symlink(&target, &dest) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}
