//! src/build.rs
//! Drives each library's native configure/make build and tracks completion
//! through a marker file in the build directory.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use colored::*;

use crate::artifacts;
use crate::library::{ConfigureFlags, Library};

/// Written after a successful build; its presence lets later runs skip the
/// library unless `--no-skip` is given.
pub const BUILD_SENTINEL: &str = "building-info.txt";

/// Runs an external program with inherited stdio so build output streams
/// straight to the console. A nonzero exit is an error naming the program
/// and its arguments.
pub fn run_program(
    program: &str,
    args: &[String],
    cwd: &Path,
    env: &[(String, String)],
) -> Result<(), Box<dyn Error>> {
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(env.iter().map(|(key, value)| (key.as_str(), value.as_str())))
        .status()
        .map_err(|e| format!("error when starting program '{}': {}", program, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!(
            "error when running program '{}' with arguments {:?}",
            program, args
        )
        .into())
    }
}

fn capture_stdout(program: &str, args: &[&str]) -> Result<String, Box<dyn Error>> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| format!("error when starting program '{}': {}", program, e))?;

    if !output.status.success() {
        return Err(format!(
            "error when running program '{}' with arguments {:?}",
            program, args
        )
        .into());
    }
    Ok(String::from_utf8(output.stdout)?)
}

/// Queries the host compiler for its default target triple and rewrites the
/// vendor field so the SDL2 configure script selects its Raspberry Pi video
/// backends.
pub fn raspberry_host_triple() -> Result<String, Box<dyn Error>> {
    let triple = capture_stdout("gcc", &["-dumpmachine"])?;
    Ok(rewrite_host_triple(triple.trim()))
}

fn rewrite_host_triple(triple: &str) -> String {
    if triple.contains("-raspberry-linux") {
        triple.to_string()
    } else {
        triple.replacen("-linux", "-raspberry-linux", 1)
    }
}

fn build_dir(root: &Path, library: Library) -> PathBuf {
    root.join(library.source_dir()).join("build")
}

/// Configures and makes one library inside its `build` subdirectory.
/// Skips everything when the sentinel from an earlier run is present.
pub fn build_library(
    root: &Path,
    library: Library,
    configure_flags: &[String],
    no_skip: bool,
    env: &[(String, String)],
) -> Result<(), Box<dyn Error>> {
    let build_dir = build_dir(root, library);
    fs::create_dir_all(&build_dir)?;

    if build_dir.join(BUILD_SENTINEL).exists() && !no_skip {
        println!(
            "library at directory {} is already been built",
            library.source_dir().yellow()
        );
        return Ok(());
    }

    run_program("../configure", configure_flags, &build_dir, env)?;
    run_program("make", &[], &build_dir, env)?;

    fs::write(
        build_dir.join(BUILD_SENTINEL),
        "building finished without errors\n\n",
    )?;
    Ok(())
}

/// Runs `./configure --help` from the library's source directory.
pub fn show_configure_options(root: &Path, library: Library) -> Result<(), Box<dyn Error>> {
    run_program(
        "./configure",
        &["--help".to_string()],
        &root.join(library.source_dir()),
        &[],
    )
}

/// Environment handed to every add-on build so its configure script finds
/// the freshly built SDL2 instead of a system copy.
fn sdl2_discovery_env(root: &Path) -> Vec<(String, String)> {
    let sdl2_config = build_dir(root, Library::Sdl2).join("sdl2-config");
    vec![
        ("SDL2_CONFIG".to_string(), sdl2_config.display().to_string()),
        (
            "CPPFLAGS".to_string(),
            format!("-I{}", root.join(artifacts::INCLUDE_DIR).join("SDL2").display()),
        ),
        (
            "LDFLAGS".to_string(),
            format!("-L{}", root.join(artifacts::LIBRARY_DIR).display()),
        ),
    ]
}

/// Builds the selected libraries and installs their artifacts. SDL2 is always
/// built and installed first, even when it is not in the work list, because
/// every add-on library depends on it at configure time.
pub fn build_all_and_copy(
    root: &Path,
    libraries: &[Library],
    flags: &ConfigureFlags,
    no_skip: bool,
) -> Result<(), Box<dyn Error>> {
    println!("\n------- Building '{}' -------\n", Library::Sdl2.source_dir());
    println!(" Configure options: {:?}\n", flags.get(Library::Sdl2));
    build_library(root, Library::Sdl2, flags.get(Library::Sdl2), no_skip, &[])?;

    println!(
        "\n------- Copying library files for '{}' -------\n",
        Library::Sdl2.source_dir()
    );
    artifacts::copy_build_results(root, Library::Sdl2)?;

    let env = sdl2_discovery_env(root);

    for library in libraries.iter().filter(|l| **l != Library::Sdl2) {
        println!("\n------- Building '{}' -------\n", library.source_dir());
        println!(" Configure options: {:?}\n", flags.get(*library));
        build_library(root, *library, flags.get(*library), no_skip, &env)?;
    }

    for library in libraries.iter().filter(|l| **l != Library::Sdl2) {
        println!(
            "\n------- Copying built library files for '{}' -------\n",
            library.source_dir()
        );
        artifacts::copy_build_results(root, *library)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_program_run_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        run_program("true", &[], dir.path(), &[]).unwrap();
    }

    #[test]
    fn failing_program_names_itself_in_the_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = run_program("false", &[], dir.path(), &[]).unwrap_err();
        assert!(error.to_string().contains("'false'"));
    }

    #[test]
    fn sentinel_skips_the_whole_build() {
        let dir = tempfile::tempdir().unwrap();
        let build_dir = dir.path().join(Library::Sdl2.source_dir()).join("build");
        fs::create_dir_all(&build_dir).unwrap();
        fs::write(build_dir.join(BUILD_SENTINEL), "building finished without errors\n\n").unwrap();

        // No configure script exists in the temp tree, so anything but a
        // skip would fail.
        build_library(dir.path(), Library::Sdl2, &[], false, &[]).unwrap();
    }

    #[test]
    fn no_skip_overrides_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let build_dir = dir.path().join(Library::Sdl2.source_dir()).join("build");
        fs::create_dir_all(&build_dir).unwrap();
        fs::write(build_dir.join(BUILD_SENTINEL), "building finished without errors\n\n").unwrap();

        let result = build_library(dir.path(), Library::Sdl2, &[], true, &[]);
        assert!(result.is_err());
    }

    #[test]
    fn host_triple_gains_the_raspberry_vendor() {
        assert_eq!(
            rewrite_host_triple("x86_64-pc-linux-gnu"),
            "x86_64-pc-raspberry-linux-gnu"
        );
    }

    #[test]
    fn raspberry_triple_is_left_alone() {
        assert_eq!(
            rewrite_host_triple("arm-raspberry-linux-gnueabihf"),
            "arm-raspberry-linux-gnueabihf"
        );
    }

    #[test]
    fn only_the_first_linux_component_is_rewritten() {
        assert_eq!(
            rewrite_host_triple("x86_64-linux-linux"),
            "x86_64-raspberry-linux-linux"
        );
    }

    #[test]
    fn discovery_env_points_into_the_build_root() {
        let root = Path::new("/tmp/sdl2-build-directory");
        let env = sdl2_discovery_env(root);
        assert_eq!(env[0].0, "SDL2_CONFIG");
        assert!(env[0].1.ends_with("SDL2-2.0.5/build/sdl2-config"));
        assert_eq!(env[1].1, "-I/tmp/sdl2-build-directory/include/SDL2");
        assert_eq!(env[2].1, "-L/tmp/sdl2-build-directory/lib");
    }
}
