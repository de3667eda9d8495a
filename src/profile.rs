//! src/profile.rs
//! Appends include/library path exports to the user's shell profile, once.

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use colored::*;

pub const INCLUDE_VARIABLE: &str = "SDL2_INCLUDE";
pub const LIBRARY_VARIABLE: &str = "SDL2_LIBRARY";

pub fn profile_path() -> Result<PathBuf, Box<dyn Error>> {
    dirs_next::home_dir()
        .map(|home| home.join(".profile"))
        .ok_or_else(|| "could not determine the home directory".into())
}

/// Appends the export block to `profile` unless a line containing the
/// include-variable marker is already there. The profile file must already
/// exist; it is never created here.
pub fn add_profile_variables(
    profile: &Path,
    include_dir: &Path,
    library_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    println!("\n------- Adding profile environment variables -------\n");

    if !profile.exists() {
        return Err(format!("error: {} was not found", profile.display()).into());
    }

    let contents = fs::read_to_string(profile)?;
    if contents.lines().any(|line| line.contains(INCLUDE_VARIABLE)) {
        println!("{}", "Profile variables are already been added.".yellow());
        return Ok(());
    }

    let mut file = OpenOptions::new().append(true).open(profile)?;
    file.write_all(export_block(include_dir, library_dir).as_bytes())?;

    println!("Added {} and {} to {}", INCLUDE_VARIABLE, LIBRARY_VARIABLE, profile.display());
    Ok(())
}

fn export_block(include_dir: &Path, library_dir: &Path) -> String {
    format!(
        "# SDL2 build script environment variables\n\
         if [ -d \"{include}\" ] ; then\n\
         \x20   export {include_var}=\"{include}\"\n\
         fi\n\
         \n\
         if [ -d \"{library}\" ] ; then\n\
         \x20   export {library_var}=\"{library}\"\n\
         fi\n\
         \n",
        include = include_dir.display(),
        include_var = INCLUDE_VARIABLE,
        library = library_dir.display(),
        library_var = LIBRARY_VARIABLE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_profile_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let profile = dir.path().join(".profile");
        let result =
            add_profile_variables(&profile, Path::new("/tmp/include"), Path::new("/tmp/lib"));
        assert!(result.is_err());
    }

    #[test]
    fn exports_are_appended_once() {
        let dir = tempfile::tempdir().unwrap();
        let profile = dir.path().join(".profile");
        fs::write(&profile, "# existing profile\n").unwrap();

        let include = dir.path().join("include");
        let library = dir.path().join("lib");
        add_profile_variables(&profile, &include, &library).unwrap();
        add_profile_variables(&profile, &include, &library).unwrap();

        let contents = fs::read_to_string(&profile).unwrap();
        assert_eq!(contents.matches(INCLUDE_VARIABLE).count(), 1);
        assert_eq!(contents.matches(LIBRARY_VARIABLE).count(), 1);
        assert!(contents.starts_with("# existing profile\n"));
    }

    #[test]
    fn export_block_guards_each_directory() {
        let block = export_block(Path::new("/build/include"), Path::new("/build/lib"));
        assert!(block.contains("if [ -d \"/build/include\" ] ; then"));
        assert!(block.contains("export SDL2_INCLUDE=\"/build/include\""));
        assert!(block.contains("if [ -d \"/build/lib\" ] ; then"));
        assert!(block.contains("export SDL2_LIBRARY=\"/build/lib\""));
    }
}
