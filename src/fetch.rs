//! src/fetch.rs
//! Downloads library source archives and unpacks them under the build root.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use colored::*;
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use tar::Archive;

use crate::library::Library;

/// Fetches and unpacks every library in the work list. Both steps are
/// idempotent by presence check, so a rerun after a failed build touches
/// neither the network nor already extracted trees.
pub fn download_and_extract_all(root: &Path, libraries: &[Library]) -> Result<(), Box<dyn Error>> {
    println!("\n------- Downloading SDL libraries -------\n");
    for library in libraries {
        download_if_missing(library.url(), &root.join(library.archive_name()))?;
    }

    println!("\n------- Extracting library source archives -------\n");
    for library in libraries {
        extract_if_missing(
            &root.join(library.archive_name()),
            root,
            library.source_dir(),
        )?;
    }
    Ok(())
}

/// Streams `url` into `dest` behind a progress bar, unless the archive is
/// already on disk.
pub fn download_if_missing(url: &str, dest: &Path) -> Result<(), Box<dyn Error>> {
    if dest.exists() {
        println!("archive '{}' already exists", dest.display().to_string().yellow());
        return Ok(());
    }

    println!("downloading {}", url.cyan());
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let total_size = response.content_length().unwrap_or(0);

    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")?
            .progress_chars("#>-"),
    );

    let mut reader = pb.wrap_read(response);
    let mut dest_file = File::create(dest)?;
    io::copy(&mut reader, &mut dest_file)?;

    pb.finish_and_clear();
    Ok(())
}

/// Unpacks `archive` into `root` unless `source_dir` already exists there.
pub fn extract_if_missing(
    archive: &Path,
    root: &Path,
    source_dir: &str,
) -> Result<(), Box<dyn Error>> {
    if root.join(source_dir).exists() {
        println!(
            "archive '{}' is already extracted to '{}'",
            archive.display(),
            source_dir.yellow()
        );
        return Ok(());
    }

    if !archive.exists() {
        return Err(format!("archive not found: {}", archive.display()).into());
    }

    let file = File::open(archive)?;
    let decompressor = GzDecoder::new(BufReader::new(file));
    let mut tarball = Archive::new(decompressor);
    tarball.unpack(root)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn existing_archive_is_not_downloaded_again() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("SDL2-2.0.5.tar.gz");
        fs::write(&archive, b"original contents").unwrap();

        // The host is unresolvable; reaching the network would fail the call.
        download_if_missing("http://download.invalid/SDL2-2.0.5.tar.gz", &archive).unwrap();

        assert_eq!(fs::read(&archive).unwrap(), b"original contents");
    }

    #[test]
    fn existing_source_dir_skips_extraction() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("SDL2-2.0.5")).unwrap();

        // The archive does not exist; opening it would fail the call.
        let archive = dir.path().join("SDL2-2.0.5.tar.gz");
        extract_if_missing(&archive, dir.path(), "SDL2-2.0.5").unwrap();
    }

    #[test]
    fn missing_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("SDL2-2.0.5.tar.gz");
        let result = extract_if_missing(&archive, dir.path(), "SDL2-2.0.5");
        assert!(result.is_err());
    }

    #[test]
    fn extraction_unpacks_into_the_build_root() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("SDL2-2.0.5.tar.gz");

        let file = File::create(&archive).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(5);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "SDL2-2.0.5/configure", &b"hello"[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        extract_if_missing(&archive, dir.path(), "SDL2-2.0.5").unwrap();
        assert!(dir.path().join("SDL2-2.0.5/configure").exists());
    }
}
