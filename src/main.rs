mod artifacts;
mod build;
mod fetch;
mod library;
mod profile;

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use colored::*;

use crate::library::{ConfigureFlags, Library};

/// All downloads, source trees and build output live under this directory.
const BUILD_ROOT_DIR: &str = "sdl2-build-directory";

#[derive(Parser)]
#[command(name = "sdl2-build")]
#[command(about = "Downloads and builds the SDL2 libraries from source into a local directory")]
#[command(after_help = help_footer())]
struct Cli {
    /// Show SDL2 configure script's available options.
    #[arg(long)]
    show_configure_sdl2: bool,

    /// Show SDL2_mixer configure script's available options.
    #[arg(long)]
    show_configure_mixer: bool,

    /// Show SDL2_ttf configure script's available options.
    #[arg(long)]
    show_configure_ttf: bool,

    /// Show SDL2_image configure script's available options.
    #[arg(long)]
    show_configure_image: bool,

    /// Build SDL2.
    #[arg(long, value_name = "CONFIGURE_OPTIONS")]
    build_sdl2: Option<Option<String>>,

    /// Build SDL2_mixer.
    #[arg(long, value_name = "CONFIGURE_OPTIONS")]
    build_mixer: Option<Option<String>>,

    /// Build SDL2_ttf.
    #[arg(long, value_name = "CONFIGURE_OPTIONS")]
    build_ttf: Option<Option<String>>,

    /// Build SDL2_image.
    #[arg(long, value_name = "CONFIGURE_OPTIONS")]
    build_image: Option<Option<String>>,

    /// Build all libraries with default configure options.
    #[arg(long)]
    build_all: bool,

    /// Add header and library files location variables to your ~/.profile
    #[arg(long)]
    add_profile_variables: bool,

    /// Don't skip building if library is built before.
    #[arg(long)]
    no_skip: bool,

    /// Build with no default or user selected configure options.
    #[arg(long)]
    no_configure_options: bool,

    /// Disables adding the '--host=...' configure option with a target triple
    /// containing '-raspberry-linux'.
    #[arg(long)]
    no_raspberry_pi_support: bool,
}

fn help_footer() -> String {
    let mut text = String::from(
        "Examples:\n  sdl2-build --build-sdl2 \"enable-video-opengl enable-video-opengles\"\n\n",
    );
    text.push_str("------- Default download URLs and configure options -------\n\n");
    for library in Library::ALL {
        text.push_str(&format!(
            "{}\n  URL: {}\n  Configure options: []\n\n",
            library.name(),
            library.url()
        ));
    }
    text.push_str(&format!(
        "------- Profile environment variables -------\n\n\
         With option --add-profile-variables two environment variables are\n\
         added to your ~/.profile file.\n\n\
         {} is the path to the directory where all .h files are copied.\n\
         {} is the path to the directory where all .so and .a files are copied.\n\n\
         With these variables other environment variables can be pointed at\n\
         the correct paths. Changes to the .profile file don't take effect\n\
         until you log out and log in again.",
        profile::INCLUDE_VARIABLE,
        profile::LIBRARY_VARIABLE,
    ));
    text
}

/// Splits a "enable-video-opengl enable-video-opengles" style value into
/// ["--enable-video-opengl", "--enable-video-opengles"]. A value that itself
/// starts with "--" is not treated as configure options; the caller keeps
/// the library's defaults instead.
fn parse_configure_arguments(value: &str) -> Vec<String> {
    if value.starts_with("--") {
        return Vec::new();
    }
    value
        .split(' ')
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| format!("--{}", piece))
        .collect()
}

fn build_requests(cli: &Cli) -> [(Library, &Option<Option<String>>); 4] {
    [
        (Library::Sdl2, &cli.build_sdl2),
        (Library::Ttf, &cli.build_ttf),
        (Library::Mixer, &cli.build_mixer),
        (Library::Image, &cli.build_image),
    ]
}

/// Resolves each library's configure-flag list from the command line.
/// `--no-configure-options` wins over any per-library value.
fn resolve_configure_flags(cli: &Cli) -> ConfigureFlags {
    let mut flags = ConfigureFlags::default();
    for (library, request) in build_requests(cli) {
        if let Some(Some(value)) = request {
            let parsed = parse_configure_arguments(value);
            if !parsed.is_empty() {
                flags.replace(library, parsed);
            }
        }
    }
    if cli.no_configure_options {
        flags.clear_all();
    }
    flags
}

fn push_unique(list: &mut Vec<Library>, library: Library) {
    if !list.contains(&library) {
        list.push(library);
    }
}

fn selected_show_list(cli: &Cli) -> Vec<Library> {
    let requested = [
        (Library::Sdl2, cli.show_configure_sdl2),
        (Library::Ttf, cli.show_configure_ttf),
        (Library::Mixer, cli.show_configure_mixer),
        (Library::Image, cli.show_configure_image),
    ];
    let mut list = Vec::new();
    for (library, selected) in requested {
        if selected {
            push_unique(&mut list, library);
        }
    }
    list
}

fn selected_build_list(cli: &Cli) -> Vec<Library> {
    let mut list = Vec::new();
    if cli.build_all {
        for library in Library::ALL {
            push_unique(&mut list, library);
        }
    }
    for (library, request) in build_requests(cli) {
        if request.is_some() {
            push_unique(&mut list, library);
        }
    }
    list
}

/// Checked before any filesystem or network work happens.
fn refuse_root_uid(uid: nix::unistd::Uid) -> Result<(), Box<dyn Error>> {
    if uid.is_root() {
        return Err("Run this tool only with normal user privileges, not as root".into());
    }
    Ok(())
}

/// Resolves the directory all work happens in. Running from inside an
/// existing build directory reuses it instead of nesting another one.
fn enter_build_root() -> Result<PathBuf, Box<dyn Error>> {
    let cwd = env::current_dir()?;
    if cwd
        .file_name()
        .map(|name| name == BUILD_ROOT_DIR)
        .unwrap_or(false)
    {
        return Ok(cwd);
    }
    let root = cwd.join(BUILD_ROOT_DIR);
    fs::create_dir_all(&root)?;
    Ok(root)
}

fn run() -> Result<(), Box<dyn Error>> {
    refuse_root_uid(nix::unistd::Uid::effective())?;

    if env::args().len() <= 1 {
        Cli::command().print_long_help()?;
        return Ok(());
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            if error.kind() == ErrorKind::DisplayHelp {
                let _ = error.print();
                return Ok(());
            }
            let _ = error.print();
            println!();
            let _ = Cli::command().print_long_help();
            process::exit(-1);
        }
    };

    let root = enter_build_root()?;

    let mut flags = resolve_configure_flags(&cli);
    if !cli.no_raspberry_pi_support {
        let triple = build::raspberry_host_triple()?;
        flags.push(Library::Sdl2, format!("--host={}", triple));
    }

    let show_list = selected_show_list(&cli);
    let build_list = selected_build_list(&cli);

    if !show_list.is_empty() {
        fetch::download_and_extract_all(&root, &show_list)?;
        for library in &show_list {
            println!(
                "\n------- Configure options for '{}' -------\n",
                library.source_dir()
            );
            build::show_configure_options(&root, *library)?;
        }
        if !cli.add_profile_variables {
            return Ok(());
        }
    }

    if !build_list.is_empty() {
        fetch::download_and_extract_all(&root, &build_list)?;
        build::build_all_and_copy(&root, &build_list, &flags, cli.no_skip)?;

        println!(
            "{}",
            "Building libraries and copying files finished without errors.".green()
        );
        println!(
            "Header files (.h) location:          '{}'",
            root.join(artifacts::INCLUDE_DIR).display()
        );
        println!(
            "Library files (.so and .a) location: '{}'\n",
            root.join(artifacts::LIBRARY_DIR).display()
        );
        if !cli.add_profile_variables {
            return Ok(());
        }
    }

    if cli.add_profile_variables {
        profile::add_profile_variables(
            &profile::profile_path()?,
            &root.join(artifacts::INCLUDE_DIR),
            &root.join(artifacts::LIBRARY_DIR),
        )?;
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{}", error.to_string().red());
        process::exit(-1);
    }
}
