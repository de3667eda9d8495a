// src/library.rs
// The static table of SDL libraries this tool knows how to download and build.

const SDL2_URL: &str = "https://www.libsdl.org/release/SDL2-2.0.5.tar.gz";
const SDL2_TTF_URL: &str = "https://www.libsdl.org/projects/SDL_ttf/release/SDL2_ttf-2.0.14.tar.gz";
const SDL2_MIXER_URL: &str = "https://www.libsdl.org/projects/SDL_mixer/release/SDL2_mixer-2.0.1.tar.gz";
const SDL2_IMAGE_URL: &str = "https://www.libsdl.org/projects/SDL_image/release/SDL2_image-2.0.1.tar.gz";

const ARCHIVE_SUFFIX: &str = ".tar.gz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    Sdl2,
    Ttf,
    Mixer,
    Image,
}

impl Library {
    /// Build order for `--build-all`. SDL2 comes first because the add-on
    /// libraries link against it.
    pub const ALL: [Library; 4] = [Library::Sdl2, Library::Ttf, Library::Mixer, Library::Image];

    pub fn name(self) -> &'static str {
        match self {
            Library::Sdl2 => "SDL2",
            Library::Ttf => "SDL2_ttf",
            Library::Mixer => "SDL2_mixer",
            Library::Image => "SDL2_image",
        }
    }

    pub fn url(self) -> &'static str {
        match self {
            Library::Sdl2 => SDL2_URL,
            Library::Ttf => SDL2_TTF_URL,
            Library::Mixer => SDL2_MIXER_URL,
            Library::Image => SDL2_IMAGE_URL,
        }
    }

    /// Last path segment of the download URL.
    pub fn archive_name(self) -> &'static str {
        let url = self.url();
        url.rsplit('/').next().unwrap_or(url)
    }

    /// Directory the archive unpacks to: the archive name with the
    /// compressed-tar suffix stripped.
    pub fn source_dir(self) -> &'static str {
        let archive = self.archive_name();
        archive.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(archive)
    }

    fn index(self) -> usize {
        match self {
            Library::Sdl2 => 0,
            Library::Ttf => 1,
            Library::Mixer => 2,
            Library::Image => 3,
        }
    }
}

/// Per-library configure arguments, resolved once from the command line and
/// passed down to the build step instead of living in shared mutable state.
#[derive(Debug, Default, Clone)]
pub struct ConfigureFlags {
    lists: [Vec<String>; 4],
}

impl ConfigureFlags {
    pub fn get(&self, library: Library) -> &[String] {
        &self.lists[library.index()]
    }

    /// Replaces the library's flag list, dropping any defaults.
    pub fn replace(&mut self, library: Library, flags: Vec<String>) {
        self.lists[library.index()] = flags;
    }

    pub fn push(&mut self, library: Library, flag: String) {
        self.lists[library.index()].push(flag);
    }

    pub fn clear_all(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_names_follow_the_url() {
        assert_eq!(Library::Sdl2.archive_name(), "SDL2-2.0.5.tar.gz");
        assert_eq!(Library::Sdl2.source_dir(), "SDL2-2.0.5");
        assert_eq!(Library::Image.archive_name(), "SDL2_image-2.0.1.tar.gz");
        assert_eq!(Library::Image.source_dir(), "SDL2_image-2.0.1");
    }

    #[test]
    fn archive_and_directory_names_stay_consistent() {
        for library in Library::ALL {
            assert!(library.url().ends_with(library.archive_name()));
            assert_eq!(
                library.archive_name(),
                format!("{}{}", library.source_dir(), ARCHIVE_SUFFIX)
            );
        }
    }

    #[test]
    fn replace_drops_previous_flags() {
        let mut flags = ConfigureFlags::default();
        flags.push(Library::Sdl2, "--enable-video-x11".to_string());
        flags.replace(Library::Sdl2, vec!["--enable-video-opengl".to_string()]);
        assert_eq!(flags.get(Library::Sdl2), ["--enable-video-opengl"]);
    }

    #[test]
    fn clear_all_empties_every_list() {
        let mut flags = ConfigureFlags::default();
        for library in Library::ALL {
            flags.push(library, "--with-pic".to_string());
        }
        flags.clear_all();
        for library in Library::ALL {
            assert!(flags.get(library).is_empty());
        }
    }
}
