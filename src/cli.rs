//! Handlers for the `slidetool` commands.
//!
//! Handlers write results to `out` and warnings to `err`, keep going after a
//! failing input, and return the process exit status: 0 if every input
//! succeeded, 1 otherwise.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{Command, PropCommand, SlideCommand};
use crate::error::SlideError;
use crate::native::SlideLibrary;
use crate::slide::{EmptyValues, OpenOptions, Slide, SlideCache};

/// Prefix of every warning line.
pub const PROGRAM_NAME: &str = "slidetool";

/// Exit status when every input succeeded.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status when at least one input failed.
pub const EXIT_FAILURE: u8 = 1;

/// Runs commands against one slide library, sharing one optional tile cache.
pub struct SlideTool<'a, L: SlideLibrary> {
    library: &'a L,
    cache: Option<SlideCache<L::Cache>>,
}

impl<'a, L: SlideLibrary> SlideTool<'a, L> {
    /// Create a runner. A cache of `cache_size` bytes is allocated up front
    /// when given.
    pub fn new(library: &'a L, cache_size: Option<usize>) -> Result<Self, SlideError> {
        let cache = cache_size
            .map(|capacity| SlideCache::create(library, capacity))
            .transpose()?;
        Ok(Self { library, cache })
    }

    /// Cache shared by the slides this runner opens.
    pub fn cache(&self) -> Option<&SlideCache<L::Cache>> {
        self.cache.as_ref()
    }

    pub fn run<O: Write, E: Write>(
        &self,
        command: &Command,
        out: &mut O,
        err: &mut E,
    ) -> io::Result<u8> {
        match command {
            Command::Slide(SlideCommand::Open { files }) => self.open(files, err),
            Command::Slide(SlideCommand::Vendor { files }) => self.vendor(files, out, err),
            Command::Slide(SlideCommand::Version) => self.version(out),
            Command::Prop(PropCommand::List {
                file,
                json,
                drop_empty,
            }) => {
                let empty_values = if *drop_empty {
                    EmptyValues::Drop
                } else {
                    EmptyValues::Keep
                };
                self.prop_list(file, *json, empty_values, out, err)
            }
            Command::Prop(PropCommand::Get { file, names }) => self.prop_get(file, names, out, err),
        }
    }

    fn open_slide(&self, file: &Path, empty_values: EmptyValues) -> Slide<L> {
        let mut options = OpenOptions::new().with_empty_values(empty_values);
        if let Some(ref cache) = self.cache {
            options = options.with_cache(cache.clone());
        }
        Slide::open_with(self.library, file, options)
    }

    // =========================================================================
    // slide
    // =========================================================================

    /// `slide open`: try opening each file, warn about the ones that fail.
    pub fn open<E: Write>(&self, files: &[PathBuf], err: &mut E) -> io::Result<u8> {
        let mut status = EXIT_SUCCESS;
        for file in files {
            debug!("Trying to open {}", file.display());
            let slide = self.open_slide(file, EmptyValues::Keep);
            if let Some(message) = slide.error_message() {
                warn(err, format_args!("{}: {}", file.display(), message))?;
                status = EXIT_FAILURE;
            }
        }
        Ok(status)
    }

    /// `slide vendor`: print the detected vendor of each file.
    ///
    /// With more than one file, each line is prefixed with the file name.
    pub fn vendor<O: Write, E: Write>(
        &self,
        files: &[PathBuf],
        out: &mut O,
        err: &mut E,
    ) -> io::Result<u8> {
        let mut status = EXIT_SUCCESS;
        for file in files {
            match Slide::detect_vendor(self.library, file) {
                Some(vendor) if files.len() > 1 => {
                    writeln!(out, "{}: {}", file.display(), vendor)?;
                }
                Some(vendor) => writeln!(out, "{}", vendor)?,
                None => {
                    warn(err, format_args!("{}: No vendor detected", file.display()))?;
                    status = EXIT_FAILURE;
                }
            }
        }
        Ok(status)
    }

    /// `slide version`: print the library version.
    pub fn version<O: Write>(&self, out: &mut O) -> io::Result<u8> {
        writeln!(out, "{}", Slide::version(self.library))?;
        Ok(EXIT_SUCCESS)
    }

    // =========================================================================
    // prop
    // =========================================================================

    /// `prop list`: print every property as `name: 'value'`, or as JSON.
    pub fn prop_list<O: Write, E: Write>(
        &self,
        file: &Path,
        json: bool,
        empty_values: EmptyValues,
        out: &mut O,
        err: &mut E,
    ) -> io::Result<u8> {
        let slide = self.open_slide(file, empty_values);
        let properties = match slide.properties() {
            Ok(properties) => properties,
            Err(e) => {
                warn(err, format_args!("{}: {}", file.display(), e))?;
                return Ok(EXIT_FAILURE);
            }
        };

        if json {
            let text = serde_json::to_string_pretty(&properties).map_err(io::Error::other)?;
            writeln!(out, "{}", text)?;
        } else {
            for (name, value) in &properties {
                writeln!(out, "{}: '{}'", name, value)?;
            }
        }
        Ok(EXIT_SUCCESS)
    }

    /// `prop get`: print the value of each named property.
    pub fn prop_get<O: Write, E: Write>(
        &self,
        file: &Path,
        names: &[String],
        out: &mut O,
        err: &mut E,
    ) -> io::Result<u8> {
        let slide = self.open_slide(file, EmptyValues::Keep);
        if let Err(e) = slide.check_error() {
            warn(err, format_args!("{}: {}", file.display(), e))?;
            return Ok(EXIT_FAILURE);
        }

        let mut status = EXIT_SUCCESS;
        for name in names {
            match slide.property_value(name) {
                Ok(Some(value)) => writeln!(out, "{}", value)?,
                Ok(None) => {
                    warn(err, format_args!("{}: No such property", name))?;
                    status = EXIT_FAILURE;
                }
                Err(e) => {
                    warn(err, format_args!("{}: {}", file.display(), e))?;
                    return Ok(EXIT_FAILURE);
                }
            }
        }
        Ok(status)
    }
}

fn warn<E: Write>(err: &mut E, message: std::fmt::Arguments<'_>) -> io::Result<()> {
    writeln!(err, "{}: {}", PROGRAM_NAME, message)
}
