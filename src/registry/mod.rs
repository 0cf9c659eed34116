//! Operation registry
//!
//! A static table of operation descriptors. Each descriptor names the
//! parameters an operation takes and the template that turns resolved
//! parameters into the external command line.

use std::path::PathBuf;

use regex::Regex;
use serde::Serialize;

use crate::domain::model::{CommandLine, Session, Toolchain};
use crate::error::{EasyVideoError, EasyVideoResult};

pub mod params;
pub mod templates;

pub use params::Params;
pub use templates::{BuildContext, ScreencastPlan};

/// Builds the plan for one operation from its resolved context
pub type Template = fn(&BuildContext<'_>) -> EasyVideoResult<CommandPlan>;

/// Static description of one supported operation
pub struct OperationDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    /// Parameters without a default, in positional order
    pub required_params: &'static [&'static str],
    /// Parameters with a default, in positional order
    pub optional_params: &'static [(&'static str, &'static str)],
    /// Takes every positional argument as an additional input file
    pub multi_input: bool,
    pub template: Template,
}

impl OperationDescriptor {
    /// Declared parameter names, required first
    pub fn param_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required_params
            .iter()
            .copied()
            .chain(self.optional_params.iter().map(|(name, _)| *name))
    }

    /// Usage line such as `trim <start_time> <end_or_duration>`
    pub fn usage(&self) -> String {
        let mut usage = self.name.to_string();
        for name in self.required_params {
            usage.push_str(&format!(" <{}>", name));
        }
        for (name, default) in self.optional_params {
            usage.push_str(&format!(" [{}={}]", name, default));
        }
        usage
    }
}

impl std::fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("required_params", &self.required_params)
            .field("optional_params", &self.optional_params)
            .finish()
    }
}

/// What an operation needs from the runner
#[derive(Debug, Clone, PartialEq)]
pub enum CommandPlan {
    /// Run one command with inherited output
    Run(CommandLine),
    /// Run the metadata reader and parse a duration from its output
    Duration(CommandLine),
    /// Run the prober and surface its report
    Report(CommandLine),
    /// Record an intermediate animated image, then transcode it
    Screencast(ScreencastPlan),
}

impl CommandPlan {
    /// Command text shown in dry-run mode
    pub fn render(&self) -> String {
        match self {
            CommandPlan::Run(line) | CommandPlan::Duration(line) | CommandPlan::Report(line) => {
                line.to_string()
            }
            CommandPlan::Screencast(plan) => {
                let intermediate = plan.dry_run_intermediate();
                format!(
                    "{} && {}",
                    plan.record_command(&intermediate),
                    plan.transcode_command(&intermediate)
                )
            }
        }
    }
}

/// Settings shared by every template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub tools: Toolchain,
    /// Let the transcoder replace an existing output file
    pub overwrite: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            tools: Toolchain::default(),
            overwrite: true,
        }
    }
}

static OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        name: "add_audio",
        aliases: &[],
        description: "add an audio track",
        required_params: &["audio_file"],
        optional_params: &[],
        multi_input: false,
        template: templates::add_audio,
    },
    OperationDescriptor {
        name: "add_subtitles",
        aliases: &[],
        description: "add subtitles from a .srt file",
        required_params: &["subtitle_file"],
        optional_params: &[],
        multi_input: false,
        template: templates::add_subtitles,
    },
    OperationDescriptor {
        name: "capture_desktop",
        aliases: &["capture", "record"],
        description: "capture the desktop at 1024x768",
        required_params: &[],
        optional_params: &[("resolution", "1024x768"), ("frame_rate", "25")],
        multi_input: false,
        template: templates::capture_desktop,
    },
    OperationDescriptor {
        name: "concat",
        aliases: &[],
        description: "joins videos sharing one codec and no audio e.g. a.mp4 b.mp4",
        required_params: &["input_list"],
        optional_params: &[],
        multi_input: true,
        template: templates::concat,
    },
    OperationDescriptor {
        name: "create_poster",
        aliases: &[],
        description: "makes a video from a still image and an audio track",
        required_params: &["audio_path", "image_path"],
        optional_params: &[],
        multi_input: false,
        template: templates::create_poster,
    },
    OperationDescriptor {
        name: "create_slideshow",
        aliases: &[],
        description: "makes a video from numbered images e.g. image-01.jpg",
        required_params: &[],
        optional_params: &[("image_extension", ".jpg"), ("seconds_per_image", "5")],
        multi_input: false,
        template: templates::create_slideshow,
    },
    OperationDescriptor {
        name: "duration",
        aliases: &[],
        description: "prints the duration in seconds",
        required_params: &[],
        optional_params: &[],
        multi_input: false,
        template: templates::duration,
    },
    OperationDescriptor {
        name: "extract_images",
        aliases: &[],
        description: "saves frames as numbered images e.g. 1 per second",
        required_params: &[],
        optional_params: &[("frame_rate", "1"), ("image_extension", ".png")],
        multi_input: false,
        template: templates::extract_images,
    },
    OperationDescriptor {
        name: "grab_image",
        aliases: &[],
        description: "saves a single frame at the given time e.g. 1m 3s",
        required_params: &[],
        optional_params: &[("start_time", "1")],
        multi_input: false,
        template: templates::grab_image,
    },
    OperationDescriptor {
        name: "info",
        aliases: &[],
        description: "prints stream information using ffprobe",
        required_params: &[],
        optional_params: &[],
        multi_input: false,
        template: templates::info,
    },
    OperationDescriptor {
        name: "play",
        aliases: &[],
        description: "plays the video using mplayer",
        required_params: &[],
        optional_params: &[],
        multi_input: false,
        template: templates::play,
    },
    OperationDescriptor {
        name: "preview",
        aliases: &[],
        description: "plays the video using ffplay",
        required_params: &[],
        optional_params: &[],
        multi_input: false,
        template: templates::preview,
    },
    OperationDescriptor {
        name: "remove_audio",
        aliases: &[],
        description: "removes the audio track",
        required_params: &[],
        optional_params: &[],
        multi_input: false,
        template: templates::remove_audio,
    },
    OperationDescriptor {
        name: "remove_video",
        aliases: &[],
        description: "removes the video track leaving the audio e.g. mp4 -> mp3",
        required_params: &[],
        optional_params: &[],
        multi_input: false,
        template: templates::remove_video,
    },
    OperationDescriptor {
        name: "resize",
        aliases: &["scale"],
        description: "resize to 720 pixels wide, or to WxH e.g. 640x480",
        required_params: &[],
        optional_params: &[("target_dimensions", "720")],
        multi_input: false,
        template: templates::resize,
    },
    OperationDescriptor {
        name: "screencast",
        aliases: &[],
        description: "records the screen as a gif then converts it to video",
        required_params: &[],
        optional_params: &[("duration", "6"), ("scale", "0.75"), ("show_window", "true")],
        multi_input: false,
        template: templates::screencast,
    },
    OperationDescriptor {
        name: "slowdown",
        aliases: &[],
        description: "slows the video down e.g. x2",
        required_params: &[],
        optional_params: &[("speed_factor", "x2")],
        multi_input: false,
        template: templates::slowdown,
    },
    OperationDescriptor {
        name: "speedup",
        aliases: &[],
        description: "speeds the video up e.g. x4",
        required_params: &[],
        optional_params: &[("speed_factor", "x2")],
        multi_input: false,
        template: templates::speedup,
    },
    OperationDescriptor {
        name: "transcode",
        aliases: &["convert"],
        description: "converts 1 video format to another e.g. avi -> mp4",
        required_params: &[],
        optional_params: &[],
        multi_input: false,
        template: templates::transcode,
    },
    OperationDescriptor {
        name: "trim",
        aliases: &[],
        description: "trims the beginning and ending of a video in hms format e.g. 1m 3s",
        required_params: &["start_time", "end_or_duration"],
        optional_params: &[],
        multi_input: false,
        template: templates::trim,
    },
    OperationDescriptor {
        name: "youtube_dl",
        aliases: &[],
        description: "downloads a video using youtube-dl",
        required_params: &[],
        optional_params: &[(
            "format_selector",
            "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
        )],
        multi_input: false,
        template: templates::youtube_dl,
    },
];

/// Every registered operation, sorted by name
pub fn operations() -> &'static [OperationDescriptor] {
    OPERATIONS
}

/// Find an operation by name or alias; case-sensitive
pub fn lookup(name: &str) -> EasyVideoResult<&'static OperationDescriptor> {
    OPERATIONS
        .iter()
        .find(|op| op.name == name || op.aliases.iter().any(|alias| *alias == name))
        .ok_or_else(|| EasyVideoError::UnknownOperation {
            name: name.to_string(),
        })
}

/// Resolve parameters and build the plan for `operation`
pub fn build(
    operation: &str,
    session: &Session,
    args: &[String],
    options: &BuildOptions,
) -> EasyVideoResult<CommandPlan> {
    let descriptor = lookup(operation)?;
    let params = Params::resolve(descriptor, session, args)?;
    let ctx = BuildContext::new(descriptor.name, session, &params, options);
    (descriptor.template)(&ctx)
}

/// One line of the published catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogueEntry {
    pub name: &'static str,
    pub description: String,
    pub usage: String,
}

impl CatalogueEntry {
    fn searchable(&self) -> String {
        format!("{} # {}", self.name, self.description)
    }
}

/// Operations and aliases as catalogue entries, sorted by name
pub fn catalogue() -> Vec<CatalogueEntry> {
    let mut entries = Vec::new();
    for op in OPERATIONS {
        entries.push(CatalogueEntry {
            name: op.name,
            description: op.description.to_string(),
            usage: op.usage(),
        });
        for &alias in op.aliases {
            entries.push(CatalogueEntry {
                name: alias,
                description: format!("alias for {}", op.name),
                usage: op.usage().replacen(op.name, alias, 1),
            });
        }
    }
    entries.sort_by_key(|entry| entry.name);
    entries
}

/// Catalogue entries whose `name # description` line matches `pattern`
pub fn search(pattern: &str) -> EasyVideoResult<Vec<CatalogueEntry>> {
    let re = Regex::new(pattern)?;
    Ok(catalogue()
        .into_iter()
        .filter(|entry| re.is_match(&entry.searchable()))
        .collect())
}

/// Render entries the way `--list` prints them
pub fn format_entries(entries: &[CatalogueEntry]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|e| format!(" * {:width$}  {}", e.name, e.description, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default path for the screencast intermediate in dry-run output
pub(crate) fn intermediate_name(output: &str) -> PathBuf {
    let stem = std::path::Path::new(output)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "screencast".to_string());
    PathBuf::from(format!("{}.gif", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let mut seen = HashSet::new();
        for op in operations() {
            assert!(seen.insert(op.name), "duplicate name {}", op.name);
            for &alias in op.aliases {
                assert!(seen.insert(alias), "duplicate alias {}", alias);
            }
        }
    }

    #[test]
    fn test_table_is_sorted() {
        let names: Vec<_> = operations().iter().map(|op| op.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_every_catalogue_name_resolves() {
        for entry in catalogue() {
            let op = lookup(entry.name).unwrap();
            assert!(op.name == entry.name || op.aliases.contains(&entry.name));
        }
    }

    #[test]
    fn test_aliases_resolve_to_target() {
        assert_eq!(lookup("scale").unwrap().name, "resize");
        assert_eq!(lookup("convert").unwrap().name, "transcode");
        assert_eq!(lookup("record").unwrap().name, "capture_desktop");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(lookup("resize").is_ok());
        assert!(matches!(
            lookup("Resize"),
            Err(EasyVideoError::UnknownOperation { .. })
        ));
        assert!(matches!(
            lookup("rotate"),
            Err(EasyVideoError::UnknownOperation { .. })
        ));
    }

    #[test]
    fn test_search_matches_description() {
        let names: Vec<_> = search("mplayer|ffplay").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["play", "preview"]);

        let names: Vec<_> = search("alias for resize").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["scale"]);
    }

    #[test]
    fn test_search_invalid_pattern() {
        assert!(matches!(search("("), Err(EasyVideoError::InvalidPattern(_))));
    }

    #[test]
    fn test_usage_and_listing() {
        assert_eq!(lookup("trim").unwrap().usage(), "trim <start_time> <end_or_duration>");
        assert_eq!(lookup("resize").unwrap().usage(), "resize [target_dimensions=720]");

        let listing = format_entries(&search("^trim").unwrap());
        assert!(listing.starts_with(" * trim  trims the beginning"));
    }

    #[test]
    fn test_intermediate_name() {
        assert_eq!(intermediate_name("demo.mp4"), PathBuf::from("demo.gif"));
        assert_eq!(intermediate_name(""), PathBuf::from("screencast.gif"));
    }
}
