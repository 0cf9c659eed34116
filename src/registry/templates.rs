//! Command templates, one per operation

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::model::{CommandLine, Session, Toolchain};
use crate::error::{EasyVideoError, EasyVideoResult};
use crate::registry::params::{
    format_factor, lookup_factor, Dimensions, ImageExtension, PositiveNumber, Switch,
    SLOWDOWN_FACTORS, SPEEDUP_FACTORS,
};
use crate::registry::{intermediate_name, BuildOptions, CommandPlan, Params};
use crate::utils::time::Timecode;

/// Pads odd frame sizes up to even ones, which yuv420p requires
const EVEN_DIMENSIONS_FILTER: &str = "scale=trunc(iw/2)*2:trunc(ih/2)*2";

/// Everything a template may read
pub struct BuildContext<'a> {
    operation: &'static str,
    session: &'a Session,
    params: &'a Params,
    options: &'a BuildOptions,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        operation: &'static str,
        session: &'a Session,
        params: &'a Params,
        options: &'a BuildOptions,
    ) -> Self {
        Self {
            operation,
            session,
            params,
            options,
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn params(&self) -> &'a Params {
        self.params
    }

    fn tools(&self) -> &'a Toolchain {
        &self.options.tools
    }

    fn input(&self) -> EasyVideoResult<&'a str> {
        match self.session.input_path() {
            "" => Err(EasyVideoError::invalid_params(self.operation, "no input file given")),
            path => Ok(path),
        }
    }

    fn output(&self) -> EasyVideoResult<&'a str> {
        match self.session.output() {
            "" => Err(EasyVideoError::invalid_params(self.operation, "no output file given")),
            path => Ok(path),
        }
    }

    fn transcoder(&self) -> CommandLine {
        CommandLine::new(&self.tools().transcoder)
    }

    fn legacy_transcoder(&self) -> CommandLine {
        CommandLine::new(&self.tools().legacy_transcoder)
    }

    /// Finish a transcoder line with its destination and the overwrite flag
    fn write_to(&self, line: CommandLine, destination: &str) -> CommandLine {
        line.arg(destination).arg_if(self.options.overwrite, "-y")
    }

    fn write_output(&self, line: CommandLine) -> EasyVideoResult<CommandPlan> {
        Ok(CommandPlan::Run(self.write_to(line, self.output()?)))
    }

    /// Read a human-typed time parameter; debug sessions echo the parsed fields
    fn timecode(&self, name: &str) -> EasyVideoResult<Timecode> {
        let raw = self.params.get(name)?;
        let timecode = Timecode::from_human(raw);
        if self.session.debug() {
            info!(
                operation = self.operation,
                parameter = name,
                raw,
                hours = timecode.hours,
                minutes = timecode.minutes,
                seconds = timecode.seconds,
                "normalized {}",
                timecode
            );
        }
        Ok(timecode)
    }

    fn invalid(&self, reason: impl Into<String>) -> EasyVideoError {
        EasyVideoError::invalid_params(self.operation, reason)
    }
}

pub(crate) fn add_audio(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let line = ctx
        .transcoder()
        .args(["-i", ctx.input()?, "-i", ctx.params.get("audio_file")?])
        .args(["-codec", "copy", "-shortest"]);
    ctx.write_output(line)
}

pub(crate) fn add_subtitles(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let line = ctx
        .transcoder()
        .args(["-i", ctx.input()?, "-i", ctx.params.get("subtitle_file")?])
        .args(["-c", "copy", "-c:s", "mov_text"]);
    ctx.write_output(line)
}

pub(crate) fn capture_desktop(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let resolution: Dimensions = ctx.params.parse("resolution")?;
    if let Dimensions::Width(_) = resolution {
        return Err(ctx.invalid("resolution must be given as WxH e.g. 1024x768"));
    }
    let frame_rate: PositiveNumber = ctx.params.parse("frame_rate")?;
    let line = ctx
        .transcoder()
        .args(["-video_size", &resolution.to_string()])
        .args(["-framerate", frame_rate.as_str()])
        .args(["-f", "x11grab", "-i", ":0.0+0,0"]);
    ctx.write_output(line)
}

pub(crate) fn concat(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let inputs = ctx.params.inputs();
    if inputs.iter().any(|path| path.trim().is_empty()) {
        return Err(ctx.invalid("input list contains an empty path"));
    }

    let mut line = ctx.transcoder();
    for path in inputs {
        line = line.args(["-i", path.as_str()]);
    }
    let streams = (0..inputs.len())
        .map(|i| format!("[{}:v]", i))
        .collect::<Vec<_>>()
        .join(" ");
    let line = line
        .arg("-filter_complex")
        .arg(format!("{} concat=n={}:v=1 [v]", streams, inputs.len()))
        .args(["-map", "[v]"]);
    ctx.write_output(line)
}

pub(crate) fn create_poster(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let line = ctx
        .transcoder()
        .args(["-loop", "1", "-i", ctx.params.get("image_path")?])
        .args(["-i", ctx.params.get("audio_path")?])
        .args(["-c:v", "libx264", "-tune", "stillimage"])
        .args(["-c:a", "aac", "-b:a", "192k"])
        .args(["-pix_fmt", "yuv420p", "-shortest"]);
    ctx.write_output(line)
}

pub(crate) fn create_slideshow(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let extension: ImageExtension = ctx.params.parse("image_extension")?;
    let seconds: PositiveNumber = ctx.params.parse("seconds_per_image")?;
    let line = ctx
        .transcoder()
        .args(["-r", &format!("1/{}", seconds.as_str())])
        .args(["-i", &format!("image-%02d{}", extension.as_str())])
        .args(["-c:v", "libx264", "-r", "30", "-pix_fmt", "yuv420p"]);
    ctx.write_output(line)
}

pub(crate) fn duration(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let line = CommandLine::new(&ctx.tools().metadata_reader).arg(ctx.input()?);
    Ok(CommandPlan::Duration(line))
}

pub(crate) fn extract_images(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let frame_rate: PositiveNumber = ctx.params.parse("frame_rate")?;
    let extension: ImageExtension = ctx.params.parse("image_extension")?;
    let line = ctx
        .transcoder()
        .args(["-i", ctx.input()?])
        .args(["-r", frame_rate.as_str(), "-f", "image2"]);
    let pattern = format!("image-%02d{}", extension.as_str());
    Ok(CommandPlan::Run(ctx.write_to(line, &pattern)))
}

pub(crate) fn grab_image(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let start = ctx.timecode("start_time")?.to_string();
    let line = ctx
        .legacy_transcoder()
        .args(["-ss", start.as_str(), "-i", ctx.input()?])
        .args(["-frames:v", "1"]);
    ctx.write_output(line)
}

pub(crate) fn info(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let line = CommandLine::new(&ctx.tools().prober)
        .arg("-hide_banner")
        .arg(ctx.input()?);
    Ok(CommandPlan::Report(line))
}

pub(crate) fn play(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let line = CommandLine::new(&ctx.tools().player)
        .arg(ctx.output()?)
        .args(["-fs", "-zoom"]);
    Ok(CommandPlan::Run(line))
}

pub(crate) fn preview(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let line = CommandLine::new(&ctx.tools().previewer).arg(ctx.output()?);
    Ok(CommandPlan::Run(line))
}

pub(crate) fn remove_audio(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let line = ctx.transcoder().args(["-i", ctx.input()?, "-an"]);
    ctx.write_output(line)
}

pub(crate) fn remove_video(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let line = ctx.transcoder().args(["-i", ctx.input()?, "-vn"]);
    ctx.write_output(line)
}

pub(crate) fn resize(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let dimensions: Dimensions = ctx.params.parse("target_dimensions")?;
    let line = ctx
        .transcoder()
        .args(["-i", ctx.input()?])
        .args(["-vf", &dimensions.scale_filter()]);
    ctx.write_output(line)
}

pub(crate) fn screencast(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let seconds = ctx
        .timecode("duration")?
        .total_seconds()
        .ok_or_else(|| ctx.invalid("duration is too long"))?;
    if seconds == 0 {
        return Err(ctx.invalid("duration must be at least one second"));
    }
    let scale: PositiveNumber = ctx.params.parse("scale")?;
    let Switch(show_window) = ctx.params.parse("show_window")?;

    Ok(CommandPlan::Screencast(ScreencastPlan {
        recorder: ctx.tools().recorder.clone(),
        transcoder: ctx.tools().transcoder.clone(),
        seconds,
        scale: scale.as_str().to_string(),
        show_window,
        output: ctx.output()?.to_string(),
        working_dir: ctx.session.working_dir().to_path_buf(),
        overwrite: ctx.options.overwrite,
    }))
}

fn retime(ctx: &BuildContext<'_>, factor: f64) -> EasyVideoResult<CommandPlan> {
    let line = ctx
        .transcoder()
        .args(["-i", ctx.input()?])
        .args(["-vf", &format!("setpts={}*PTS", format_factor(factor))]);
    ctx.write_output(line)
}

pub(crate) fn slowdown(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let key = ctx.params.get("speed_factor")?;
    let multiplier = lookup_factor(ctx.operation, SLOWDOWN_FACTORS, key)?;
    retime(ctx, multiplier)
}

pub(crate) fn speedup(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let key = ctx.params.get("speed_factor")?;
    let multiplier = lookup_factor(ctx.operation, SPEEDUP_FACTORS, key)?;
    retime(ctx, 1.0 / multiplier)
}

pub(crate) fn transcode(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let input = ctx.input()?;
    let output = ctx.output()?;
    if is_animated_image(input) {
        let line = animated_image_to_video(ctx.transcoder(), input, EVEN_DIMENSIONS_FILTER);
        return Ok(CommandPlan::Run(ctx.write_to(line, output)));
    }
    let line = ctx.transcoder().args(["-i", input]);
    Ok(CommandPlan::Run(ctx.write_to(line, output)))
}

pub(crate) fn trim(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let start = ctx.timecode("start_time")?.to_string();
    let length = ctx.timecode("end_or_duration")?.to_string();
    let line = ctx
        .legacy_transcoder()
        .args(["-i", ctx.input()?])
        .args(["-ss", start.as_str(), "-t", length.as_str()])
        .args(["-codec", "copy"]);
    ctx.write_output(line)
}

pub(crate) fn youtube_dl(ctx: &BuildContext<'_>) -> EasyVideoResult<CommandPlan> {
    let line = CommandLine::new(&ctx.tools().downloader)
        .args(["-f", ctx.params.get("format_selector")?])
        .arg(ctx.input()?)
        .args(["-o", ctx.output()?]);
    Ok(CommandPlan::Run(line))
}

fn is_animated_image(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gif"))
        .unwrap_or(false)
}

/// Re-encode an animated image as web-friendly video
fn animated_image_to_video(line: CommandLine, input: &str, filter: &str) -> CommandLine {
    line.args(["-i", input])
        .args(["-movflags", "faststart", "-pix_fmt", "yuv420p"])
        .args(["-vf", filter])
}

/// Scale both sides by `factor`, rounding down to even sizes
fn scaled_even_filter(factor: &str) -> String {
    format!("scale=trunc(iw*{f}/2)*2:trunc(ih*{f}/2)*2", f = factor)
}

/// Two-step screencast: the screen recorder writes an animated image, then
/// the transcoder turns that image into the requested output.
///
/// The caller owns the intermediate file and decides where it lives.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreencastPlan {
    recorder: String,
    transcoder: String,
    seconds: u64,
    scale: String,
    show_window: bool,
    output: String,
    working_dir: PathBuf,
    overwrite: bool,
}

impl ScreencastPlan {
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// File name of the intermediate animated image
    pub fn intermediate_name(&self) -> PathBuf {
        intermediate_name(&self.output)
    }

    /// Intermediate location shown in dry-run output
    pub fn dry_run_intermediate(&self) -> PathBuf {
        self.working_dir.join(self.intermediate_name())
    }

    /// Step 1: record the screen into `intermediate` (byzanz-record syntax).
    /// `show_window` keeps the pointer visible in the recording.
    pub fn record_command(&self, intermediate: &Path) -> CommandLine {
        CommandLine::new(&self.recorder)
            .arg(format!("--duration={}", self.seconds))
            .arg_if(self.show_window, "--cursor")
            .arg(intermediate.to_string_lossy())
    }

    /// Step 2: transcode the intermediate into the final output, applying `scale`
    pub fn transcode_command(&self, intermediate: &Path) -> CommandLine {
        let input = intermediate.to_string_lossy();
        let filter = scaled_even_filter(&self.scale);
        animated_image_to_video(CommandLine::new(&self.transcoder), &input, &filter)
            .arg(self.output.as_str())
            .arg_if(self.overwrite, "-y")
    }
}
