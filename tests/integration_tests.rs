use std::sync::{Arc, Mutex};

use easyvideo::ports::{CapturedOutput, CommandRunner, ToolExit};
use easyvideo::registry::{self, BuildOptions};
use easyvideo::utils::time::Timecode;
use easyvideo::*;

/// Test utilities
mod test_utils {
    use super::*;

    /// Runner that fails the test if anything is executed
    pub struct ForbiddenRunner;

    impl CommandRunner for ForbiddenRunner {
        fn run(&self, command: &CommandLine) -> EasyVideoResult<ToolExit> {
            panic!("dry-run executed {}", command);
        }

        fn capture(&self, command: &CommandLine) -> EasyVideoResult<CapturedOutput> {
            panic!("dry-run executed {}", command);
        }
    }

    /// Runner that records commands and always succeeds
    #[derive(Default)]
    pub struct RecordingRunner {
        pub stdout: String,
        pub seen: Mutex<Vec<String>>,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &CommandLine) -> EasyVideoResult<ToolExit> {
            self.seen.lock().unwrap().push(command.to_string());
            Ok(ToolExit { code: Some(0) })
        }

        fn capture(&self, command: &CommandLine) -> EasyVideoResult<CapturedOutput> {
            self.seen.lock().unwrap().push(command.to_string());
            Ok(CapturedOutput {
                exit: ToolExit { code: Some(0) },
                stdout: self.stdout.clone(),
                stderr: String::new(),
            })
        }
    }

    pub fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// Minimal arguments that satisfy each operation's required parameters
    pub fn sample_args(operation: &str) -> Vec<String> {
        match operation {
            "add_audio" => args(&["music.mp3"]),
            "add_subtitles" => args(&["subs.srt"]),
            "concat" => args(&["b.mp4", "c.mp4"]),
            "create_poster" => args(&["song.mp3", "cover.png"]),
            "trim" => args(&["10", "1m"]),
            _ => Vec::new(),
        }
    }
}

use test_utils::*;

#[test]
fn test_human_duration_examples() {
    assert_eq!(normalize_human_duration("1m3s"), "00:01:03");
    assert_eq!(normalize_human_duration("2m30"), "00:02:30");
    assert_eq!(normalize_human_duration("45"), "00:00:45");
    // Values are not carried into the next field.
    assert_eq!(normalize_human_duration("90"), "00:00:90");
}

#[test]
fn test_human_duration_field_width() {
    for minutes in 0..60u64 {
        for seconds in [0u64, 7, 59] {
            let text = normalize_human_duration(&format!("{}m{}s", minutes, seconds));
            assert_eq!(text, format!("00:{:02}:{:02}", minutes, seconds));
            assert_eq!(text.len(), 8);
        }
    }
}

#[test]
fn test_tool_duration_forms() {
    assert_eq!(
        parse_tool_duration("Duration: 00:01:30"),
        Some(DurationSeconds::Whole(90))
    );
    assert_eq!(
        parse_tool_duration("Duration: 12.50 s"),
        Some(DurationSeconds::Fractional(12.5))
    );
    assert_eq!(parse_tool_duration("no duration here"), None);
}

#[test]
fn test_tool_duration_round_trip() {
    for total in (0..7200u64).step_by(37) {
        let text = format!("Duration: {}", Timecode::from_total_seconds(total));
        assert_eq!(parse_tool_duration(&text), Some(DurationSeconds::Whole(total)));
    }
}

#[test]
fn test_concat_command_shape() {
    let session = Session::new(args(&["a.mp4", "b.mp4", "c.mp4"])).with_output("out.mp4");
    let plan = registry::build("concat", &session, &[], &BuildOptions::default()).unwrap();
    let command = plan.render();
    for i in 0..3 {
        assert!(command.contains(&format!("[{}:v]", i)));
    }
    assert!(!command.contains("[3:v]"));
    assert!(command.contains("concat=n=3:v=1"));
    assert!(command.ends_with("out.mp4 -y"));
}

#[test]
fn test_speed_factors() {
    let session = Session::new("in.mp4").with_output("out.mp4");
    let options = BuildOptions::default();

    let slow = registry::build("slowdown", &session, &args(&["x4"]), &options).unwrap();
    assert!(slow.render().contains("setpts=4.0*PTS"));

    let fast = registry::build("speedup", &session, &args(&["x4"]), &options).unwrap();
    assert!(fast.render().contains("setpts=0.25*PTS"));

    let err = registry::build("slowdown", &session, &args(&["x3"]), &options).unwrap_err();
    assert!(matches!(err, EasyVideoError::UnsupportedOption { .. }));
}

#[test]
fn test_registry_lookup_is_total() {
    for entry in registry::catalogue() {
        assert!(registry::lookup(entry.name).is_ok(), "{}", entry.name);
    }
    for name in ["", "RESIZE", "resize ", "trimm", "list"] {
        assert!(matches!(
            registry::lookup(name),
            Err(EasyVideoError::UnknownOperation { .. })
        ));
    }
}

#[test]
fn test_dry_run_for_every_operation() {
    let interactor = OperationInteractor::new(Arc::new(ForbiddenRunner), BuildOptions::default());
    for op in registry::operations() {
        let request = OperationRequest::new(
            Session::new("a.mp4").with_output("out.mp4"),
            op.name,
            sample_args(op.name),
        )
        .dry_run();
        match interactor.execute(&request).unwrap() {
            Outcome::DryRun(command) => assert!(!command.is_empty()),
            other => panic!("{} returned {:?}", op.name, other),
        }
    }
}

#[test]
fn test_executed_command_matches_dry_run() {
    let runner = Arc::new(RecordingRunner::default());
    let interactor = OperationInteractor::new(runner.clone(), BuildOptions::default());
    let request = OperationRequest::new(
        Session::new("clip.avi").with_output("clip.mp4"),
        "trim",
        args(&["1m 3s", "30"]),
    );

    let shown = match interactor.execute(&request.clone().dry_run()).unwrap() {
        Outcome::DryRun(command) => command,
        other => panic!("unexpected outcome {:?}", other),
    };
    interactor.execute(&request).unwrap();

    assert_eq!(shown, "avconv -i clip.avi -ss 00:01:03 -t 00:00:30 -codec copy clip.mp4 -y");
    assert_eq!(*runner.seen.lock().unwrap(), vec![shown]);
}

#[test]
fn test_duration_operation() {
    let runner = Arc::new(RecordingRunner {
        stdout: "File Size : 1 MB\nDuration : 12.50 s\n".to_string(),
        ..RecordingRunner::default()
    });
    let interactor = OperationInteractor::new(runner, BuildOptions::default());
    let outcome = interactor
        .execute(&OperationRequest::new(Session::new("short.mp4"), "duration", Vec::new()))
        .unwrap();
    assert_eq!(outcome, Outcome::Duration(DurationSeconds::Fractional(12.5)));
}

#[test]
fn test_missing_required_parameters() {
    let session = Session::new("in.mp4");
    let options = BuildOptions::default();
    for op in ["add_audio", "add_subtitles", "create_poster", "trim"] {
        let err = registry::build(op, &session, &[], &options).unwrap_err();
        assert!(
            matches!(err, EasyVideoError::InvalidOperationParameters { .. }),
            "{}: {}",
            op,
            err
        );
    }
}

#[test]
fn test_oversized_duration_is_unavailable() {
    let runner = Arc::new(RecordingRunner {
        stdout: "Duration : 9999999999999999:00:00\n".to_string(),
        ..RecordingRunner::default()
    });
    let interactor = OperationInteractor::new(runner, BuildOptions::default());
    let err = interactor
        .execute(&OperationRequest::new(Session::new("huge.mp4"), "duration", Vec::new()))
        .unwrap_err();
    assert!(matches!(err, EasyVideoError::DurationUnavailable { .. }));
    assert_eq!(err.exit_code(), 1);
}
