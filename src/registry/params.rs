//! Parameter resolution and typed operation options

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::model::Session;
use crate::error::{EasyVideoError, EasyVideoResult};
use crate::registry::OperationDescriptor;

/// Named speed multipliers accepted by `slowdown`
pub const SLOWDOWN_FACTORS: &[(&str, f64)] = &[("x1_5", 1.5), ("x2", 2.0), ("x4", 4.0)];

/// Named speed multipliers accepted by `speedup`
pub const SPEEDUP_FACTORS: &[(&str, f64)] = &[
    ("x1_5", 1.5),
    ("x2", 2.0),
    ("x4", 4.0),
    ("x6", 6.0),
    ("x8", 8.0),
    ("x16", 16.0),
    ("x32", 32.0),
    ("x64", 64.0),
];

/// Parameters of one operation after defaults and arguments are merged
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    operation: &'static str,
    values: BTreeMap<&'static str, String>,
    inputs: Vec<String>,
}

impl Params {
    /// Merge `args` with the descriptor's defaults.
    ///
    /// `name=value` arguments whose name the operation declares are bound by
    /// name; the rest fill the required parameters, then the optional ones,
    /// in declaration order. Multi-input operations take the session inputs
    /// plus every positional argument as their input list.
    pub fn resolve(
        descriptor: &OperationDescriptor,
        session: &Session,
        args: &[String],
    ) -> EasyVideoResult<Self> {
        let operation = descriptor.name;
        let mut values = BTreeMap::new();
        let mut positional = Vec::new();

        for arg in args {
            match split_named(descriptor, arg) {
                Some((name, value)) => {
                    if values.insert(name, value.to_string()).is_some() {
                        return Err(EasyVideoError::invalid_params(
                            operation,
                            format!("parameter '{}' given more than once", name),
                        ));
                    }
                }
                None => positional.push(arg.clone()),
            }
        }

        let mut inputs = session.input().paths().to_vec();

        if descriptor.multi_input {
            inputs.append(&mut positional);
            if inputs.len() < 2 {
                return Err(EasyVideoError::invalid_params(
                    operation,
                    format!("needs at least 2 input files, got {}", inputs.len()),
                ));
            }
        } else {
            let open_slots = descriptor
                .required_params
                .iter()
                .copied()
                .chain(descriptor.optional_params.iter().map(|(name, _)| *name))
                .filter(|name| !values.contains_key(name))
                .collect::<Vec<_>>();

            if positional.len() > open_slots.len() {
                return Err(EasyVideoError::invalid_params(
                    operation,
                    format!("unexpected argument '{}'", positional[open_slots.len()]),
                ));
            }
            for (name, value) in open_slots.into_iter().zip(positional) {
                values.insert(name, value);
            }

            for name in descriptor.required_params {
                match values.get(name) {
                    Some(value) if !value.trim().is_empty() => {}
                    _ => {
                        return Err(EasyVideoError::invalid_params(
                            operation,
                            format!("missing required parameter '{}'", name),
                        ))
                    }
                }
            }
        }

        for (name, default) in descriptor.optional_params {
            values.entry(*name).or_insert_with(|| default.to_string());
        }

        Ok(Self {
            operation,
            values,
            inputs,
        })
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Value of a declared parameter
    pub fn get(&self, name: &str) -> EasyVideoResult<&str> {
        self.values.get(name).map(String::as_str).ok_or_else(|| {
            EasyVideoError::invalid_params(self.operation, format!("missing parameter '{}'", name))
        })
    }

    /// Parse a declared parameter, reporting failures against the operation
    pub fn parse<T>(&self, name: &str) -> EasyVideoResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.get(name)?;
        raw.trim().parse().map_err(|e| {
            EasyVideoError::invalid_params(
                self.operation,
                format!("invalid {} '{}': {}", name, raw, e),
            )
        })
    }

    /// Input paths, in order
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }
}

fn split_named<'a>(
    descriptor: &OperationDescriptor,
    arg: &'a str,
) -> Option<(&'static str, &'a str)> {
    let (key, value) = arg.split_once('=')?;
    descriptor.param_names().find(|name| *name == key).map(|name| (name, value))
}

/// Look up a named speed multiplier
pub fn lookup_factor(
    operation: &str,
    table: &[(&str, f64)],
    key: &str,
) -> EasyVideoResult<f64> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, multiplier)| *multiplier)
        .ok_or_else(|| EasyVideoError::UnsupportedOption {
            operation: operation.to_string(),
            option: "speed_factor".to_string(),
            value: key.to_string(),
            allowed: table
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Format a timestamp multiplier: at least one decimal, at most six, no trailing zeros
pub fn format_factor(factor: f64) -> String {
    if factor.fract() == 0.0 {
        return format!("{:.1}", factor);
    }
    let text = format!("{:.6}", factor);
    text.trim_end_matches('0').to_string()
}

/// Target size for `resize`: a width with automatic height, or both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimensions {
    Width(u32),
    Exact { width: u32, height: u32 },
}

impl Dimensions {
    /// Argument for the transcoder's `scale` video filter
    pub fn scale_filter(&self) -> String {
        match self {
            Dimensions::Width(width) => format!("scale={}:-1", width),
            Dimensions::Exact { width, height } => format!("scale={}:{}", width, height),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimensions::Width(width) => write!(f, "{}", width),
            Dimensions::Exact { width, height } => write!(f, "{}x{}", width, height),
        }
    }
}

impl FromStr for Dimensions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let side = |text: &str| -> Result<u32, String> {
            match text.trim().parse::<u32>() {
                Ok(0) | Err(_) => Err(format!("'{}' is not a positive pixel count", text)),
                Ok(value) => Ok(value),
            }
        };
        match s.split_once(|c: char| c == 'x' || c == 'X') {
            Some((width, height)) => Ok(Dimensions::Exact {
                width: side(width)?,
                height: side(height)?,
            }),
            None => Ok(Dimensions::Width(side(s)?)),
        }
    }
}

/// Positive decimal number, kept in its textual form for the command line
#[derive(Debug, Clone, PartialEq)]
pub struct PositiveNumber(String);

impl PositiveNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PositiveNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Ok(Self(s.to_string())),
            _ => Err("expected a positive number".to_string()),
        }
    }
}

/// Image file extension with a leading dot (`jpg` becomes `.jpg`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageExtension(String);

impl ImageExtension {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ImageExtension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.trim_start_matches('.');
        if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err("expected an extension such as .png".to_string());
        }
        Ok(Self(format!(".{}", bare)))
    }
}

/// Boolean switch accepting `true/false`, `yes/no`, `on/off` and `1/0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switch(pub bool);

impl FromStr for Switch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Switch(true)),
            "false" | "no" | "off" | "0" => Ok(Switch(false)),
            _ => Err("expected true or false".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::lookup;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_positional_fills_required_then_optional() {
        let trim = lookup("trim").unwrap();
        let params = Params::resolve(trim, &Session::new("a.mp4"), &args(&["1m", "30s"])).unwrap();
        assert_eq!(params.get("start_time").unwrap(), "1m");
        assert_eq!(params.get("end_or_duration").unwrap(), "30s");

        let slides = lookup("create_slideshow").unwrap();
        let params = Params::resolve(slides, &Session::new("a"), &args(&[".png"])).unwrap();
        assert_eq!(params.get("image_extension").unwrap(), ".png");
        assert_eq!(params.get("seconds_per_image").unwrap(), "5");
    }

    #[test]
    fn test_named_arguments() {
        let slides = lookup("create_slideshow").unwrap();
        let params = Params::resolve(
            slides,
            &Session::new("a"),
            &args(&["seconds_per_image=3"]),
        )
        .unwrap();
        assert_eq!(params.get("seconds_per_image").unwrap(), "3");
        assert_eq!(params.get("image_extension").unwrap(), ".jpg");
    }

    #[test]
    fn test_unknown_key_is_positional() {
        let audio = lookup("add_audio").unwrap();
        let params =
            Params::resolve(audio, &Session::new("a.mp4"), &args(&["track=1.mp3"])).unwrap();
        assert_eq!(params.get("audio_file").unwrap(), "track=1.mp3");
    }

    #[test]
    fn test_missing_required() {
        let audio = lookup("add_audio").unwrap();
        let err = Params::resolve(audio, &Session::new("a.mp4"), &[]).unwrap_err();
        assert!(matches!(err, EasyVideoError::InvalidOperationParameters { .. }));
        assert!(err.to_string().contains("audio_file"));
    }

    #[test]
    fn test_too_many_arguments() {
        let info = lookup("info").unwrap();
        let err = Params::resolve(info, &Session::new("a.mp4"), &args(&["extra"])).unwrap_err();
        assert!(err.to_string().contains("unexpected argument 'extra'"));
    }

    #[test]
    fn test_duplicate_named_argument() {
        let resize = lookup("resize").unwrap();
        let err = Params::resolve(
            resize,
            &Session::new("a.mp4"),
            &args(&["target_dimensions=640", "target_dimensions=720"]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_multi_input_collects_arguments() {
        let concat = lookup("concat").unwrap();
        let params =
            Params::resolve(concat, &Session::new("a.mp4"), &args(&["b.mp4", "c.mp4"])).unwrap();
        assert_eq!(params.inputs(), &args(&["a.mp4", "b.mp4", "c.mp4"])[..]);

        let err = Params::resolve(concat, &Session::new("a.mp4"), &[]).unwrap_err();
        assert!(matches!(err, EasyVideoError::InvalidOperationParameters { .. }));
    }

    #[test]
    fn test_lookup_factor() {
        assert_eq!(lookup_factor("slowdown", SLOWDOWN_FACTORS, "x4").unwrap(), 4.0);
        assert_eq!(lookup_factor("speedup", SPEEDUP_FACTORS, "x64").unwrap(), 64.0);
        let err = lookup_factor("slowdown", SLOWDOWN_FACTORS, "x3").unwrap_err();
        match err {
            EasyVideoError::UnsupportedOption { value, allowed, .. } => {
                assert_eq!(value, "x3");
                assert_eq!(allowed, "x1_5, x2, x4");
            }
            other => panic!("unexpected error: {other}"),
        }
        // Slowdown only offers the slower factors.
        assert!(lookup_factor("slowdown", SLOWDOWN_FACTORS, "x8").is_err());
    }

    #[test]
    fn test_format_factor() {
        assert_eq!(format_factor(4.0), "4.0");
        assert_eq!(format_factor(0.25), "0.25");
        assert_eq!(format_factor(1.5), "1.5");
        assert_eq!(format_factor(1.0 / 64.0), "0.015625");
        assert_eq!(format_factor(1.0 / 1.5), "0.666667");
    }

    #[test]
    fn test_dimensions() {
        assert_eq!("720".parse::<Dimensions>().unwrap(), Dimensions::Width(720));
        assert_eq!(
            "640x480".parse::<Dimensions>().unwrap(),
            Dimensions::Exact { width: 640, height: 480 }
        );
        assert_eq!(Dimensions::Width(720).scale_filter(), "scale=720:-1");
        assert_eq!("1024x768".parse::<Dimensions>().unwrap().to_string(), "1024x768");
        assert!("0".parse::<Dimensions>().is_err());
        assert!("wide".parse::<Dimensions>().is_err());
    }

    #[test]
    fn test_small_option_types() {
        assert_eq!("jpg".parse::<ImageExtension>().unwrap().as_str(), ".jpg");
        assert!("".parse::<ImageExtension>().is_err());
        assert_eq!("0.5".parse::<PositiveNumber>().unwrap().as_str(), "0.5");
        assert!("-1".parse::<PositiveNumber>().is_err());
        assert_eq!("no".parse::<Switch>().unwrap(), Switch(false));
        assert!("maybe".parse::<Switch>().is_err());
    }
}
