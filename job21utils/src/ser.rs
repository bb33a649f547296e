//!
//! # Markup Serialization
//!
//! Job descriptions and export options are authored as JSON, YAML or TOML.
//! [SerializationFormat] converts between these and serde types, in strings and in files.
//!

// Std-Lib
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

// Crates.io Imports
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use textwrap::dedent;

/// # Supported Markup Formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationFormat {
    Json,
    Yaml,
    Toml,
}
impl SerializationFormat {
    /// Infer the format from the extension of file-path `fname`
    pub fn from_path(fname: impl AsRef<Path>) -> Result<Self, Error> {
        let ext = fname
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        ext.parse()
    }
    /// Serialize `data` to a string. JSON is pretty-printed.
    pub fn to_string(&self, data: &impl Serialize) -> Result<String, Error> {
        let s = match self {
            Self::Json => serde_json::to_string_pretty(data)?,
            Self::Yaml => serde_yaml::to_string(data)?,
            Self::Toml => toml::to_string(data)?,
        };
        Ok(s)
    }
    /// Parse string `s`.
    /// Leading indentation common to every line is removed first, so inline test-data can be indented.
    pub fn from_str<T: DeserializeOwned>(&self, s: &str) -> Result<T, Error> {
        self.parse_text(&dedent(s))
    }
    /// Parse `text` as-is
    fn parse_text<T: DeserializeOwned>(&self, text: &str) -> Result<T, Error> {
        let data = match self {
            Self::Json => serde_json::from_str(text)?,
            Self::Yaml => serde_yaml::from_str(text)?,
            Self::Toml => toml::from_str(text)?,
        };
        Ok(data)
    }
    /// Save `data` to file `fname`, via [write_file]
    pub fn save(&self, data: &impl Serialize, fname: impl AsRef<Path>) -> Result<(), Error> {
        let text = self.to_string(data)?;
        write_file(fname, text)?;
        Ok(())
    }
    /// Load from file at path `fname`. Failures name the file.
    pub fn open<T: DeserializeOwned>(&self, fname: impl AsRef<Path>) -> Result<T, Error> {
        let fname = fname.as_ref();
        let text = std::fs::read_to_string(fname)?;
        self.parse_text(&text)
            .map_err(|e| Error::msg(format!("{}: {}", fname.display(), e)))
    }
}

/// Write `contents` to file `fname`, replacing any existing file whole.
/// Content goes to a temporary file in the same directory, which is then renamed over `fname`.
/// On failure the temporary file is removed, and any existing `fname` is left untouched.
pub fn write_file(fname: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> std::io::Result<()> {
    let fname = fname.as_ref();
    let dir = match fname.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_ref())?;
    tmp.flush()?;
    tmp.persist(fname)?;
    Ok(())
}

impl FromStr for SerializationFormat {
    type Err = Error;
    /// Parse a format name or file extension, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(Error::msg(format!(
                "Invalid format: \"{}\". Must be one of (json, yaml, toml).",
                s
            ))),
        }
    }
}

///
/// # Markup Files
///
/// Implemented, with an empty `impl` block, by each serde type stored in its own file:
/// job descriptions and export options.
///
pub trait SerdeFile: Serialize + DeserializeOwned {
    /// Save in `fmt`-format to file `fname`
    fn save(&self, fmt: SerializationFormat, fname: impl AsRef<Path>) -> Result<(), Error> {
        fmt.save(self, fname)
    }
    /// Open from `fmt`-format file `fname`
    fn open(fname: impl AsRef<Path>, fmt: SerializationFormat) -> Result<Self, Error> {
        fmt.open(fname)
    }
    /// Open from file `fname`, inferring its format from the file extension
    fn open_any(fname: impl AsRef<Path>) -> Result<Self, Error> {
        let fmt = SerializationFormat::from_path(&fname)?;
        fmt.open(fname)
    }
}

/// Serialization or file error, from any of the markup crates or [std::io]
#[derive(Debug)]
pub struct Error(Box<dyn std::error::Error + Send + Sync>);
impl Error {
    /// Create an [Error] from a string message
    pub fn msg(s: impl Into<String>) -> Self {
        let s: String = s.into();
        Self(s.into())
    }
}
impl std::fmt::Display for Error {
    /// Display the wrapped error
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
impl std::error::Error for Error {}
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self(Box::new(e))
    }
}
impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self(Box::new(e))
    }
}
impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Self(Box::new(e))
    }
}
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self(Box::new(e))
    }
}
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        let parse = |s: &str| s.parse::<SerializationFormat>();
        assert_eq!(parse("YAML").unwrap(), SerializationFormat::Yaml);
        assert_eq!(parse("yml").unwrap(), SerializationFormat::Yaml);
        assert_eq!(parse("json").unwrap(), SerializationFormat::Json);
        assert!(parse("gds").is_err());

        let fmt = SerializationFormat::from_path("some/dir/job.toml").unwrap();
        assert_eq!(fmt, SerializationFormat::Toml);
        assert!(SerializationFormat::from_path("no_extension").is_err());
    }
    #[test]
    fn test_dedented_yaml() {
        let v: Vec<u32> = SerializationFormat::Yaml
            .from_str(
                r#"
                - 1
                - 2
                "#,
            )
            .unwrap();
        assert_eq!(v, vec![1, 2]);
    }
    #[test]
    fn test_file_round_trip() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let fname = dir.path().join("data.json");
        let data = vec!["a".to_string(), "b".to_string()];
        SerializationFormat::Json.save(&data, &fname)?;
        let back: Vec<String> = SerializationFormat::Json.open(&fname)?;
        assert_eq!(back, data);

        let missing = SerializationFormat::Json.open::<Vec<String>>(dir.path().join("missing.json"));
        assert!(missing.is_err());
        Ok(())
    }
    #[test]
    fn test_write_file() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let fname = dir.path().join("out.txt");
        write_file(&fname, "first")?;
        write_file(&fname, "second")?;
        assert_eq!(std::fs::read_to_string(&fname)?, "second");
        // Nothing left behind but the file itself
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);

        // Failure leaves no temporary file, and the existing file intact
        let blocked = dir.path().join("blocked");
        std::fs::create_dir(&blocked)?;
        std::fs::write(blocked.join("keep"), "x")?;
        assert!(write_file(&blocked, "data").is_err());
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 2);
        Ok(())
    }
}
