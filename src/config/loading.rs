use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

use super::Arguments;

static ENVIRONMENT_VARIABLE_INTERPOLATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$|\$([[:word:].]+)|\$\{([[:word:].]+)(?::-([^}]*))?\}")
        .expect("interpolation regex is valid")
});

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read {path:?} failed, {err}")]
    Read {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("{}", .0.join("\n"))]
    Interpolate(Vec<String>),

    #[error("decode arguments failed, {0}")]
    Decode(#[from] serde_yaml::Error),
}

/// Replaces `$NAME`, `${NAME}` and `${NAME:-default}` with the value of the
/// variable. `$$` is an escaped `$`. Every reference to a missing variable
/// without a default is reported.
pub fn interpolate<'a>(
    input: &'a str,
    vars: &HashMap<String, String>,
) -> Result<Cow<'a, str>, Vec<String>> {
    let mut errs = Vec::new();

    let interpolated =
        ENVIRONMENT_VARIABLE_INTERPOLATION_REGEX.replace_all(input, |caps: &Captures<'_>| {
            let Some(name) = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) else {
                return "$".to_string();
            };

            match (vars.get(name), caps.get(3)) {
                (Some(value), Some(default)) if value.is_empty() => default.as_str().to_string(),
                (Some(value), _) => value.clone(),
                (None, Some(default)) => default.as_str().to_string(),
                (None, None) => {
                    errs.push(format!(
                        "Missing environment variable in config. name = {name:?}"
                    ));
                    String::new()
                }
            }
        });

    if errs.is_empty() {
        Ok(interpolated)
    } else {
        Err(errs)
    }
}

/// Decode arguments from YAML text, after interpolating `vars` into it.
pub fn load_from_str(text: &str, vars: &HashMap<String, String>) -> Result<Arguments, LoadError> {
    let text = interpolate(text, vars).map_err(LoadError::Interpolate)?;
    if text.trim().is_empty() {
        return Ok(Arguments::default());
    }

    serde_yaml::from_str(&text).map_err(Into::into)
}

/// Load arguments from a YAML file, environment variables of the current
/// process are interpolated.
pub fn load_from_path(path: &Path) -> Result<Arguments, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|err| LoadError::Read {
        path: path.to_path_buf(),
        err,
    })?;

    let vars = std::env::vars_os()
        .filter_map(|(k, v)| match (k.into_string(), v.into_string()) {
            (Ok(k), Ok(v)) => Some((k, v)),
            _ => None,
        })
        .collect::<HashMap<_, _>>();

    debug!(message = "loading arguments", ?path);

    load_from_str(&text, &vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> HashMap<String, String> {
        [
            ("HOST", "10.0.0.1"),
            ("PORT", "9090"),
            ("EMPTY", ""),
            ("FOO.BAR", "turtles"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn interpolation() {
        let vars = vars();

        assert_eq!(interpolate("$HOST", &vars).unwrap(), "10.0.0.1");
        assert_eq!(interpolate("${HOST}:${PORT}", &vars).unwrap(), "10.0.0.1:9090");
        assert_eq!(interpolate("${FOO.BAR}", &vars).unwrap(), "turtles");
        assert_eq!(interpolate("${EMPTY:-default}", &vars).unwrap(), "default");
        assert_eq!(interpolate("${MISSING:-default}", &vars).unwrap(), "default");
        assert_eq!(interpolate("$$HOST", &vars).unwrap(), "$HOST");
        assert_eq!(interpolate("plain text", &vars).unwrap(), "plain text");
    }

    #[test]
    fn missing_variables() {
        let errs = interpolate("$MISSING ${ALSO_MISSING}", &vars()).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert!(errs[0].contains("MISSING"));
    }

    #[test]
    fn load() {
        let args = load_from_str(
            r#"
targets:
  - __address__: ${HOST}:${PORT}
scheme: ${SCHEME:-https}
"#,
            &vars(),
        )
        .unwrap();

        assert_eq!(args.targets[0].get("__address__"), Some("10.0.0.1:9090"));
        assert_eq!(args.scheme, "https");
    }

    #[test]
    fn load_empty() {
        let args = load_from_str("\n", &vars()).unwrap();
        assert_eq!(args, Arguments::default());
    }

    #[test]
    fn load_missing_file() {
        let err = load_from_path(Path::new("/non-existent/arguments.yaml")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
