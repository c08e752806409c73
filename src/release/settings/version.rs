//! Version patterns and the version properties they produce.
//!
//! Each pattern turns the raw project version into `version*` keys such as
//! `versionMajor` or `versionYear`. A version that does not parse under its
//! declared pattern is a configuration error.

use crate::release::props::{PropertyContext, dash, underscore};
use chrono::{NaiveDate, Weekday};
use regex::Regex;
use std::{fmt, str::FromStr};

/// Supported version schemes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionPatternKind {
    #[default]
    Semver,
    Calver,
    Chronver,
    JavaRuntime,
    JavaModule,
    Custom,
}

/// A version scheme, with the format string CALVER needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionPattern {
    pub kind: VersionPatternKind,
    pub format: Option<String>,
}

impl VersionPattern {
    pub fn new(kind: VersionPatternKind) -> Self {
        Self { kind, format: None }
    }

    /// Parses `version` and returns its `version*` properties.
    pub fn parse(&self, version: &str) -> Result<PropertyContext, String> {
        let version = version.trim();
        if version.is_empty() {
            return Err("version must not be blank".to_string());
        }

        let mut props = match self.kind {
            VersionPatternKind::Semver => parse_semver(version)?,
            VersionPatternKind::Calver => {
                let format = self.format.as_deref().unwrap_or_default();
                parse_calver(version, format)?
            }
            VersionPatternKind::Chronver => parse_chronver(version)?,
            VersionPatternKind::JavaRuntime => parse_java_runtime(version)?,
            VersionPatternKind::JavaModule => parse_java_module(version)?,
            VersionPatternKind::Custom => {
                let mut props = PropertyContext::new();
                props.put("versionNumber", version);
                props
            }
        };

        let number = props.text("versionNumber");
        props.put("versionWithUnderscores", underscore(version));
        props.put("versionWithDashes", dash(version));
        props.put("versionNumberWithUnderscores", underscore(&number));
        props.put("versionNumberWithDashes", dash(&number));
        Ok(props)
    }
}

impl fmt::Display for VersionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            VersionPatternKind::Semver => "SEMVER",
            VersionPatternKind::Calver => "CALVER",
            VersionPatternKind::Chronver => "CHRONVER",
            VersionPatternKind::JavaRuntime => "JAVA_RUNTIME",
            VersionPatternKind::JavaModule => "JAVA_MODULE",
            VersionPatternKind::Custom => "CUSTOM",
        };
        match &self.format {
            Some(format) => write!(f, "{}:{}", name, format),
            None => f.write_str(name),
        }
    }
}

impl FromStr for VersionPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, format) = match s.split_once(':') {
            Some((name, format)) => (name, Some(format.trim().to_string())),
            None => (s, None),
        };
        let kind = match name.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SEMVER" => VersionPatternKind::Semver,
            "CALVER" => VersionPatternKind::Calver,
            "CHRONVER" => VersionPatternKind::Chronver,
            "JAVA_RUNTIME" => VersionPatternKind::JavaRuntime,
            "JAVA_MODULE" => VersionPatternKind::JavaModule,
            "CUSTOM" => VersionPatternKind::Custom,
            other => return Err(format!("unknown version pattern `{}`", other)),
        };
        if kind == VersionPatternKind::Calver && format.as_deref().is_none_or(str::is_empty) {
            return Err("CALVER requires a format, e.g. `CALVER:YYYY.MM.MICRO`".to_string());
        }
        Ok(Self { kind, format })
    }
}

impl TryFrom<String> for VersionPattern {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionPattern> for String {
    fn from(value: VersionPattern) -> Self {
        value.to_string()
    }
}

fn parse_semver(version: &str) -> Result<PropertyContext, String> {
    let split = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(split);
    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(format!("`{}` is not a valid SEMVER version", version));
    }

    let mut padded = parts.clone();
    padded.resize(3, "0");
    let candidate = format!("{}{}", padded.join("."), suffix);
    let parsed = semver::Version::parse(&candidate)
        .map_err(|e| format!("`{}` is not a valid SEMVER version: {}", version, e))?;

    let mut props = PropertyContext::new();
    props.put("versionMajor", parsed.major.to_string());
    let mut number = parsed.major.to_string();
    if parts.len() > 1 {
        props.put("versionMinor", parsed.minor.to_string());
        number = format!("{}.{}", number, parsed.minor);
    }
    if parts.len() > 2 {
        props.put("versionPatch", parsed.patch.to_string());
        number = format!("{}.{}", number, parsed.patch);
    }
    if !parsed.pre.is_empty() {
        props.put("versionTag", parsed.pre.as_str());
    }
    if !parsed.build.is_empty() {
        props.put("versionBuild", parsed.build.as_str());
    }
    props.put("versionNumber", number);
    Ok(props)
}

fn parse_java_runtime(version: &str) -> Result<PropertyContext, String> {
    let re = Regex::new(
        r"^(?P<number>[1-9]\d*(?:\.(?:0|[1-9]\d*))*)(?:-(?P<pre>[a-zA-Z0-9]+))?(?:\+(?P<build>0|[1-9]\d*))?(?:-(?P<optional>[-a-zA-Z0-9.]+))?$",
    )
    .map_err(|e| e.to_string())?;
    let caps = re
        .captures(version)
        .ok_or_else(|| format!("`{}` is not a valid JAVA_RUNTIME version", version))?;

    let mut props = PropertyContext::new();
    props.put("versionNumber", &caps["number"]);
    if let Some(pre) = caps.name("pre") {
        props.put("versionPrerelease", pre.as_str());
    }
    if let Some(build) = caps.name("build") {
        props.put("versionBuild", build.as_str());
    }
    if let Some(optional) = caps.name("optional") {
        props.put("versionOptional", optional.as_str());
    }
    Ok(props)
}

fn parse_java_module(version: &str) -> Result<PropertyContext, String> {
    let re = Regex::new(
        r"^(?P<number>\d+(?:\.\d+)*)(?:-(?P<pre>[-a-zA-Z0-9.]+))?(?:\+(?P<build>[-a-zA-Z0-9.+]+))?$",
    )
    .map_err(|e| e.to_string())?;
    let caps = re
        .captures(version)
        .ok_or_else(|| format!("`{}` is not a valid JAVA_MODULE version", version))?;

    let mut props = PropertyContext::new();
    props.put("versionNumber", &caps["number"]);
    if let Some(pre) = caps.name("pre") {
        props.put("versionPrerelease", pre.as_str());
    }
    if let Some(build) = caps.name("build") {
        props.put("versionBuild", build.as_str());
    }
    Ok(props)
}

fn parse_chronver(version: &str) -> Result<PropertyContext, String> {
    let re = Regex::new(
        r"^(?P<year>\d{4})\.(?P<month>\d{2})\.(?P<day>\d{2})(?:\.(?P<changeset>\d+(?:-[a-zA-Z0-9-]+)?))?$",
    )
    .map_err(|e| e.to_string())?;
    let caps = re
        .captures(version)
        .ok_or_else(|| format!("`{}` is not a valid CHRONVER version", version))?;

    let year: i32 = caps["year"].parse().map_err(|_| "invalid year".to_string())?;
    let month: u32 = caps["month"].parse().map_err(|_| "invalid month".to_string())?;
    let day: u32 = caps["day"].parse().map_err(|_| "invalid day".to_string())?;
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(format!("`{}` does not denote a calendar date", version));
    }

    let mut props = PropertyContext::new();
    props.put("versionYear", &caps["year"]);
    props.put("versionMonth", &caps["month"]);
    props.put("versionDay", &caps["day"]);
    if let Some(changeset) = caps.name("changeset") {
        props.put("versionChangeset", changeset.as_str());
    }
    props.put(
        "versionNumber",
        format!("{}.{}.{}", &caps["year"], &caps["month"], &caps["day"]),
    );
    Ok(props)
}

/// CALVER format token: regex fragment and the property it feeds.
fn calver_token(token: &str) -> Option<(&'static str, &'static str)> {
    let entry = match token {
        "YYYY" => (r"\d{4}", "versionYear"),
        "YY" => (r"[1-9]\d{0,2}", "versionYear"),
        "0Y" => (r"\d{2,3}", "versionYear"),
        "MM" => (r"1[0-2]|[1-9]", "versionMonth"),
        "0M" => (r"0[1-9]|1[0-2]", "versionMonth"),
        "WW" => (r"5[0-3]|[1-4]\d|[1-9]", "versionWeek"),
        "0W" => (r"5[0-3]|[1-4]\d|0[1-9]", "versionWeek"),
        "DD" => (r"3[01]|[12]\d|[1-9]", "versionDay"),
        "0D" => (r"3[01]|[12]\d|0[1-9]", "versionDay"),
        "MAJOR" => (r"\d+", "versionMajor"),
        "MINOR" => (r"\d+", "versionMinor"),
        "MICRO" => (r"\d+", "versionMicro"),
        "MODIFIER" => (r"[a-zA-Z0-9][a-zA-Z0-9.\-]*", "versionModifier"),
        _ => return None,
    };
    Some(entry)
}

fn parse_calver(version: &str, format: &str) -> Result<PropertyContext, String> {
    if format.is_empty() {
        return Err("CALVER requires a format".to_string());
    }

    // Tokenize the format into alternating tokens and separators.
    let mut pattern = String::from("^");
    let mut keys: Vec<&'static str> = Vec::new();
    let mut token = String::new();
    let mut pending_separator: Option<char> = None;
    let mut tokens: Vec<(Option<char>, String)> = Vec::new();
    for c in format.chars() {
        if matches!(c, '.' | '-' | '_') {
            tokens.push((pending_separator.take(), std::mem::take(&mut token)));
            pending_separator = Some(c);
        } else {
            token.push(c);
        }
    }
    tokens.push((pending_separator, token));

    let mut modifier_separator = None;
    for (separator, token) in &tokens {
        let (fragment, key) =
            calver_token(token).ok_or_else(|| format!("unknown CALVER token `{}`", token))?;
        let separator = separator.map(|c| regex::escape(&c.to_string())).unwrap_or_default();
        if *token == "MODIFIER" {
            pattern.push_str(&format!("(?:{}({}))?", separator, fragment));
            modifier_separator = Some(separator);
        } else {
            pattern.push_str(&format!("{}({})", separator, fragment));
        }
        keys.push(key);
    }
    pattern.push('$');

    let re = Regex::new(&pattern).map_err(|e| e.to_string())?;
    let caps = re
        .captures(version)
        .ok_or_else(|| format!("`{}` does not match CALVER format `{}`", version, format))?;

    let mut props = PropertyContext::new();
    let mut number = version.to_string();
    for (index, key) in keys.iter().enumerate() {
        if let Some(value) = caps.get(index + 1) {
            let mut text = value.as_str().to_string();
            if *key == "versionYear" && text.len() < 4 {
                let short: i32 = text.parse().map_err(|_| "invalid year".to_string())?;
                text = (2000 + short).to_string();
            }
            if *key == "versionModifier" {
                if let Some(separator) = &modifier_separator {
                    let unescaped = separator.replace('\\', "");
                    let suffix = format!("{}{}", unescaped, value.as_str());
                    if let Some(stripped) = version.strip_suffix(&suffix) {
                        number = stripped.to_string();
                    }
                }
            }
            props.put(*key, text);
        }
    }
    props.put("versionNumber", number);

    validate_calendar(&props, version)?;
    Ok(props)
}

fn validate_calendar(props: &PropertyContext, version: &str) -> Result<(), String> {
    let year: Option<i32> = props.get_str("versionYear").and_then(|y| y.parse().ok());
    let month: Option<u32> = props.get_str("versionMonth").and_then(|m| m.parse().ok());
    let day: Option<u32> = props.get_str("versionDay").and_then(|d| d.parse().ok());
    let week: Option<u32> = props.get_str("versionWeek").and_then(|w| w.parse().ok());

    let valid = match (year, month, day, week) {
        (Some(y), Some(m), Some(d), _) => NaiveDate::from_ymd_opt(y, m, d).is_some(),
        (Some(y), _, _, Some(w)) => NaiveDate::from_isoywd_opt(y, w, Weekday::Mon).is_some(),
        _ => true,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("`{}` does not denote a calendar date", version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &str) -> VersionPattern {
        s.parse().unwrap()
    }

    #[test]
    fn semver_full_and_partial() {
        let props = pattern("SEMVER").parse("1.2.3-rc.1+b7").unwrap();
        assert_eq!(props.text("versionMajor"), "1");
        assert_eq!(props.text("versionMinor"), "2");
        assert_eq!(props.text("versionPatch"), "3");
        assert_eq!(props.text("versionTag"), "rc.1");
        assert_eq!(props.text("versionBuild"), "b7");
        assert_eq!(props.text("versionNumber"), "1.2.3");
        assert_eq!(props.text("versionWithUnderscores"), "1_2_3_rc_1+b7");

        let partial = pattern("semver").parse("4.1").unwrap();
        assert_eq!(partial.text("versionNumber"), "4.1");
        assert!(!partial.contains_key("versionPatch"));
    }

    #[test]
    fn semver_rejects_garbage() {
        assert!(pattern("SEMVER").parse("one.two").is_err());
        assert!(pattern("SEMVER").parse("1.2.3.4").is_err());
        assert!(pattern("SEMVER").parse("").is_err());
    }

    #[test]
    fn calver_with_modifier() {
        let props = pattern("CALVER:YYYY.0M.MICRO-MODIFIER")
            .parse("2024.03.5-beta")
            .unwrap();
        assert_eq!(props.text("versionYear"), "2024");
        assert_eq!(props.text("versionMonth"), "03");
        assert_eq!(props.text("versionMicro"), "5");
        assert_eq!(props.text("versionModifier"), "beta");
        assert_eq!(props.text("versionNumber"), "2024.03.5");

        let plain = pattern("CALVER:YYYY.0M.MICRO-MODIFIER")
            .parse("2024.03.5")
            .unwrap();
        assert!(!plain.contains_key("versionModifier"));
    }

    #[test]
    fn calver_checks_dates() {
        assert!(pattern("CALVER:YY.MM.DD").parse("23.2.30").is_err());
        let props = pattern("CALVER:YY.MM.DD").parse("24.2.29").unwrap();
        assert_eq!(props.text("versionYear"), "2024");
        assert!("CALVER".parse::<VersionPattern>().is_err());
    }

    #[test]
    fn chronver_and_java() {
        let props = pattern("CHRONVER").parse("2024.01.31.7").unwrap();
        assert_eq!(props.text("versionChangeset"), "7");
        assert!(pattern("CHRONVER").parse("2024.02.31").is_err());

        let runtime = pattern("JAVA_RUNTIME").parse("17.0.2-ea+8").unwrap();
        assert_eq!(runtime.text("versionNumber"), "17.0.2");
        assert_eq!(runtime.text("versionPrerelease"), "ea");
        assert_eq!(runtime.text("versionBuild"), "8");

        let module = pattern("JAVA_MODULE").parse("1.0-alpha+42").unwrap();
        assert_eq!(module.text("versionBuild"), "42");
    }

    #[test]
    fn custom_accepts_anything() {
        let props = pattern("CUSTOM").parse("nightly_42").unwrap();
        assert_eq!(props.text("versionNumber"), "nightly_42");
        assert_eq!(pattern("CALVER:YYYY.MINOR").to_string(), "CALVER:YYYY.MINOR");
    }
}
