use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

use anyhow::bail;
use log::debug;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// A validated DMCA takedown request, one per input config file.
///
/// The field set mirrors GitHub's DMCA notice submission form. A value of
/// this type only exists if every field passed validation; it is never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakedownRequest {
    pub from: String,
    pub copyright_holder_or_authorized: String,
    pub is_revised: YesNo,
    pub content_source: ContentSource,
    pub ownership: String,
    pub work_description: String,
    pub infringing_urls: Vec<String>,
    pub access_control: YesNo,
    pub forks_information: String,
    pub open_source: YesNo,
    pub solution: String,
    pub contact: String,
    pub legal_name: String,
    pub contact_email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YesNo {
    Yes,
    /// Also the placeholder while validation is still collecting errors
    #[default]
    No,
}

impl Display for YesNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YesNo::Yes => write!(f, "Yes"),
            YesNo::No => write!(f, "No"),
        }
    }
}

impl TryFrom<&str> for YesNo {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "Yes" => Ok(YesNo::Yes),
            "No" => Ok(YesNo::No),
            _ => bail!("must be \"Yes\" or \"No\", got {value:?}"),
        }
    }
}

/// Which service the claim concerns, per the form's wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentSource {
    #[default]
    GitHub,
    Npm,
    Both,
}

impl Display for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentSource::GitHub => write!(f, "GitHub"),
            ContentSource::Npm => write!(f, "npm.js"),
            ContentSource::Both => write!(f, "Both"),
        }
    }
}

impl TryFrom<&str> for ContentSource {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "GitHub" => Ok(ContentSource::GitHub),
            "npm.js" => Ok(ContentSource::Npm),
            "Both" => Ok(ContentSource::Both),
            _ => bail!("must be \"GitHub\", \"npm.js\" or \"Both\", got {value:?}"),
        }
    }
}

/// One problem with one field, human readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub problem: String,
}

impl FieldError {
    fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}': {}", self.field, self.problem)
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Carries every field problem found, not just the first, so a bad file
    /// can be fixed in one edit cycle.
    #[error("Invalid request in {path:?}: {}", join_errors(.errors))]
    Validation {
        path: PathBuf,
        errors: Vec<FieldError>,
    },
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TakedownRequest {
    /// Reads and validates a request config file. No side effects beyond the
    /// read; no partially validated request ever escapes.
    pub fn load(path: &Path) -> Result<TakedownRequest, RequestError> {
        debug!("Loading takedown request from: {path:?}");
        let contents = fs::read_to_string(path).map_err(|source| RequestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fields: Map<String, Value> =
            serde_json::from_str(&contents).map_err(|source| RequestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_fields(fields).map_err(|errors| RequestError::Validation {
            path: path.to_path_buf(),
            errors,
        })
    }

    /// Validates the parsed field map, collecting every problem before
    /// failing. Unknown keys are rejected.
    pub fn from_fields(mut fields: Map<String, Value>) -> Result<TakedownRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        // Placeholder values returned on error never escape: the error check
        // below fires before the request is handed out.
        let from = take_string(&mut fields, "from", &mut errors);
        let copyright_holder_or_authorized =
            take_string(&mut fields, "copyright_holder_or_authorized", &mut errors);
        let is_revised = take_parsed::<YesNo>(&mut fields, "is_revised", &mut errors);
        let content_source = take_parsed::<ContentSource>(&mut fields, "content_source", &mut errors);
        let ownership = take_string(&mut fields, "ownership", &mut errors);
        let work_description = take_string(&mut fields, "work_description", &mut errors);
        let infringing_urls = take_urls(&mut fields, "infringing_urls", &mut errors);
        let access_control = take_parsed::<YesNo>(&mut fields, "access_control", &mut errors);
        let forks_information = take_string(&mut fields, "forks_information", &mut errors);
        let open_source = take_parsed::<YesNo>(&mut fields, "open_source", &mut errors);
        let solution = take_string(&mut fields, "solution", &mut errors);
        let contact = take_string(&mut fields, "contact", &mut errors);
        let legal_name = take_string(&mut fields, "legal_name", &mut errors);
        let contact_email = take_email(&mut fields, "contact_email", &mut errors);
        let phone = take_string(&mut fields, "phone", &mut errors);
        take_affirmation(&mut fields, "good_faith", &mut errors);

        for key in fields.keys() {
            errors.push(FieldError::new(key, "unknown field"));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TakedownRequest {
            from,
            copyright_holder_or_authorized,
            is_revised,
            content_source,
            ownership,
            work_description,
            infringing_urls,
            access_control,
            forks_information,
            open_source,
            solution,
            contact,
            legal_name,
            contact_email,
            phone,
        })
    }
}

const MISSING: &str = "missing required field";

fn take_string(fields: &mut Map<String, Value>, key: &str, errors: &mut Vec<FieldError>) -> String {
    match fields.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::String(_)) => {
            errors.push(FieldError::new(key, "must not be empty"));
            String::new()
        }
        Some(_) => {
            errors.push(FieldError::new(key, "must be a string"));
            String::new()
        }
        None => {
            errors.push(FieldError::new(key, MISSING));
            String::new()
        }
    }
}

fn take_parsed<T>(fields: &mut Map<String, Value>, key: &str, errors: &mut Vec<FieldError>) -> T
where
    T: for<'a> TryFrom<&'a str, Error = anyhow::Error> + Default,
{
    let raw = take_string(fields, key, errors);
    if raw.is_empty() {
        // take_string already recorded the problem
        return T::default();
    }
    match T::try_from(raw.as_str()) {
        Ok(value) => value,
        Err(e) => {
            errors.push(FieldError::new(key, e.to_string()));
            T::default()
        }
    }
}

fn take_urls(
    fields: &mut Map<String, Value>,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Vec<String> {
    let entries = match fields.remove(key) {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            errors.push(FieldError::new(key, "must be a list of URLs"));
            return Vec::new();
        }
        None => {
            errors.push(FieldError::new(key, MISSING));
            return Vec::new();
        }
    };
    if entries.is_empty() {
        errors.push(FieldError::new(key, "must list at least one URL"));
        return Vec::new();
    }

    let mut urls = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let label = format!("{key}[{index}]");
        match entry {
            Value::String(s) => match Url::parse(&s) {
                Ok(_) => urls.push(s),
                Err(e) => errors.push(FieldError::new(label, format!("not a valid URL: {e}"))),
            },
            _ => errors.push(FieldError::new(label, "must be a string")),
        }
    }
    urls
}

fn take_email(fields: &mut Map<String, Value>, key: &str, errors: &mut Vec<FieldError>) -> String {
    let raw = take_string(fields, key, errors);
    if raw.is_empty() {
        return raw;
    }
    // Validated with the same parser the mail transport uses, so a request
    // that validates here cannot later be refused as an address.
    match raw.parse::<lettre::Address>() {
        Ok(_) => raw,
        Err(e) => {
            errors.push(FieldError::new(key, format!("not a valid email address: {e}")));
            String::new()
        }
    }
}

/// The good faith statement has to be affirmed outright; a notice without it
/// must never reach the transport.
fn take_affirmation(fields: &mut Map<String, Value>, key: &str, errors: &mut Vec<FieldError>) {
    match fields.remove(key) {
        Some(Value::Bool(true)) => (),
        Some(Value::Bool(false)) => {
            errors.push(FieldError::new(key, "the good faith statement must be affirmed"));
        }
        Some(_) => {
            errors.push(FieldError::new(key, "must be a boolean"));
        }
        None => {
            errors.push(FieldError::new(key, MISSING));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn valid_fields() -> Map<String, Value> {
        let value = json!({
            "from": "Jane Doe",
            "copyright_holder_or_authorized": "I am the copyright holder",
            "is_revised": "No",
            "content_source": "GitHub",
            "ownership": "Sole author of the work",
            "work_description": "A Rust crate published at https://example.com/crate",
            "infringing_urls": ["https://github.com/someone/stolen-repo"],
            "access_control": "No",
            "forks_information": "No forks found",
            "open_source": "No",
            "solution": "Remove the repository",
            "contact": "Unknown",
            "legal_name": "Jane Margaret Doe",
            "contact_email": "jane@example.com",
            "phone": "+1 555 0100",
            "good_faith": true
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn valid_request_passes() {
        let request = TakedownRequest::from_fields(valid_fields()).unwrap();
        assert_eq!(request.from, "Jane Doe");
        assert_eq!(request.is_revised, YesNo::No);
        assert_eq!(request.content_source, ContentSource::GitHub);
        assert_eq!(
            request.infringing_urls,
            vec!["https://github.com/someone/stolen-repo".to_string()]
        );
    }

    #[test]
    fn every_missing_field_is_named() {
        // Arrange
        let mut fields = valid_fields();
        fields.remove("from");
        fields.remove("legal_name");
        fields.remove("contact_email");

        // Act
        let errors = TakedownRequest::from_fields(fields).unwrap_err();

        // Assert
        let named: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(errors.len(), 3);
        assert!(named.contains(&"from"));
        assert!(named.contains(&"legal_name"));
        assert!(named.contains(&"contact_email"));
    }

    #[test]
    fn empty_string_field_rejected() {
        let mut fields = valid_fields();
        fields.insert("solution".to_string(), json!("   "));
        let errors = TakedownRequest::from_fields(fields).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "solution");
        assert_eq!(errors[0].problem, "must not be empty");
    }

    #[test]
    fn malformed_email_rejected() {
        let mut fields = valid_fields();
        fields.insert("contact_email".to_string(), json!("not-an-address"));
        let errors = TakedownRequest::from_fields(fields).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "contact_email");
        assert!(errors[0].problem.contains("email address"));
    }

    #[test]
    fn malformed_url_names_the_entry() {
        let mut fields = valid_fields();
        fields.insert(
            "infringing_urls".to_string(),
            json!(["https://github.com/a/b", "not a url"]),
        );
        let errors = TakedownRequest::from_fields(fields).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "infringing_urls[1]");
    }

    #[test]
    fn empty_url_list_rejected() {
        let mut fields = valid_fields();
        fields.insert("infringing_urls".to_string(), json!([]));
        let errors = TakedownRequest::from_fields(fields).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "infringing_urls");
    }

    #[test]
    fn url_field_must_be_a_list() {
        let mut fields = valid_fields();
        fields.insert(
            "infringing_urls".to_string(),
            json!("https://github.com/a/b"),
        );
        let errors = TakedownRequest::from_fields(fields).unwrap_err();
        assert_eq!(errors[0].problem, "must be a list of URLs");
    }

    #[test]
    fn unknown_field_rejected() {
        let mut fields = valid_fields();
        fields.insert("extra_notes".to_string(), json!("should not be here"));
        let errors = TakedownRequest::from_fields(fields).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "extra_notes");
        assert_eq!(errors[0].problem, "unknown field");
    }

    #[test]
    fn unaffirmed_good_faith_rejected() {
        let mut fields = valid_fields();
        fields.insert("good_faith".to_string(), json!(false));
        let errors = TakedownRequest::from_fields(fields).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "good_faith");
    }

    #[rstest]
    #[case("Yes", YesNo::Yes)]
    #[case("No", YesNo::No)]
    fn yes_no_parses(#[case] input: &str, #[case] expected: YesNo) {
        assert_eq!(YesNo::try_from(input).unwrap(), expected);
    }

    #[rstest]
    #[case("yes")]
    #[case("YES")]
    #[case("maybe")]
    #[case("")]
    fn yes_no_rejects_other_spellings(#[case] input: &str) {
        assert!(YesNo::try_from(input).is_err());
    }

    #[rstest]
    #[case("GitHub", ContentSource::GitHub)]
    #[case("npm.js", ContentSource::Npm)]
    #[case("Both", ContentSource::Both)]
    fn content_source_parses(#[case] input: &str, #[case] expected: ContentSource) {
        assert_eq!(ContentSource::try_from(input).unwrap(), expected);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = TakedownRequest::load(Path::new("no_such_request.json")).unwrap_err();
        assert!(matches!(err, RequestError::Io { .. }));
        assert!(format!("{err}").contains("no_such_request.json"));
    }

    #[test]
    fn load_malformed_json_is_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "dmca_sender_test_malformed_{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ not json").unwrap();

        let err = TakedownRequest::load(&path).unwrap_err();
        assert!(matches!(err, RequestError::Parse { .. }));

        fs::remove_file(&path).ok();
    }
}
