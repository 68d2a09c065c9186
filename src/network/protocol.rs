//! Protocol Messages
//!
//! JSON bodies exchanged with browser clients over HTTP. Request bodies are
//! decoded leniently (every field optional, numbers accepted as strings) so
//! that a missing or malformed field can be reported by name with a 400.

use serde::{Deserialize, Serialize};

use crate::leaderboard::record::ScoreRecord;

// =============================================================================
// CLIENT -> SERVER
// =============================================================================

/// Signed score submission, as built by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Circuit id
    pub circuit: u32,
    /// Player pseudo
    pub pseudo: String,
    /// Completion time in centiseconds
    pub chrono: i64,
    /// Session token (hex)
    pub token: String,
    /// HMAC key (hex)
    pub key: String,
}

/// Integer parameter that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntParam {
    /// JSON number
    Number(i64),
    /// Numeric string (form-style clients)
    Text(String),
}

impl IntParam {
    /// Integer value, if well-formed.
    pub fn value(&self) -> Option<i64> {
        match self {
            IntParam::Number(n) => Some(*n),
            IntParam::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Raw submission body. Validated into a [`SubmitRequest`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitParams {
    /// Circuit id (`parcours` accepted)
    #[serde(alias = "parcours")]
    pub circuit: Option<IntParam>,
    /// Player pseudo
    pub pseudo: Option<String>,
    /// Completion time in centiseconds (`chronoCentiseconds` accepted)
    #[serde(alias = "chronoCentiseconds")]
    pub chrono: Option<IntParam>,
    /// Session token
    pub token: Option<String>,
    /// HMAC key
    pub key: Option<String>,
}

/// Why a request body could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// Field absent.
    Missing(&'static str),
    /// Field present but unusable.
    Invalid(&'static str),
}

impl ParamError {
    /// Client-facing message.
    pub fn message(&self) -> String {
        match self {
            ParamError::Missing(name) => format!("The \"{name}\" parameter is required"),
            ParamError::Invalid(name) => format!("The \"{name}\" parameter is invalid"),
        }
    }
}

/// Parse a circuit id (positive, fits `u32`).
pub fn parse_circuit(param: Option<&IntParam>) -> Result<u32, ParamError> {
    let value = param.ok_or(ParamError::Missing("circuit"))?;
    value
        .value()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .ok_or(ParamError::Invalid("circuit"))
}

impl SubmitParams {
    /// Check that every field is present and well-formed.
    ///
    /// The pseudo is only checked for presence here.
    pub fn validate(self) -> Result<SubmitRequest, ParamError> {
        let circuit = parse_circuit(self.circuit.as_ref())?;
        let pseudo = self.pseudo.ok_or(ParamError::Missing("pseudo"))?;
        let chrono = self
            .chrono
            .ok_or(ParamError::Missing("chrono"))?
            .value()
            .ok_or(ParamError::Invalid("chrono"))?;
        let token = self.token.ok_or(ParamError::Missing("token"))?;
        let key = self.key.ok_or(ParamError::Missing("key"))?;

        Ok(SubmitRequest {
            circuit,
            pseudo,
            chrono,
            token,
            key,
        })
    }
}

/// Query string of `GET /api/records`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordsQuery {
    /// Circuit id (`parcours` accepted)
    #[serde(alias = "parcours")]
    pub circuit: Option<String>,
}

impl RecordsQuery {
    /// Circuit id, if present and valid.
    pub fn circuit(&self) -> Result<u32, ParamError> {
        parse_circuit(self.circuit.clone().map(IntParam::Text).as_ref())
    }
}

// =============================================================================
// SERVER -> CLIENT
// =============================================================================

/// One leaderboard entry as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// HTML-escaped pseudo
    pub pseudo: String,
    /// Time in seconds
    pub chrono: f64,
}

impl From<&ScoreRecord> for RecordEntry {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            pseudo: escape_html(&record.pseudo),
            chrono: record.seconds(),
        }
    }
}

/// Convert a stored list for output.
pub fn to_entries(records: &[ScoreRecord]) -> Vec<RecordEntry> {
    records.iter().map(RecordEntry::from).collect()
}

/// `GET /api/records` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsResponse {
    /// Ordered list, best first
    pub records: Vec<RecordEntry>,
}

/// `POST /api/records` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// Whether the score entered the list
    pub success: bool,
    /// 1-based rank of the new entry
    pub new_rank: Option<usize>,
    /// Ordered list after the submission
    pub records: Vec<RecordEntry>,
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short error category
    pub error: String,
    /// Human-readable detail
    pub message: String,
}

impl ErrorBody {
    /// Create an error body.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Escape `& < > " '` for safe embedding in HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_params_aliases() {
        let json = r#"{"parcours":"3","pseudo":"Alice","chronoCentiseconds":523,"token":"ab","key":"cd"}"#;
        let params: SubmitParams = serde_json::from_str(json).unwrap();
        let request = params.validate().unwrap();
        assert_eq!(request.circuit, 3);
        assert_eq!(request.chrono, 523);
        assert_eq!(request.pseudo, "Alice");
    }

    #[test]
    fn test_missing_fields_reported_by_name() {
        let params: SubmitParams = serde_json::from_str(r#"{"circuit":1,"pseudo":"Alice","chrono":5}"#).unwrap();
        assert_eq!(params.validate(), Err(ParamError::Missing("token")));

        let params: SubmitParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.validate(), Err(ParamError::Missing("circuit")));
    }

    #[test]
    fn test_invalid_numbers() {
        let params: SubmitParams =
            serde_json::from_str(r#"{"circuit":0,"pseudo":"Alice","chrono":5,"token":"a","key":"b"}"#).unwrap();
        assert_eq!(params.validate(), Err(ParamError::Invalid("circuit")));

        let params: SubmitParams =
            serde_json::from_str(r#"{"circuit":1,"pseudo":"Alice","chrono":"fast","token":"a","key":"b"}"#).unwrap();
        assert_eq!(params.validate(), Err(ParamError::Invalid("chrono")));

        let query = RecordsQuery { circuit: Some("../etc".into()) };
        assert_eq!(query.circuit(), Err(ParamError::Invalid("circuit")));
        assert_eq!(RecordsQuery::default().circuit(), Err(ParamError::Missing("circuit")));
    }

    #[test]
    fn test_submit_response_shape() {
        let response = SubmitResponse {
            success: true,
            new_rank: Some(2),
            records: to_entries(&[ScoreRecord::new("<b>Bob</b>", 523)]),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["newRank"], 2);
        assert_eq!(json["records"][0]["pseudo"], "&lt;b&gt;Bob&lt;/b&gt;");
        assert_eq!(json["records"][0]["chrono"], 5.23);

        let rejected = SubmitResponse { success: false, new_rank: None, records: vec![] };
        assert!(serde_json::to_value(&rejected).unwrap()["newRank"].is_null());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a&b<c>"d"'e'"#), "a&amp;b&lt;c&gt;&quot;d&quot;&#039;e&#039;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
