//! Structural dump of a report tree, the inverse of `Report`'s `Serialize`.
//!
//! Every field is optional at the serde level so that a missing required
//! field surfaces as a precondition failure naming that field instead of a
//! generic deserialization error.

use super::{Issue, Severity};
use crate::error::{ReportError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDump {
    pub name: Option<String>,
    pub base_path: Option<String>,
    pub issues: Option<IssueSet>,
    #[serde(default, deserialize_with = "de_sub_reports")]
    pub sub_reports: Vec<ReportDump>,
    pub time_start: Option<f64>,
    pub time_end: Option<f64>,
    pub total_time: Option<f64>,
}

/// Issues either as one flat list or grouped by path.
#[derive(Debug, Clone)]
pub enum IssueSet {
    Flat(Vec<IssueRecord>),
    ByFile(Vec<(String, Vec<IssueRecord>)>),
}

impl IssueSet {
    pub fn into_records(self) -> Vec<IssueRecord> {
        match self {
            IssueSet::Flat(v) => v,
            IssueSet::ByFile(groups) => groups.into_iter().flat_map(|(_, v)| v).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueRecord {
    pub code: Option<String>,
    pub severity: Option<Severity>,
    pub message: Option<String>,
    pub path: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub help: Option<String>,
    #[serde(default, deserialize_with = "de_extra")]
    pub extra: Map<String, Value>,
}

impl IssueRecord {
    /// Convert into an [`Issue`], failing on the first missing required key.
    pub fn into_issue(self) -> Result<Issue> {
        let code = self.code.ok_or_else(|| ReportError::missing_field("code"))?;
        let severity = self
            .severity
            .ok_or_else(|| ReportError::missing_field("severity"))?;
        let message = self
            .message
            .ok_or_else(|| ReportError::missing_field("message"))?;
        let path = self.path.ok_or_else(|| ReportError::missing_field("path"))?;
        let line = self.line.ok_or_else(|| ReportError::missing_field("line"))?;
        let mut issue = Issue::new(code, severity, message, path)
            .with_line(line)
            .with_column(self.column.unwrap_or(0))
            .with_extra(self.extra);
        issue.reference = self.reference;
        issue.help = self.help;
        Ok(issue)
    }
}

impl<'de> Deserialize<'de> for IssueSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error;
        let records = |v: Value| -> std::result::Result<Vec<IssueRecord>, D::Error> {
            let single = matches!(&v, Value::Object(o) if o.contains_key("severity"));
            if single {
                Ok(vec![serde_json::from_value(v).map_err(D::Error::custom)?])
            } else {
                serde_json::from_value(v).map_err(D::Error::custom)
            }
        };
        match Value::deserialize(deserializer)? {
            Value::Array(items) => Ok(IssueSet::Flat(records(Value::Array(items))?)),
            Value::Object(groups) => {
                let mut out = Vec::with_capacity(groups.len());
                for (path, v) in groups {
                    out.push((path, records(v)?));
                }
                Ok(IssueSet::ByFile(out))
            }
            other => Err(D::Error::custom(format!(
                "issues must be a list or a map of path to list, got {other}"
            ))),
        }
    }
}

fn de_sub_reports<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<ReportDump>, D::Error> {
    use serde::de::Error;
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(D::Error::custom))
            .collect(),
        Some(Value::Object(map)) => map
            .into_iter()
            .map(|(_, v)| serde_json::from_value(v).map_err(D::Error::custom))
            .collect(),
        Some(other) => Err(D::Error::custom(format!(
            "subReports must be a list or a map, got {other}"
        ))),
    }
}

fn de_extra<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Map<String, Value>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Ok(map),
        // Empty lists and nulls are how some producers spell "no extra".
        _ => Ok(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_and_grouped_issue_sets() {
        let flat: ReportDump = serde_json::from_str(
            r#"{"name":"r","basePath":"/b/","issues":[{"code":"c","severity":3,"message":"m","path":"/b/a","line":1}]}"#,
        )
        .unwrap();
        assert!(matches!(flat.issues, Some(IssueSet::Flat(ref v)) if v.len() == 1));

        let grouped: ReportDump = serde_json::from_str(
            r#"{"name":"r","basePath":"/b/","issues":{"/b/a":[{"code":"c","severity":"WARNING","message":"m","path":"/b/a","line":1}],"/b/z":[]}}"#,
        )
        .unwrap();
        match grouped.issues {
            Some(IssueSet::ByFile(groups)) => {
                assert_eq!(groups.len(), 2);
                assert_eq!(groups[0].0, "/b/a");
                assert_eq!(groups[0].1[0].severity, Some(Severity::Warning));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sub_reports_accept_map_form() {
        let dump: ReportDump = serde_json::from_str(
            r#"{"name":"p","basePath":"/","issues":[],"subReports":{"child":{"name":"child","basePath":"/c/","issues":[]}}}"#,
        )
        .unwrap();
        assert_eq!(dump.sub_reports.len(), 1);
        assert_eq!(dump.sub_reports[0].name.as_deref(), Some("child"));
    }

    #[test]
    fn test_record_missing_line_is_precondition() {
        let rec: IssueRecord =
            serde_json::from_str(r#"{"code":"c","severity":0,"message":"m","path":"p","extra":[]}"#)
                .unwrap();
        let err = rec.into_issue().unwrap_err();
        assert!(matches!(err, ReportError::Precondition(m) if m.contains("line")));
    }
}
