//! Result envelope returned by every tool: `{ outcome, text, data, presentation }`.
//!
//! `outcome` is the explicit success/failure marker, so an empty successful list is
//! never confused with a failed one. `data` keeps the tool's output shape in both cases.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// Alert severity shown by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertVariant {
    Info,
    Warning,
    Error,
}

/// One table column: `key` selects the row field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub key: String,
    pub header: String,
    #[serde(rename = "type")]
    pub typ: String,
}

impl TableColumn {
    pub fn text(key: &str, header: &str) -> Self {
        Self {
            key: key.to_string(),
            header: header.to_string(),
            typ: "text".to_string(),
        }
    }
}

/// What the host renders next to the text summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Presentation {
    Table {
        columns: Vec<TableColumn>,
        rows: Vec<serde_json::Value>,
    },
    Card {
        title: String,
        content: String,
    },
    Alert {
        variant: AlertVariant,
        title: String,
        message: String,
    },
}

impl Presentation {
    pub fn card(title: impl Into<String>, content: impl Into<String>) -> Self {
        Presentation::Card {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn error_alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        Presentation::Alert {
            variant: AlertVariant::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Table whose rows are the serialized items. Items that fail to serialize are skipped.
    pub fn table<T: Serialize>(columns: Vec<TableColumn>, items: &[T]) -> Self {
        let rows = items
            .iter()
            .filter_map(|item| serde_json::to_value(item).ok())
            .collect();
        Presentation::Table { columns, rows }
    }
}

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult<D> {
    pub outcome: Outcome,
    pub text: String,
    pub data: D,
    pub presentation: Presentation,
}

impl<D> OperationResult<D> {
    pub fn success(text: impl Into<String>, data: D, presentation: Presentation) -> Self {
        Self {
            outcome: Outcome::Success,
            text: text.into(),
            data,
            presentation,
        }
    }

    pub fn failure(text: impl Into<String>, data: D, presentation: Presentation) -> Self {
        Self {
            outcome: Outcome::Failure,
            text: text.into(),
            data,
            presentation,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

impl<D: Serialize> OperationResult<D> {
    /// Erase the data type for the tool registry and the HTTP surface.
    pub fn into_json(self) -> OperationResult<serde_json::Value> {
        let data = serde_json::to_value(&self.data).unwrap_or_else(|e| {
            log::warn!("envelope: failed to serialize data: {}", e);
            serde_json::Value::Null
        });
        OperationResult {
            outcome: self.outcome,
            text: self.text,
            data,
            presentation: self.presentation,
        }
    }
}
