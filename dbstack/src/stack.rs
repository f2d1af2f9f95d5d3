//! The JSON document handed to the provisioning engine.
//!
//! A document also records the lookups it was built with. Re-emitting over an earlier
//! document reuses its timestamp so `CreatedAt` does not change between runs.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;

use crate::errors::Result;
use crate::module::Lookups;
use crate::outputs::ModuleOutputs;
use crate::resources::ResourceGraph;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack<'a> {
    pub name: &'a str,
    pub lookups: &'a Lookups,
    pub resources: &'a ResourceGraph,
    pub outputs: &'a ModuleOutputs,
}

impl<'a> Stack<'a> {
    pub fn new(name: &'a str, lookups: &'a Lookups, resources: &'a ResourceGraph, outputs: &'a ModuleOutputs) -> Self {
        Self {
            name,
            lookups,
            resources,
            outputs,
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Write the document followed by a trailing newline
    pub fn write_to<W: Write>(&self, mut writer: W, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct RecordedStack {
    lookups: RecordedLookups,
}

#[derive(Deserialize)]
struct RecordedLookups {
    timestamp: DateTime<Utc>,
}

/// Timestamp recorded by an earlier document at `path`.
///
/// `None` when nothing has been written there yet. Anything other than a stack document is an
/// error, so an unrelated file is never overwritten.
pub fn recorded_timestamp(path: &Path) -> Result<Option<DateTime<Utc>>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if text.trim().is_empty() {
        return Ok(None);
    }

    let recorded = serde_json::from_str::<RecordedStack>(&text)
        .with_context(|| format!("{} is not a stack document", path.display()))?;
    Ok(Some(recorded.lookups.timestamp))
}
