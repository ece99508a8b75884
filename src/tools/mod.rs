//! Graph tools invokable by a language model
//!
//! A tool call arrives as a name plus a JSON argument string. `ToolCall::parse`
//! turns it into one of a closed set of variants; the dispatcher handles
//! every variant in a single match.

mod catalog;
mod dispatch;

pub use catalog::{catalog, FunctionDefinition, ToolDefinition};
pub use dispatch::{ToolDispatcher, ToolOutput};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::error::RdfError;
use crate::format::RdfFormat;
use crate::types::Triple;

/// Names of every tool in the catalog
pub const TOOL_NAMES: &[&str] = &[
    "get_weather",
    "get_number_of_triples",
    "saveGraphToDisk",
    "addTriple",
    "addTriples",
    "removeTriple",
    "removeTriples",
    "listAvailableFiles",
    "readRDFFile",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherArgs {
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriplesArgs {
    pub triples: Vec<Triple>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaveGraphArgs {
    pub format: RdfFormat,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileArgs {
    pub filename: String,
}

/// A parsed tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    GetWeather(WeatherArgs),
    GetNumberOfTriples,
    AddTriple(Triple),
    AddTriples(TriplesArgs),
    RemoveTriple(Triple),
    RemoveTriples(TriplesArgs),
    SaveGraphToDisk(SaveGraphArgs),
    ListAvailableFiles,
    ReadRdfFile(FileArgs),
}

#[derive(Error, Debug, PartialEq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    Unknown(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

impl From<ToolError> for RdfError {
    fn from(err: ToolError) -> Self {
        RdfError::InvalidInput(err.to_string())
    }
}

impl ToolCall {
    /// Parse a tool name and its JSON argument string
    pub fn parse(name: &str, arguments: &str) -> Result<Self, ToolError> {
        let call = match name {
            "get_weather" => ToolCall::GetWeather(args(name, arguments)?),
            "get_number_of_triples" => ToolCall::GetNumberOfTriples,
            "saveGraphToDisk" => ToolCall::SaveGraphToDisk(args(name, arguments)?),
            "addTriple" => ToolCall::AddTriple(args(name, arguments)?),
            "addTriples" => ToolCall::AddTriples(args(name, arguments)?),
            "removeTriple" => ToolCall::RemoveTriple(args(name, arguments)?),
            "removeTriples" => ToolCall::RemoveTriples(args(name, arguments)?),
            "listAvailableFiles" => ToolCall::ListAvailableFiles,
            "readRDFFile" => ToolCall::ReadRdfFile(args(name, arguments)?),
            other => return Err(ToolError::Unknown(other.to_string())),
        };
        Ok(call)
    }

    /// Catalog name of the tool
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::GetWeather(_) => "get_weather",
            ToolCall::GetNumberOfTriples => "get_number_of_triples",
            ToolCall::SaveGraphToDisk(_) => "saveGraphToDisk",
            ToolCall::AddTriple(_) => "addTriple",
            ToolCall::AddTriples(_) => "addTriples",
            ToolCall::RemoveTriple(_) => "removeTriple",
            ToolCall::RemoveTriples(_) => "removeTriples",
            ToolCall::ListAvailableFiles => "listAvailableFiles",
            ToolCall::ReadRdfFile(_) => "readRDFFile",
        }
    }

    /// Whether the call changes the graph
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ToolCall::AddTriple(_)
                | ToolCall::AddTriples(_)
                | ToolCall::RemoveTriple(_)
                | ToolCall::RemoveTriples(_)
                | ToolCall::ReadRdfFile(_)
        )
    }
}

fn args<T: DeserializeOwned>(tool: &str, arguments: &str) -> Result<T, ToolError> {
    let arguments = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}
