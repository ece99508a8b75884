//! Tool execution against the graph manager

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{FileArgs, SaveGraphArgs, ToolCall, TriplesArgs, WeatherArgs};
use crate::api::websocket::broadcaster::GraphBroadcaster;
use crate::error::{RdfError, RdfResult};
use crate::format::RdfFormat;
use crate::manager::KnowledgeGraphManager;
use crate::types::{CurrentGraphData, Triple, TriplePattern};

/// Result handed back to the model as the tool message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolOutput {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolOutput {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// A call that was understood but could not be carried out
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Runs parsed tool calls; graph changes are re-broadcast to every viewer
#[derive(Clone)]
pub struct ToolDispatcher {
    broadcaster: Arc<GraphBroadcaster>,
    data_dir: PathBuf,
}

impl ToolDispatcher {
    pub fn new(broadcaster: Arc<GraphBroadcaster>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            broadcaster,
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn manager(&self) -> &KnowledgeGraphManager {
        self.broadcaster.manager()
    }

    /// Execute one call; `current` is the subgraph the viewer is showing
    pub fn dispatch(&self, call: ToolCall, current: &CurrentGraphData) -> RdfResult<ToolOutput> {
        let name = call.name();
        let mutation = call.is_mutation();
        debug!(tool = name, "Dispatching tool call");

        let output = match call {
            ToolCall::GetWeather(args) => self.get_weather(args),
            ToolCall::GetNumberOfTriples => self.get_number_of_triples(current),
            ToolCall::AddTriple(triple) => self.add_triple(triple)?,
            ToolCall::AddTriples(args) => self.add_triples(args)?,
            ToolCall::RemoveTriple(triple) => self.remove_triple(&triple)?,
            ToolCall::RemoveTriples(args) => self.remove_triples(args)?,
            ToolCall::SaveGraphToDisk(args) => self.save_graph_to_disk(args)?,
            ToolCall::ListAvailableFiles => self.list_available_files()?,
            ToolCall::ReadRdfFile(args) => self.read_rdf_file(args)?,
        };

        if mutation {
            self.broadcaster.broadcast_graph();
        }
        Ok(output)
    }

    fn get_weather(&self, args: WeatherArgs) -> ToolOutput {
        ToolOutput::ok(format!(
            "Weather information is not available for {}.",
            args.location
        ))
    }

    fn get_number_of_triples(&self, current: &CurrentGraphData) -> ToolOutput {
        let count = current.edges.len();
        let message = if count == 1 {
            "There is 1 triple in the graph.".to_string()
        } else {
            format!("There are {} triples in the graph.", count)
        };
        ToolOutput::ok(message).with_data(json!({ "count": count }))
    }

    fn add_triple(&self, triple: Triple) -> RdfResult<ToolOutput> {
        let added = self.manager().add_triples(vec![triple])?;
        Ok(if added.is_empty() {
            ToolOutput::ok("Triple already exists in the graph")
        } else {
            ToolOutput::ok("Triple added successfully")
        })
    }

    fn add_triples(&self, args: TriplesArgs) -> RdfResult<ToolOutput> {
        let added = self.manager().add_triples(args.triples)?;
        Ok(ToolOutput::ok(format!("Successfully added {} triples", added.len())))
    }

    fn remove_triple(&self, triple: &Triple) -> RdfResult<ToolOutput> {
        let removed = self.manager().remove_triples(&[TriplePattern::spo(triple)])?;
        Ok(if removed > 0 {
            ToolOutput::ok("Triple removed successfully")
        } else {
            ToolOutput::ok("Triple not found in the graph")
        })
    }

    fn remove_triples(&self, args: TriplesArgs) -> RdfResult<ToolOutput> {
        let patterns: Vec<TriplePattern> = args.triples.iter().map(TriplePattern::spo).collect();
        let removed = self.manager().remove_triples(&patterns)?;
        Ok(ToolOutput::ok(format!("Successfully removed {} triples", removed)))
    }

    fn save_graph_to_disk(&self, args: SaveGraphArgs) -> RdfResult<ToolOutput> {
        let file_name = format!("{}.{}", args.filename, args.format.file_extension());
        let path = self.resolve(&file_name)?;
        let written = self.manager().save_as(&path, args.format)?;

        Ok(ToolOutput::ok(format!(
            "Graph saved to {} in {} format",
            written.display(),
            args.format
        )))
    }

    fn list_available_files(&self) -> RdfResult<ToolOutput> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(ToolOutput::ok("No RDF files found").with_data(json!([])));
            }
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && RdfFormat::is_graph_file(&path) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }
        files.sort();

        let message = if files.is_empty() {
            "No RDF files found".to_string()
        } else {
            format!("Available RDF files: {}", files.join(", "))
        };
        Ok(ToolOutput::ok(message).with_data(json!(files)))
    }

    fn read_rdf_file(&self, args: FileArgs) -> RdfResult<ToolOutput> {
        let path = self.resolve(&args.filename)?;
        let count = self.manager().load_file(&path)?;

        info!(file = %args.filename, triples = count, "Graph replaced from file");
        Ok(ToolOutput::ok(format!(
            "Loaded {} triples from {}",
            count, args.filename
        )))
    }

    /// Join a relative file name onto the data directory, refusing anything
    /// that could leave it
    fn resolve(&self, file_name: &str) -> RdfResult<PathBuf> {
        let relative = Path::new(file_name);
        let inside = !file_name.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !inside {
            return Err(RdfError::invalid(format!(
                "'{}' is not a file name inside the data directory",
                file_name
            )));
        }
        Ok(self.data_dir.join(relative))
    }
}
