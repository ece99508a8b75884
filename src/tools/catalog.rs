//! Function-tool schemas advertised to the completion endpoint

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Tool entry in the OpenAI `tools` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

fn triple_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "subject": { "type": "string" },
            "predicate": { "type": "string" },
            "object": { "type": "string" }
        },
        "required": ["subject", "predicate", "object"],
        "additionalProperties": false
    })
}

fn triples_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "triples": {
                "type": "array",
                "items": triple_schema()
            }
        },
        "required": ["triples"],
        "additionalProperties": false
    })
}

fn no_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "additionalProperties": false
    })
}

/// The fixed tool catalog
pub fn catalog() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            "get_weather",
            "Get current temperature for a given location.",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "City and country e.g. Bogotá, Colombia"
                    }
                },
                "required": ["location"],
                "additionalProperties": false
            }),
        ),
        ToolDefinition::function(
            "get_number_of_triples",
            "Get the number of triples.",
            no_parameters(),
        ),
        ToolDefinition::function(
            "saveGraphToDisk",
            "Save the current RDF graph to disk in a specified format.",
            json!({
                "type": "object",
                "properties": {
                    "format": {
                        "type": "string",
                        "description": "The RDF format to save the graph in (turtle, ntriples, nquads, trig)",
                        "enum": ["turtle", "ntriples", "nquads", "trig"]
                    },
                    "filename": {
                        "type": "string",
                        "description": "The name of the file to save the graph to (without extension)"
                    }
                },
                "required": ["format", "filename"],
                "additionalProperties": false
            }),
        ),
        ToolDefinition::function("addTriple", "Add a triple to the graph.", triple_schema()),
        ToolDefinition::function("addTriples", "Add multiple triples to the graph.", triples_schema()),
        ToolDefinition::function(
            "removeTriple",
            "Remove a specific triple from the graph.",
            triple_schema(),
        ),
        ToolDefinition::function(
            "removeTriples",
            "Remove multiple triples from the graph.",
            triples_schema(),
        ),
        ToolDefinition::function(
            "listAvailableFiles",
            "List all available RDF files in the current directory.",
            no_parameters(),
        ),
        ToolDefinition::function(
            "readRDFFile",
            "Read an RDF file from disk into memory.",
            json!({
                "type": "object",
                "properties": {
                    "filename": {
                        "type": "string",
                        "description": "The name of the RDF file to read (with extension)"
                    }
                },
                "required": ["filename"],
                "additionalProperties": false
            }),
        ),
    ]
}
