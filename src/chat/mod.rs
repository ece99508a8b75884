//! Chat over the graph through an OpenAI-compatible completion endpoint
//!
//! One round of tool calling: the first completion may request tools, their
//! results are appended to the conversation and a second completion
//! produces the answer.

mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RdfResult;
use crate::manager::blocking;
use crate::tools::{catalog, ToolCall, ToolDefinition, ToolDispatcher, ToolError, ToolOutput};
use crate::types::{ChatRequest, CurrentGraphData};

/// Message in a chat-completions conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text("assistant", content)
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::text("tool", content)
        }
    }

    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

/// Tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    pub arguments: String,
}

/// Input of one completion call
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

/// Something that can complete a conversation
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> RdfResult<ChatMessage>;
}

fn system_prompt(current: &CurrentGraphData) -> RdfResult<String> {
    Ok(format!(
        "You are an assistant working on an RDF knowledge graph. \
         Use the available tools to inspect or change the graph when asked. \
         The part of the graph the user is currently looking at is:\n{}",
        serde_json::to_string(current)?
    ))
}

/// Answer a chat message, running any tools the model asks for
pub async fn run_chat(
    backend: &dyn CompletionBackend,
    dispatcher: &ToolDispatcher,
    request: ChatRequest,
) -> RdfResult<String> {
    let current = request.current_graph_data.unwrap_or_default();

    let mut conversation = CompletionRequest {
        messages: vec![
            ChatMessage::system(system_prompt(&current)?),
            ChatMessage::user(request.message),
        ],
        tools: catalog(),
    };

    let reply = backend.complete(&conversation).await?;
    let calls = reply.tool_calls.clone().unwrap_or_default();
    if calls.is_empty() {
        return Ok(reply.content.unwrap_or_default());
    }

    conversation.messages.push(reply);

    // Every call's arguments are checked before any of them runs
    let mut pending = Vec::with_capacity(calls.len());
    for call in calls {
        let parsed = match ToolCall::parse(&call.function.name, &call.function.arguments) {
            Ok(parsed) => Some(parsed),
            Err(ToolError::Unknown(name)) => {
                warn!(tool = %name, "Ignoring unknown tool call");
                None
            }
            Err(e) => return Err(e.into()),
        };
        pending.push((call, parsed));
    }

    let tools = dispatcher.clone();
    let results = blocking(move || {
        pending
            .into_iter()
            .map(|(call, parsed)| -> RdfResult<ChatMessage> {
                let result = match parsed {
                    Some(tool) => {
                        let output = tools.dispatch(tool, &current).unwrap_or_else(|e| {
                            warn!(tool = %call.function.name, error = %e, "Tool call failed");
                            ToolOutput::failed(e.to_string())
                        });
                        serde_json::to_string(&output)?
                    }
                    None => format!("Unknown tool '{}' was not executed", call.function.name),
                };
                debug!(tool = %call.function.name, "Tool call finished");
                Ok(ChatMessage::tool(call.id, result))
            })
            .collect::<RdfResult<Vec<_>>>()
    })
    .await?;
    conversation.messages.extend(results);

    // The follow-up completion is not offered tools again
    conversation.tools.clear();
    let answer = backend.complete(&conversation).await?;
    Ok(answer.content.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::websocket::broadcaster::GraphBroadcaster;
    use crate::manager::KnowledgeGraphManager;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Backend replaying canned replies and recording what it was sent
    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<VecDeque<ChatMessage>>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<ChatMessage>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, request: &CompletionRequest) -> RdfResult<ChatMessage> {
            self.seen.lock().push(request.clone());
            self.replies
                .lock()
                .pop_front()
                .ok_or_else(|| crate::error::RdfError::Completion("script exhausted".to_string()))
        }
    }

    fn tool_reply(calls: &[(&str, &str, &str)]) -> ChatMessage {
        ChatMessage {
            role: "assistant".to_string(),
            content: None,
            tool_calls: Some(
                calls
                    .iter()
                    .map(|(id, name, arguments)| ToolCallRequest {
                        id: id.to_string(),
                        kind: "function".to_string(),
                        function: FunctionCall {
                            name: name.to_string(),
                            arguments: arguments.to_string(),
                        },
                    })
                    .collect(),
            ),
            tool_call_id: None,
        }
    }

    fn dispatcher() -> ToolDispatcher {
        dispatcher_for(Arc::new(KnowledgeGraphManager::in_memory()))
    }

    fn dispatcher_for(manager: Arc<KnowledgeGraphManager>) -> ToolDispatcher {
        ToolDispatcher::new(Arc::new(GraphBroadcaster::new(manager)), std::env::temp_dir())
    }

    const ADD_AB: &str =
        r#"{"subject":"http://ex.org/a","predicate":"http://ex.org/p","object":"http://ex.org/b"}"#;

    #[tokio::test]
    async fn test_plain_answer() {
        let backend = ScriptedBackend::new(vec![ChatMessage::assistant("Hello!")]);
        let request = ChatRequest {
            message: "hi".to_string(),
            current_graph_data: None,
        };

        let answer = run_chat(&backend, &dispatcher(), request).await.unwrap();
        assert_eq!(answer, "Hello!");

        let seen = backend.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tools.len(), crate::tools::TOOL_NAMES.len());
        assert_eq!(seen[0].messages[0].role, "system");
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let backend = ScriptedBackend::new(vec![
            tool_reply(&[
                (
                    "call_1",
                    "addTriple",
                    r#"{"subject":"http://ex.org/a","predicate":"http://ex.org/p","object":"http://ex.org/b"}"#,
                ),
                ("call_2", "summon_dragon", "{}"),
            ]),
            ChatMessage::assistant("Added it."),
        ]);
        let tools = dispatcher();
        let request = ChatRequest {
            message: "add a p b".to_string(),
            current_graph_data: None,
        };

        let answer = run_chat(&backend, &tools, request).await.unwrap();
        assert_eq!(answer, "Added it.");

        let seen = backend.seen.lock();
        let follow_up = &seen[1].messages;
        assert_eq!(follow_up.len(), 5);
        assert_eq!(follow_up[3].tool_call_id.as_deref(), Some("call_1"));
        assert!(follow_up[3].content.as_deref().unwrap().contains("Triple added successfully"));
        assert!(follow_up[4].content.as_deref().unwrap().contains("summon_dragon"));
        assert!(seen[1].tools.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_tool_arguments_fail() {
        let backend = ScriptedBackend::new(vec![tool_reply(&[("call_1", "readRDFFile", "{}")])]);
        let request = ChatRequest {
            message: "load".to_string(),
            current_graph_data: None,
        };

        let err = run_chat(&backend, &dispatcher(), request).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_failed_tool_call_is_reported_to_model() {
        let manager = Arc::new(KnowledgeGraphManager::in_memory());
        let backend = ScriptedBackend::new(vec![
            tool_reply(&[
                ("call_1", "addTriple", ADD_AB),
                ("call_2", "readRDFFile", r#"{"filename":"../secret.ttl"}"#),
            ]),
            ChatMessage::assistant("Added a, could not read the file."),
        ]);
        let request = ChatRequest {
            message: "add and load".to_string(),
            current_graph_data: None,
        };

        let answer = run_chat(&backend, &dispatcher_for(Arc::clone(&manager)), request)
            .await
            .unwrap();
        assert_eq!(answer, "Added a, could not read the file.");
        assert_eq!(manager.triple_count().unwrap(), 1);

        let seen = backend.seen.lock();
        let failure: serde_json::Value =
            serde_json::from_str(seen[1].messages[4].content.as_deref().unwrap()).unwrap();
        assert_eq!(seen[1].messages[4].tool_call_id.as_deref(), Some("call_2"));
        assert_eq!(failure["success"], false);
        assert!(failure["message"].as_str().unwrap().contains("secret.ttl"));
    }

    #[tokio::test]
    async fn test_malformed_later_call_runs_nothing() {
        let manager = Arc::new(KnowledgeGraphManager::in_memory());
        let backend = ScriptedBackend::new(vec![tool_reply(&[
            ("call_1", "addTriple", ADD_AB),
            ("call_2", "addTriples", r#"{"triples":"nope"}"#),
        ])]);
        let request = ChatRequest {
            message: "add".to_string(),
            current_graph_data: None,
        };

        let err = run_chat(&backend, &dispatcher_for(Arc::clone(&manager)), request)
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(manager.triple_count().unwrap(), 0);
    }
}
