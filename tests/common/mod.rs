//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use futures_util::future::BoxFuture;
use serde_json::Value;

use multiagent::ollama::{
    ChatBackend, ChatError, ChatMessage, ChatRequest, ChatResponse, EmbedError, Embedder,
    FunctionCall, ToolCall,
};

/// Plays back a fixed list of replies, one per request, and records every request.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<ChatResponse, ChatError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<ChatResponse, ChatError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl ChatBackend for ScriptedBackend {
    fn chat<'a>(&'a self, request: ChatRequest) -> BoxFuture<'a, Result<ChatResponse, ChatError>> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ChatError::EmptyResponse));
        Box::pin(async move { reply })
    }
}

pub fn text(content: &str) -> Result<ChatResponse, ChatError> {
    Ok(ChatResponse {
        message: ChatMessage::assistant(content),
        done: true,
        eval_count: 0,
        eval_duration: 0,
    })
}

pub fn tool_call(name: &str, arguments: Value) -> Result<ChatResponse, ChatError> {
    let mut message = ChatMessage::assistant("");
    message.tool_calls = Some(vec![ToolCall {
        function: FunctionCall {
            name: name.to_string(),
            arguments,
        },
    }]);
    Ok(ChatResponse {
        message,
        done: true,
        eval_count: 0,
        eval_duration: 0,
    })
}

pub fn api_error(status: u16, message: &str) -> Result<ChatResponse, ChatError> {
    Err(ChatError::Api {
        status,
        message: message.to_string(),
    })
}

const VOCABULARY: [&str; 5] = ["python", "agent", "rag", "model", "calcul"];

/// Bag-of-keywords embedding: one dimension per vocabulary word.
pub struct KeywordEmbedder;

impl Embedder for KeywordEmbedder {
    fn embed<'a>(&'a self, inputs: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>, EmbedError>> {
        let vectors = inputs
            .iter()
            .map(|input| {
                let lower = input.to_lowercase();
                let mut vector: Vec<f32> = VOCABULARY
                    .iter()
                    .map(|word| lower.matches(word).count() as f32)
                    .collect();
                // keep every vector non-zero
                vector.push(0.1);
                vector
            })
            .collect();
        Box::pin(async move { Ok(vectors) })
    }
}

/// An embedder whose server is always down.
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed<'a>(&'a self, _inputs: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>, EmbedError>> {
        Box::pin(async {
            Err(EmbedError::Api {
                status: 500,
                message: "embedding model not loaded".to_string(),
            })
        })
    }
}

/// Write a stand-in `ollama` binary into `dir`.
///
/// `list` reports `phi3:latest` and `mistral:7b`. `pull` succeeds for
/// `llama3` and `mistral` and fails for anything else. Each pull is logged to `pulls.log`.
#[cfg(unix)]
pub fn fake_ollama(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = r#"#!/bin/sh
case "$1" in
  list)
    echo "NAME           ID              SIZE      MODIFIED"
    echo "phi3:latest    4f2222927938    2.2 GB    2 days ago"
    echo "mistral:7b     61e88e884507    4.1 GB    3 weeks ago"
    ;;
  pull)
    echo "$2" >> "$(dirname "$0")/pulls.log"
    if [ "$2" = "llama3" ] || [ "$2" = "mistral" ]; then
      echo "success"
    else
      echo "Error: pull model manifest: file does not exist" >&2
      exit 1
    fi
    ;;
  *)
    exit 2
    ;;
esac
"#;
    let path = dir.join("ollama");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Models pulled through the fake binary, in order.
pub fn pulls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("pulls.log"))
        .map(|log| log.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
