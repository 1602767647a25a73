use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    gateway::Gateway,
    provider::{ChatError, ChatProvider},
    types::ChatRequest,
};

/// Gateway with model `m` backed by a scripted provider
pub fn gateway(provider: &Arc<Scripted>) -> Gateway {
    gateway_with_model(provider, "m")
}

pub fn gateway_with_model(provider: &Arc<Scripted>, model: &str) -> Gateway {
    Gateway::new(Some(Arc::clone(provider) as Arc<dyn ChatProvider>), model)
}

/// Replays one canned completion result and records the request it saw
pub struct Scripted {
    reply: Mutex<Option<Result<String, ChatError>>>,
    seen: Mutex<Option<ChatRequest>>,
}

impl Scripted {
    pub fn new(reply: Result<String, ChatError>) -> Self {
        Self {
            reply: Mutex::new(Some(reply)),
            seen: Mutex::new(None),
        }
    }

    pub fn arc(reply: Result<String, ChatError>) -> Arc<Self> {
        Arc::new(Self::new(reply))
    }

    pub fn arc_reply(content: &str) -> Arc<Self> {
        Self::arc(Ok(content.to_owned()))
    }

    pub fn seen(&self) -> Option<ChatRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        *self.seen.lock().unwrap() = Some(request.clone());
        self.reply.lock().unwrap().take().expect("provider called more than once")
    }
}
