//! Scripted `Assessor` double for driving the pipeline in tests without a network.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Assessor, CallError};

type Responder = dyn Fn(usize, &str) -> Result<String, CallError> + Send + Sync;

/// Answers each call by invoking `respond(call_index, prompt)` and records every prompt.
pub struct ScriptedAssessor {
    respond: Box<Responder>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAssessor {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(usize, &str) -> Result<String, CallError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Returns the same body for every call.
    pub fn always(body: &str) -> Self {
        let body = body.to_string();
        Self::new(move |_, _| Ok(body.clone()))
    }

    /// Fails every call with a 503.
    pub fn failing() -> Self {
        Self::new(|_, _| {
            Err(CallError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Assessor for ScriptedAssessor {
    async fn call(&self, prompt: &str) -> Result<String, CallError> {
        let index = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };
        (self.respond)(index, prompt)
    }
}
