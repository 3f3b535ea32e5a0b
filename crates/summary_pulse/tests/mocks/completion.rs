use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use summary_pulse::CompletionService;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionCall {
    pub system: String,
    pub user: String,
}

/// Replays scripted responses in order; once the script runs out the last
/// response is repeated.
#[derive(Clone)]
pub struct MockCompletion {
    pub responses: Arc<Mutex<VecDeque<String>>>,
    pub last_response: Arc<Mutex<String>>,
    pub calls: Arc<Mutex<Vec<CompletionCall>>>,
    pub fail_with: Option<String>,
}

impl MockCompletion {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.iter().map(|r| r.to_string()).collect(),
            )),
            last_response: Arc::new(Mutex::new(String::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// Every call answers with `response`
    pub fn always(response: &str) -> Self {
        Self::new(&[response])
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new(&[])
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CompletionService for MockCompletion {
    type Error = anyhow::Error;

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(CompletionCall {
            system: system_prompt.to_string(),
            user: user_prompt.to_string(),
        });
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }

        let mut last = self.last_response.lock().unwrap();
        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}
