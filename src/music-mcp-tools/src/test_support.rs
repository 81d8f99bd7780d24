//! Recording script runner for handler and dispatcher tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use music_mcp_script::{ExecutionResult, ExitKind, ScriptRef, ScriptRunner};

use crate::config::Config;
use crate::handlers::HandlerContext;
use crate::scripts::Script;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub script: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

/// Answers every run from a table of canned results keyed by script path.
///
/// Unknown scripts succeed with empty output. A canned `Timeout` sleeps for
/// its deadline before answering, like a real hung process would.
#[derive(Default)]
pub struct StubRunner {
    responses: Mutex<HashMap<String, ExecutionResult>>,
    calls: Mutex<Vec<Call>>,
    panic_on_run: bool,
    interpreter_missing: bool,
}

impl StubRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panicking() -> Self {
        Self {
            panic_on_run: true,
            ..Self::default()
        }
    }

    pub fn without_interpreter(mut self) -> Self {
        self.interpreter_missing = true;
        self
    }

    pub fn respond(self, script: Script, result: ExecutionResult) -> Self {
        self.respond_to(script.path(), result)
    }

    pub fn respond_to(self, key: &str, result: ExecutionResult) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.script).collect()
    }
}

#[async_trait]
impl ScriptRunner for StubRunner {
    async fn run(&self, script: &ScriptRef, args: &[String], timeout: Duration) -> ExecutionResult {
        if self.panic_on_run {
            panic!("stub runner exploded");
        }
        let key = script.to_string();
        self.calls.lock().unwrap().push(Call {
            script: key.clone(),
            args: args.to_vec(),
            timeout,
        });
        let result = self
            .responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ExecutionResult::success(""));
        if let ExitKind::Timeout { after } = result.exit_kind {
            tokio::time::sleep(after).await;
        }
        result
    }

    fn interpreter_available(&self) -> bool {
        !self.interpreter_missing
    }
}

pub fn context(runner: &Arc<StubRunner>) -> HandlerContext {
    context_with(runner, Config::default())
}

pub fn context_with(runner: &Arc<StubRunner>, config: Config) -> HandlerContext {
    let runner: Arc<dyn ScriptRunner> = runner.clone();
    HandlerContext::new(runner, Arc::new(config))
}
