use std::fmt;

/// Manager step during which a getter failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Resolve,
    Initialize,
    Start,
    Stop,
    Reconfigure,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecyclePhase::Resolve => "resolve",
            LifecyclePhase::Initialize => "initialize",
            LifecyclePhase::Start => "start",
            LifecyclePhase::Stop => "stop",
            LifecyclePhase::Reconfigure => "reconfigure",
        };
        f.write_str(name)
    }
}

/// One getter that failed, and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetterFailure {
    pub getter_id: String,
    pub type_name: String,
    pub phase: LifecyclePhase,
    pub reason: String,
    /// Copied from the getter's settings; decides [`LifecycleReport::is_success`]
    pub required: bool,
}

impl fmt::Display for GetterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "getter '{}' ({}) failed to {}: {}",
            self.getter_id, self.type_name, self.phase, self.reason
        )
    }
}

/// Outcome of a manager-wide start or stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleReport {
    pub phase: LifecyclePhase,
    /// Getters the operation succeeded for, in configuration order
    pub succeeded: Vec<String>,
    pub failures: Vec<GetterFailure>,
}

impl LifecycleReport {
    pub fn new(phase: LifecyclePhase) -> Self {
        Self {
            phase,
            succeeded: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// False only when a getter marked `required` failed
    pub fn is_success(&self) -> bool {
        !self.failures.iter().any(|failure| failure.required)
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|failure| failure.getter_id.as_str()).collect()
    }

    pub fn required_failures(&self) -> Vec<String> {
        self.failures
            .iter()
            .filter(|failure| failure.required)
            .map(|failure| failure.getter_id.clone())
            .collect()
    }
}
