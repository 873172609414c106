use ::std::num::NonZeroUsize;

use ::rucalc_common::serde::Deserialize;

pub mod dispatcher;
pub mod orchestrator_client;
pub mod worker;

/// Configuration for rucalc agent
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(crate = "rucalc_common::serde")]
pub struct AgentConfig {
    /// Number of tasks computed in parallel
    pub workers: NonZeroUsize,
    #[serde(default)]
    pub orchestrator: OrchestratorEndpoint,
    #[serde(default = "AgentConfig::default_request_timeout_millis")]
    pub request_timeout_millis: u64,
}

impl AgentConfig {
    fn default_request_timeout_millis() -> u64 {
        5000
    }
}

/// Where the orchestrator listens.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(crate = "rucalc_common::serde")]
pub struct OrchestratorEndpoint {
    #[serde(default = "OrchestratorEndpoint::default_host")]
    pub host: String,
    #[serde(default = "OrchestratorEndpoint::default_port")]
    pub port: u16,
}

impl OrchestratorEndpoint {
    fn default_host() -> String {
        "localhost".to_owned()
    }

    fn default_port() -> u16 {
        8081
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for OrchestratorEndpoint {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}
