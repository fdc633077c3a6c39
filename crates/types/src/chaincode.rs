use serde::{Deserialize, Serialize};
use std::fmt;

/// Language the targeted chaincode is written in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChaincodeLanguage {
    #[default]
    Golang,
    Java,
    Node,
}

/// Identifies the application logic a proposal targets.
///
/// Built once per executor and shared by reference across every request it
/// issues; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChaincodeReference {
    name: String,
    version: String,
    #[serde(default)]
    language: ChaincodeLanguage,
}

impl ChaincodeReference {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            language: ChaincodeLanguage::default(),
        }
    }

    pub fn with_language(mut self, language: ChaincodeLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn language(&self) -> ChaincodeLanguage {
        self.language
    }

    /// Key under which discovery results for this chaincode are cached
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }
}

impl fmt::Display for ChaincodeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
