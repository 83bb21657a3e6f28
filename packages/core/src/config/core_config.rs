/**
 * Values read from config.json, overridable through TENANTDB_* environment variables
 */
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /**
     * Reject extra filters replacing _id or projectId
     */
    #[serde(default = "default_strict_scope")]
    pub strict_scope: bool,
}

fn default_strict_scope() -> bool {
    true
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            strict_scope: default_strict_scope(),
        }
    }
}
