//! Toolset registry.
//!
//! Tools are grouped into named toolsets that can be enabled one by one or
//! all at once. A group-wide read-only flag ratchets every toolset added to
//! the group into exposing its read tools only.
//!
//! The registry is built and enabled once during startup and is not touched
//! again while requests are served, so it carries no locking of its own.

use std::collections::BTreeMap;

use gitlab_mcp_core::ToolsetError;
use tracing::{debug, info};

use crate::tool::{ServerTool, ToolSink};

/// Enables every registered toolset when passed alone to
/// [`ToolsetGroup::enable_toolsets`].
pub const ALL_TOOLSETS: &str = "all";

// =============================================================================
// Toolset
// =============================================================================

/// A named group of related tools.
#[derive(Debug, Clone)]
pub struct Toolset {
    name: String,
    description: String,
    enabled: bool,
    read_only: bool,
    read_tools: Vec<ServerTool>,
    write_tools: Vec<ServerTool>,
}

impl Toolset {
    /// Create a disabled, writable toolset with no tools.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            enabled: false,
            read_only: false,
            read_tools: Vec::new(),
            write_tools: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn read_tools(&self) -> &[ServerTool] {
        &self.read_tools
    }

    pub fn write_tools(&self) -> &[ServerTool] {
        &self.write_tools
    }

    /// Append non-mutating tools.
    pub fn add_read_tools(&mut self, tools: impl IntoIterator<Item = ServerTool>) -> &mut Self {
        self.read_tools.extend(tools);
        self
    }

    /// Append mutating tools. They are never exposed once the toolset is read-only.
    pub fn add_write_tools(&mut self, tools: impl IntoIterator<Item = ServerTool>) -> &mut Self {
        self.write_tools.extend(tools);
        self
    }

    /// Restrict the toolset to its read tools. There is no way back.
    pub fn force_read_only(&mut self) {
        self.read_only = true;
    }

    /// Tools to expose right now.
    ///
    /// Nothing while disabled; read tools followed by write tools otherwise,
    /// with write tools dropped for read-only toolsets. The returned vector
    /// is a fresh copy.
    pub fn active_tools(&self) -> Vec<ServerTool> {
        if !self.enabled {
            return Vec::new();
        }

        let mut tools = self.read_tools.clone();
        if !self.read_only {
            tools.extend(self.write_tools.iter().cloned());
        }
        tools
    }

    fn enable(&mut self) {
        self.enabled = true;
    }
}

// =============================================================================
// ToolsetGroup
// =============================================================================

/// The set of toolsets owned by one server instance.
#[derive(Debug, Clone, Default)]
pub struct ToolsetGroup {
    toolsets: BTreeMap<String, Toolset>,
    everything_on: bool,
    read_only: bool,
}

impl ToolsetGroup {
    /// Create an empty group. With `read_only` set, every toolset added
    /// later is forced read-only.
    pub fn new(read_only: bool) -> Self {
        Self {
            toolsets: BTreeMap::new(),
            everything_on: false,
            read_only,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether the last [`enable_toolsets`](Self::enable_toolsets) call used `"all"`.
    pub fn is_everything_on(&self) -> bool {
        self.everything_on
    }

    pub fn get(&self, name: &str) -> Option<&Toolset> {
        self.toolsets.get(name)
    }

    /// All toolsets, ordered by name.
    pub fn toolsets(&self) -> impl Iterator<Item = &Toolset> {
        self.toolsets.values()
    }

    /// Insert a toolset, replacing any previous one with the same name.
    pub fn add_toolset(&mut self, mut toolset: Toolset) {
        if self.read_only {
            toolset.force_read_only();
        }

        debug!(
            toolset = %toolset.name,
            read_tools = toolset.read_tools.len(),
            write_tools = toolset.write_tools.len(),
            read_only = toolset.read_only,
            "Adding toolset"
        );

        if self.toolsets.insert(toolset.name.clone(), toolset).is_some() {
            debug!("Replaced previously registered toolset");
        }
    }

    /// Enable a single toolset by name.
    pub fn enable_toolset(&mut self, name: &str) -> Result<(), ToolsetError> {
        let toolset = self
            .toolsets
            .get_mut(name)
            .ok_or_else(|| ToolsetError::UnknownToolset(name.to_string()))?;

        toolset.enable();
        debug!(toolset = name, "Enabled toolset");
        Ok(())
    }

    /// Enable the named toolsets in order.
    ///
    /// A single `"all"` enables everything. Stops at the first unknown
    /// name; toolsets enabled before it stay enabled.
    pub fn enable_toolsets<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), ToolsetError> {
        if names.is_empty() {
            return Err(ToolsetError::NoToolsetsSpecified);
        }

        if let [only] = names {
            if only.as_ref() == ALL_TOOLSETS {
                self.everything_on = true;
                for toolset in self.toolsets.values_mut() {
                    toolset.enable();
                }
                debug!(count = self.toolsets.len(), "Enabled all toolsets");
                return Ok(());
            }
        }

        self.everything_on = false;
        for name in names {
            self.enable_toolset(name.as_ref())?;
        }
        Ok(())
    }

    /// Hand the active tools of every enabled toolset to `sink`.
    pub fn register_active<S: ToolSink + ?Sized>(&self, sink: &mut S) {
        let mut registered = 0;
        for toolset in self.toolsets.values().filter(|t| t.enabled) {
            for tool in toolset.active_tools() {
                sink.add_tool(tool);
                registered += 1;
            }
        }

        info!(
            toolsets = self.toolsets.values().filter(|t| t.enabled).count(),
            tools = registered,
            read_only = self.read_only,
            "Registered active tools"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ToolCallResult, ToolDefinition};
    use crate::tool::handler_fn;
    use gitlab_mcp_core::Error;
    use serde_json::json;

    fn tool(name: &str) -> ServerTool {
        ServerTool::new(
            ToolDefinition::new(name, format!("{} tool", name), json!({"type": "object"})),
            handler_fn(|_| async { Ok::<_, Error>(ToolCallResult::text("ok")) }),
        )
    }

    fn names(tools: &[ServerTool]) -> Vec<&str> {
        tools.iter().map(ServerTool::name).collect()
    }

    fn populated(name: &str) -> Toolset {
        let mut ts = Toolset::new(name, format!("{} toolset", name));
        ts.add_read_tools([tool("r1"), tool("r2")])
            .add_write_tools([tool("w1")]);
        ts
    }

    #[test]
    fn test_new_toolset() {
        let ts = Toolset::new("issues", "Issue tools");
        assert_eq!(ts.name(), "issues");
        assert_eq!(ts.description(), "Issue tools");
        assert!(!ts.is_enabled());
        assert!(!ts.is_read_only());
        assert!(ts.read_tools().is_empty());
        assert!(ts.write_tools().is_empty());
    }

    #[test]
    fn test_add_tools_preserves_order_and_duplicates() {
        let mut ts = Toolset::new("x", "");
        ts.add_read_tools([tool("a"), tool("b")]);
        ts.add_read_tools([tool("a")]);
        ts.add_write_tools([tool("c")]).add_write_tools([tool("d")]);

        assert_eq!(names(ts.read_tools()), vec!["a", "b", "a"]);
        assert_eq!(names(ts.write_tools()), vec!["c", "d"]);
    }

    #[test]
    fn test_active_tools_disabled_is_empty() {
        let mut ts = populated("x");
        assert!(ts.active_tools().is_empty());

        ts.force_read_only();
        assert!(ts.active_tools().is_empty());
    }

    #[test]
    fn test_active_tools_enabled() {
        let mut ts = populated("x");
        ts.enable();
        assert_eq!(names(&ts.active_tools()), vec!["r1", "r2", "w1"]);
    }

    #[test]
    fn test_active_tools_read_only() {
        let mut ts = populated("x");
        ts.enable();
        ts.force_read_only();
        assert_eq!(names(&ts.active_tools()), vec!["r1", "r2"]);
    }

    #[test]
    fn test_active_tools_is_fresh_copy() {
        let mut ts = populated("x");
        ts.enable();

        let mut first = ts.active_tools();
        first.clear();

        let second = ts.active_tools();
        let third = ts.active_tools();
        assert_eq!(names(&second), vec!["r1", "r2", "w1"]);
        assert_eq!(names(&second), names(&third));
    }

    #[test]
    fn test_force_read_only_idempotent() {
        let mut ts = Toolset::new("x", "");
        ts.force_read_only();
        ts.force_read_only();
        assert!(ts.is_read_only());
    }

    #[test]
    fn test_read_only_group_forces_toolsets() {
        let mut group = ToolsetGroup::new(true);
        assert!(group.is_read_only());

        group.add_toolset(populated("x"));
        assert!(group.get("x").unwrap().is_read_only());

        group.enable_toolsets(&["x"]).unwrap();
        assert_eq!(
            names(&group.get("x").unwrap().active_tools()),
            vec!["r1", "r2"]
        );
    }

    #[test]
    fn test_writable_group_keeps_toolset_flag() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(populated("x"));
        assert!(!group.get("x").unwrap().is_read_only());

        let mut ro = populated("y");
        ro.force_read_only();
        group.add_toolset(ro);
        assert!(group.get("y").unwrap().is_read_only());
    }

    #[test]
    fn test_add_toolset_replaces_by_name() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(populated("x"));
        group.enable_toolset("x").unwrap();

        let mut replacement = Toolset::new("x", "replacement");
        replacement.add_read_tools([tool("only")]);
        group.add_toolset(replacement);

        let ts = group.get("x").unwrap();
        assert_eq!(ts.description(), "replacement");
        assert!(!ts.is_enabled());
        assert_eq!(names(ts.read_tools()), vec!["only"]);
        assert_eq!(group.toolsets().count(), 1);
    }

    #[test]
    fn test_enable_toolset() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(populated("x"));

        group.enable_toolset("x").unwrap();
        group.enable_toolset("x").unwrap();
        assert!(group.get("x").unwrap().is_enabled());
    }

    #[test]
    fn test_enable_unknown_toolset() {
        let mut group = ToolsetGroup::new(false);
        let err = group.enable_toolset("invalid-toolset").unwrap_err();
        assert_eq!(
            err,
            ToolsetError::UnknownToolset("invalid-toolset".to_string())
        );
        assert_eq!(err.to_string(), "unknown toolset: invalid-toolset");
    }

    #[test]
    fn test_enable_toolsets_empty() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(populated("x"));

        let names: [&str; 0] = [];
        let err = group.enable_toolsets(&names).unwrap_err();
        assert_eq!(err, ToolsetError::NoToolsetsSpecified);
        assert!(!group.get("x").unwrap().is_enabled());
        assert!(!group.is_everything_on());
    }

    #[test]
    fn test_enable_toolsets_all() {
        for count in [0usize, 1, 3] {
            let mut group = ToolsetGroup::new(false);
            for i in 0..count {
                group.add_toolset(populated(&format!("ts{}", i)));
            }

            group.enable_toolsets(&[ALL_TOOLSETS]).unwrap();
            assert!(group.is_everything_on());
            assert!(group.toolsets().all(Toolset::is_enabled));
            assert_eq!(group.toolsets().count(), count);
        }
    }

    #[test]
    fn test_enable_toolsets_all_among_others_is_a_name() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(populated("x"));

        let err = group.enable_toolsets(&["x", "all"]).unwrap_err();
        assert_eq!(err, ToolsetError::UnknownToolset("all".to_string()));
        assert!(!group.is_everything_on());
    }

    #[test]
    fn test_enable_toolsets_named_resets_everything_on() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(populated("x"));

        group.enable_toolsets(&["all"]).unwrap();
        assert!(group.is_everything_on());

        group.enable_toolsets(&["x".to_string()]).unwrap();
        assert!(!group.is_everything_on());
        assert!(group.get("x").unwrap().is_enabled());
    }

    #[test]
    fn test_enable_toolsets_partial_failure() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(populated("a"));
        group.add_toolset(populated("b"));

        let err = group.enable_toolsets(&["a", "unknown", "b"]).unwrap_err();
        assert_eq!(err, ToolsetError::UnknownToolset("unknown".to_string()));
        assert!(group.get("a").unwrap().is_enabled());
        assert!(!group.get("b").unwrap().is_enabled());
    }

    #[test]
    fn test_register_active() {
        let mut group = ToolsetGroup::new(false);

        let mut issues = Toolset::new("issues", "");
        issues
            .add_read_tools([tool("getIssue")])
            .add_write_tools([tool("createIssue")]);
        group.add_toolset(issues);

        let mut projects = Toolset::new("projects", "");
        projects.add_read_tools([tool("getProject")]);
        group.add_toolset(projects);

        let mut search = Toolset::new("search", "");
        search.add_read_tools([tool("search")]);
        group.add_toolset(search);

        group.enable_toolsets(&["issues", "projects"]).unwrap();

        let mut sink: Vec<ServerTool> = Vec::new();
        group.register_active(&mut sink);
        assert_eq!(names(&sink), vec!["getIssue", "createIssue", "getProject"]);
    }

    #[test]
    fn test_register_active_read_only() {
        let mut group = ToolsetGroup::new(true);
        group.add_toolset(populated("x"));
        group.enable_toolsets(&["all"]).unwrap();

        let mut sink: Vec<ServerTool> = Vec::new();
        group.register_active(&mut sink);
        assert_eq!(names(&sink), vec!["r1", "r2"]);
    }

    #[test]
    fn test_register_active_nothing_enabled() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(populated("x"));

        let mut sink: Vec<ServerTool> = Vec::new();
        group.register_active(&mut sink);
        assert!(sink.is_empty());
    }
}
