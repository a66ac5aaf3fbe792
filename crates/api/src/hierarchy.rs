use crate::models::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// A node of a caller-defined object tree, addressed with `{a#b#c}` paths.
pub trait HierarchyNode: Send + Sync + Debug {
    /// Display name used in paths; the root node's name is never matched.
    fn name(&self) -> &str;

    fn children(&self) -> Vec<Arc<dyn HierarchyNode>>;

    /// The object represented by this node, if any.
    fn user_object(&self) -> Option<Value>;
}

/// Simple owned tree node, sufficient for configuration-driven hierarchies.
#[derive(Debug, Clone)]
pub struct StaticHierarchyNode {
    pub name: String,
    pub value: Option<Value>,
    pub children: Vec<Arc<dyn HierarchyNode>>,
}

impl StaticHierarchyNode {
    pub fn new(name: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            name: name.into(),
            value,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: impl HierarchyNode + 'static) -> Self {
        self.children.push(Arc::new(child));
        self
    }
}

impl HierarchyNode for StaticHierarchyNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> Vec<Arc<dyn HierarchyNode>> {
        self.children.clone()
    }

    fn user_object(&self) -> Option<Value> {
        self.value.clone()
    }
}
