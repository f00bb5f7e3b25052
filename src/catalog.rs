//! GUID lookups over the source model, plus the board containment
//! hierarchy used to classify leaf boards as convertible conversations.

use crate::error::{ImportError, Warning};
use crate::report::ImportReport;
use crate::source::{
    Asset, Attribute, Board, Branch, Component, Condition, Connection, Element, Jumper, Project,
};
use ahash::AHashMap;

/// Hard guard against cyclic or pathologically deep board hierarchies.
pub const MAX_HIERARCHY_DEPTH: usize = 1000;

/// Read-only id→object resolution across all source categories.
///
/// The source maps are already GUID-keyed, so every lookup is O(1); the
/// catalog only adds a typed front door so conversion code never touches
/// raw maps.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    project: &'a Project,
}

impl<'a> Catalog<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    pub fn board(&self, guid: &str) -> Option<&'a Board> {
        self.project.boards.get(guid)
    }

    pub fn element(&self, guid: &str) -> Option<&'a Element> {
        self.project.elements.get(guid)
    }

    pub fn connection(&self, guid: &str) -> Option<&'a Connection> {
        self.project.connections.get(guid)
    }

    pub fn branch(&self, guid: &str) -> Option<&'a Branch> {
        self.project.branches.get(guid)
    }

    pub fn jumper(&self, guid: &str) -> Option<&'a Jumper> {
        self.project.jumpers.get(guid)
    }

    pub fn condition(&self, guid: &str) -> Option<&'a Condition> {
        self.project.conditions.get(guid)
    }

    pub fn component(&self, guid: &str) -> Option<&'a Component> {
        self.project.components.get(guid)
    }

    pub fn attribute(&self, guid: &str) -> Option<&'a Attribute> {
        self.project.attributes.get(guid)
    }

    pub fn asset(&self, guid: &str) -> Option<&'a Asset> {
        self.project.assets.get(guid)
    }
}

/// The board containment hierarchy, built once per import.
///
/// Leaf boards (no `children` array) are the conversation candidates. Each
/// leaf records its title path from below the root, e.g. `"Act 1/Tavern"`,
/// used as the conversation title.
#[derive(Debug, Clone, Default)]
pub struct BoardTree {
    pub root_guid: String,
    leaves: Vec<String>,
    leaf_paths: AHashMap<String, String>,
}

impl BoardTree {
    /// Walks the hierarchy from the unique root board.
    ///
    /// A missing root is fatal ([`ImportError::SchemaMismatch`]); a cyclic
    /// parent chain trips the depth guard ([`ImportError::DepthExceeded`])
    /// instead of recursing forever. Dangling child references are
    /// warnings.
    pub fn build(project: &Project, report: &mut ImportReport) -> Result<Self, ImportError> {
        let (root_guid, root_board) = project
            .boards
            .iter()
            .find(|(_, board)| board.root)
            .ok_or_else(|| {
                ImportError::SchemaMismatch("no root board in project".to_string())
            })?;

        let mut tree = Self {
            root_guid: root_guid.clone(),
            leaves: Vec::new(),
            leaf_paths: AHashMap::new(),
        };
        let mut path: Vec<String> = Vec::new();
        tree.record_children(project, root_guid, root_board, &mut path, 0, report)?;
        Ok(tree)
    }

    fn record_children(
        &mut self,
        project: &Project,
        guid: &str,
        board: &Board,
        path: &mut Vec<String>,
        depth: usize,
        report: &mut ImportReport,
    ) -> Result<(), ImportError> {
        if depth > MAX_HIERARCHY_DEPTH {
            return Err(ImportError::DepthExceeded {
                path: path.join("/"),
                limit: MAX_HIERARCHY_DEPTH,
            });
        }
        match &board.children {
            None => {
                if !self.leaf_paths.contains_key(guid) {
                    let mut full_path = path.clone();
                    full_path.push(board.name.clone());
                    self.leaves.push(guid.to_string());
                    self.leaf_paths
                        .insert(guid.to_string(), full_path.join("/"));
                }
            }
            Some(children) if children.is_empty() => {
                report.warn(Warning::ChildlessContainer {
                    board_id: guid.to_string(),
                });
            }
            Some(children) => {
                // The root's own name is not part of any title path.
                if !board.root {
                    path.push(board.name.clone());
                }
                for child_guid in children {
                    let Some(child) = project.boards.get(child_guid) else {
                        report.warn(Warning::DanglingReference {
                            source_id: guid.to_string(),
                            target_id: child_guid.clone(),
                        });
                        continue;
                    };
                    self.record_children(project, child_guid, child, path, depth + 1, report)?;
                }
                if !board.root {
                    path.pop();
                }
            }
        }
        Ok(())
    }

    pub fn is_leaf(&self, guid: &str) -> bool {
        self.leaf_paths.contains_key(guid)
    }

    /// Leaf board GUIDs in traversal order.
    pub fn leaves(&self) -> &[String] {
        &self.leaves
    }

    /// Title path for a leaf board, or `None` for containers.
    pub fn title_path(&self, guid: &str) -> Option<&str> {
        self.leaf_paths.get(guid).map(String::as_str)
    }
}
