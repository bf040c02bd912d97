//! GraphIR — the typed directed multigraph the layout pipeline works on.
//!
//! A thin wrapper over a petgraph `DiGraph` that adds Mermaid metadata, a
//! subgraph tree, and the determinism contract: node and edge iteration
//! follow insertion order, so identical input always yields identical
//! layouts.

use indexmap::IndexMap;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::syntax::types::{
    Attr, Direction, Edge as AstEdge, EdgeType, Graph as AstGraph, Node as AstNode, NodeShape,
    Subgraph as AstSubgraph,
};

// ─── Metadata ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NodeMeta {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    pub attrs: Vec<Attr>,
    /// Innermost subgraph this node belongs to, if any.
    pub subgraph: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EdgeMeta {
    pub edge_type: EdgeType,
    pub label: Option<String>,
    pub attrs: Vec<Attr>,
    /// Set by cycle removal when the stored direction is the reverse of the
    /// declared one. Arrowheads are flipped back at render time.
    pub reversed: bool,
}

/// One subgraph in the (flattened) nesting tree.
#[derive(Debug, Clone)]
pub struct SubgraphInfo {
    pub id: String,
    pub title: Option<String>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Ids of nodes declared directly in this subgraph.
    pub members: Vec<String>,
    pub direction: Option<Direction>,
}

// ─── GraphIR ─────────────────────────────────────────────────────────────────

pub struct GraphIR {
    pub digraph: DiGraph<NodeMeta, EdgeMeta>,
    pub direction: Direction,
    node_index: IndexMap<String, NodeIndex>,
    subgraphs: Vec<SubgraphInfo>,
    sg_index: IndexMap<String, usize>,
}

impl GraphIR {
    /// Build a GraphIR from the parsed AST, consuming it conceptually:
    /// nothing reads the AST after this.
    pub fn from_ast(ast: &AstGraph) -> Self {
        let mut ir = Self {
            digraph: DiGraph::new(),
            direction: ast.direction,
            node_index: IndexMap::new(),
            subgraphs: Vec::new(),
            sg_index: IndexMap::new(),
        };

        // Register the subgraph tree first so top-level nodes that shadow a
        // subgraph name can be skipped.
        for sg in &ast.subgraphs {
            ir.collect_subgraph(sg, None);
        }

        // Subgraph members before top-level declarations: a node referenced
        // at top level but declared in a subgraph belongs to the subgraph.
        Self::walk_subgraph_nodes(&mut ir, &ast.subgraphs);
        for node in &ast.nodes {
            if !ir.sg_index.contains_key(&node.id) {
                ir.add_node(node, None);
            }
        }

        for edge in &ast.edges {
            ir.add_edge(edge);
        }
        Self::walk_subgraph_edges(&mut ir, &ast.subgraphs);

        ir
    }

    fn collect_subgraph(&mut self, sg: &AstSubgraph, parent: Option<usize>) {
        let idx = self.subgraphs.len();
        self.subgraphs.push(SubgraphInfo {
            id: sg.name.clone(),
            title: sg.description.clone(),
            parent,
            children: Vec::new(),
            members: sg.nodes.iter().map(|n| n.id.clone()).collect(),
            direction: sg.direction,
        });
        self.sg_index.insert(sg.name.clone(), idx);
        if let Some(p) = parent {
            self.subgraphs[p].children.push(idx);
        }
        for nested in &sg.subgraphs {
            self.collect_subgraph(nested, Some(idx));
        }
    }

    fn walk_subgraph_nodes(ir: &mut Self, subgraphs: &[AstSubgraph]) {
        for sg in subgraphs {
            for node in &sg.nodes {
                ir.add_node(node, Some(sg.name.clone()));
            }
            Self::walk_subgraph_nodes(ir, &sg.subgraphs);
        }
    }

    fn walk_subgraph_edges(ir: &mut Self, subgraphs: &[AstSubgraph]) {
        for sg in subgraphs {
            for edge in &sg.edges {
                ir.add_edge(edge);
            }
            Self::walk_subgraph_edges(ir, &sg.subgraphs);
        }
    }

    /// Add a node. First definition wins, except that a shaped declaration
    /// fills in an id previously seen only as a bare reference — regardless
    /// of which scope saw it first. Subgraph membership stays where the
    /// first sighting put it.
    pub fn add_node(&mut self, node: &AstNode, subgraph: Option<String>) {
        if let Some(&idx) = self.node_index.get(&node.id) {
            let existing = &mut self.digraph[idx];
            let existing_bare = existing.label == existing.id
                && existing.shape == NodeShape::Rectangle
                && existing.attrs.is_empty();
            let incoming_shaped = node.label != node.id || node.shape != NodeShape::Rectangle;
            if existing_bare && incoming_shaped {
                existing.label = node.label.clone();
                existing.shape = node.shape;
                existing.attrs = node.attrs.clone();
            }
            return;
        }
        let meta = NodeMeta {
            id: node.id.clone(),
            label: node.label.clone(),
            shape: node.shape,
            attrs: node.attrs.clone(),
            subgraph,
        };
        let idx = self.digraph.add_node(meta);
        self.node_index.insert(node.id.clone(), idx);
    }

    /// Add an edge, implicitly declaring any endpoint that has no node
    /// declaration as a bare Rectangle with label = id.
    pub fn add_edge(&mut self, edge: &AstEdge) {
        self.ensure_node(&edge.from_id);
        self.ensure_node(&edge.to_id);
        let from = self.node_index[&edge.from_id];
        let to = self.node_index[&edge.to_id];
        self.digraph.add_edge(
            from,
            to,
            EdgeMeta {
                edge_type: edge.edge_type,
                label: edge.label.clone(),
                attrs: edge.attrs.clone(),
                reversed: false,
            },
        );
    }

    fn ensure_node(&mut self, id: &str) {
        if !self.node_index.contains_key(id) {
            self.add_node(&AstNode::bare(id), None);
        }
    }

    pub fn node_count(&self) -> usize {
        self.digraph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.digraph.edge_count()
    }

    pub fn is_dag(&self) -> bool {
        !is_cyclic_directed(&self.digraph)
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.node_index.keys().map(|s| s.as_str())
    }

    pub fn node_meta(&self, id: &str) -> Option<&NodeMeta> {
        self.node_index.get(id).map(|&idx| &self.digraph[idx])
    }

    /// All edges as `(from_id, to_id, meta)` in insertion order.
    pub fn edge_list(&self) -> Vec<(String, String, EdgeMeta)> {
        self.digraph
            .edge_indices()
            .map(|eidx| {
                let (a, b) = self.digraph.edge_endpoints(eidx).unwrap();
                (
                    self.digraph[a].id.clone(),
                    self.digraph[b].id.clone(),
                    self.digraph[eidx].clone(),
                )
            })
            .collect()
    }

    /// Direct successors of `id`, in edge insertion order.
    pub fn successors(&self, id: &str) -> Vec<String> {
        self.adjacent(id, true)
    }

    /// Direct predecessors of `id`, in edge insertion order.
    pub fn predecessors(&self, id: &str) -> Vec<String> {
        self.adjacent(id, false)
    }

    fn adjacent(&self, id: &str, outgoing: bool) -> Vec<String> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        self.digraph
            .edge_indices()
            .filter_map(|eidx| {
                let (a, b) = self.digraph.edge_endpoints(eidx).unwrap();
                if outgoing && a == idx {
                    Some(self.digraph[b].id.clone())
                } else if !outgoing && b == idx {
                    Some(self.digraph[a].id.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Flip the first non-reversed `u → v` edge in place, marking it
    /// reversed. Used by cycle removal. Returns false if no such edge.
    pub fn reverse_edge(&mut self, u: &str, v: &str) -> bool {
        let (Some(&ui), Some(&vi)) = (self.node_index.get(u), self.node_index.get(v)) else {
            return false;
        };
        let found = self.digraph.edge_indices().find(|&eidx| {
            self.digraph.edge_endpoints(eidx) == Some((ui, vi)) && !self.digraph[eidx].reversed
        });
        let Some(eidx) = found else {
            return false;
        };
        let mut meta = self.digraph.remove_edge(eidx).unwrap();
        meta.reversed = true;
        self.digraph.add_edge(vi, ui, meta);
        true
    }

    /// Innermost subgraph containing `id`, if any.
    pub fn subgraph_of(&self, id: &str) -> Option<&str> {
        self.node_meta(id)?.subgraph.as_deref()
    }

    /// Direct members of a subgraph.
    pub fn members(&self, sg_id: &str) -> &[String] {
        match self.sg_index.get(sg_id) {
            Some(&i) => &self.subgraphs[i].members,
            None => &[],
        }
    }

    pub fn subgraphs(&self) -> &[SubgraphInfo] {
        &self.subgraphs
    }

    pub fn subgraph_info(&self, sg_id: &str) -> Option<&SubgraphInfo> {
        self.sg_index.get(sg_id).map(|&i| &self.subgraphs[i])
    }

    /// Subgraph indices from the outermost ancestor down to the innermost
    /// subgraph containing `id`. Empty for top-level nodes.
    pub fn subgraph_chain(&self, id: &str) -> Vec<usize> {
        let Some(inner) = self.subgraph_of(id) else {
            return Vec::new();
        };
        let Some(&start) = self.sg_index.get(inner) else {
            return Vec::new();
        };
        let mut cur = start;
        let mut chain = vec![cur];
        while let Some(parent) = self.subgraphs[cur].parent {
            chain.push(parent);
            cur = parent;
        }
        chain.reverse();
        chain
    }

    /// `(subgraph_id, members)` pairs in declaration order, for LayoutResult.
    pub fn subgraph_members(&self) -> Vec<(String, Vec<String>)> {
        self.subgraphs
            .iter()
            .map(|sg| (sg.id.clone(), sg.members.clone()))
            .collect()
    }

    /// Subgraph id → title map, for LayoutResult.
    pub fn subgraph_descriptions(&self) -> IndexMap<String, String> {
        self.subgraphs
            .iter()
            .filter_map(|sg| sg.title.clone().map(|t| (sg.id.clone(), t)))
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse;

    fn ir(src: &str) -> GraphIR {
        GraphIR::from_ast(&parse(src).unwrap())
    }

    #[test]
    fn nodes_and_edges_from_ast() {
        let g = ir("graph TD\n  A --> B --> C\n");
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.node_ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn implicit_nodes_are_bare_rectangles() {
        let g = ir("graph TD\n  A[Start] --> B\n");
        let b = g.node_meta("B").unwrap();
        assert_eq!(b.label, "B");
        assert_eq!(b.shape, NodeShape::Rectangle);
    }

    #[test]
    fn first_definition_wins_in_ir() {
        let ast = crate::parsers::parse("graph TD\n  A[First]\n").unwrap();
        let mut g = GraphIR::from_ast(&ast);
        g.add_node(&AstNode::new("A", "Second", NodeShape::Rounded), None);
        assert_eq!(g.node_meta("A").unwrap().label, "First");
    }

    #[test]
    fn shaped_declaration_upgrades_bare_subgraph_reference() {
        // The subgraph's bare X is registered first; the later top-level
        // shaped declaration still supplies the label without stealing
        // the subgraph membership.
        let g = ir("graph TD\n  X[Foo] --> Y\n  subgraph G\n    X\n  end\n");
        let x = g.node_meta("X").unwrap();
        assert_eq!(x.label, "Foo");
        assert_eq!(x.subgraph.as_deref(), Some("G"));

        // And the other way round: a bare top-level reference does not
        // demote a shaped declaration inside the subgraph.
        let g = ir("graph TD\n  X --> Y\n  subgraph G\n    X[Foo]\n  end\n");
        let x = g.node_meta("X").unwrap();
        assert_eq!(x.label, "Foo");
        assert_eq!(x.subgraph.as_deref(), Some("G"));
    }

    #[test]
    fn adjacency_in_insertion_order() {
        let g = ir("graph TD\n  A --> C\n  A --> B\n  D --> C\n");
        assert_eq!(g.successors("A"), vec!["C", "B"]);
        assert_eq!(g.predecessors("C"), vec!["A", "D"]);
        assert!(g.successors("missing").is_empty());
    }

    #[test]
    fn cycle_detection() {
        assert!(ir("graph TD\n  A --> B\n").is_dag());
        assert!(!ir("graph TD\n  A --> B --> A\n").is_dag());
    }

    #[test]
    fn reverse_edge_flips_and_marks() {
        let mut g = ir("graph TD\n  A --> B\n");
        assert!(g.reverse_edge("A", "B"));
        let edges = g.edge_list();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].0, "B");
        assert_eq!(edges[0].1, "A");
        assert!(edges[0].2.reversed);
        // Already reversed; nothing left to flip.
        assert!(!g.reverse_edge("A", "B"));
    }

    #[test]
    fn subgraph_membership() {
        let g = ir("graph TD\n  subgraph G\n    X --> Y\n  end\n  Y --> Z\n");
        assert_eq!(g.subgraph_of("X"), Some("G"));
        assert_eq!(g.subgraph_of("Z"), None);
        assert_eq!(g.members("G"), ["X".to_string(), "Y".to_string()]);
        assert_eq!(g.subgraph_members().len(), 1);
    }

    #[test]
    fn nested_subgraph_chain() {
        let g = ir("graph TD\n  subgraph outer\n    subgraph inner\n      A\n    end\n  end\n");
        let chain = g.subgraph_chain("A");
        assert_eq!(chain.len(), 2);
        assert_eq!(g.subgraphs()[chain[0]].id, "outer");
        assert_eq!(g.subgraphs()[chain[1]].id, "inner");
        assert!(g.subgraph_chain("missing").is_empty());
    }

    #[test]
    fn top_level_node_shadowing_subgraph_name_is_skipped() {
        let g = ir("graph TD\n  subgraph G\n    X\n  end\n  G --> Z\n");
        // "G" as an edge endpoint becomes an implicit node, but the
        // declaration inside the subgraph block does not duplicate it.
        assert!(g.node_meta("G").is_some());
        assert_eq!(g.members("G"), ["X".to_string()]);
    }

    #[test]
    fn subgraph_titles() {
        let g = ir("graph TD\n  subgraph api[Public API]\n    A\n  end\n");
        assert_eq!(
            g.subgraph_descriptions().get("api").map(|s| s.as_str()),
            Some("Public API")
        );
        assert_eq!(g.subgraph_info("api").unwrap().title.as_deref(), Some("Public API"));
    }
}
