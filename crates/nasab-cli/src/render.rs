//! Graphviz DOT rendering of a tree layout

use std::fmt::Write;

use nasab_core::{LayoutNode, LayoutStyle, NodeCell, NodeKind, TreeLayout};

const TABLE_OPEN: &str = r#"<TABLE BORDER="1" CELLBORDER="0" CELLSPACING="0" COLOR=""#;

/// Render `layout` as a DOT digraph for the given Graphviz `engine`
///
/// Marriage nodes are HTML tables with `husband` and `wife` ports. The
/// lineage marker is drawn only on marriage rows.
pub fn render_dot(layout: &TreeLayout, style: &LayoutStyle, engine: &str) -> String {
    let mut dot = String::new();

    dot.push_str("digraph FamilyTree {\n");
    let _ = writeln!(dot, "  layout=\"{}\";", attr_escape(engine));
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  nodesep=0.6;\n");
    dot.push_str("  ranksep=0.9;\n");
    dot.push_str("  splines=curved;\n");
    dot.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\", margin=0.12];\n");
    let _ = writeln!(
        dot,
        "  edge [color=\"{}\", arrowhead=normal, arrowsize=0.8];",
        attr_escape(&style.edge_color)
    );
    dot.push('\n');

    for node in &layout.nodes {
        let _ = writeln!(dot, "  {} [label={}];", node.id, node_label(node, style));
    }

    if !layout.edges.is_empty() {
        dot.push('\n');
    }
    for edge in &layout.edges {
        match edge.port {
            Some(port) => {
                let _ = writeln!(dot, "  {} -> {}:{};", edge.source(), edge.to, port);
            }
            None => {
                let _ = writeln!(dot, "  {} -> {};", edge.source(), edge.to);
            }
        }
    }

    for group in &layout.rank_groups {
        let members: Vec<String> = group.members.iter().map(|m| m.to_string()).collect();
        let _ = writeln!(dot, "  {{ rank=same; {}; }}", members.join("; "));
    }

    dot.push_str("}\n");
    dot
}

fn node_label(node: &LayoutNode, style: &LayoutStyle) -> String {
    let mut html = String::from("<");
    html.push_str(TABLE_OPEN);
    html.push_str(&attr_escape(&style.border_color));
    html.push_str("\">");

    match &node.kind {
        NodeKind::Person { cell } => html.push_str(&row(cell, None, style)),
        NodeKind::Marriage { husband, wife } => {
            html.push_str(&row(husband, Some("husband"), style));
            html.push_str(&row(wife, Some("wife"), style));
        }
    }

    html.push_str("</TABLE>>");
    html
}

fn row(cell: &NodeCell, port: Option<&str>, style: &LayoutStyle) -> String {
    let color = attr_escape(&cell.color);
    let mut name = html_escape(&cell.text);
    if port.is_some() && cell.lineage {
        let _ = write!(
            name,
            " <FONT COLOR=\"{}\">{}</FONT>",
            attr_escape(&style.lineage_color),
            html_escape(&style.lineage_symbol)
        );
    }
    let port_attr = port
        .map(|p| format!(" PORT=\"{}\"", p))
        .unwrap_or_default();

    format!(
        "<TR><TD WIDTH=\"20\" ALIGN=\"CENTER\" BGCOLOR=\"{color}\"><B>{symbol}</B></TD>\
         <TD{port_attr} ALIGN=\"LEFT\" BGCOLOR=\"{color}\">{name}</TD></TR>",
        symbol = html_escape(&cell.symbol),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn attr_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
