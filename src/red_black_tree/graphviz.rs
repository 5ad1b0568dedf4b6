use crate::arena::Entry;
use crate::red_black_tree::node::{Color, Link, Pool};
use std::fmt::Display;

fn render_node<T>(pool: &Pool<T>, entry: Entry, buf: &mut String)
where
    T: Display,
{
    let node = &pool[entry];
    let fill = match node.color {
        Color::Red => "Red",
        Color::Black => "Gray",
    };
    buf.push_str(&format!(
        "\t\tnode_{} [shape = Mrecord label = \"{}\", fillcolor = {}, style=filled]\n",
        entry.index(),
        node.value,
        fill,
    ));
}

/// Writes the tree rooted at `root` as a DOT digraph: one filled record per node, colored by the
/// node's color, and one edge from every node to each of its children.
pub fn render<T>(pool: &Pool<T>, root: Link) -> String
where
    T: Display,
{
    let mut buf = String::from("digraph {\nrankdir = TB\n");
    let mut stack: Vec<_> = root.into_iter().collect();
    while let Some(entry) = stack.pop() {
        render_node(pool, entry, &mut buf);
        let node = &pool[entry];
        for child in node.left().into_iter().chain(node.right()) {
            buf.push_str(&format!("\t\tnode_{} -> node_{}\n", entry.index(), child.index()));
        }
        stack.extend(node.right());
        stack.extend(node.left());
    }
    buf.push_str("}\n");
    buf
}
