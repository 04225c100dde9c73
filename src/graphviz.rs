//! Graphviz DOT output for inspecting tree shape and coloring.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::index::IndexType;
use crate::node::{Color, Node};
use crate::rbtree::RbTree;

impl<K, V, Ix> RbTree<K, V, Ix>
where
    K: Display,
    Ix: IndexType,
{
    /// Write the tree to `path` in DOT format, labelling nodes with key and payload.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from creating or writing the file.
    pub fn draw(&self, path: impl AsRef<Path>) -> io::Result<()>
    where
        V: Display,
    {
        self.draw_with(path, |key, payload| match payload {
            Some(payload) => format!("{key}: {payload}"),
            None => format!("{key}"),
        })
    }

    /// Write the tree to `path` in DOT format, labelling nodes with their key only.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from creating or writing the file.
    pub fn draw_without_payload(&self, path: impl AsRef<Path>) -> io::Result<()> {
        self.draw_with(path, |key, _| format!("{key}"))
    }

    fn draw_with<F>(&self, path: impl AsRef<Path>, label: F) -> io::Result<()>
    where
        F: Fn(&K, Option<&V>) -> String,
    {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_dot(&mut out, label)?;
        out.flush()
    }

    pub(crate) fn write_dot<W, F>(&self, out: &mut W, label: F) -> io::Result<()>
    where
        W: Write,
        F: Fn(&K, Option<&V>) -> String,
    {
        writeln!(out, "digraph rbtree {{")?;
        writeln!(out, "    node [style=filled, fontcolor=white];")?;
        let mut stack = vec![self.root];
        let mut nil = 0usize;
        while let Some(x) = stack.pop() {
            let node = &self.nodes[x.index()];
            let Some(key) = node.key.as_ref() else {
                continue;
            };
            let fill = match node.color() {
                Color::Red => "red",
                Color::Black => "black",
            };
            writeln!(
                out,
                "    n{} [label=\"{}\", fillcolor={fill}];",
                x.index(),
                label(key, node.payload.as_ref())
            )?;
            for child in [node.left(), node.right()] {
                if self.node_ref(child, Node::is_sentinel) {
                    writeln!(out, "    nil{nil} [shape=point, fillcolor=black];")?;
                    writeln!(out, "    n{} -> nil{nil};", x.index())?;
                    nil += 1;
                } else {
                    writeln!(out, "    n{} -> n{};", x.index(), child.index())?;
                    stack.push(child);
                }
            }
        }
        writeln!(out, "}}")
    }
}
