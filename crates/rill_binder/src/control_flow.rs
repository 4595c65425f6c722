//! Control-flow graph over a lowered body, and return-path analysis.

use crate::bound_tree::*;
use crate::operators::BOOL_LOGICAL_NEGATION;
use crate::symbol::BoundLabel;
use rill_ast::LiteralValue;
use rill_core::collections::FxHashMap;
use std::fmt;
use std::io::{self, Write};

/// A maximal run of statements entered only at the top and left only at the
/// bottom.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub statements: Vec<BoundStatement>,
    is_start: bool,
    is_end: bool,
}

impl BasicBlock {
    pub fn is_start(&self) -> bool {
        self.is_start
    }

    pub fn is_end(&self) -> bool {
        self.is_end
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_start {
            return f.write_str("<Start>");
        }
        if self.is_end {
            return f.write_str("<End>");
        }
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

/// An edge between two blocks, by index into [`ControlFlowGraph::blocks`].
#[derive(Debug, Clone)]
pub struct BasicBlockBranch {
    pub from: usize,
    pub to: usize,
    /// The condition under which the edge is taken; `None` if unconditional.
    pub condition: Option<BoundExpression>,
}

#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    blocks: Vec<BasicBlock>,
    branches: Vec<BasicBlockBranch>,
}

impl ControlFlowGraph {
    pub fn create(body: &BoundBlockStatement) -> Self {
        let mut blocks = vec![BasicBlock {
            is_start: true,
            ..BasicBlock::default()
        }];
        blocks.extend(split_blocks(&body.statements));
        blocks.push(BasicBlock {
            is_end: true,
            ..BasicBlock::default()
        });

        let branches = connect_blocks(&blocks);
        let mut graph = Self { blocks, branches };
        graph.remove_unreachable_blocks();
        graph
    }

    /// Whether every path through the lowered `body` ends in a `return`.
    pub fn all_paths_return(body: &BoundBlockStatement) -> bool {
        let graph = Self::create(body);
        let end = graph.end();
        graph
            .branches
            .iter()
            .filter(|branch| branch.to == end)
            .all(|branch| {
                matches!(
                    graph.blocks[branch.from].statements.last(),
                    Some(BoundStatement::Return(_))
                )
            })
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn branches(&self) -> &[BasicBlockBranch] {
        &self.branches
    }

    pub fn start(&self) -> usize {
        0
    }

    pub fn end(&self) -> usize {
        self.blocks.len() - 1
    }

    pub fn incoming(&self, block: usize) -> impl Iterator<Item = &BasicBlockBranch> {
        self.branches.iter().filter(move |branch| branch.to == block)
    }

    pub fn outgoing(&self, block: usize) -> impl Iterator<Item = &BasicBlockBranch> {
        self.branches.iter().filter(move |branch| branch.from == block)
    }

    /// Render the graph in Graphviz dot format.
    pub fn write_dot(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "digraph G {{")?;
        for (id, block) in self.blocks.iter().enumerate() {
            let label = quote(&block.to_string().replace('\n', "\\l"));
            writeln!(writer, "    N{} [label = {}, shape = box]", id, label)?;
        }
        for branch in &self.branches {
            let label = match &branch.condition {
                Some(condition) => quote(&condition.to_string()),
                None => quote(""),
            };
            writeln!(writer, "    N{} -> N{} [label = {}]", branch.from, branch.to, label)?;
        }
        writeln!(writer, "}}")
    }

    /// Drop blocks nothing branches to, repeating until none are left.
    fn remove_unreachable_blocks(&mut self) {
        let end = self.end();
        let mut alive = vec![true; self.blocks.len()];

        loop {
            let unreachable: Vec<usize> = (1..end)
                .filter(|&block| alive[block] && !self.branches.iter().any(|branch| branch.to == block))
                .collect();
            if unreachable.is_empty() {
                break;
            }
            for block in unreachable {
                alive[block] = false;
                self.branches.retain(|branch| branch.from != block);
            }
        }

        let mut remap = vec![usize::MAX; self.blocks.len()];
        let mut next = 0;
        for (old, is_alive) in alive.iter().enumerate() {
            if *is_alive {
                remap[old] = next;
                next += 1;
            }
        }

        let blocks = std::mem::take(&mut self.blocks);
        self.blocks = blocks
            .into_iter()
            .zip(alive)
            .filter_map(|(block, is_alive)| is_alive.then_some(block))
            .collect();
        for branch in &mut self.branches {
            branch.from = remap[branch.from];
            branch.to = remap[branch.to];
        }
    }
}

/// Labels start a block; gotos, conditional gotos and returns end one.
fn split_blocks(statements: &[BoundStatement]) -> Vec<BasicBlock> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for statement in statements {
        match statement {
            BoundStatement::Label(_) => {
                if !current.is_empty() {
                    blocks.push(BasicBlock {
                        statements: std::mem::take(&mut current),
                        ..BasicBlock::default()
                    });
                }
                current.push(statement.clone());
            }
            BoundStatement::Goto(_) | BoundStatement::ConditionalGoto(_) | BoundStatement::Return(_) => {
                current.push(statement.clone());
                blocks.push(BasicBlock {
                    statements: std::mem::take(&mut current),
                    ..BasicBlock::default()
                });
            }
            _ => current.push(statement.clone()),
        }
    }

    if !current.is_empty() {
        blocks.push(BasicBlock {
            statements: current,
            ..BasicBlock::default()
        });
    }
    blocks
}

/// Edges for `blocks`, where the first block is the start and the last the end.
fn connect_blocks(blocks: &[BasicBlock]) -> Vec<BasicBlockBranch> {
    let end = blocks.len() - 1;
    let mut branches = Vec::new();
    let mut connect = |from: usize, to: usize, condition: Option<BoundExpression>| {
        // A constant-true condition is unconditional; constant-false never taken.
        match &condition {
            Some(BoundExpression::Literal(LiteralValue::Bool(true))) => {
                branches.push(BasicBlockBranch { from, to, condition: None })
            }
            Some(BoundExpression::Literal(LiteralValue::Bool(false))) => {}
            _ => branches.push(BasicBlockBranch { from, to, condition }),
        }
    };

    let mut labels: FxHashMap<&BoundLabel, usize> = FxHashMap::default();
    for (index, block) in blocks.iter().enumerate() {
        for statement in &block.statements {
            if let BoundStatement::Label(label) = statement {
                labels.insert(label, index);
            }
        }
    }

    if end == 1 {
        connect(0, end, None);
    } else {
        connect(0, 1, None);
    }

    for from in 1..end {
        let next = from + 1;
        let block = &blocks[from];
        let count = block.statements.len();
        for (i, statement) in block.statements.iter().enumerate() {
            let is_last = i + 1 == count;
            match statement {
                BoundStatement::Goto(label) => {
                    if let Some(&to) = labels.get(label) {
                        connect(from, to, None);
                    }
                }
                BoundStatement::ConditionalGoto(goto) => {
                    let Some(&then_block) = labels.get(&goto.label) else {
                        continue;
                    };
                    let negated = negate(&goto.condition);
                    let (then_condition, else_condition) = if goto.jump_if_true {
                        (goto.condition.clone(), negated)
                    } else {
                        (negated, goto.condition.clone())
                    };
                    connect(from, then_block, Some(then_condition));
                    connect(from, next, Some(else_condition));
                }
                BoundStatement::Return(_) => connect(from, end, None),
                _ => {
                    if is_last {
                        connect(from, next, None);
                    }
                }
            }
        }
    }

    branches
}

fn negate(condition: &BoundExpression) -> BoundExpression {
    match condition {
        BoundExpression::Literal(LiteralValue::Bool(value)) => {
            BoundExpression::Literal(LiteralValue::Bool(!value))
        }
        _ => BoundExpression::Unary(BoundUnaryExpression {
            op: &BOOL_LOGICAL_NEGATION,
            operand: Box::new(condition.clone()),
        }),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.trim_end().replace('"', "\\\""))
}
