//! Balances opening and closing directives and patches jump targets.
//!
//! Conditionals and loops close with `end`, blocks with `endblock`,
//! content includes with `endinclude` and content tags or shortcuts with
//! `end<name>`. Crossed or missing closers are syntax errors.

use super::errors::{DirectiveError, SyntaxErrorKind};
use super::ir::{Instruction, Statement};

/// A construct that has been opened and not yet closed.
#[derive(Debug)]
enum Open {
    /// Indices of the `if`/`else if`/`else` statements seen so far.
    Conditional { branches: Vec<usize>, has_else: bool },
    Loop(usize),
    Block(usize),
    Include(usize),
    Tag(usize, String),
    Shortcut(usize, String),
}

impl Open {
    fn opener(&self) -> usize {
        match self {
            Self::Conditional { branches, .. } => branches[0],
            Self::Loop(i) | Self::Block(i) | Self::Include(i) => *i,
            Self::Tag(i, _) | Self::Shortcut(i, _) => *i,
        }
    }

    fn closer(&self) -> String {
        match self {
            Self::Conditional { .. } | Self::Loop(_) => "{{end}}".to_string(),
            Self::Block(_) => "{{endblock}}".to_string(),
            Self::Include(_) => "{{endinclude}}".to_string(),
            Self::Tag(_, name) | Self::Shortcut(_, name) => format!("{{{{end{}}}}}", name),
        }
    }
}

/// A balancing failure at statement `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkError {
    pub index: usize,
    pub error: DirectiveError,
}

impl LinkError {
    fn new(index: usize, kind: SyntaxErrorKind, reason: String) -> Self {
        Self {
            index,
            error: DirectiveError::new(kind, reason, 0),
        }
    }
}

/// Checks balance and replaces every placeholder jump target.
pub(crate) fn link(statements: &mut [Statement]) -> Result<(), LinkError> {
    let mut stack: Vec<Open> = Vec::new();

    for index in 0..statements.len() {
        match &statements[index].instruction {
            Instruction::If { .. } => stack.push(Open::Conditional {
                branches: vec![index],
                has_else: false,
            }),
            Instruction::ElseIf { .. } | Instruction::Else { .. } => {
                let is_else = matches!(statements[index].instruction, Instruction::Else { .. });
                match stack.last_mut() {
                    Some(Open::Conditional { branches, has_else }) if !*has_else => {
                        branches.push(index);
                        *has_else = is_else;
                    }
                    _ => {
                        return Err(LinkError::new(
                            index,
                            SyntaxErrorKind::MisplacedElse,
                            "no open `if` to continue".to_string(),
                        ));
                    }
                }
            }
            Instruction::Loop(_) => stack.push(Open::Loop(index)),
            Instruction::BlockOpen(_) => stack.push(Open::Block(index)),
            Instruction::Include { content: true, .. } => stack.push(Open::Include(index)),
            Instruction::Tag {
                name,
                content: true,
                ..
            } => stack.push(Open::Tag(index, name.clone())),
            Instruction::Shortcut {
                name,
                content: true,
                ..
            } => stack.push(Open::Shortcut(index, name.clone())),

            Instruction::End => match stack.pop() {
                Some(Open::Conditional { branches, .. }) => {
                    patch_conditional(statements, &branches, index);
                }
                Some(Open::Loop(opener)) => {
                    if let Instruction::Loop(l) = &mut statements[opener].instruction {
                        l.end = index;
                    }
                }
                other => return Err(unbalanced(index, "{{end}}", other)),
            },
            Instruction::BlockClose => match stack.pop() {
                Some(Open::Block(_)) => {}
                other => return Err(unbalanced(index, "{{endblock}}", other)),
            },
            Instruction::IncludeEnd => match stack.pop() {
                Some(Open::Include(_)) => {}
                other => return Err(unbalanced(index, "{{endinclude}}", other)),
            },
            Instruction::TagEnd(name) => {
                let name = name.clone();
                match stack.pop() {
                    Some(Open::Tag(_, open)) if open == name => {}
                    other => return Err(unbalanced(index, &format!("{{{{end{}}}}}", name), other)),
                }
            }
            Instruction::ShortcutEnd(name) => {
                let name = name.clone();
                match stack.pop() {
                    Some(Open::Shortcut(_, open)) if open == name => {}
                    other => return Err(unbalanced(index, &format!("{{{{end{}}}}}", name), other)),
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some(open) => Err(LinkError::new(
            open.opener(),
            SyntaxErrorKind::UnclosedBlock,
            format!("not closed, expected {}", open.closer()),
        )),
        None => Ok(()),
    }
}

/// Points each branch at the next one and every branch end at `end`.
fn patch_conditional(statements: &mut [Statement], branches: &[usize], end: usize) {
    for (n, &branch) in branches.iter().enumerate() {
        let next = branches.get(n + 1).copied().unwrap_or(end);
        match &mut statements[branch].instruction {
            Instruction::If { alt, .. } => *alt = next,
            Instruction::ElseIf {
                alt, end: branch_end, ..
            } => {
                *alt = next;
                *branch_end = end;
            }
            Instruction::Else { end: branch_end } => *branch_end = end,
            _ => {}
        }
    }
}

fn unbalanced(index: usize, found: &str, open: Option<Open>) -> LinkError {
    match open {
        None => LinkError::new(
            index,
            SyntaxErrorKind::UnexpectedCloser,
            format!("{} has nothing to close", found),
        ),
        Some(open) => LinkError::new(
            index,
            SyntaxErrorKind::MismatchedCloser,
            format!("expected {}, found {}", open.closer(), found),
        ),
    }
}
