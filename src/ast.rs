use crate::error::Span;
use crate::value::{escape_str, format_num};
use std::fmt;

/// One parsed input line. Built fresh per line and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num {
        value: f64,
        span: Span,
    },
    Str {
        value: String,
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    None {
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        operator_span: Span,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        operator: UnaryOp,
        operator_span: Span,
        operand: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Callee,
        args: Vec<Expr>,
        span: Span,
    },
    Assign {
        name: String,
        name_span: Span,
        value: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Num { span, .. } => span,
            Expr::Str { span, .. } => span,
            Expr::Identifier { span, .. } => span,
            Expr::None { span } => span,
            Expr::Binary { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Call { span, .. } => span,
            Expr::Assign { span, .. } => span,
        }
    }
}

/// What a call invokes. Identifier callees name a builtin, string callees
/// name an external program; the two never share a namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Builtin { name: String, span: Span },
    Program { path: String, span: Span },
}

impl Callee {
    pub fn span(&self) -> &Span {
        match self {
            Callee::Builtin { span, .. } => span,
            Callee::Program { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
}

impl UnaryOp {
    pub fn symbol(&self) -> char {
        match self {
            UnaryOp::Plus => '+',
            UnaryOp::Negate => '-',
        }
    }
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Callee::Builtin { name, .. } => write!(f, "{}", name),
            Callee::Program { path, .. } => write!(f, "'{}'", escape_str(path)),
        }
    }
}

/// Source form, fully parenthesized around binary operations.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Num { value, .. } => write!(f, "{}", format_num(*value)),
            Expr::Str { value, .. } => write!(f, "'{}'", escape_str(value)),
            Expr::Identifier { name, .. } => write!(f, "{}", name),
            Expr::None { .. } => write!(f, "none"),
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Expr::Unary {
                operator, operand, ..
            } => write!(f, "{}{}", operator.symbol(), operand),
            Expr::Call { callee, args, .. } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Assign { name, value, .. } => write!(f, "{} = {}", name, value),
        }
    }
}
