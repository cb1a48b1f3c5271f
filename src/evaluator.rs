use crate::ast::{BinaryOp, Callee, Expr, UnaryOp};
use crate::builtins::Builtin;
use crate::error::{NsError, Span};
use crate::fragments;
use crate::host::Host;
use crate::parser::Parser;
use crate::path;
use crate::value::Value;
use log::debug;
use std::io;

/// Flat, session-wide variable table. Keeps insertion order; rebinding a
/// name overwrites it in place.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: Vec<(String, Value)>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    pub fn assign(&mut self, name: &str, value: Value) {
        match self.values.iter_mut().find(|(bound, _)| bound == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Tree-walking evaluator. One instance lives for the whole session and owns
/// the variables, the working directory and the device host.
pub struct Evaluator<H: Host> {
    environment: Environment,
    cwd: String,
    host: H,
    shutdown_requested: bool,
}

impl<H: Host> Evaluator<H> {
    pub fn new(host: H) -> Self {
        Self::with_cwd(host, "/")
    }

    pub fn with_cwd(host: H, cwd: &str) -> Self {
        Self {
            environment: Environment::new(),
            cwd: path::resolve_dir("/", cwd),
            host,
            shutdown_requested: false,
        }
    }

    /// Absolute working directory, always ending in `/`.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Lexes, parses and evaluates one input line.
    pub fn evaluate_line(&mut self, source: &str) -> Result<Value, NsError> {
        let expr = Parser::new(source).parse()?;
        self.evaluate(&expr)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, NsError> {
        match expr {
            Expr::Num { value, .. } => Ok(Value::Num(*value)),
            Expr::Str { value, .. } => Ok(Value::Str(value.clone())),
            Expr::None { .. } => Ok(Value::None),
            Expr::Identifier { name, span } => {
                self.environment.get(name).cloned().ok_or_else(|| {
                    NsError::runtime_error(*span, fragments!["unknown variable `", name, "`"])
                        .with_help("variables are created by assigning them: `name = value`")
                })
            }
            Expr::Binary {
                left,
                operator,
                operator_span,
                right,
                span,
            } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                self.evaluate_binary_op(*operator, operator_span, left_val, right_val, right.span(), span)
            }
            Expr::Unary {
                operator,
                operand,
                span,
                ..
            } => {
                let operand_val = self.evaluate(operand)?;
                self.evaluate_unary_op(*operator, operand_val, span)
            }
            Expr::Assign { name, value, .. } => {
                let val = self.evaluate(value)?;
                debug!("binding `{}` to {}", name, val.type_name());
                self.environment.assign(name, val);
                Ok(Value::None)
            }
            Expr::Call { callee, args, .. } => match callee {
                Callee::Builtin { name, span } => self.call_builtin(name, *span, args),
                Callee::Program { path, span } => self.call_program(path, *span, args),
            },
        }
    }

    fn evaluate_binary_op(
        &self,
        operator: BinaryOp,
        operator_span: &Span,
        left: Value,
        right: Value,
        right_span: &Span,
        span: &Span,
    ) -> Result<Value, NsError> {
        match (left, right) {
            (Value::Num(l), Value::Num(r)) => match operator {
                BinaryOp::Add => Ok(Value::Num(l + r)),
                BinaryOp::Subtract => Ok(Value::Num(l - r)),
                BinaryOp::Multiply => Ok(Value::Num(l * r)),
                BinaryOp::Divide => {
                    if r == 0.0 {
                        Err(NsError::runtime_error(*right_span, fragments!["dividing by 0"]))
                    } else {
                        Ok(Value::Num(l / r))
                    }
                }
            },
            (Value::Str(l), Value::Str(r)) => match operator {
                BinaryOp::Add => Ok(Value::Str(l + &r)),
                _ => Err(NsError::runtime_error(
                    *operator_span,
                    fragments!["string does not support bin `", operator.symbol(), "`"],
                )
                .with_help("strings only support `+` (concatenation)")),
            },
            (l, r) if l.type_name() != r.type_name() => Err(NsError::runtime_error(
                *span,
                fragments![
                    "bin operands type mismatch (`",
                    l.type_name(),
                    "` and `",
                    r.type_name(),
                    "`)"
                ],
            )),
            (l, _) => Err(NsError::runtime_error(
                *span,
                fragments!["type `", l.type_name(), "` does not support bin `", operator.symbol(), "`"],
            )),
        }
    }

    fn evaluate_unary_op(&self, operator: UnaryOp, operand: Value, span: &Span) -> Result<Value, NsError> {
        match (operator, operand) {
            (UnaryOp::Negate, Value::Num(n)) => Ok(Value::Num(-n)),
            (UnaryOp::Plus, Value::Num(n)) => Ok(Value::Num(n)),
            (operator, other) => Err(NsError::runtime_error(
                *span,
                fragments![
                    "type `",
                    other.type_name(),
                    "` does not support unary `",
                    operator.symbol(),
                    "`"
                ],
            )),
        }
    }

    fn call_builtin(&mut self, name: &str, callee_span: Span, args: &[Expr]) -> Result<Value, NsError> {
        let builtin = Builtin::from_name(name).ok_or_else(|| {
            NsError::runtime_error(callee_span, fragments!["unknown builtin function `", name, "`"])
                .with_help("programs are called by path: `'/bin/prog'(...)`")
        })?;

        if let Some(expected) = builtin.arity() {
            if args.len() != expected {
                return Err(NsError::runtime_error(
                    callee_span,
                    fragments!["expected ", expected, " args (found ", args.len(), ")"],
                ));
            }
        }

        debug!("calling builtin `{}` with {} args", builtin.name(), args.len());

        match builtin {
            Builtin::Print => {
                for arg in args {
                    let value = self.evaluate(arg)?;
                    self.host.write_output(&value.to_print_string());
                }
                Ok(Value::None)
            }
            Builtin::Floor => {
                let n = self.expect_num(&args[0])?;
                Ok(Value::Num(n.trunc()))
            }
            Builtin::Cd => {
                let dir = self.expect_str(&args[0])?;
                if dir.is_empty() {
                    return Err(NsError::runtime_error(
                        *args[0].span(),
                        fragments!["expected a non-empty path"],
                    ));
                }

                // every segment has to exist, so `missing/..` is rejected
                // even though it folds back onto the cwd
                let target = path::resolve_dir(&self.cwd, &dir);
                if !self.host.dir_exists(&path::join(&self.cwd, &dir)) {
                    return Err(NsError::runtime_error(
                        *args[0].span(),
                        fragments!["unknown dir `", target, "`"],
                    ));
                }

                debug!("changing dir from {} to {}", self.cwd, target);
                self.cwd = target;
                Ok(Value::None)
            }
            Builtin::Clear => {
                self.host.clear_screen();
                Ok(Value::None)
            }
            Builtin::Shutdown => {
                self.host.shutdown();
                self.shutdown_requested = true;
                Ok(Value::None)
            }
            Builtin::Ls => {
                let entries = self.host.list_entries(&self.cwd).map_err(|error| {
                    host_error(callee_span, fragments!["unable to list dir `", self.cwd, "`"], error)
                })?;

                let listing: String = entries
                    .iter()
                    .map(|entry| format!("{:<6} {}\n", entry.kind.tag(), entry.name))
                    .collect();
                self.host.write_output(&listing);
                Ok(Value::None)
            }
            Builtin::Mkdir => {
                let target = self.expect_path(&args[0])?;
                self.host.make_dir(&target).map_err(|error| {
                    host_error(*args[0].span(), fragments!["unable to create dir `", target, "`"], error)
                })?;
                Ok(Value::None)
            }
            Builtin::Rmdir => {
                let target = self.expect_path(&args[0])?;
                self.host.remove_dir_recursive(&target).map_err(|error| {
                    host_error(*args[0].span(), fragments!["unable to remove dir `", target, "`"], error)
                })?;
                Ok(Value::None)
            }
            Builtin::Rmfile => {
                let target = self.expect_path(&args[0])?;
                self.host.remove_file(&target).map_err(|error| {
                    host_error(*args[0].span(), fragments!["unable to remove file `", target, "`"], error)
                })?;
                Ok(Value::None)
            }
            Builtin::Write => {
                let target = self.expect_path(&args[0])?;
                let contents = self.expect_str(&args[1])?;
                self.host.write_all(&target, &contents).map_err(|error| {
                    host_error(
                        *args[0].span(),
                        fragments!["unable to open file `", target, "` for writing"],
                        error,
                    )
                })?;
                Ok(Value::None)
            }
            Builtin::Read => {
                let target = self.expect_path(&args[0])?;
                let contents = self.host.read_all(&target).map_err(|error| {
                    host_error(*args[0].span(), fragments!["unable to open file `", target, "`"], error)
                })?;
                Ok(Value::Str(contents))
            }
        }
    }

    fn call_program(&mut self, program: &str, span: Span, args: &[Expr]) -> Result<Value, NsError> {
        let mut argv = Vec::with_capacity(args.len());
        for arg in args {
            argv.push(self.expect_str(arg)?);
        }

        // bare names are left to the host's program lookup
        let program = if program.contains('/') {
            path::resolve(&self.cwd, program)
        } else {
            program.to_string()
        };

        debug!("spawning `{}` {:?} in {}", program, argv, self.cwd);
        let code = self
            .host
            .spawn_and_wait(&program, &argv, &self.cwd)
            .map_err(|error| host_error(span, fragments!["unable to run process `", program, "`"], error))?;

        Ok(Value::Num(code.map_or(-1.0, f64::from)))
    }

    fn expect_num(&mut self, arg: &Expr) -> Result<f64, NsError> {
        match self.evaluate(arg)? {
            Value::Num(n) => Ok(n),
            other => Err(type_error(arg, "num", &other)),
        }
    }

    fn expect_str(&mut self, arg: &Expr) -> Result<String, NsError> {
        match self.evaluate(arg)? {
            Value::Str(s) => Ok(s),
            other => Err(type_error(arg, "str", &other)),
        }
    }

    /// A string argument resolved against the working directory.
    fn expect_path(&mut self, arg: &Expr) -> Result<String, NsError> {
        let raw = self.expect_str(arg)?;
        Ok(path::resolve(&self.cwd, &raw))
    }
}

fn type_error(arg: &Expr, expected: &str, found: &Value) -> NsError {
    NsError::runtime_error(
        *arg.span(),
        fragments!["expected type `", expected, "` (found `", found.type_name(), "`)"],
    )
}

fn host_error(span: Span, message: Vec<String>, error: io::Error) -> NsError {
    debug!("host call failed: {}", error);
    NsError::runtime_error(span, message).with_help(error.to_string())
}
